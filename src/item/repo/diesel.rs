use crate::item::repo::Error;
use crate::item::{LibraryBook, ShelfLocation, WishlistBook};
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::SqliteConnection;
use r2d2::Pool;

mod schema;

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = schema::book)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookEntity {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub price: Option<f64>,
    pub review: Option<String>,
    pub synopsis: Option<String>,
    pub bookcase_no: Option<i32>,
    pub shelf_no: Option<i32>,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub added_at: chrono::NaiveDateTime,
}

impl BookEntity {

    pub fn to_domain(self) -> LibraryBook {
        // 위치 컬럼이 한 쪽만 채워진 행은 위치 없음으로 취급 한다.
        let location = ShelfLocation::from_pair(self.bookcase_no, self.shelf_no);

        let mut builder = LibraryBook::builder()
            .isbn(self.isbn)
            .title(self.title)
            .author(self.author)
            .cover_url_opt(self.cover_url)
            .price_opt(self.price)
            .synopsis_opt(self.synopsis)
            .publisher_opt(self.publisher)
            .page_count_opt(self.page_count)
            .location_opt(location)
            .added_at(self.added_at);

        if let Some(review) = self.review {
            builder = builder.review(review);
        }

        builder.build().unwrap()
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::book)]
pub struct NewBook<'a> {
    pub isbn: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub cover_url: Option<&'a str>,
    pub price: Option<f64>,
    pub review: Option<&'a str>,
    pub synopsis: Option<&'a str>,
    pub bookcase_no: Option<i32>,
    pub shelf_no: Option<i32>,
    pub publisher: Option<&'a str>,
    pub page_count: Option<i32>,
    pub added_at: chrono::NaiveDateTime,
}

impl <'a, 'b> NewBook<'a> where 'b: 'a {
    pub fn from(book: &'b LibraryBook) -> Self {
        Self {
            isbn: book.isbn(),
            title: book.title(),
            author: book.author(),
            cover_url: book.cover_url(),
            price: book.price(),
            review: book.review(),
            synopsis: book.synopsis(),
            bookcase_no: book.location().map(|l| l.bookcase()),
            shelf_no: book.location().map(|l| l.shelf()),
            publisher: book.publisher(),
            page_count: book.page_count(),
            added_at: book.added_at().unwrap_or_else(|| chrono::Local::now().naive_local()),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = schema::wishlist_book)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WishlistEntity {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub price: Option<f64>,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub added_at: chrono::NaiveDateTime,
}

impl WishlistEntity {

    pub fn to_domain(self) -> WishlistBook {
        WishlistBook::builder()
            .isbn(self.isbn)
            .title(self.title)
            .author(self.author)
            .cover_url_opt(self.cover_url)
            .price_opt(self.price)
            .publisher_opt(self.publisher)
            .page_count_opt(self.page_count)
            .added_at(self.added_at)
            .build()
            .unwrap()
    }
}

#[derive(Insertable)]
#[diesel(table_name = schema::wishlist_book)]
pub struct NewWishlistBook<'a> {
    pub isbn: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub cover_url: Option<&'a str>,
    pub price: Option<f64>,
    pub publisher: Option<&'a str>,
    pub page_count: Option<i32>,
    pub added_at: chrono::NaiveDateTime,
}

impl <'a, 'b> NewWishlistBook<'a> where 'b: 'a {
    pub fn from(book: &'b WishlistBook) -> Self {
        Self {
            isbn: book.isbn(),
            title: book.title(),
            author: book.author(),
            cover_url: book.cover_url(),
            price: book.price(),
            publisher: book.publisher(),
            page_count: book.page_count(),
            added_at: book.added_at().unwrap_or_else(|| chrono::Local::now().naive_local()),
        }
    }
}

pub struct LibrarySqliteStore {
    pool: SqlitePool,
}

impl LibrarySqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LibrarySqliteStore {

    pub fn get_all(&self) -> Result<Vec<BookEntity>, Error> {
        use schema::book::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let results = book
            .order_by(added_at.desc())
            .select(BookEntity::as_select())
            .load(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(results)
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookEntity>, Error> {
        use schema::book::dsl::book;
        use schema::book::dsl::isbn as db_isbn;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let result = book
            .filter(db_isbn.eq(isbn))
            .select(BookEntity::as_select())
            .first(&mut connection)
            .optional()
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(result)
    }

    pub fn find_by_location(&self, location: &ShelfLocation) -> Result<Vec<BookEntity>, Error> {
        use schema::book::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let results = book
            .filter(bookcase_no.eq(Some(location.bookcase())))
            .filter(shelf_no.eq(Some(location.shelf())))
            .order_by(added_at.desc())
            .select(BookEntity::as_select())
            .load(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(results)
    }

    /// 같은 ISBN 행이 존재하면 REPLACE로 행 전체를 교체 한다.
    pub fn upsert(&self, entry: &LibraryBook) -> Result<BookEntity, Error> {
        use schema::book;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        diesel::replace_into(book::table)
            .values(NewBook::from(entry))
            .execute(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        let saved = book::dsl::book
            .filter(book::dsl::isbn.eq(entry.isbn()))
            .select(BookEntity::as_select())
            .first(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(saved)
    }

    pub fn delete(&self, entry: &LibraryBook) -> Result<usize, Error> {
        use schema::book::dsl::book;
        use schema::book::dsl::isbn as db_isbn;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let deleted_count = diesel::delete(book.filter(db_isbn.eq(entry.isbn())))
            .execute(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(deleted_count)
    }

    pub fn update_location(&self, isbn: &str, location: &ShelfLocation) -> Result<usize, Error> {
        use schema::book::dsl::*;
        use schema::book::dsl::isbn as db_isbn;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let updated_count = diesel::update(book.filter(db_isbn.eq(isbn)))
            .set((
                bookcase_no.eq(Some(location.bookcase())),
                shelf_no.eq(Some(location.shelf())),
            ))
            .execute(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(updated_count)
    }
}

pub struct WishlistSqliteStore {
    pool: SqlitePool,
}

impl WishlistSqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl WishlistSqliteStore {

    pub fn get_all(&self) -> Result<Vec<WishlistEntity>, Error> {
        use schema::wishlist_book::dsl::*;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let results = wishlist_book
            .order_by(added_at.desc())
            .select(WishlistEntity::as_select())
            .load(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(results)
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Result<Option<WishlistEntity>, Error> {
        use schema::wishlist_book::dsl::wishlist_book;
        use schema::wishlist_book::dsl::isbn as db_isbn;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let result = wishlist_book
            .filter(db_isbn.eq(isbn))
            .select(WishlistEntity::as_select())
            .first(&mut connection)
            .optional()
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(result)
    }

    /// 같은 ISBN 행이 존재하면 REPLACE로 행 전체를 교체 한다.
    pub fn upsert(&self, entry: &WishlistBook) -> Result<WishlistEntity, Error> {
        use schema::wishlist_book;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        diesel::replace_into(wishlist_book::table)
            .values(NewWishlistBook::from(entry))
            .execute(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        let saved = wishlist_book::dsl::wishlist_book
            .filter(wishlist_book::dsl::isbn.eq(entry.isbn()))
            .select(WishlistEntity::as_select())
            .first(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(saved)
    }

    pub fn delete(&self, entry: &WishlistBook) -> Result<usize, Error> {
        use schema::wishlist_book::dsl::wishlist_book;
        use schema::wishlist_book::dsl::isbn as db_isbn;

        let mut connection = self.pool.get()
            .map_err(|e| Error::ConnectError(e.to_string()))?;
        let deleted_count = diesel::delete(wishlist_book.filter(db_isbn.eq(entry.isbn())))
            .execute(&mut connection)
            .map_err(|e| Error::SqlExecuteError(e.to_string()))?;

        Ok(deleted_count)
    }
}
