pub mod repo;

use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

/// Item 모듈에서 사용할 에러 열거
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// 필수 데이터가 입력 되지 않음
    RequireArgumentMissing(String),

    /// 유효하지 않은 입력 값
    InvalidArgument(String),
}

impl Display for ItemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 서가 위치. 책장 번호와 단 번호는 반드시 쌍으로 존재한다.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ShelfLocation {
    bookcase: i32,
    shelf: i32,
}

impl ShelfLocation {

    pub fn new(bookcase: i32, shelf: i32) -> Result<Self, ItemError> {
        if bookcase < 1 {
            return Err(ItemError::InvalidArgument(format!("bookcase must be positive: {}", bookcase)));
        }
        if shelf < 1 {
            return Err(ItemError::InvalidArgument(format!("shelf must be positive: {}", shelf)));
        }
        Ok(Self { bookcase, shelf })
    }

    /// 두 값이 모두 존재할 때만 위치로 인정 한다. 한 쪽만 있는 값은 버려진다.
    pub fn from_pair(bookcase: Option<i32>, shelf: Option<i32>) -> Option<Self> {
        match (bookcase, shelf) {
            (Some(b), Some(s)) => ShelfLocation::new(b, s).ok(),
            _ => None,
        }
    }

    pub fn bookcase(&self) -> i32 {
        self.bookcase
    }

    pub fn shelf(&self) -> i32 {
        self.shelf
    }
}

impl Display for ShelfLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.bookcase, self.shelf)
    }
}

/// 서재에 소장 중인 도서
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryBook {
    isbn: String,
    title: String,
    author: String,

    cover_url: Option<String>,
    price: Option<f64>,
    review: Option<String>,
    synopsis: Option<String>,
    publisher: Option<String>,
    page_count: Option<i32>,

    location: Option<ShelfLocation>,

    added_at: Option<chrono::NaiveDateTime>,
}

impl LibraryBook {
    pub fn builder() -> LibraryBookBuilder {
        LibraryBookBuilder::new()
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn review(&self) -> Option<&str> {
        self.review.as_deref()
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.synopsis.as_deref()
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn page_count(&self) -> Option<i32> {
        self.page_count
    }

    pub fn location(&self) -> Option<ShelfLocation> {
        self.location
    }

    pub fn added_at(&self) -> Option<chrono::NaiveDateTime> {
        self.added_at
    }

    pub fn to_builder(&self) -> LibraryBookBuilder {
        let mut builder = LibraryBookBuilder::new()
            .isbn(self.isbn.clone())
            .title(self.title.clone())
            .author(self.author.clone());

        if let Some(cover_url) = &self.cover_url {
            builder = builder.cover_url(cover_url.clone());
        }
        if let Some(price) = self.price {
            builder = builder.price(price);
        }
        if let Some(review) = &self.review {
            builder = builder.review(review.clone());
        }
        if let Some(synopsis) = &self.synopsis {
            builder = builder.synopsis(synopsis.clone());
        }
        if let Some(publisher) = &self.publisher {
            builder = builder.publisher(publisher.clone());
        }
        if let Some(page_count) = self.page_count {
            builder = builder.page_count(page_count);
        }
        if let Some(location) = self.location {
            builder = builder.location(location);
        }
        if let Some(added_at) = self.added_at {
            builder = builder.added_at(added_at);
        }

        builder
    }
}

impl AsRef<LibraryBook> for LibraryBook {
    fn as_ref(&self) -> &LibraryBook {
        self
    }
}

/// LibraryBook 빌더
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryBookBuilder {
    isbn: Option<String>,
    title: Option<String>,
    author: Option<String>,
    cover_url: Option<String>,
    price: Option<f64>,
    review: Option<String>,
    synopsis: Option<String>,
    publisher: Option<String>,
    page_count: Option<i32>,
    location: Option<ShelfLocation>,
    added_at: Option<chrono::NaiveDateTime>,
}

impl LibraryBookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isbn<S: Into<String>>(mut self, isbn: S) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn cover_url<S: Into<String>>(mut self, cover_url: S) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    pub fn cover_url_opt(mut self, cover_url: Option<String>) -> Self {
        self.cover_url = cover_url;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn price_opt(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    pub fn review<S: Into<String>>(mut self, review: S) -> Self {
        self.review = Some(review.into());
        self
    }

    pub fn synopsis<S: Into<String>>(mut self, synopsis: S) -> Self {
        self.synopsis = Some(synopsis.into());
        self
    }

    pub fn synopsis_opt(mut self, synopsis: Option<String>) -> Self {
        self.synopsis = synopsis;
        self
    }

    pub fn publisher<S: Into<String>>(mut self, publisher: S) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn publisher_opt(mut self, publisher: Option<String>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn page_count(mut self, page_count: i32) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn page_count_opt(mut self, page_count: Option<i32>) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn location(mut self, location: ShelfLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn location_opt(mut self, location: Option<ShelfLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn added_at(mut self, added_at: chrono::NaiveDateTime) -> Self {
        self.added_at = Some(added_at);
        self
    }

    pub fn build(self) -> Result<LibraryBook, ItemError> {
        let isbn = self.isbn.ok_or(ItemError::RequireArgumentMissing("isbn".to_owned()))?;
        let title = self.title.ok_or(ItemError::RequireArgumentMissing("title".to_owned()))?;
        let author = self.author.ok_or(ItemError::RequireArgumentMissing("author".to_owned()))?;

        Ok(LibraryBook {
            isbn,
            title,
            author,
            cover_url: self.cover_url,
            price: self.price,
            review: self.review,
            synopsis: self.synopsis,
            publisher: self.publisher,
            page_count: self.page_count,
            location: self.location,
            added_at: self.added_at,
        })
    }
}

/// 위시리스트에 담긴 도서. 아직 소장 전이므로 서평, 줄거리, 서가 위치를 가지지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistBook {
    isbn: String,
    title: String,
    author: String,

    cover_url: Option<String>,
    price: Option<f64>,
    publisher: Option<String>,
    page_count: Option<i32>,

    added_at: Option<chrono::NaiveDateTime>,
}

impl WishlistBook {
    pub fn builder() -> WishlistBookBuilder {
        WishlistBookBuilder::new()
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn page_count(&self) -> Option<i32> {
        self.page_count
    }

    pub fn added_at(&self) -> Option<chrono::NaiveDateTime> {
        self.added_at
    }
}

impl AsRef<WishlistBook> for WishlistBook {
    fn as_ref(&self) -> &WishlistBook {
        self
    }
}

/// WishlistBook 빌더
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WishlistBookBuilder {
    isbn: Option<String>,
    title: Option<String>,
    author: Option<String>,
    cover_url: Option<String>,
    price: Option<f64>,
    publisher: Option<String>,
    page_count: Option<i32>,
    added_at: Option<chrono::NaiveDateTime>,
}

impl WishlistBookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isbn<S: Into<String>>(mut self, isbn: S) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn cover_url_opt(mut self, cover_url: Option<String>) -> Self {
        self.cover_url = cover_url;
        self
    }

    pub fn price_opt(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    pub fn publisher_opt(mut self, publisher: Option<String>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn page_count_opt(mut self, page_count: Option<i32>) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn added_at(mut self, added_at: chrono::NaiveDateTime) -> Self {
        self.added_at = Some(added_at);
        self
    }

    pub fn build(self) -> Result<WishlistBook, ItemError> {
        let isbn = self.isbn.ok_or(ItemError::RequireArgumentMissing("isbn".to_owned()))?;
        let title = self.title.ok_or(ItemError::RequireArgumentMissing("title".to_owned()))?;
        let author = self.author.ok_or(ItemError::RequireArgumentMissing("author".to_owned()))?;

        Ok(WishlistBook {
            isbn,
            title,
            author,
            cover_url: self.cover_url,
            price: self.price,
            publisher: self.publisher,
            page_count: self.page_count,
            added_at: self.added_at,
        })
    }
}

/// 서재 도서와 위시리스트 도서를 한 목록에 표시하기 위한 열거.
/// 공통 표시 필드는 런타임 타입 검사 없이 이 열거를 통해 투영 된다.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Library(LibraryBook),
    Wishlist(WishlistBook),
}

impl Entry {

    pub fn isbn(&self) -> &str {
        match self {
            Entry::Library(book) => book.isbn(),
            Entry::Wishlist(book) => book.isbn(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Entry::Library(book) => book.title(),
            Entry::Wishlist(book) => book.title(),
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Entry::Library(book) => book.author(),
            Entry::Wishlist(book) => book.author(),
        }
    }

    pub fn cover_url(&self) -> Option<&str> {
        match self {
            Entry::Library(book) => book.cover_url(),
            Entry::Wishlist(book) => book.cover_url(),
        }
    }
}

/// 서재 도서 저장소
///
/// 모든 변경 연산은 저장소를 통해서만 이루어지며 변경이 성공할 때마다
/// 구독자들에게 전체 목록 스냅샷이 전달 된다.
pub trait LibraryRepository {

    /// 모든 도서를 등록일 내림차순으로 가져온다.
    fn get_all(&self) -> Result<Vec<LibraryBook>, repo::Error>;

    /// 전달 받은 ISBN으로 도서를 찾는다.
    fn find_by_isbn(&self, isbn: &str) -> Result<Option<LibraryBook>, repo::Error>;

    /// 전달 받은 서가 위치에 꽂혀 있는 도서를 찾는다.
    fn find_by_location(&self, location: &ShelfLocation) -> Result<Vec<LibraryBook>, repo::Error>;

    /// 도서를 저장한다. 같은 ISBN이 이미 존재하면 행 전체를 교체한다.
    fn upsert(&self, book: &LibraryBook) -> Result<LibraryBook, repo::Error>;

    /// 도서를 삭제하고 삭제된 행의 수를 반환한다.
    fn delete(&self, book: &LibraryBook) -> Result<usize, repo::Error>;

    /// 도서의 서가 위치만 갱신한다. 전체 교체가 아닌 유일한 부분 갱신이다.
    fn update_location(&self, isbn: &str, location: &ShelfLocation) -> Result<usize, repo::Error>;

    /// 전체 목록 스냅샷을 수신할 채널을 등록한다.
    fn subscribe(&self) -> Receiver<Vec<LibraryBook>>;
}

/// 위시리스트 저장소
pub trait WishlistRepository {

    /// 모든 도서를 등록일 내림차순으로 가져온다.
    fn get_all(&self) -> Result<Vec<WishlistBook>, repo::Error>;

    /// 전달 받은 ISBN으로 도서를 찾는다.
    fn find_by_isbn(&self, isbn: &str) -> Result<Option<WishlistBook>, repo::Error>;

    /// 도서를 저장한다. 같은 ISBN이 이미 존재하면 행 전체를 교체한다.
    fn upsert(&self, book: &WishlistBook) -> Result<WishlistBook, repo::Error>;

    /// 도서를 삭제하고 삭제된 행의 수를 반환한다.
    fn delete(&self, book: &WishlistBook) -> Result<usize, repo::Error>;

    /// 전체 목록 스냅샷을 수신할 채널을 등록한다.
    fn subscribe(&self) -> Receiver<Vec<WishlistBook>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelf_location_rejects_non_positive_numbers() {
        assert!(ShelfLocation::new(0, 2).is_err());
        assert!(ShelfLocation::new(3, -1).is_err());
        assert!(ShelfLocation::new(3, 2).is_ok());
    }

    #[test]
    fn shelf_location_from_pair_requires_both_values() {
        assert_eq!(ShelfLocation::from_pair(Some(3), None), None);
        assert_eq!(ShelfLocation::from_pair(None, Some(2)), None);
        assert_eq!(
            ShelfLocation::from_pair(Some(3), Some(2)),
            Some(ShelfLocation::new(3, 2).unwrap())
        );
    }

    #[test]
    fn library_book_builder_requires_isbn_title_author() {
        let missing_author = LibraryBook::builder()
            .isbn("9780441013593")
            .title("Dune")
            .build();

        assert_eq!(missing_author, Err(ItemError::RequireArgumentMissing("author".to_owned())));
    }

    #[test]
    fn library_book_to_builder_round_trips_every_field() {
        let book = LibraryBook::builder()
            .isbn("9780441013593")
            .title("Dune")
            .author("Frank Herbert")
            .cover_url("https://covers.example/dune.jpg")
            .price(9.99)
            .review("re-read every year")
            .synopsis("Desert planet.")
            .publisher("Ace")
            .page_count(896)
            .location(ShelfLocation::new(1, 4).unwrap())
            .build()
            .unwrap();

        assert_eq!(book.to_builder().build().unwrap(), book);
    }

    #[test]
    fn entry_projects_shared_fields_from_both_variants() {
        let library = LibraryBook::builder()
            .isbn("9780441013593")
            .title("Dune")
            .author("Frank Herbert")
            .build()
            .unwrap();
        let wishlist = WishlistBook::builder()
            .isbn("9780553293357")
            .title("Foundation")
            .author("Isaac Asimov")
            .cover_url_opt(Some("https://covers.example/foundation.jpg".to_owned()))
            .build()
            .unwrap();

        let entries = vec![Entry::Library(library), Entry::Wishlist(wishlist)];

        assert_eq!(entries[0].title(), "Dune");
        assert_eq!(entries[0].cover_url(), None);
        assert_eq!(entries[1].author(), "Isaac Asimov");
        assert_eq!(entries[1].cover_url(), Some("https://covers.example/foundation.jpg"));
    }
}
