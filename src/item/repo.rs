use crate::item::{LibraryBook, LibraryRepository, ShelfLocation, WishlistBook, WishlistRepository};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use tracing::error;

mod diesel;

pub use crate::item::repo::diesel::SqlitePool;

use crate::item::repo::diesel::{LibrarySqliteStore, WishlistSqliteStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ConnectError(String),

    SqlExecuteError(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

const SCHEMA_DDL: &str = "
    CREATE TABLE IF NOT EXISTS book (
        isbn TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        cover_url TEXT,
        price DOUBLE,
        review TEXT,
        synopsis TEXT,
        bookcase_no INTEGER,
        shelf_no INTEGER,
        publisher TEXT,
        page_count INTEGER,
        added_at TIMESTAMP NOT NULL
    );
    CREATE TABLE IF NOT EXISTS wishlist_book (
        isbn TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        cover_url TEXT,
        price DOUBLE,
        publisher TEXT,
        page_count INTEGER,
        added_at TIMESTAMP NOT NULL
    );
";

/// 스키마가 없는 새 데이터베이스 파일을 초기화 한다.
/// 이후의 컬럼 추가 마이그레이션은 migrations/ 디렉터리의 SQL로 관리 된다.
pub fn initialize_schema(pool: &SqlitePool) -> Result<(), Error> {
    use ::diesel::connection::SimpleConnection;

    let mut connection = pool.get()
        .map_err(|e| Error::ConnectError(e.to_string()))?;
    connection.batch_execute(SCHEMA_DDL)
        .map_err(|e| Error::SqlExecuteError(e.to_string()))
}

/// 구독자 채널 목록. 스냅샷 발행 시 끊어진 구독자는 목록에서 제거 된다.
struct Subscribers<T> {
    senders: Mutex<Vec<Sender<Vec<T>>>>,
}

impl<T: Clone> Subscribers<T> {
    fn new() -> Self {
        Self { senders: Mutex::new(Vec::new()) }
    }

    fn add(&self, sender: Sender<Vec<T>>) {
        self.senders.lock().unwrap().push(sender);
    }

    fn publish(&self, snapshot: &[T]) {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|sender| sender.send(snapshot.to_vec()).is_ok());
    }
}

/// 서재 저장소 구현체
///
/// 변경 연산이 성공할 때마다 전체 목록을 다시 읽어 구독자들에게 발행한다.
/// 스냅샷 발행 중의 조회 실패는 로그만 남기고 해당 발행을 건너뛴다.
pub struct ObservableLibraryStore {
    store: LibrarySqliteStore,
    subscribers: Subscribers<LibraryBook>,
}

impl ObservableLibraryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: LibrarySqliteStore::new(pool),
            subscribers: Subscribers::new(),
        }
    }

    fn publish(&self) {
        match self.load_all() {
            Ok(books) => self.subscribers.publish(&books),
            Err(e) => error!("failed to load library snapshot: {:?}", e),
        }
    }

    fn load_all(&self) -> Result<Vec<LibraryBook>, Error> {
        let books = self.store.get_all()?
            .into_iter()
            .map(|entity| entity.to_domain())
            .collect();

        Ok(books)
    }
}

impl LibraryRepository for ObservableLibraryStore {

    fn get_all(&self) -> Result<Vec<LibraryBook>, Error> {
        self.load_all()
    }

    fn find_by_isbn(&self, isbn: &str) -> Result<Option<LibraryBook>, Error> {
        let found = self.store.find_by_isbn(isbn)?
            .map(|entity| entity.to_domain());

        Ok(found)
    }

    fn find_by_location(&self, location: &ShelfLocation) -> Result<Vec<LibraryBook>, Error> {
        let books = self.store.find_by_location(location)?
            .into_iter()
            .map(|entity| entity.to_domain())
            .collect();

        Ok(books)
    }

    fn upsert(&self, book: &LibraryBook) -> Result<LibraryBook, Error> {
        let saved = self.store.upsert(book)?.to_domain();
        self.publish();

        Ok(saved)
    }

    fn delete(&self, book: &LibraryBook) -> Result<usize, Error> {
        let deleted_count = self.store.delete(book)?;
        if deleted_count > 0 {
            self.publish();
        }

        Ok(deleted_count)
    }

    fn update_location(&self, isbn: &str, location: &ShelfLocation) -> Result<usize, Error> {
        let updated_count = self.store.update_location(isbn, location)?;
        if updated_count > 0 {
            self.publish();
        }

        Ok(updated_count)
    }

    fn subscribe(&self) -> Receiver<Vec<LibraryBook>> {
        let (sender, receiver) = channel();

        // 등록 직후 현재 스냅샷을 먼저 전달 한다.
        match self.load_all() {
            Ok(books) => _ = sender.send(books),
            Err(e) => error!("failed to load library snapshot: {:?}", e),
        }
        self.subscribers.add(sender);

        receiver
    }
}

/// 위시리스트 저장소 구현체
pub struct ObservableWishlistStore {
    store: WishlistSqliteStore,
    subscribers: Subscribers<WishlistBook>,
}

impl ObservableWishlistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: WishlistSqliteStore::new(pool),
            subscribers: Subscribers::new(),
        }
    }

    fn publish(&self) {
        match self.load_all() {
            Ok(books) => self.subscribers.publish(&books),
            Err(e) => error!("failed to load wishlist snapshot: {:?}", e),
        }
    }

    fn load_all(&self) -> Result<Vec<WishlistBook>, Error> {
        let books = self.store.get_all()?
            .into_iter()
            .map(|entity| entity.to_domain())
            .collect();

        Ok(books)
    }
}

impl WishlistRepository for ObservableWishlistStore {

    fn get_all(&self) -> Result<Vec<WishlistBook>, Error> {
        self.load_all()
    }

    fn find_by_isbn(&self, isbn: &str) -> Result<Option<WishlistBook>, Error> {
        let found = self.store.find_by_isbn(isbn)?
            .map(|entity| entity.to_domain());

        Ok(found)
    }

    fn upsert(&self, book: &WishlistBook) -> Result<WishlistBook, Error> {
        let saved = self.store.upsert(book)?.to_domain();
        self.publish();

        Ok(saved)
    }

    fn delete(&self, book: &WishlistBook) -> Result<usize, Error> {
        let deleted_count = self.store.delete(book)?;
        if deleted_count > 0 {
            self.publish();
        }

        Ok(deleted_count)
    }

    fn subscribe(&self) -> Receiver<Vec<WishlistBook>> {
        let (sender, receiver) = channel();

        match self.load_all() {
            Ok(books) => _ = sender.send(books),
            Err(e) => error!("failed to load wishlist snapshot: {:?}", e),
        }
        self.subscribers.add(sender);

        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::diesel::r2d2::ConnectionManager;
    use r2d2::Pool;

    // 커넥션마다 별도의 메모리 DB가 생기므로 풀 크기는 1로 고정 한다.
    fn memory_pool() -> SqlitePool {
        let manager = ConnectionManager::new(":memory:");
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .unwrap();

        initialize_schema(&pool).unwrap();
        pool
    }

    fn library_book(isbn: &str, title: &str) -> LibraryBook {
        LibraryBook::builder()
            .isbn(isbn)
            .title(title)
            .author("Frank Herbert")
            .build()
            .unwrap()
    }

    fn wishlist_book(isbn: &str, title: &str) -> WishlistBook {
        WishlistBook::builder()
            .isbn(isbn)
            .title(title)
            .author("Frank Herbert")
            .build()
            .unwrap()
    }

    #[test]
    fn upsert_then_find_returns_stored_book() {
        let store = ObservableLibraryStore::new(memory_pool());

        let saved = store.upsert(&library_book("9780441013593", "Dune")).unwrap();

        assert!(saved.added_at().is_some());
        let found = store.find_by_isbn("9780441013593").unwrap().unwrap();
        assert_eq!(found.title(), "Dune");
        assert_eq!(found.location(), None);
    }

    #[test]
    fn upsert_replaces_whole_row_for_same_isbn() {
        let store = ObservableLibraryStore::new(memory_pool());

        let first = library_book("9780441013593", "Dune")
            .to_builder()
            .review("first impression")
            .build()
            .unwrap();
        store.upsert(&first).unwrap();

        // 같은 ISBN을 다시 저장하면 부분 병합 없이 행 전체가 바뀐다.
        store.upsert(&library_book("9780441013593", "Dune (revised)")).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title(), "Dune (revised)");
        assert_eq!(all[0].review(), None);
    }

    #[test]
    fn get_all_orders_by_added_at_descending() {
        let store = ObservableLibraryStore::new(memory_pool());

        let older = library_book("9780441013593", "Dune")
            .to_builder()
            .added_at(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap())
            .build()
            .unwrap();
        let newer = library_book("9780553293357", "Foundation")
            .to_builder()
            .added_at(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(9, 0, 0).unwrap())
            .build()
            .unwrap();

        store.upsert(&older).unwrap();
        store.upsert(&newer).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all[0].isbn(), "9780553293357");
        assert_eq!(all[1].isbn(), "9780441013593");
    }

    #[test]
    fn update_location_touches_only_location_columns() {
        let store = ObservableLibraryStore::new(memory_pool());

        let book = library_book("9780441013593", "Dune")
            .to_builder()
            .review("keep me")
            .build()
            .unwrap();
        store.upsert(&book).unwrap();

        let location = ShelfLocation::new(3, 2).unwrap();
        let updated = store.update_location("9780441013593", &location).unwrap();

        assert_eq!(updated, 1);
        let found = store.find_by_isbn("9780441013593").unwrap().unwrap();
        assert_eq!(found.location(), Some(location));
        assert_eq!(found.review(), Some("keep me"));
    }

    #[test]
    fn find_by_location_returns_books_on_that_shelf_only() {
        let store = ObservableLibraryStore::new(memory_pool());

        let located = library_book("9780441013593", "Dune")
            .to_builder()
            .location(ShelfLocation::new(3, 2).unwrap())
            .build()
            .unwrap();
        store.upsert(&located).unwrap();
        store.upsert(&library_book("9780553293357", "Foundation")).unwrap();

        let on_shelf = store.find_by_location(&ShelfLocation::new(3, 2).unwrap()).unwrap();

        assert_eq!(on_shelf.len(), 1);
        assert_eq!(on_shelf[0].isbn(), "9780441013593");
    }

    #[test]
    fn subscribers_receive_snapshot_on_subscribe_and_after_each_mutation() {
        let store = ObservableLibraryStore::new(memory_pool());
        store.upsert(&library_book("9780441013593", "Dune")).unwrap();

        let receiver = store.subscribe();
        let initial = receiver.recv().unwrap();
        assert_eq!(initial.len(), 1);

        store.upsert(&library_book("9780553293357", "Foundation")).unwrap();
        let after_insert = receiver.recv().unwrap();
        assert_eq!(after_insert.len(), 2);

        store.delete(&library_book("9780441013593", "Dune")).unwrap();
        let after_delete = receiver.recv().unwrap();
        assert_eq!(after_delete.len(), 1);
        assert_eq!(after_delete[0].isbn(), "9780553293357");
    }

    #[test]
    fn delete_of_missing_row_reports_zero_and_publishes_nothing() {
        let store = ObservableLibraryStore::new(memory_pool());
        let receiver = store.subscribe();
        _ = receiver.recv().unwrap();

        let deleted = store.delete(&library_book("9780441013593", "Dune")).unwrap();

        assert_eq!(deleted, 0);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn wishlist_store_round_trips_and_publishes() {
        let store = ObservableWishlistStore::new(memory_pool());
        let receiver = store.subscribe();
        _ = receiver.recv().unwrap();

        store.upsert(&wishlist_book("9780553293357", "Foundation")).unwrap();

        let snapshot = receiver.recv().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title(), "Foundation");

        let found = store.find_by_isbn("9780553293357").unwrap().unwrap();
        store.delete(&found).unwrap();
        assert_eq!(store.get_all().unwrap().len(), 0);
    }
}
