use crate::item::repo::{ObservableLibraryStore, ObservableWishlistStore, SqlitePool};
use crate::procedure::reconcile::Reconciler;
use crate::provider::api::google;

pub mod configs;
pub mod covers;
pub mod item;
pub mod procedure;
pub mod provider;

/// 스캔 판정 엔진을 SQLite 저장소 구현과 Google Books 클라이언트로 조립 한다.
pub fn create_reconciler(
    pool: SqlitePool,
) -> Result<Reconciler<ObservableLibraryStore, ObservableWishlistStore, google::Client>, provider::api::ClientError> {
    let catalog = google::new_client()?;

    Ok(Reconciler::new(
        ObservableLibraryStore::new(pool.clone()),
        ObservableWishlistStore::new(pool),
        catalog,
    ))
}

/// 표지 이미지 저장소를 설정된 디렉터리로 만든다.
pub fn create_cover_store(config: &configs::AppConfig) -> covers::CoverImageStore {
    covers::CoverImageStore::new(config.covers_dir())
}
