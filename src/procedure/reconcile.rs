use crate::item::{LibraryBook, LibraryRepository, ShelfLocation, WishlistBook, WishlistRepository};
use crate::procedure::{transform, ProcedureError};
use crate::provider::api::{Candidate, Client};
use tracing::{error, info, warn};

/// 스캔된 ISBN의 현재 소속과 다음 행동을 나타내는 판정 결과
///
/// 어떤 실패도 이 열거 혹은 [`ProcedureError`]로 변환 되어 호출자에게 값으로 전달 된다.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// 이미 서재에 존재 한다. 오류가 아닌 중복 안내로 처리 한다.
    AlreadyInLibrary(LibraryBook),

    /// 위시리스트에만 존재 한다. 호출자에게 승격 경로가 제공 된다.
    FoundInWishlist(WishlistBook),

    /// 양쪽 모두에 없어 외부 카탈로그에서 가져온 임시 후보. 저장 전 확인 대상이다.
    FetchedFromCatalog(Candidate),

    /// 외부 카탈로그에도 일치하는 도서가 없다. 이번 스캔은 여기서 끝난다.
    NotFound,

    /// 외부 조회 호출이 실패 했다. 재스캔으로 다시 시도 할 수 있다.
    LookupFailed(String),
}

/// 스캔 판정 엔진
///
/// 저장소를 직접 수정하지 않고 항상 목표 상태를 계산한 뒤 저장소 연산을 요청 한다.
pub struct Reconciler<L, W, C>
where
    L: LibraryRepository,
    W: WishlistRepository,
    C: Client,
{
    library: L,
    wishlist: W,
    catalog: C,
}

impl<L, W, C> Reconciler<L, W, C>
where
    L: LibraryRepository,
    W: WishlistRepository,
    C: Client,
{
    pub fn new(library: L, wishlist: W, catalog: C) -> Self {
        Self { library, wishlist, catalog }
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn wishlist(&self) -> &W {
        &self.wishlist
    }

    /// 스캔된 ISBN의 소속을 판정 한다.
    ///
    /// 서재, 위시리스트, 외부 카탈로그 순서로 조회하며 첫 일치에서 중단 한다.
    /// 네트워크 호출 전에 로컬 저장소를 먼저 확인하므로 중복 저장과 불필요한
    /// 네트워크 사용이 발생하지 않는다. 서재 소속이 항상 우선 한다.
    pub fn reconcile(&self, isbn: &str) -> Result<ReconcileOutcome, ProcedureError> {
        let in_library = self.library.find_by_isbn(isbn)
            .map_err(ProcedureError::Persistence)?;
        if let Some(book) = in_library {
            self.repair_stale_wishlist(isbn);
            return Ok(ReconcileOutcome::AlreadyInLibrary(book));
        }

        let in_wishlist = self.wishlist.find_by_isbn(isbn)
            .map_err(ProcedureError::Persistence)?;
        if let Some(book) = in_wishlist {
            return Ok(ReconcileOutcome::FoundInWishlist(book));
        }

        match self.catalog.search_by_isbn(isbn) {
            Ok(response) => {
                match transform::select_first(response.candidates) {
                    Some(candidate) => {
                        info!("fetched candidate from catalog. ISBN: {}", isbn);
                        Ok(ReconcileOutcome::FetchedFromCatalog(candidate))
                    }
                    None => Ok(ReconcileOutcome::NotFound),
                }
            }
            Err(e) => {
                warn!("catalog lookup failed. ISBN: {}, ERROR: {:?}", isbn, e);
                Ok(ReconcileOutcome::LookupFailed(e.to_string()))
            }
        }
    }

    // 부분 승격 실패로 남은 위시리스트 행을 서재 우선 규칙에 따라 정리 한다.
    fn repair_stale_wishlist(&self, isbn: &str) {
        match self.wishlist.find_by_isbn(isbn) {
            Ok(Some(stale)) => {
                warn!("stale wishlist row for library book. repairing. ISBN: {}", isbn);
                if let Err(e) = self.wishlist.delete(&stale) {
                    error!("failed to repair stale wishlist row. ISBN: {}, ERROR: {:?}", isbn, e);
                }
            }
            Ok(None) => {}
            Err(e) => error!("failed to check stale wishlist row. ISBN: {}, ERROR: {:?}", isbn, e),
        }
    }

    /// 위시리스트 도서를 서재로 승격 한다.
    ///
    /// 서재 삽입과 위시리스트 삭제 두 연산으로 이루어진다. 삽입이 실패하면 아무 것도
    /// 적용 되지 않는다. 삽입 후 삭제가 실패하면 같은 ISBN이 양쪽에 남는 저하 상태가
    /// 되며 [`ProcedureError::PartialPromotion`]으로 보고 된다. 이 상태는 다음 판정의
    /// 서재 우선 규칙과 위시리스트 정리로 자가 복구 된다.
    pub fn promote(&self, book: &WishlistBook, location: ShelfLocation) -> Result<LibraryBook, ProcedureError> {
        let library_book = transform::wishlist_to_library_book(book, location)
            .map_err(ProcedureError::Item)?;

        let saved = self.library.upsert(&library_book)
            .map_err(ProcedureError::Persistence)?;

        if let Err(e) = self.wishlist.delete(book) {
            error!("wishlist delete failed after library insert. ISBN: {}, ERROR: {:?}", book.isbn(), e);
            return Err(ProcedureError::PartialPromotion {
                isbn: book.isbn().to_owned(),
                cause: e,
            });
        }

        info!("promoted wishlist book to library. ISBN: {}, LOCATION: {}", saved.isbn(), location);
        Ok(saved)
    }

    /// 카탈로그 후보를 서재에 저장 한다.
    ///
    /// 명시된 위치가 없으면 호출자가 전달한 기본 서가 위치가 적용 되고,
    /// 기본 위치도 없으면 위치 없이 저장 된다.
    pub fn commit_to_library(
        &self,
        candidate: &Candidate,
        isbn: &str,
        location: Option<ShelfLocation>,
        default_location: Option<ShelfLocation>,
    ) -> Result<LibraryBook, ProcedureError> {
        let effective_location = location.or(default_location);
        let book = transform::candidate_to_library_book(candidate, isbn, effective_location)
            .map_err(ProcedureError::Item)?;

        self.library.upsert(&book)
            .map_err(ProcedureError::Persistence)
    }

    /// 카탈로그 후보를 위시리스트에 저장 한다.
    pub fn commit_to_wishlist(&self, candidate: &Candidate, isbn: &str) -> Result<WishlistBook, ProcedureError> {
        let book = transform::candidate_to_wishlist_book(candidate, isbn)
            .map_err(ProcedureError::Item)?;

        self.wishlist.upsert(&book)
            .map_err(ProcedureError::Persistence)
    }
}
