use crate::item::{ItemError, LibraryBook, ShelfLocation, WishlistBook};
use crate::provider::api::Candidate;

const INSECURE_SCHEME: &str = "http://";
const SECURE_SCHEME: &str = "https://";

/// 저자가 제공 되지 않았을 때 사용할 표시 문자열
const UNKNOWN_AUTHOR: &str = "Unknown";

/// 저자 목록을 하나의 표시 문자열로 연결 한다.
///
/// # Example
/// ```
/// use libreria_rust::procedure::transform::join_authors;
///
/// assert_eq!(join_authors(&["A".to_owned(), "B".to_owned()]), "A, B");
/// assert_eq!(join_authors(&[]), "Unknown");
/// ```
pub fn join_authors(authors: &[String]) -> String {
    if authors.is_empty() {
        UNKNOWN_AUTHOR.to_owned()
    } else {
        authors.join(", ")
    }
}

/// 비보안 스킴의 표지 URL을 보안 스킴으로 재작성 한다.
/// 스킴 접두사만 바꾸며 그 외 URL은 그대로 둔다.
pub fn normalize_cover_url(url: Option<String>) -> Option<String> {
    url.map(|u| {
        match u.strip_prefix(INSECURE_SCHEME) {
            Some(rest) => format!("{}{}", SECURE_SCHEME, rest),
            None => u,
        }
    })
}

/// 카탈로그 다중 결과에서 첫 항목을 결정적으로 선택 한다.
pub fn select_first(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.into_iter().next()
}

/// 카탈로그 후보를 서재 도서로 변환 한다.
///
/// 서평은 스캔 시점에 존재하지 않으므로 빈 값으로 남는다.
pub fn candidate_to_library_book(
    candidate: &Candidate,
    isbn: &str,
    location: Option<ShelfLocation>,
) -> Result<LibraryBook, ItemError> {
    LibraryBook::builder()
        .isbn(isbn)
        .title(candidate.title.clone())
        .author(join_authors(&candidate.authors))
        .cover_url_opt(normalize_cover_url(candidate.cover_url.clone()))
        .price_opt(candidate.list_price)
        .synopsis_opt(candidate.description.clone())
        .publisher_opt(candidate.publisher.clone())
        .page_count_opt(candidate.page_count)
        .location_opt(location)
        .build()
}

/// 카탈로그 후보를 위시리스트 도서로 변환 한다.
pub fn candidate_to_wishlist_book(candidate: &Candidate, isbn: &str) -> Result<WishlistBook, ItemError> {
    WishlistBook::builder()
        .isbn(isbn)
        .title(candidate.title.clone())
        .author(join_authors(&candidate.authors))
        .cover_url_opt(normalize_cover_url(candidate.cover_url.clone()))
        .price_opt(candidate.list_price)
        .publisher_opt(candidate.publisher.clone())
        .page_count_opt(candidate.page_count)
        .build()
}

/// 위시리스트 도서를 서가 위치를 부여해 서재 도서로 변환 한다.
///
/// 서평과 줄거리는 위시리스트 스키마에 없으므로 빈 값으로 남는다.
pub fn wishlist_to_library_book(book: &WishlistBook, location: ShelfLocation) -> Result<LibraryBook, ItemError> {
    LibraryBook::builder()
        .isbn(book.isbn())
        .title(book.title())
        .author(book.author())
        .cover_url_opt(book.cover_url().map(|u| u.to_owned()))
        .price_opt(book.price())
        .publisher_opt(book.publisher().map(|p| p.to_owned()))
        .page_count_opt(book.page_count())
        .location(location)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate {
            title: "Dune".to_owned(),
            authors: vec!["Frank Herbert".to_owned()],
            description: Some("Desert planet.".to_owned()),
            cover_url: Some("http://books.google.com/dune.jpg".to_owned()),
            publisher: Some("Ace".to_owned()),
            page_count: Some(896),
            list_price: Some(9.99),
        }
    }

    #[test]
    fn join_authors_joins_with_comma_space() {
        let authors = vec!["Frank Herbert".to_owned(), "Brian Herbert".to_owned()];

        assert_eq!(join_authors(&authors), "Frank Herbert, Brian Herbert");
    }

    #[test]
    fn join_authors_defaults_to_unknown_on_empty_list() {
        assert_eq!(join_authors(&[]), "Unknown");
    }

    #[test]
    fn normalize_cover_url_rewrites_insecure_scheme_only() {
        assert_eq!(
            normalize_cover_url(Some("http://x/y.jpg".to_owned())),
            Some("https://x/y.jpg".to_owned())
        );
        assert_eq!(
            normalize_cover_url(Some("https://x/y.jpg".to_owned())),
            Some("https://x/y.jpg".to_owned())
        );
        assert_eq!(normalize_cover_url(None), None);
    }

    #[test]
    fn select_first_is_deterministic() {
        let mut second = candidate();
        second.title = "Dune Messiah".to_owned();

        let selected = select_first(vec![candidate(), second]).unwrap();

        assert_eq!(selected.title, "Dune");
        assert_eq!(select_first(Vec::new()), None);
    }

    #[test]
    fn candidate_to_library_book_maps_every_field() {
        let book = candidate_to_library_book(&candidate(), "9780441013593", None).unwrap();

        assert_eq!(book.isbn(), "9780441013593");
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(book.cover_url(), Some("https://books.google.com/dune.jpg"));
        assert_eq!(book.price(), Some(9.99));
        assert_eq!(book.review(), None);
        assert_eq!(book.synopsis(), Some("Desert planet."));
        assert_eq!(book.publisher(), Some("Ace"));
        assert_eq!(book.page_count(), Some(896));
        assert_eq!(book.location(), None);
    }

    #[test]
    fn candidate_to_wishlist_book_has_no_annotation_fields() {
        let book = candidate_to_wishlist_book(&candidate(), "9780441013593").unwrap();

        assert_eq!(book.isbn(), "9780441013593");
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(book.cover_url(), Some("https://books.google.com/dune.jpg"));
        assert_eq!(book.page_count(), Some(896));
    }

    #[test]
    fn wishlist_to_library_book_sets_location_and_leaves_annotations_empty() {
        let wishlist = candidate_to_wishlist_book(&candidate(), "9780441013593").unwrap();
        let location = ShelfLocation::new(3, 2).unwrap();

        let book = wishlist_to_library_book(&wishlist, location).unwrap();

        assert_eq!(book.location(), Some(location));
        assert_eq!(book.review(), None);
        assert_eq!(book.synopsis(), None);
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.price(), Some(9.99));
    }
}
