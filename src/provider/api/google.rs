use crate::provider;
use crate::provider::api::{Candidate, ClientError, Response};
use serde::Deserialize;
use std::time::Duration;

/// Google Books 도서 검색 API 엔드포인트 URL
const VOLUME_SEARCH_ENDPOINT: &'static str = "https://www.googleapis.com/books/v1/volumes";

/// 외부 조회가 무한정 매달리지 않도록 하는 요청 제한 시간
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Google Books API에서 반환하는 검색 응답 구조체
#[derive(Debug, Deserialize)]
pub struct VolumesResponse {
    /// 검색된 총 도서 수
    #[serde(rename = "totalItems", default)]
    pub total_items: i32,

    /// 검색된 도서 목록으로 일치 결과가 없으면 필드 자체가 생략 된다.
    pub items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
pub struct Volume {
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeInfo,

    #[serde(rename = "saleInfo")]
    pub sale_info: Option<SaleInfo>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeInfo {
    /// 도서 제목
    pub title: String,
    /// 저자 목록
    pub authors: Option<Vec<String>>,
    /// 줄거리
    pub description: Option<String>,
    /// 출판사
    pub publisher: Option<String>,
    /// 페이지 수
    #[serde(rename = "pageCount")]
    pub page_count: Option<i32>,
    #[serde(rename = "imageLinks")]
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaleInfo {
    #[serde(rename = "listPrice")]
    pub list_price: Option<ListPrice>,
}

#[derive(Debug, Deserialize)]
pub struct ListPrice {
    pub amount: Option<f64>,
}

impl Volume {

    fn into_candidate(self) -> Candidate {
        let cover_url = self.volume_info.image_links
            .and_then(|links| links.thumbnail);
        let list_price = self.sale_info
            .and_then(|sale| sale.list_price)
            .and_then(|price| price.amount);

        Candidate {
            title: self.volume_info.title,
            authors: self.volume_info.authors.unwrap_or_default(),
            description: self.volume_info.description,
            cover_url,
            publisher: self.volume_info.publisher,
            page_count: self.volume_info.page_count,
            list_price,
        }
    }
}

/// Google Books API 클라이언트
pub struct Client {
    http: reqwest::blocking::Client,
}

pub fn new_client() -> Result<Client, ClientError> {
    let http = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

    Ok(Client { http })
}

impl provider::api::Client for Client {

    fn search_by_isbn(&self, isbn: &str) -> Result<Response, ClientError> {
        let url = build_search_url(isbn)?;
        let response = self.http.get(url)
            .send()
            .map_err(|e| ClientError::RequestFailed(format!("ISBN: {}, ERROR: {:?}", isbn, e)))?;
        let response_text = response.text()
            .map_err(|e| ClientError::ResponseTextExtractionFailed(format!("ISBN: {}, ERROR: {:?}", isbn, e)))?;
        let parsed_response: VolumesResponse = serde_json::from_str(&response_text)
            .map_err(|e| ClientError::ResponseParseFailed(format!("ISBN: {}, ERROR: {:?}", isbn, e)))?;

        let candidates = parsed_response.items
            .unwrap_or_default()
            .into_iter()
            .map(|volume| volume.into_candidate())
            .collect();

        Ok(Response {
            total_count: parsed_response.total_items,
            candidates,
        })
    }
}

fn build_search_url(isbn: &str) -> Result<reqwest::Url, ClientError> {
    if isbn.is_empty() {
        return Err(ClientError::MissingRequiredParameter("ISBN은 반드시 입력 되어야 합니다.".to_string()));
    }

    let mut url = reqwest::Url::parse(VOLUME_SEARCH_ENDPOINT)
        .map_err(|_| ClientError::InvalidBaseUrl)?;

    url.query_pairs_mut()
        .append_pair("q", &format!("isbn:{}", isbn));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_search_url_uses_isbn_prefixed_query() {
        let url = build_search_url("9780441013593").unwrap();

        assert_eq!(url.as_str(), "https://www.googleapis.com/books/v1/volumes?q=isbn%3A9780441013593");
    }

    #[test]
    fn build_search_url_rejects_empty_isbn() {
        assert!(matches!(
            build_search_url(""),
            Err(ClientError::MissingRequiredParameter(_))
        ));
    }

    #[test]
    fn volume_json_maps_to_candidate() {
        let body = r#"{
            "totalItems": 1,
            "items": [{
                "volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert"],
                    "description": "Desert planet.",
                    "publisher": "Ace",
                    "pageCount": 896,
                    "imageLinks": { "thumbnail": "http://books.google.com/dune.jpg" }
                },
                "saleInfo": { "listPrice": { "amount": 9.99 } }
            }]
        }"#;

        let parsed: VolumesResponse = serde_json::from_str(body).unwrap();
        let candidate = parsed.items.unwrap().remove(0).into_candidate();

        assert_eq!(candidate.title, "Dune");
        assert_eq!(candidate.authors, vec!["Frank Herbert".to_owned()]);
        assert_eq!(candidate.publisher.as_deref(), Some("Ace"));
        assert_eq!(candidate.page_count, Some(896));
        assert_eq!(candidate.list_price, Some(9.99));
        // 보안 스킴 재작성은 저장 직전 변환 규칙에서 처리 한다.
        assert_eq!(candidate.cover_url.as_deref(), Some("http://books.google.com/dune.jpg"));
    }

    #[test]
    fn missing_items_field_parses_to_empty_response() {
        let parsed: VolumesResponse = serde_json::from_str(r#"{"totalItems": 0}"#).unwrap();

        assert_eq!(parsed.total_items, 0);
        assert!(parsed.items.is_none());
    }
}
