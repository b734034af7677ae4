use std::fmt;
use std::fmt::{Display, Formatter};

pub mod google;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    MissingRequiredParameter(String), // 필수 매개변수가 누락됨
    InvalidBaseUrl,
    RequestFailed(String),
    ResponseTextExtractionFailed(String),
    ResponseParseFailed(String),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 외부 카탈로그 검색 결과의 후보 레코드
///
/// 조회할 때마다 새로 만들어지며 저장 되지 않는다. 로컬 데이터와 병합하지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub list_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub total_count: i32,
    pub candidates: Vec<Candidate>,
}

impl Response {
    pub fn empty() -> Self {
        Response {
            total_count: 0,
            candidates: Vec::new(),
        }
    }
}

pub trait Client {

    /// ISBN으로 외부 카탈로그를 검색 한다.
    ///
    /// 일치하는 도서가 없는 응답은 에러가 아니라 빈 결과로 반환 된다.
    fn search_by_isbn(&self, isbn: &str) -> Result<Response, ClientError>;
}
