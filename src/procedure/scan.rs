use regex::Regex;
use std::io::BufRead;
use std::sync::{Condvar, Mutex};
use tracing::debug;

/// ISBN-10 또는 ISBN-13 형태 검사용 정규식
const ISBN_PATTERN: &str = r"^(?:\d{9}[\dX]|\d{13})$";

/// 스캔 원문에서 하이픈과 공백을 제거하고 ISBN 형태인지 검사 한다.
/// 형태 검사를 통과하지 못한 값은 버려진다.
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let compact: String = raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let pattern = Regex::new(ISBN_PATTERN).unwrap();
    if pattern.is_match(&compact) {
        Some(compact)
    } else {
        None
    }
}

/// 바코드 디코더가 만들어 내는 원문 문자열의 지연 시퀀스
///
/// 시퀀스는 재시작 가능 하며 스캔 세션은 처음으로 형태 검사를 통과한 값 하나만 소비 한다.
pub trait BarcodeSource {

    /// 다음 디코드 결과를 가져온다. 시퀀스가 끝나면 None을 반환 한다.
    fn next_code(&mut self) -> Option<String>;
}

/// 소스에서 처음으로 ISBN 형태 검사를 통과한 값을 가져온다.
pub fn first_valid_isbn<S: BarcodeSource>(source: &mut S) -> Option<String> {
    while let Some(raw) = source.next_code() {
        if let Some(isbn) = normalize_isbn(&raw) {
            return Some(isbn);
        }
        debug!("discarded non-ISBN scan value: {}", raw);
    }

    None
}

/// 줄 단위 입력을 바코드 시퀀스로 읽는 소스
pub struct LinesSource<R> {
    reader: R,
}

impl<R: BufRead> LinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> BarcodeSource for LinesSource<R> {
    fn next_code(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_owned()),
            Err(_) => None,
        }
    }
}

struct SlotState<T> {
    value: Option<T>,
    closed: bool,
}

/// 가장 최근 값 하나만 유지하는 단일 슬롯 채널
///
/// 소비 되지 않은 값은 새 값이 도착하면 덮어써진다. 밀린 프레임을 처리할 이유가
/// 없는 카메라 디코더와 판정 워크플로 사이에 둔다. 화면을 떠날 때는 슬롯을 닫아
/// 소비를 끝낸다.
pub struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
    available: Condvar,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState { value: None, closed: false }),
            available: Condvar::new(),
        }
    }

    /// 값을 넣는다. 이전 값이 남아 있으면 덮어쓴다. 닫힌 슬롯에 넣은 값은 버려진다.
    pub fn publish(&self, value: T) {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return;
        }
        state.value = Some(value);
        self.available.notify_one();
    }

    /// 값이 도착할 때까지 기다렸다 꺼낸다. 슬롯이 닫혀 있고 남은 값이 없으면 None.
    pub fn recv(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(value) = state.value.take() {
                return Some(value);
            }
            if state.closed {
                return None;
            }
            state = self.available.wait(state).unwrap();
        }
    }

    /// 대기 없이 현재 값을 꺼낸다.
    pub fn try_recv(&self) -> Option<T> {
        self.state.lock().unwrap().value.take()
    }

    /// 슬롯을 닫아 소비를 끝낸다.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.available.notify_all();
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
