//! 요청 파라미터
//!
//! 쿼리스트링에서 추출한 구조화된 요청입니다. 예약 키(`_select`, `_order` 등)를
//! 제외한 나머지 쌍은 모두 필터 조건으로 취급합니다. 쌍의 입력 순서를 그대로
//! 유지하므로 같은 요청은 항상 같은 SQL을 만듭니다.

/// 예약 쿼리 키
pub const RESERVED_KEYS: &[&str] = &[
    "_select",
    "_order",
    "_page",
    "_page_size",
    "_count",
    "_distinct",
    "_groupby",
    "_join",
];

/// 구조화된 요청 파라미터
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// 예약 키의 단일 값 (같은 키가 여러 번 오면 첫 번째)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 같은 키의 모든 값 (`_join`처럼 반복 가능한 키)
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 필터 쌍 (예약 키 제외, 입력 순서 유지)
    pub fn filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 필터에 등장한 컬럼 이름 목록
    pub fn filter_columns(&self) -> Vec<String> {
        self.filters().map(|(k, _)| k.to_string()).collect()
    }

    /// `_select`로 요청된 컬럼 목록
    pub fn selected_columns(&self) -> Vec<String> {
        self.get("_select")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
