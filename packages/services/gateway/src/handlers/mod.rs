//! 연산별 핸들러
//!
//! 경로 변수에서 대상을 뽑고, 조각 조립을 tbl-sql에 맡긴 뒤, 실행 디스패처가
//! 돌려준 결과 바이트를 그대로 응답합니다.

pub mod databases;
pub mod health;
pub mod schemas;
pub mod tables;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// 실행 결과 바이트를 JSON 응답으로
pub(crate) fn json_bytes(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
}
