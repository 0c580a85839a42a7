//! Gateway 미들웨어
//!
//! 요청 ID 부여 등 공통 미들웨어를 정의합니다.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 현재 요청의 ID (에러 응답 본문에 실림)
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 요청마다 ID를 발급하고 응답 헤더에 실어 줍니다.
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let mut resp = REQUEST_ID
        .scope(id.clone(), async move { next.run(req).await })
        .await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}
