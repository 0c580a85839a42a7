//! 스키마 목록 핸들러

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;

use tbl_sql::{composer, RequestParams};

use crate::error::Result;
use crate::executor::{self, ExecMode};
use crate::state::AppState;

use super::json_bytes;

/// GET /schemas — 전체 (또는 필터된) 스키마 목록
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let params = RequestParams::from_pairs(pairs);
    let (stmt, aggregate) = composer::schemas(&params)?;

    let pool = state.default_pool().await?;
    let bytes = executor::execute(&pool, ExecMode::for_query(aggregate), &stmt).await?;
    Ok(json_bytes(bytes))
}
