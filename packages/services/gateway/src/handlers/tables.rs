//! 테이블 목록과 테이블 CRUD 핸들러
//!
//! 대상 database는 공유 상태를 바꾸지 않고 경로 변수에서 풀 선택까지
//! 명시적으로 전달됩니다.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde_json::Value;

use tbl_core::access::Action;
use tbl_sql::{composer, RequestParams, ResourceTarget};

use crate::error::Result;
use crate::executor::{self, ExecMode};
use crate::state::AppState;

use super::json_bytes;

/// GET /tables — 전체 (또는 필터된) 테이블 목록
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let params = RequestParams::from_pairs(pairs);
    let (stmt, aggregate) = composer::tables(&params)?;

    let pool = state.default_pool().await?;
    let bytes = executor::execute(&pool, ExecMode::for_query(aggregate), &stmt).await?;
    Ok(json_bytes(bytes))
}

/// GET /{database}/{schema} — 해당 스키마의 테이블 목록
pub async fn list_by_schema(
    State(state): State<Arc<AppState>>,
    Path((database, schema)): Path<(String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let params = RequestParams::from_pairs(pairs);
    let (stmt, aggregate) = composer::schema_tables(&database, &schema, &params)?;

    let pool = state.pool(&database).await?;
    let bytes = executor::execute(&pool, ExecMode::for_query(aggregate), &stmt).await?;
    Ok(json_bytes(bytes))
}

/// GET /{database}/{schema}/{table} — SELECT
pub async fn select(
    State(state): State<Arc<AppState>>,
    Path((database, schema, table)): Path<(String, String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let target = ResourceTarget::new(&database, &schema, &table)?;
    let params = RequestParams::from_pairs(pairs);

    // 허용 컬럼이 비면 SQL을 만들기 전에 실패합니다.
    let cols = state
        .access
        .permitted_columns(&table, Action::Read, &params.selected_columns())?;
    let (stmt, aggregate) = composer::select(&target, &params, &cols)?;

    let pool = state.pool(&database).await?;
    let bytes = executor::execute(&pool, ExecMode::for_query(aggregate), &stmt).await?;
    Ok(json_bytes(bytes))
}

/// POST /{database}/{schema}/{table} — INSERT
pub async fn insert(
    State(state): State<Arc<AppState>>,
    Path((database, schema, table)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Response> {
    let target = ResourceTarget::new(&database, &schema, &table)?;
    state
        .access
        .ensure_permitted(&table, Action::Write, &body_columns(&body))?;

    let stmt = composer::insert(&target, &body)?;

    let pool = state.pool(&database).await?;
    let bytes = executor::execute(&pool, ExecMode::Insert, &stmt).await?;
    Ok(json_bytes(bytes))
}

/// PATCH/PUT /{database}/{schema}/{table} — UPDATE
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((database, schema, table)): Path<(String, String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> Result<Response> {
    let target = ResourceTarget::new(&database, &schema, &table)?;
    let params = RequestParams::from_pairs(pairs);
    state
        .access
        .ensure_permitted(&table, Action::Write, &body_columns(&body))?;

    let stmt = composer::update(&target, &params, &body)?;

    let pool = state.pool(&database).await?;
    let bytes = executor::execute(&pool, ExecMode::Update, &stmt).await?;
    Ok(json_bytes(bytes))
}

/// DELETE /{database}/{schema}/{table} — DELETE
///
/// 필터 없는 전체 삭제도 허용됩니다 (원하지 않으면 접근 정책으로 막을 것).
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path((database, schema, table)): Path<(String, String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let target = ResourceTarget::new(&database, &schema, &table)?;
    let params = RequestParams::from_pairs(pairs);
    state
        .access
        .ensure_permitted(&table, Action::Delete, &params.filter_columns())?;

    let stmt = composer::delete(&target, &params)?;

    let pool = state.pool(&database).await?;
    let bytes = executor::execute(&pool, ExecMode::Delete, &stmt).await?;
    Ok(json_bytes(bytes))
}

/// 본문 객체의 컬럼 이름 목록 (객체가 아니면 빈 목록 — 조립 단계에서 거름)
fn body_columns(body: &Value) -> Vec<String> {
    body.as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}
