//! 실행 디스패처
//!
//! 조립된 문장을 실행 모드에 따라 드라이버 호출로 보내고, 결과를 JSON
//! 바이트로 직렬화해 돌려줍니다. 재시도나 트랜잭션 관리는 하지 않습니다 —
//! 요청당 한 번의 동기적 실행이 전부입니다.

use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row, TypeInfo};

use tbl_core::error::{Error, Result};
use tbl_sql::ComposedStatement;

/// 실행 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// 행 조회
    Query,
    /// 집계/카운트 조회 (단일 스칼라)
    QueryCount,
    Insert,
    Update,
    Delete,
}

impl ExecMode {
    /// 집계 여부로 조회 모드 선택
    pub fn for_query(aggregate: bool) -> Self {
        if aggregate {
            ExecMode::QueryCount
        } else {
            ExecMode::Query
        }
    }
}

/// 문장 실행
///
/// 실패는 드라이버 메시지를 담은 `Error::Execution`으로 돌려줍니다.
pub async fn execute(pool: &PgPool, mode: ExecMode, stmt: &ComposedStatement) -> Result<Vec<u8>> {
    let query = bind_values(sqlx::query::<Postgres>(&stmt.sql), &stmt.values);

    let payload = match mode {
        ExecMode::Query => {
            let rows = query.fetch_all(pool).await.map_err(execution_error)?;
            Value::Array(rows.iter().map(row_to_json).collect())
        }
        ExecMode::QueryCount => {
            let row = query.fetch_one(pool).await.map_err(execution_error)?;
            let count: i64 = row.try_get(0).map_err(execution_error)?;
            serde_json::json!({ "count": count })
        }
        ExecMode::Insert | ExecMode::Update | ExecMode::Delete => {
            let result = query.execute(pool).await.map_err(execution_error)?;
            serde_json::json!({ "rows_affected": result.rows_affected() })
        }
    };

    Ok(serde_json::to_vec(&payload)?)
}

fn execution_error(e: sqlx::Error) -> Error {
    Error::Execution {
        message: e.to_string(),
    }
}

/// 값 목록을 순서대로 바인딩
fn bind_values<'a>(
    mut query: Query<'a, Postgres, PgArguments>,
    values: &'a [Value],
) -> Query<'a, Postgres, PgArguments> {
    for value in values {
        match value {
            Value::Null => {
                let v: Option<String> = None;
                query = query.bind(v);
            }
            Value::Bool(b) => query = query.bind(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query = query.bind(i);
                } else if let Some(f) = n.as_f64() {
                    query = query.bind(f);
                } else {
                    query = query.bind(n.to_string());
                }
            }
            Value::String(s) => query = query.bind(s.as_str()),
            Value::Array(_) | Value::Object(_) => {
                query = query.bind(sqlx::types::Json(value.clone()));
            }
        }
    }
    query
}

/// 한 행을 JSON 객체로 변환
///
/// 컬럼 타입 이름을 보고 적절한 Rust 타입으로 꺼낸 뒤 JSON 값으로 바꿉니다.
/// 모르는 타입은 문자열로 시도합니다.
fn row_to_json(row: &PgRow) -> Value {
    let mut obj = serde_json::Map::new();
    for column in row.columns() {
        let name = column.name();
        let value = match column.type_info().name().to_ascii_uppercase().as_str() {
            "INT2" | "INT4" | "INT8" | "INTEGER" | "BIGINT" => row
                .try_get::<Option<i64>, _>(name)
                .ok()
                .flatten()
                .map(Value::from),
            "FLOAT4" | "FLOAT8" | "DOUBLE PRECISION" | "NUMERIC" => row
                .try_get::<Option<f64>, _>(name)
                .ok()
                .flatten()
                .and_then(|v| serde_json::Number::from_f64(v).map(Value::Number)),
            "BOOL" | "BOOLEAN" => row
                .try_get::<Option<bool>, _>(name)
                .ok()
                .flatten()
                .map(Value::Bool),
            "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(name).ok().flatten(),
            "UUID" => row
                .try_get::<Option<uuid::Uuid>, _>(name)
                .ok()
                .flatten()
                .map(|v| Value::String(v.to_string())),
            "TIMESTAMPTZ" | "TIMESTAMP" => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)
                .ok()
                .flatten()
                .map(|v| Value::String(v.to_rfc3339())),
            _ => row
                .try_get::<Option<String>, _>(name)
                .ok()
                .flatten()
                .map(Value::String),
        }
        .unwrap_or(Value::Null);

        obj.insert(name.to_string(), value);
    }
    Value::Object(obj)
}
