//! Gateway 앱 상태

use std::collections::HashMap;
use std::sync::RwLock;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use tbl_core::access::AccessPolicy;
use tbl_core::ident;

use crate::config::Config;
use crate::error::{GatewayError, Result};

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다. 요청 대상 database는 공유 필드를
/// 바꾸는 대신 `pool()`에 명시적으로 전달합니다 — 멀티테넌트 요청이 동시에
/// 들어와도 서로의 대상을 덮어쓰지 않습니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 컬럼 접근 정책
    pub access: AccessPolicy,

    /// DB Connection Pool 캐시 (database 이름 → Pool)
    pools: RwLock<HashMap<String, PgPool>>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let access = match &config.access_policy_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                AccessPolicy::from_yaml(&raw)?
            }
            None => AccessPolicy::default(),
        };

        Ok(Self {
            config: config.clone(),
            access,
            pools: RwLock::new(HashMap::new()),
        })
    }

    /// 기본 URL의 database를 향한 풀
    pub async fn default_pool(&self) -> Result<PgPool> {
        let database = self.config.default_database().to_string();
        self.pool(&database).await
    }

    /// 요청 대상 database를 향한 풀 (캐시되거나 새로 연결)
    pub async fn pool(&self, database: &str) -> Result<PgPool> {
        ident::validate(database).map_err(GatewayError::Core)?;

        if let Some(pool) = self
            .pools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(database)
        {
            return Ok(pool.clone());
        }

        let url = database_url(&self.config.pg_url, database);
        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_pool_connections)
            .connect(&url)
            .await?;

        self.pools
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(database.to_string(), pool.clone());
        Ok(pool)
    }
}

/// 기본 URL의 경로 부분을 대상 database로 치환
fn database_url(base: &str, database: &str) -> String {
    let (core, query) = match base.split_once('?') {
        Some((core, query)) => (core, Some(query)),
        None => (base, None),
    };

    let after_scheme = core.find("://").map(|idx| idx + 3).unwrap_or(0);
    let root = match core[after_scheme..].find('/') {
        Some(idx) => &core[..after_scheme + idx],
        None => core,
    };

    match query {
        Some(query) => format!("{root}/{database}?{query}"),
        None => format!("{root}/{database}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_replaces_path() {
        assert_eq!(
            database_url("postgres://u:p@localhost:5432/postgres", "mydb"),
            "postgres://u:p@localhost:5432/mydb"
        );
        assert_eq!(
            database_url("postgres://u@localhost:5432", "mydb"),
            "postgres://u@localhost:5432/mydb"
        );
    }

    #[test]
    fn test_database_url_keeps_query() {
        assert_eq!(
            database_url("postgres://u@localhost/postgres?sslmode=disable", "mydb"),
            "postgres://u@localhost/mydb?sslmode=disable"
        );
    }
}
