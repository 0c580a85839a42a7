//! Gateway 설정

use std::env;

/// Gateway 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// 기본 Postgres 접속 URL (경로 부분이 요청 대상 database로 치환됨)
    pub pg_url: String,

    /// 컬럼 접근 정책 YAML 경로 (없으면 무제한)
    pub access_policy_path: Option<String>,

    /// database별 커넥션 풀의 최대 커넥션 수
    pub max_pool_connections: u32,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("TBL_GATEWAY_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,

            pg_url: env::var("TBL_PG_URL")
                .unwrap_or_else(|_| "postgres://postgres@localhost:5432/postgres".to_string()),

            access_policy_path: env::var("TBL_ACCESS_POLICY").ok(),

            max_pool_connections: env::var("TBL_MAX_POOL_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
        })
    }

    /// 기본 URL에 들어 있는 database 이름
    pub fn default_database(&self) -> &str {
        let core = self.pg_url.split('?').next().unwrap_or(&self.pg_url);
        let after_scheme = match core.find("://") {
            Some(idx) => &core[idx + 3..],
            None => core,
        };
        match after_scheme.rfind('/') {
            Some(idx) if idx + 1 < after_scheme.len() => &after_scheme[idx + 1..],
            _ => "postgres",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pg_url: &str) -> Config {
        Config {
            port: 3000,
            pg_url: pg_url.to_string(),
            access_policy_path: None,
            max_pool_connections: 5,
        }
    }

    #[test]
    fn test_default_database_from_url() {
        assert_eq!(
            config("postgres://u:p@localhost:5432/appdb").default_database(),
            "appdb"
        );
        assert_eq!(
            config("postgres://u@localhost/appdb?sslmode=disable").default_database(),
            "appdb"
        );
        assert_eq!(
            config("postgres://u@localhost:5432").default_database(),
            "postgres"
        );
    }
}
