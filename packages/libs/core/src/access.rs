//! 컬럼 접근 정책
//!
//! 테이블별로 읽기/쓰기/삭제에 사용할 수 있는 컬럼 목록을 정의합니다.
//! `access.yaml` 파일 구조를 그대로 매핑하며, `restrict`가 꺼져 있으면
//! 모든 컬럼이 허용됩니다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 접근 동작 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
    Delete,
}

/// 전체 접근 정책
///
/// `access.yaml` 파일의 루트 구조입니다.
///
/// ```yaml
/// restrict: true
/// tables:
///   users:
///     read: [id, name, email]
///     write: [name, email]
///     delete: [id]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// 정책 적용 여부 (false = 모든 컬럼 허용)
    #[serde(default)]
    pub restrict: bool,

    /// 테이블별 컬럼 목록
    #[serde(default)]
    pub tables: HashMap<String, TableAccess>,
}

/// 테이블 접근 정책
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableAccess {
    /// SELECT 가능 컬럼
    #[serde(default)]
    pub read: Vec<String>,

    /// INSERT/UPDATE 가능 컬럼
    #[serde(default)]
    pub write: Vec<String>,

    /// DELETE 필터에 쓸 수 있는 컬럼
    #[serde(default)]
    pub delete: Vec<String>,
}

impl AccessPolicy {
    /// YAML 문자열에서 정책 로드
    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    fn columns_for(&self, table: &str, action: Action) -> &[String] {
        self.tables
            .get(table)
            .map(|t| match action {
                Action::Read => t.read.as_slice(),
                Action::Write => t.write.as_slice(),
                Action::Delete => t.delete.as_slice(),
            })
            .unwrap_or(&[])
    }

    /// 허용 컬럼 결정
    ///
    /// 요청 컬럼을 정책 목록과 교집합합니다. 요청 컬럼이 없으면 정책 목록
    /// 전체를 돌려주고, 결과가 비면 에러입니다 — 암묵적인 전체 행 접근은
    /// 허용하지 않습니다.
    pub fn permitted_columns(
        &self,
        table: &str,
        action: Action,
        requested: &[String],
    ) -> Result<Vec<String>> {
        if !self.restrict {
            return Ok(if requested.is_empty() {
                vec!["*".to_string()]
            } else {
                requested.to_vec()
            });
        }

        let allowed = self.columns_for(table, action);
        let cols: Vec<String> = if requested.is_empty() {
            allowed.to_vec()
        } else {
            requested
                .iter()
                .filter(|c| allowed.iter().any(|a| a == *c))
                .cloned()
                .collect()
        };

        if cols.is_empty() {
            return Err(Error::NoPermittedColumns {
                table: table.to_string(),
            });
        }
        Ok(cols)
    }

    /// 컬럼 목록 전체가 허용되는지 확인
    ///
    /// 교집합과 달리 하나라도 허용되지 않으면 에러입니다. INSERT/UPDATE의
    /// 본문 컬럼이나 DELETE 필터 컬럼처럼 조용히 걸러내면 안 되는 경우에
    /// 사용합니다.
    pub fn ensure_permitted(&self, table: &str, action: Action, columns: &[String]) -> Result<()> {
        if !self.restrict {
            return Ok(());
        }

        let allowed = self.columns_for(table, action);
        for column in columns {
            if !allowed.iter().any(|a| a == column) {
                return Err(Error::ColumnNotAllowed {
                    table: table.to_string(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> AccessPolicy {
        AccessPolicy::from_yaml(
            r#"
restrict: true
tables:
  users:
    read: [id, name, email]
    write: [name, email]
    delete: [id]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unrestricted_passes_through() {
        let policy = AccessPolicy::default();
        let cols = policy
            .permitted_columns("users", Action::Read, &[])
            .unwrap();
        assert_eq!(cols, vec!["*".to_string()]);

        let requested = vec!["secret".to_string()];
        let cols = policy
            .permitted_columns("users", Action::Read, &requested)
            .unwrap();
        assert_eq!(cols, requested);
    }

    #[test]
    fn test_requested_intersects_with_policy() {
        let policy = sample_policy();
        let requested = vec!["name".to_string(), "password".to_string()];
        let cols = policy
            .permitted_columns("users", Action::Read, &requested)
            .unwrap();
        assert_eq!(cols, vec!["name".to_string()]);
    }

    #[test]
    fn test_no_request_returns_full_policy_list() {
        let policy = sample_policy();
        let cols = policy
            .permitted_columns("users", Action::Read, &[])
            .unwrap();
        assert_eq!(
            cols,
            vec!["id".to_string(), "name".to_string(), "email".to_string()]
        );
    }

    #[test]
    fn test_empty_intersection_is_an_error() {
        let policy = sample_policy();
        let requested = vec!["password".to_string()];
        let err = policy
            .permitted_columns("users", Action::Read, &requested)
            .unwrap_err();
        assert!(matches!(err, Error::NoPermittedColumns { .. }));

        // 정책에 없는 테이블도 동일
        let err = policy
            .permitted_columns("orders", Action::Read, &[])
            .unwrap_err();
        assert!(matches!(err, Error::NoPermittedColumns { .. }));
    }

    #[test]
    fn test_ensure_permitted_rejects_partial_match() {
        let policy = sample_policy();
        let columns = vec!["name".to_string(), "role".to_string()];
        let err = policy
            .ensure_permitted("users", Action::Write, &columns)
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotAllowed { column, .. } if column == "role"));

        policy
            .ensure_permitted("users", Action::Write, &["email".to_string()])
            .unwrap();
        policy
            .ensure_permitted("users", Action::Delete, &["id".to_string()])
            .unwrap();
    }
}
