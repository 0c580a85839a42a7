//! 공통 에러 타입
//!
//! Tabula 전체에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Tabula 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Request Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("malformed filter: {message}")]
    MalformedFilter { message: String },

    #[error("malformed order: {message}")]
    MalformedOrder { message: String },

    #[error("malformed group: {message}")]
    MalformedGroup { message: String },

    #[error("malformed join: {message}")]
    MalformedJoin { message: String },

    #[error("malformed pagination: {message}")]
    MalformedPagination { message: String },

    #[error("malformed body: {message}")]
    MalformedBody { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Identifier Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid identifier: '{name}'")]
    InvalidIdentifier { name: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Access Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("no permitted columns for table '{table}', please check the access policy")]
    NoPermittedColumns { table: String },

    #[error("column '{column}' of table '{table}' is not permitted for this action")]
    ColumnNotAllowed { table: String, column: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("execution error: {message}")]
    Execution { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::MalformedFilter { .. }
            | Error::MalformedOrder { .. }
            | Error::MalformedGroup { .. }
            | Error::MalformedJoin { .. }
            | Error::MalformedPagination { .. }
            | Error::MalformedBody { .. }
            | Error::InvalidIdentifier { .. }
            | Error::Yaml(_)
            | Error::Json(_) => 400,

            // 403 Forbidden
            Error::NoPermittedColumns { .. } | Error::ColumnNotAllowed { .. } => 403,

            // 500 Internal Server Error
            Error::Execution { .. } => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedFilter { .. } => "MALFORMED_FILTER",
            Error::MalformedOrder { .. } => "MALFORMED_ORDER",
            Error::MalformedGroup { .. } => "MALFORMED_GROUP",
            Error::MalformedJoin { .. } => "MALFORMED_JOIN",
            Error::MalformedPagination { .. } => "MALFORMED_PAGINATION",
            Error::MalformedBody { .. } => "MALFORMED_BODY",
            Error::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            Error::NoPermittedColumns { .. } => "NO_PERMITTED_COLUMNS",
            Error::ColumnNotAllowed { .. } => "COLUMN_NOT_ALLOWED",
            Error::Execution { .. } => "EXECUTION_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_client_faults() {
        let err = Error::MalformedFilter {
            message: "unknown operator: $foo".to_string(),
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "MALFORMED_FILTER");
    }

    #[test]
    fn test_permission_errors_are_forbidden() {
        let err = Error::NoPermittedColumns {
            table: "users".to_string(),
        };
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_execution_errors_are_server_faults() {
        let err = Error::Execution {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.code(), "EXECUTION_ERROR");
    }
}
