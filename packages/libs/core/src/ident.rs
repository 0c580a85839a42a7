//! 식별자 검증
//!
//! 데이터베이스/스키마/테이블/컬럼 이름은 표준 플레이스홀더 문법으로 바인딩할
//! 수 없어 SQL 텍스트에 문자열로 직접 삽입됩니다. 삽입 전에 허용 문자 집합을
//! 엄격하게 검증하고, 통과한 이름만 큰따옴표로 감싸 사용합니다.

use crate::error::{Error, Result};

/// Postgres NAMEDATALEN - 1
const MAX_IDENT_LEN: usize = 63;

/// 단일 식별자 검증
///
/// 첫 글자는 ASCII 알파벳 또는 `_`, 이후는 알파벳/숫자/`_`/`$`만 허용합니다.
pub fn validate(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };

    if !valid || name.len() > MAX_IDENT_LEN {
        return Err(Error::InvalidIdentifier {
            name: name.to_string(),
        });
    }
    Ok(name)
}

/// 검증 후 큰따옴표로 감싸기
pub fn quote(name: &str) -> Result<String> {
    Ok(format!("\"{}\"", validate(name)?))
}

/// `table.column` 형태의 경로 식별자 검증/인용
///
/// 각 구간을 개별 검증해서 `"table"."column"`으로 돌려줍니다.
pub fn quote_path(path: &str) -> Result<String> {
    let parts: Vec<String> = path
        .split('.')
        .map(quote)
        .collect::<Result<_>>()
        .map_err(|_| Error::InvalidIdentifier {
            name: path.to_string(),
        })?;
    Ok(parts.join("."))
}
