//! SQL 조각 생성기
//!
//! 요청 파라미터를 절 단위 SQL 조각으로 변환합니다. 값을 바인딩하는 조각은
//! 호출자가 넘긴 시작 번호부터 연속된 위치 플레이스홀더를 매기고, 바인딩한
//! 값을 같은 순서로 함께 돌려줍니다. 조각 텍스트의 플레이스홀더 개수와
//! 값 개수는 항상 같습니다.
//!
//! 필터 값은 `42`/`4.2`/`true` 꼴이면 해당 타입으로, 그 외에는 문자열로
//! 바인딩됩니다.

use std::collections::BTreeMap;

use serde_json::Value;

use tbl_core::error::{Error, Result};
use tbl_core::ident;

use crate::params::RequestParams;

/// SQL 절 조각과 바인딩 값
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub values: Vec<Value>,
}

/// INSERT 문에 들어갈 컬럼/플레이스홀더/값 묶음
#[derive(Debug, Clone, PartialEq)]
pub struct InsertFragment {
    pub names: String,
    pub placeholders: String,
    pub values: Vec<Value>,
}

/// 필터 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    NotIn,
    Null,
    NotNull,
}

impl FilterOp {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "$eq" => FilterOp::Eq,
            "$ne" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NotIn,
            "$null" => FilterOp::Null,
            "$notnull" => FilterOp::NotNull,
            _ => {
                return Err(Error::MalformedFilter {
                    message: format!("unknown operator: {name}"),
                })
            }
        })
    }

    fn symbol(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "<>",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Like => "LIKE",
            FilterOp::ILike => "ILIKE",
            // IN/NULL 계열은 symbol을 쓰지 않습니다.
            FilterOp::In | FilterOp::NotIn | FilterOp::Null | FilterOp::NotNull => unreachable!(),
        }
    }
}

/// `value` 또는 `$op.value` 형태의 필터 값 해석
fn split_operator(raw: &str) -> Result<(FilterOp, &str)> {
    if !raw.starts_with('$') {
        return Ok((FilterOp::Eq, raw));
    }

    let (name, operand) = match raw.find('.') {
        Some(idx) => (&raw[..idx], &raw[idx + 1..]),
        None => (raw, ""),
    };
    let op = FilterOp::parse(name)?;

    let needs_operand = !matches!(op, FilterOp::Null | FilterOp::NotNull);
    if needs_operand && operand.is_empty() {
        return Err(Error::MalformedFilter {
            message: format!("operator {name} requires a value"),
        });
    }
    Ok((op, operand))
}

/// 스칼라 문자열을 바인딩 값으로 변환
fn typed_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::from(f);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// WHERE 절 생성
///
/// 예약 키를 제외한 모든 쿼리 쌍을 조건으로 해석하고 ` AND `로 잇습니다.
/// 플레이스홀더 번호는 `base`부터 시작합니다. 조건이 하나도 없으면 `None`.
pub fn where_clause(params: &RequestParams, base: usize) -> Result<Option<Fragment>> {
    let mut predicates = Vec::new();
    let mut values = Vec::new();
    let mut next = base;

    for (column, raw) in params.filters() {
        let column_sql = ident::quote_path(column)?;
        let (op, operand) = split_operator(raw)?;

        match op {
            FilterOp::Null => predicates.push(format!("{column_sql} IS NULL")),
            FilterOp::NotNull => predicates.push(format!("{column_sql} IS NOT NULL")),
            FilterOp::In | FilterOp::NotIn => {
                let items: Vec<&str> = operand.split(',').filter(|s| !s.is_empty()).collect();
                if items.is_empty() {
                    return Err(Error::MalformedFilter {
                        message: format!("empty list for column '{column}'"),
                    });
                }
                let mut marks = Vec::with_capacity(items.len());
                for item in items {
                    marks.push(format!("${next}"));
                    next += 1;
                    values.push(typed_value(item));
                }
                let keyword = if op == FilterOp::In { "IN" } else { "NOT IN" };
                predicates.push(format!("{column_sql} {keyword} ({})", marks.join(",")));
            }
            _ => {
                predicates.push(format!("{column_sql} {} ${next}", op.symbol()));
                next += 1;
                values.push(typed_value(operand));
            }
        }
    }

    if predicates.is_empty() {
        return Ok(None);
    }
    Ok(Some(Fragment {
        text: predicates.join(" AND "),
        values,
    }))
}

/// ORDER BY 절 생성
///
/// `_order=col,-col2` → `ORDER BY "col" ASC, "col2" DESC`. 값은 바인딩하지
/// 않습니다.
pub fn order_clause(params: &RequestParams) -> Result<Option<String>> {
    let Some(raw) = params.get("_order") else {
        return Ok(None);
    };

    let mut parts = Vec::new();
    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            return Err(Error::MalformedOrder {
                message: "empty order field".to_string(),
            });
        }
        let (name, direction) = match item.strip_prefix('-') {
            Some(name) => (name, "DESC"),
            None => (item, "ASC"),
        };
        parts.push(format!("{} {direction}", ident::quote_path(name)?));
    }
    Ok(Some(format!("ORDER BY {}", parts.join(", "))))
}

/// GROUP BY 절 생성
pub fn group_clause(params: &RequestParams) -> Result<Option<String>> {
    let Some(raw) = params.get("_groupby") else {
        return Ok(None);
    };

    let mut parts = Vec::new();
    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            return Err(Error::MalformedGroup {
                message: "empty group field".to_string(),
            });
        }
        parts.push(ident::quote_path(item)?);
    }
    Ok(Some(format!("GROUP BY {}", parts.join(", "))))
}

/// JOIN 절 목록 생성
///
/// `_join=type:table:left:$op:right` 하나당 조각 하나를 만듭니다. 조각은
/// 선행 공백을 포함하므로 그대로 이어 붙이면 됩니다.
pub fn join_clauses(params: &RequestParams) -> Result<Vec<String>> {
    let mut joins = Vec::new();

    for raw in params.get_all("_join") {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 5 {
            return Err(Error::MalformedJoin {
                message: format!("expected type:table:left:$op:right, got '{raw}'"),
            });
        }

        let kind = match parts[0] {
            "inner" => "INNER",
            "left" => "LEFT",
            "right" => "RIGHT",
            "outer" => "FULL OUTER",
            other => {
                return Err(Error::MalformedJoin {
                    message: format!("unknown join type: {other}"),
                })
            }
        };

        let op = match parts[3] {
            "$eq" => "=",
            "$ne" => "<>",
            "$gt" => ">",
            "$gte" => ">=",
            "$lt" => "<",
            "$lte" => "<=",
            other => {
                return Err(Error::MalformedJoin {
                    message: format!("unsupported join operator: {other}"),
                })
            }
        };

        joins.push(format!(
            " {kind} JOIN {} ON {} {op} {}",
            ident::quote(parts[1])?,
            ident::quote_path(parts[2])?,
            ident::quote_path(parts[4])?,
        ));
    }
    Ok(joins)
}

/// COUNT 프로젝션 생성
///
/// `_count=*` 또는 `_count=col` → `SELECT COUNT(...) FROM`. 집계 프로젝션은
/// 기본 프로젝션과 암묵적 정렬을 대체합니다.
pub fn count_projection(params: &RequestParams) -> Result<Option<String>> {
    let Some(raw) = params.get("_count") else {
        return Ok(None);
    };

    let target = if raw.is_empty() || raw == "*" {
        "*".to_string()
    } else {
        ident::quote_path(raw)?
    };
    Ok(Some(format!("SELECT COUNT({target}) FROM")))
}

/// DISTINCT 요청 여부
pub fn distinct_requested(params: &RequestParams) -> bool {
    matches!(params.get("_distinct"), Some(v) if v != "false")
}

/// 페이지네이션 절 생성
///
/// `_page`(기본 1, 1부터 시작)와 `_page_size`(기본 20)로 `LIMIT n OFFSET m`을
/// 만듭니다. 숫자는 파싱을 거친 리터럴이라 값을 바인딩하지 않습니다.
pub fn pagination_clause(params: &RequestParams) -> Result<String> {
    let page: u64 = match params.get("_page") {
        Some(raw) => raw.parse().map_err(|_| Error::MalformedPagination {
            message: format!("invalid _page: '{raw}'"),
        })?,
        None => 1,
    };
    let size: u64 = match params.get("_page_size") {
        Some(raw) => raw.parse().map_err(|_| Error::MalformedPagination {
            message: format!("invalid _page_size: '{raw}'"),
        })?,
        None => 20,
    };
    if page == 0 {
        return Err(Error::MalformedPagination {
            message: "_page starts at 1".to_string(),
        });
    }

    // (page - 1) * size가 u64를 넘는 요청은 잘못된 페이지네이션으로 거부
    let offset = (page - 1)
        .checked_mul(size)
        .ok_or_else(|| Error::MalformedPagination {
            message: format!("page range out of bounds: _page={page}, _page_size={size}"),
        })?;

    Ok(format!("LIMIT {size} OFFSET {offset}"))
}

/// 허용 컬럼 프로젝션 생성
///
/// `SELECT "a","b" FROM` 형태. `*`는 인용 없이 그대로 둡니다.
pub fn select_fields(cols: &[String]) -> Result<String> {
    let mut rendered = Vec::with_capacity(cols.len());
    for col in cols {
        if col == "*" {
            rendered.push("*".to_string());
        } else {
            rendered.push(ident::quote_path(col)?);
        }
    }
    Ok(format!("SELECT {} FROM", rendered.join(",")))
}

/// INSERT 본문 해석
///
/// JSON 객체 본문을 컬럼 목록/플레이스홀더 목록/값 목록으로 분해합니다.
/// 키를 정렬해서 같은 본문이면 항상 같은 SQL이 나옵니다.
pub fn insert_fragment(body: &Value) -> Result<InsertFragment> {
    let obj = object_body(body, "insert")?;

    let mut names = Vec::with_capacity(obj.len());
    let mut placeholders = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len());
    for (idx, (column, value)) in obj.iter().enumerate() {
        names.push(ident::quote(column)?);
        placeholders.push(format!("${}", idx + 1));
        values.push((*value).clone());
    }

    Ok(InsertFragment {
        names: names.join(","),
        placeholders: placeholders.join(","),
        values,
    })
}

/// SET 절 생성
///
/// `"a" = $base, "b" = $base+1 …` 형태. WHERE가 먼저 소비한 값 개수를 지나
/// `base`부터 번호를 매깁니다.
pub fn set_clause(body: &Value, base: usize) -> Result<Fragment> {
    let obj = object_body(body, "update")?;

    let mut assignments = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len());
    for (idx, (column, value)) in obj.iter().enumerate() {
        assignments.push(format!("{} = ${}", ident::quote(column)?, base + idx));
        values.push((*value).clone());
    }

    Ok(Fragment {
        text: assignments.join(", "),
        values,
    })
}

/// 본문을 비어 있지 않은 정렬된 객체로 변환
fn object_body<'a>(body: &'a Value, action: &str) -> Result<BTreeMap<&'a String, &'a Value>> {
    let obj = body.as_object().ok_or_else(|| Error::MalformedBody {
        message: format!("{action} body must be a JSON object"),
    })?;
    if obj.is_empty() {
        return Err(Error::MalformedBody {
            message: format!("{action} body must not be empty"),
        });
    }
    Ok(obj.iter().collect())
}
