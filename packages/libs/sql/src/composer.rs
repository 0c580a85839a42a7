//! 문장 조립기
//!
//! 연산별로 고정된 순서대로 조각을 이어 붙여 최종 SQL 문장과 값 목록을
//! 만듭니다. 조각 사이의 플레이스홀더 번호는 `PlaceholderCursor`가 이어 주고,
//! 최종 문장에서는 k번째 플레이스홀더가 값 목록의 k번째 원소를 가리킵니다
//! (1부터, 빈 번호 없이).
//!
//! 리스트 연산 공통 규칙: 명시적 `_order`가 항상 기본 정렬을 이기고, 집계
//! 프로젝션(`_count`)이 있으면 기본 정렬을 아예 붙이지 않습니다 — 집계는
//! 결과 컬럼 모양을 바꾸므로 이름 기준 기본 정렬이 존재하지 않는 컬럼을
//! 참조할 수 있습니다.

use serde_json::Value;

use tbl_core::error::Result;
use tbl_core::ident;

use crate::fragment;
use crate::params::RequestParams;
use crate::placeholder::PlaceholderCursor;
use crate::statements;

/// 조립 완료된 SQL 문장
///
/// `sql` 안의 k번째 플레이스홀더는 `values[k-1]`에 대응합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedStatement {
    pub sql: String,
    pub values: Vec<Value>,
}

/// 요청 대상 (database/schema/table)
///
/// 식별자는 파라미터로 바인딩할 수 없으므로 생성 시점에 검증하고,
/// 이후 큰따옴표로 감싸 SQL 텍스트에 직접 삽입합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTarget {
    database: String,
    schema: String,
    table: String,
}

impl ResourceTarget {
    pub fn new(database: &str, schema: &str, table: &str) -> Result<Self> {
        ident::validate(database)?;
        ident::validate(schema)?;
        ident::validate(table)?;
        Ok(Self {
            database: database.to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `"db"."schema"."table"` 형태의 정규화된 이름
    fn qualified(&self) -> String {
        format!(
            "\"{}\".\"{}\".\"{}\"",
            self.database, self.schema, self.table
        )
    }
}

/// 리스트 연산의 출발점 모양
struct ListShape {
    select: &'static str,
    count: &'static str,
    /// 기본 필터를 내장한 WHERE (없으면 빈 문자열)
    builtin_where: &'static str,
    /// 기본 정렬에 쓰는 이름 컬럼
    name_field: &'static str,
}

/// 리스트 연산 공통 조립
///
/// 순서: 기본 절(집계 선택) → 요청 WHERE → DISTINCT 치환 → ORDER(기본 정렬
/// 포함) → 페이지네이션. `leading`은 기본 절이 이미 바인딩한 선행 값으로,
/// 요청 WHERE는 그 뒤 번호부터 시작합니다.
fn compose_list(
    shape: &ListShape,
    params: &RequestParams,
    leading: Vec<Value>,
) -> Result<(ComposedStatement, bool)> {
    let aggregate = params.get("_count").is_some();

    let mut sql = String::from(if aggregate { shape.count } else { shape.select });
    sql.push_str(shape.builtin_where);

    let mut cursor = PlaceholderCursor::starting_after(leading.len());
    let mut values = leading;

    if let Some(filter) = fragment::where_clause(params, cursor.base())? {
        cursor.advance(filter.values.len());
        sql.push_str(if shape.builtin_where.is_empty() {
            " WHERE "
        } else {
            " AND "
        });
        sql.push_str(&filter.text);
        values.extend(filter.values);
    }

    if fragment::distinct_requested(params) {
        sql = sql.replacen("SELECT", "SELECT DISTINCT", 1);
    }

    match fragment::order_clause(params)? {
        Some(order) => {
            sql.push(' ');
            sql.push_str(&order);
        }
        None if !aggregate => {
            sql.push_str(" ORDER BY ");
            sql.push_str(&ident::quote(shape.name_field)?);
            sql.push_str(" ASC");
        }
        None => {}
    }

    let page = fragment::pagination_clause(params)?;
    sql.push(' ');
    sql.push_str(&page);

    Ok((ComposedStatement { sql, values }, aggregate))
}

/// 데이터베이스 목록
pub fn databases(params: &RequestParams) -> Result<(ComposedStatement, bool)> {
    compose_list(
        &ListShape {
            select: statements::DATABASES_SELECT,
            count: statements::DATABASES_COUNT,
            builtin_where: statements::DATABASES_WHERE,
            name_field: statements::DATABASES_NAME_FIELD,
        },
        params,
        Vec::new(),
    )
}

/// 스키마 목록
pub fn schemas(params: &RequestParams) -> Result<(ComposedStatement, bool)> {
    compose_list(
        &ListShape {
            select: statements::SCHEMAS_SELECT,
            count: statements::SCHEMAS_COUNT,
            builtin_where: "",
            name_field: statements::SCHEMAS_NAME_FIELD,
        },
        params,
        Vec::new(),
    )
}

/// 전체 테이블 목록
pub fn tables(params: &RequestParams) -> Result<(ComposedStatement, bool)> {
    compose_list(
        &ListShape {
            select: statements::TABLES_SELECT,
            count: statements::TABLES_COUNT,
            builtin_where: statements::TABLES_WHERE,
            name_field: statements::TABLES_NAME_FIELD,
        },
        params,
        Vec::new(),
    )
}

/// 특정 database/schema 아래의 테이블 목록
///
/// 기본 절이 `table_catalog = $1 AND table_schema = $2`를 내장하므로 값 목록은
/// `[database, schema]`로 시작하고, 요청 WHERE는 3번부터 번호를 매깁니다.
pub fn schema_tables(
    database: &str,
    schema: &str,
    params: &RequestParams,
) -> Result<(ComposedStatement, bool)> {
    compose_list(
        &ListShape {
            select: statements::SCHEMA_TABLES_SELECT,
            count: statements::SCHEMA_TABLES_COUNT,
            builtin_where: statements::SCHEMA_TABLES_WHERE,
            name_field: statements::SCHEMA_TABLES_NAME_FIELD,
        },
        params,
        vec![Value::from(database), Value::from(schema)],
    )
}

/// SELECT 문 조립
///
/// `cols`는 접근 정책을 거친 허용 컬럼 목록입니다 (빈 목록은 호출자가 이미
/// 거릅니다). `_count`가 있으면 프로젝션을 집계로 바꾸고 두 번째 반환값으로
/// 집계 실행 모드를 알립니다. 테이블 SELECT에는 암묵적 기본 정렬이 없습니다.
pub fn select(
    target: &ResourceTarget,
    params: &RequestParams,
    cols: &[String],
) -> Result<(ComposedStatement, bool)> {
    let count = fragment::count_projection(params)?;
    let aggregate = count.is_some();
    let projection = match count {
        Some(count) => count,
        None => fragment::select_fields(cols)?,
    };

    let mut sql = format!("{projection} {}", target.qualified());

    for join in fragment::join_clauses(params)? {
        sql.push_str(&join);
    }

    let mut cursor = PlaceholderCursor::new();
    let mut values = Vec::new();
    if let Some(filter) = fragment::where_clause(params, cursor.base())? {
        cursor.advance(filter.values.len());
        sql.push_str(" WHERE ");
        sql.push_str(&filter.text);
        values.extend(filter.values);
    }

    if let Some(group) = fragment::group_clause(params)? {
        sql.push(' ');
        sql.push_str(&group);
    }
    if let Some(order) = fragment::order_clause(params)? {
        sql.push(' ');
        sql.push_str(&order);
    }

    let page = fragment::pagination_clause(params)?;
    sql.push(' ');
    sql.push_str(&page);

    Ok((ComposedStatement { sql, values }, aggregate))
}

/// INSERT 문 조립
pub fn insert(target: &ResourceTarget, body: &Value) -> Result<ComposedStatement> {
    let frag = fragment::insert_fragment(body)?;
    Ok(ComposedStatement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            target.qualified(),
            frag.names,
            frag.placeholders
        ),
        values: frag.values,
    })
}

/// UPDATE 문 조립
///
/// WHERE를 먼저 계산해 몇 개의 값을 소비하는지 확정한 뒤, SET 조각은 그
/// 다음 번호부터 매깁니다. SET이 SQL 텍스트에서는 먼저 나오지만 번호는
/// WHERE 뒤에 할당됐으므로, 값 목록은 `[where…, set…]` 순서여야 플레이스홀더
/// 번호와 맞습니다.
pub fn update(
    target: &ResourceTarget,
    params: &RequestParams,
    body: &Value,
) -> Result<ComposedStatement> {
    let mut cursor = PlaceholderCursor::new();
    let filter = fragment::where_clause(params, cursor.base())?;
    if let Some(filter) = &filter {
        cursor.advance(filter.values.len());
    }
    let set = fragment::set_clause(body, cursor.base())?;

    let mut sql = format!("UPDATE {} SET {}", target.qualified(), set.text);
    let values = match filter {
        Some(filter) => {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.text);
            let mut values = filter.values;
            values.extend(set.values);
            values
        }
        None => set.values,
    };

    Ok(ComposedStatement { sql, values })
}

/// DELETE 문 조립
///
/// 값은 정확히 WHERE 조각의 값입니다. 필터 없는 전체 삭제도 조립은 되며,
/// 막을지는 호출자 책임입니다.
pub fn delete(target: &ResourceTarget, params: &RequestParams) -> Result<ComposedStatement> {
    let mut sql = format!("DELETE FROM {}", target.qualified());
    let mut values = Vec::new();

    let cursor = PlaceholderCursor::new();
    if let Some(filter) = fragment::where_clause(params, cursor.base())? {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.text);
        values = filter.values;
    }

    Ok(ComposedStatement { sql, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> RequestParams {
        RequestParams::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn target() -> ResourceTarget {
        ResourceTarget::new("d", "s", "t").unwrap()
    }

    /// SQL 안의 `$n`들을 수집
    fn placeholder_numbers(sql: &str) -> Vec<usize> {
        let mut numbers = Vec::new();
        let bytes = sql.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    numbers.push(sql[start..end].parse().unwrap());
                }
                i = end;
            } else {
                i += 1;
            }
        }
        numbers
    }

    /// 플레이스홀더 개수 == 값 개수, 번호는 1..=n 연속
    fn assert_placeholders_match(stmt: &ComposedStatement) {
        let mut numbers = placeholder_numbers(&stmt.sql);
        numbers.sort_unstable();
        assert_eq!(numbers.len(), stmt.values.len(), "sql: {}", stmt.sql);
        assert_eq!(
            numbers,
            (1..=stmt.values.len()).collect::<Vec<_>>(),
            "sql: {}",
            stmt.sql
        );
    }

    #[test]
    fn test_databases_defaults() {
        let (stmt, aggregate) = databases(&params(&[])).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT datname FROM pg_database WHERE NOT datistemplate \
             ORDER BY \"datname\" ASC LIMIT 20 OFFSET 0"
        );
        assert!(stmt.values.is_empty());
        assert!(!aggregate);
    }

    #[test]
    fn test_databases_filter_appends_with_and() {
        let (stmt, _) = databases(&params(&[("datname", "$like.prod%")])).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT datname FROM pg_database WHERE NOT datistemplate \
             AND \"datname\" LIKE $1 ORDER BY \"datname\" ASC LIMIT 20 OFFSET 0"
        );
        assert_eq!(stmt.values, vec![json!("prod%")]);
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_databases_count_suppresses_default_order() {
        let (stmt, aggregate) = databases(&params(&[("_count", "*")])).unwrap();
        assert!(aggregate);
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(datname) FROM pg_database WHERE NOT datistemplate LIMIT 20 OFFSET 0"
        );
    }

    #[test]
    fn test_databases_explicit_order_wins() {
        let (stmt, _) = databases(&params(&[("_order", "-datname")])).unwrap();
        assert!(stmt.sql.contains("ORDER BY \"datname\" DESC"));
        assert!(!stmt.sql.contains("ASC"));
    }

    #[test]
    fn test_databases_distinct_rewrites_once() {
        let (stmt, _) = databases(&params(&[("_distinct", "true")])).unwrap();
        assert!(stmt.sql.starts_with("SELECT DISTINCT datname FROM pg_database"));
    }

    #[test]
    fn test_schemas_filter_installs_where() {
        let (stmt, _) = schemas(&params(&[("schema_name", "public")])).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT schema_name FROM information_schema.schemata \
             WHERE \"schema_name\" = $1 ORDER BY \"schema_name\" ASC LIMIT 20 OFFSET 0"
        );
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_tables_defaults() {
        let (stmt, _) = tables(&params(&[])).unwrap();
        assert!(stmt.sql.starts_with("SELECT n.nspname AS schema"));
        assert!(stmt.sql.contains("WHERE c.relkind IN"));
        assert!(stmt.sql.ends_with("ORDER BY \"name\" ASC LIMIT 20 OFFSET 0"));
    }

    #[test]
    fn test_schema_tables_leading_values_offset_filter() {
        let p = params(&[("name", "$like.user%")]);
        let (stmt, _) = schema_tables("mydb", "public", &p).unwrap();

        // 값 목록은 [database, schema]로 시작하고 요청 WHERE는 $3부터
        assert_eq!(
            stmt.values,
            vec![json!("mydb"), json!("public"), json!("user%")]
        );
        assert!(stmt.sql.contains("table_catalog = $1 AND table_schema = $2"));
        assert!(stmt.sql.contains("\"name\" LIKE $3"));
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_schema_tables_without_filter() {
        let (stmt, _) = schema_tables("mydb", "public", &params(&[])).unwrap();
        assert_eq!(stmt.values, vec![json!("mydb"), json!("public")]);
        assert!(stmt.sql.ends_with("ORDER BY \"name\" ASC LIMIT 20 OFFSET 0"));
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_select_example_from_permitted_columns() {
        let cols = vec!["id".to_string(), "name".to_string()];
        let (stmt, aggregate) = select(&target(), &params(&[]), &cols).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"id\",\"name\" FROM \"d\".\"s\".\"t\" LIMIT 20 OFFSET 0"
        );
        assert!(stmt.values.is_empty());
        assert!(!aggregate);
    }

    #[test]
    fn test_select_full_shape_in_order() {
        let p = params(&[
            ("_join", "inner:books:books.author_id:$eq:t.id"),
            ("status", "active"),
            ("_groupby", "status"),
            ("_order", "-id"),
            ("_page", "2"),
            ("_page_size", "5"),
        ]);
        let cols = vec!["id".to_string(), "status".to_string()];
        let (stmt, _) = select(&target(), &p, &cols).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"id\",\"status\" FROM \"d\".\"s\".\"t\" \
             INNER JOIN \"books\" ON \"books\".\"author_id\" = \"t\".\"id\" \
             WHERE \"status\" = $1 GROUP BY \"status\" ORDER BY \"id\" DESC \
             LIMIT 5 OFFSET 5"
        );
        assert_eq!(stmt.values, vec![json!("active")]);
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_select_count_overrides_projection() {
        let cols = vec!["id".to_string()];
        let (stmt, aggregate) = select(&target(), &params(&[("_count", "*")]), &cols).unwrap();
        assert!(aggregate);
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(*) FROM \"d\".\"s\".\"t\" LIMIT 20 OFFSET 0"
        );
    }

    #[test]
    fn test_insert_statement() {
        let body = json!({"name": "kim", "age": 30});
        let stmt = insert(&target(), &body).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"d\".\"s\".\"t\" (\"age\",\"name\") VALUES ($1,$2)"
        );
        assert_eq!(stmt.values, vec![json!(30), json!("kim")]);
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_update_where_first_then_set() {
        let p = params(&[("id", "7"), ("status", "active")]);
        let body = json!({"name": "kim", "age": 30});
        let stmt = update(&target(), &p, &body).unwrap();

        // WHERE가 1..n, SET이 n+1..n+m, 값은 [where…, set…]
        assert_eq!(
            stmt.sql,
            "UPDATE \"d\".\"s\".\"t\" SET \"age\" = $3, \"name\" = $4 \
             WHERE \"id\" = $1 AND \"status\" = $2"
        );
        assert_eq!(
            stmt.values,
            vec![json!(7), json!("active"), json!(30), json!("kim")]
        );
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_update_without_filter_sends_only_set_values() {
        let body = json!({"age": 30});
        let stmt = update(&target(), &params(&[]), &body).unwrap();
        assert_eq!(stmt.sql, "UPDATE \"d\".\"s\".\"t\" SET \"age\" = $1");
        assert_eq!(stmt.values, vec![json!(30)]);
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_delete_example() {
        let stmt = delete(&target(), &params(&[("id", "42")])).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM \"d\".\"s\".\"t\" WHERE \"id\" = $1");
        assert_eq!(stmt.values, vec![json!(42)]);
        assert_placeholders_match(&stmt);
    }

    #[test]
    fn test_delete_all_composes() {
        let stmt = delete(&target(), &params(&[])).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM \"d\".\"s\".\"t\"");
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_target_rejects_bad_identifiers() {
        assert!(ResourceTarget::new("d", "s", "t; DROP TABLE x").is_err());
        assert!(ResourceTarget::new("", "s", "t").is_err());
        assert!(ResourceTarget::new("d", "pg\"; --", "t").is_err());
    }

    #[test]
    fn test_composition_is_idempotent() {
        let p = params(&[("status", "active"), ("_order", "-id"), ("_page", "2")]);
        let cols = vec!["id".to_string(), "status".to_string()];
        let first = select(&target(), &p, &cols).unwrap();
        let second = select(&target(), &p, &cols).unwrap();
        assert_eq!(first, second);

        let body = json!({"name": "kim"});
        assert_eq!(
            update(&target(), &p, &body).unwrap(),
            update(&target(), &p, &body).unwrap()
        );
    }
}
