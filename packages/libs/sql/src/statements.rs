//! 카탈로그 기본 SQL
//!
//! 리스트 연산이 출발점으로 쓰는 카탈로그 조회문입니다. `_WHERE`가 붙은
//! 상수는 기본 필터를 내장하고 있어서, 요청 필터는 ` AND `로 이어 붙입니다.

pub const DATABASES_SELECT: &str = "SELECT datname FROM pg_database";
pub const DATABASES_COUNT: &str = "SELECT COUNT(datname) FROM pg_database";
pub const DATABASES_WHERE: &str = " WHERE NOT datistemplate";
pub const DATABASES_NAME_FIELD: &str = "datname";

pub const SCHEMAS_SELECT: &str = "SELECT schema_name FROM information_schema.schemata";
pub const SCHEMAS_COUNT: &str = "SELECT COUNT(schema_name) FROM information_schema.schemata";
pub const SCHEMAS_NAME_FIELD: &str = "schema_name";

pub const TABLES_SELECT: &str = "SELECT n.nspname AS schema, c.relname AS name, \
    CASE c.relkind WHEN 'r' THEN 'table' WHEN 'v' THEN 'view' WHEN 'm' THEN 'matview' \
    WHEN 'f' THEN 'foreign_table' END AS type \
    FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace";
pub const TABLES_COUNT: &str = "SELECT COUNT(c.relname) \
    FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace";
pub const TABLES_WHERE: &str = " WHERE c.relkind IN ('r','v','m','f') \
    AND n.nspname NOT IN ('pg_catalog','information_schema')";
pub const TABLES_NAME_FIELD: &str = "name";

pub const SCHEMA_TABLES_SELECT: &str = "SELECT table_catalog AS database, \
    table_schema AS schema, table_name AS name, table_type AS type \
    FROM information_schema.tables";
pub const SCHEMA_TABLES_COUNT: &str = "SELECT COUNT(table_name) FROM information_schema.tables";
pub const SCHEMA_TABLES_WHERE: &str = " WHERE table_catalog = $1 AND table_schema = $2";
pub const SCHEMA_TABLES_NAME_FIELD: &str = "name";
