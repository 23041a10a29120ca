//! PostgreSQL operator.

use super::dialect::{Dialect, quote_with, string_literal};
use crate::db::registry::ConnectionRegistry;
use crate::models::DbType;
use std::sync::Arc;

/// Catalog SQL. Engine-owned tables (`pg*`, `gp*`, `sql_*`) are excluded.
mod queries {
    pub const TABLES_SELECT: &str = r#"
        SELECT tb.schemaname::text AS table_schema,
               tb.tablename::text AS table_name,
               d.description AS comments
        FROM pg_tables tb
        JOIN pg_namespace n ON n.nspname = tb.schemaname
        JOIN pg_class c ON c.relname = tb.tablename AND c.relnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = c.oid AND d.objsubid = 0
        WHERE tb.tablename NOT LIKE 'pg%'
          AND tb.tablename NOT LIKE 'gp%'
          AND tb.tablename NOT LIKE 'sql_%'"#;

    pub const TABLES_ORDER: &str = " ORDER BY tb.schemaname, tb.tablename";

    pub const ALL_TABLES: &str = r#"
        SELECT tb.schemaname::text AS table_schema,
               tb.tablename::text AS table_name,
               d.description AS comments
        FROM pg_tables tb
        JOIN pg_namespace n ON n.nspname = tb.schemaname
        JOIN pg_class c ON c.relname = tb.tablename AND c.relnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = c.oid AND d.objsubid = 0
        WHERE tb.schemaname <> 'information_schema'
          AND tb.tablename NOT LIKE 'pg%'
          AND tb.tablename NOT LIKE 'gp%'
          AND tb.tablename NOT LIKE 'sql_%'
        ORDER BY tb.schemaname, tb.tablename"#;

    pub const COLUMNS_SELECT: &str = r#"
        SELECT ic.table_schema::text AS table_schema,
               ic.table_name::text AS table_name,
               ic.column_name::text AS column_name,
               ic.udt_name::text AS data_type,
               d.description AS comments
        FROM information_schema.columns ic
        JOIN pg_namespace n ON n.nspname = ic.table_schema
        JOIN pg_class c ON c.relname = ic.table_name AND c.relnamespace = n.oid
        LEFT JOIN pg_description d
          ON d.objoid = c.oid AND d.objsubid = ic.ordinal_position"#;

    pub const COLUMNS_ORDER: &str =
        " ORDER BY ic.table_schema, ic.table_name, ic.ordinal_position";

    pub const ALL_COLUMNS_FILTER: &str = r#"
        WHERE ic.table_name NOT LIKE 'pg%'
          AND ic.table_name NOT LIKE 'gp%'
          AND ic.table_name NOT LIKE 'sql_%'
          AND ic.table_schema <> 'information_schema'"#;
}

/// Operator for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresOperator {
    connections: Arc<ConnectionRegistry>,
}

impl PostgresOperator {
    pub fn new(connections: Arc<ConnectionRegistry>) -> Self {
        Self { connections }
    }
}

impl Dialect for PostgresOperator {
    const DB_TYPE: DbType = DbType::Postgres;
    const COMMENT_PLACEHOLDER: &'static str = "";

    fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    fn quote_ident(ident: &str) -> String {
        quote_with(ident, '"', '"')
    }

    fn placeholder(n: usize) -> String {
        format!("${n}")
    }

    fn page_query(target: &str, limit: u64, offset: u64) -> String {
        format!("SELECT * FROM {target} LIMIT {limit} OFFSET {offset}")
    }

    fn tables_in_schemas_sql(schema_count: usize) -> String {
        format!(
            "{} AND tb.schemaname IN ({}){}",
            queries::TABLES_SELECT,
            Self::placeholders(1, schema_count),
            queries::TABLES_ORDER
        )
    }

    fn tables_sql() -> &'static str {
        queries::ALL_TABLES
    }

    fn columns_sql() -> &'static str {
        static SQL: std::sync::OnceLock<String> = std::sync::OnceLock::new();
        SQL.get_or_init(|| {
            format!(
                "{}{}{}",
                queries::COLUMNS_SELECT,
                queries::ALL_COLUMNS_FILTER,
                queries::COLUMNS_ORDER
            )
        })
    }

    fn columns_in_tables_sql(table_count: usize) -> String {
        format!(
            "{} WHERE ic.table_schema = $1 AND ic.table_name IN ({}){}",
            queries::COLUMNS_SELECT,
            Self::placeholders(2, table_count),
            queries::COLUMNS_ORDER
        )
    }

    fn create_schema_sql(schema: &str, comment: &str) -> Vec<String> {
        let quoted = Self::quote_ident(schema);
        vec![
            format!("CREATE SCHEMA IF NOT EXISTS {quoted}"),
            format!("COMMENT ON SCHEMA {quoted} IS {}", string_literal(comment)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(PostgresOperator::placeholder(1), "$1");
        assert_eq!(PostgresOperator::placeholders(2, 3), "$2, $3, $4");
    }

    #[test]
    fn test_qualified_table() {
        assert_eq!(
            PostgresOperator::qualified_table("public", "users"),
            "\"public\".\"users\""
        );
        assert_eq!(PostgresOperator::qualified_table("", "users"), "\"users\"");
    }

    #[test]
    fn test_page_query() {
        assert_eq!(
            PostgresOperator::page_query("\"users\"", 10, 20),
            "SELECT * FROM \"users\" LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_tables_in_schemas_sql() {
        let sql = PostgresOperator::tables_in_schemas_sql(2);
        assert!(sql.contains("tb.schemaname IN ($1, $2)"));
        assert!(sql.contains("NOT LIKE 'sql_%'"));
        assert!(sql.trim_end().ends_with("ORDER BY tb.schemaname, tb.tablename"));
        assert!(!sql.contains("information_schema"));
    }

    #[test]
    fn test_all_tables_excludes_information_schema() {
        assert!(PostgresOperator::tables_sql().contains("<> 'information_schema'"));
    }

    #[test]
    fn test_columns_sql() {
        let sql = PostgresOperator::columns_sql();
        assert!(sql.contains("udt_name"));
        assert!(sql.contains("ic.table_schema <> 'information_schema'"));
        assert!(sql.ends_with("ic.ordinal_position"));

        let sql = PostgresOperator::columns_in_tables_sql(2);
        assert!(sql.contains("ic.table_schema = $1 AND ic.table_name IN ($2, $3)"));
    }

    #[test]
    fn test_create_schema_sql() {
        let sql = PostgresOperator::create_schema_sql("sales", "it's sales");
        assert_eq!(sql[0], "CREATE SCHEMA IF NOT EXISTS \"sales\"");
        assert_eq!(sql[1], "COMMENT ON SCHEMA \"sales\" IS 'it''s sales'");
    }
}
