//! MySQL operator.
//!
//! MySQL has no schema/database distinction: a schema here is a database on
//! the server, and `create_schema` creates one. Schemas carry no comments.

use super::dialect::{Dialect, quote_with};
use crate::db::registry::ConnectionRegistry;
use crate::models::DbType;
use std::sync::Arc;

/// Catalog SQL. `information_schema` text columns are converted to utf8mb4 so
/// they decode as strings regardless of the server charset.
mod queries {
    pub const TABLES_SELECT: &str = r#"
        SELECT CONVERT(t.TABLE_SCHEMA USING utf8mb4) AS table_schema,
               CONVERT(t.TABLE_NAME USING utf8mb4) AS table_name,
               CONVERT(t.TABLE_COMMENT USING utf8mb4) AS comments
        FROM information_schema.TABLES t
        WHERE t.TABLE_TYPE = 'BASE TABLE'"#;

    pub const TABLES_ORDER: &str = " ORDER BY t.TABLE_SCHEMA, t.TABLE_NAME";

    pub const ALL_TABLES: &str = r#"
        SELECT CONVERT(t.TABLE_SCHEMA USING utf8mb4) AS table_schema,
               CONVERT(t.TABLE_NAME USING utf8mb4) AS table_name,
               CONVERT(t.TABLE_COMMENT USING utf8mb4) AS comments
        FROM information_schema.TABLES t
        WHERE t.TABLE_TYPE = 'BASE TABLE'
          AND t.TABLE_SCHEMA NOT IN ('information_schema', 'mysql', 'performance_schema', 'sys')
        ORDER BY t.TABLE_SCHEMA, t.TABLE_NAME"#;

    pub const COLUMNS_SELECT: &str = r#"
        SELECT CONVERT(c.TABLE_SCHEMA USING utf8mb4) AS table_schema,
               CONVERT(c.TABLE_NAME USING utf8mb4) AS table_name,
               CONVERT(c.COLUMN_NAME USING utf8mb4) AS column_name,
               CONVERT(c.DATA_TYPE USING utf8mb4) AS data_type,
               CONVERT(c.COLUMN_COMMENT USING utf8mb4) AS comments
        FROM information_schema.COLUMNS c"#;

    pub const COLUMNS_ORDER: &str = " ORDER BY c.TABLE_SCHEMA, c.TABLE_NAME, c.ORDINAL_POSITION";

    pub const ALL_COLUMNS: &str = r#"
        SELECT CONVERT(c.TABLE_SCHEMA USING utf8mb4) AS table_schema,
               CONVERT(c.TABLE_NAME USING utf8mb4) AS table_name,
               CONVERT(c.COLUMN_NAME USING utf8mb4) AS column_name,
               CONVERT(c.DATA_TYPE USING utf8mb4) AS data_type,
               CONVERT(c.COLUMN_COMMENT USING utf8mb4) AS comments
        FROM information_schema.COLUMNS c
        WHERE c.TABLE_SCHEMA NOT IN ('information_schema', 'mysql', 'performance_schema', 'sys')
        ORDER BY c.TABLE_SCHEMA, c.TABLE_NAME, c.ORDINAL_POSITION"#;
}

/// Operator for MySQL and MariaDB databases.
#[derive(Debug, Clone)]
pub struct MySqlOperator {
    connections: Arc<ConnectionRegistry>,
}

impl MySqlOperator {
    pub fn new(connections: Arc<ConnectionRegistry>) -> Self {
        Self { connections }
    }
}

impl Dialect for MySqlOperator {
    const DB_TYPE: DbType = DbType::MySql;
    const COMMENT_PLACEHOLDER: &'static str = "";

    fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    fn quote_ident(ident: &str) -> String {
        quote_with(ident, '`', '`')
    }

    fn placeholder(_n: usize) -> String {
        "?".to_string()
    }

    fn page_query(target: &str, limit: u64, offset: u64) -> String {
        format!("SELECT * FROM {target} LIMIT {limit} OFFSET {offset}")
    }

    fn tables_in_schemas_sql(schema_count: usize) -> String {
        format!(
            "{} AND t.TABLE_SCHEMA IN ({}){}",
            queries::TABLES_SELECT,
            Self::placeholders(1, schema_count),
            queries::TABLES_ORDER
        )
    }

    fn tables_sql() -> &'static str {
        queries::ALL_TABLES
    }

    fn columns_sql() -> &'static str {
        queries::ALL_COLUMNS
    }

    fn columns_in_tables_sql(table_count: usize) -> String {
        format!(
            "{} WHERE c.TABLE_SCHEMA = ? AND c.TABLE_NAME IN ({}){}",
            queries::COLUMNS_SELECT,
            Self::placeholders(2, table_count),
            queries::COLUMNS_ORDER
        )
    }

    fn create_schema_sql(schema: &str, _comment: &str) -> Vec<String> {
        vec![format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            Self::quote_ident(schema)
        )]
    }
}
