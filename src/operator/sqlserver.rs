//! SQL Server operator.

use super::dialect::{Dialect, quote_with, string_literal};
use crate::db::registry::ConnectionRegistry;
use crate::models::DbType;
use std::sync::Arc;

/// Catalog SQL. Comments come from the `MS_Description` extended property.
/// All-schema queries skip `sys`, `INFORMATION_SCHEMA` and the `db_*` role schemas.
mod queries {
    pub const TABLES_SELECT: &str = r#"
        SELECT b.name AS table_schema,
               a.name AS table_name,
               CONVERT(NVARCHAR(4000), c.[value]) AS comments
        FROM sys.tables a
        JOIN sys.schemas b ON a.schema_id = b.schema_id
        LEFT JOIN sys.extended_properties c
          ON c.major_id = a.object_id AND c.minor_id = 0
         AND c.class = 1 AND c.name = 'MS_Description'"#;

    pub const TABLES_ORDER: &str = " ORDER BY b.name, a.name";

    pub const ALL_TABLES: &str = r#"
        SELECT b.name AS table_schema,
               a.name AS table_name,
               CONVERT(NVARCHAR(4000), c.[value]) AS comments
        FROM sys.tables a
        JOIN sys.schemas b ON a.schema_id = b.schema_id
        LEFT JOIN sys.extended_properties c
          ON c.major_id = a.object_id AND c.minor_id = 0
         AND c.class = 1 AND c.name = 'MS_Description'
        WHERE b.name NOT LIKE 'db[_]%'
          AND b.name NOT IN ('sys', 'INFORMATION_SCHEMA')
        ORDER BY b.name, a.name"#;

    pub const COLUMNS_SELECT: &str = r#"
        SELECT ic.TABLE_SCHEMA AS table_schema,
               ic.TABLE_NAME AS table_name,
               ic.COLUMN_NAME AS column_name,
               ic.DATA_TYPE AS data_type,
               CONVERT(NVARCHAR(4000), ep.[value]) AS comments
        FROM INFORMATION_SCHEMA.COLUMNS ic
        LEFT JOIN sys.extended_properties ep
          ON ep.major_id = OBJECT_ID(QUOTENAME(ic.TABLE_SCHEMA) + '.' + QUOTENAME(ic.TABLE_NAME))
         AND ep.minor_id = COLUMNPROPERTY(ep.major_id, ic.COLUMN_NAME, 'ColumnId')
         AND ep.class = 1 AND ep.name = 'MS_Description'"#;

    pub const COLUMNS_ORDER: &str =
        " ORDER BY ic.TABLE_SCHEMA, ic.TABLE_NAME, ic.ORDINAL_POSITION";

    pub const ALL_COLUMNS: &str = r#"
        SELECT ic.TABLE_SCHEMA AS table_schema,
               ic.TABLE_NAME AS table_name,
               ic.COLUMN_NAME AS column_name,
               ic.DATA_TYPE AS data_type,
               CONVERT(NVARCHAR(4000), ep.[value]) AS comments
        FROM INFORMATION_SCHEMA.COLUMNS ic
        LEFT JOIN sys.extended_properties ep
          ON ep.major_id = OBJECT_ID(QUOTENAME(ic.TABLE_SCHEMA) + '.' + QUOTENAME(ic.TABLE_NAME))
         AND ep.minor_id = COLUMNPROPERTY(ep.major_id, ic.COLUMN_NAME, 'ColumnId')
         AND ep.class = 1 AND ep.name = 'MS_Description'
        WHERE ic.TABLE_SCHEMA NOT LIKE 'db[_]%'
          AND ic.TABLE_SCHEMA NOT IN ('sys', 'INFORMATION_SCHEMA')
        ORDER BY ic.TABLE_SCHEMA, ic.TABLE_NAME, ic.ORDINAL_POSITION"#;
}

/// Operator for SQL Server databases.
#[derive(Debug, Clone)]
pub struct SqlServerOperator {
    connections: Arc<ConnectionRegistry>,
}

impl SqlServerOperator {
    pub fn new(connections: Arc<ConnectionRegistry>) -> Self {
        Self { connections }
    }
}

fn nstring(value: &str) -> String {
    format!("N{}", string_literal(value))
}

impl Dialect for SqlServerOperator {
    const DB_TYPE: DbType = DbType::SqlServer;
    const COMMENT_PLACEHOLDER: &'static str = "-";

    fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    fn quote_ident(ident: &str) -> String {
        quote_with(ident, '[', ']')
    }

    fn placeholder(n: usize) -> String {
        format!("@P{n}")
    }

    fn page_query(target: &str, limit: u64, offset: u64) -> String {
        // OFFSET/FETCH needs an ORDER BY; there is no natural key to sort on
        format!(
            "SELECT * FROM {target} ORDER BY (SELECT NULL) OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY"
        )
    }

    fn tables_in_schemas_sql(schema_count: usize) -> String {
        format!(
            "{} WHERE b.name IN ({}){}",
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
            "{} WHERE ic.TABLE_SCHEMA = @P1 AND ic.TABLE_NAME IN ({}){}",
            queries::COLUMNS_SELECT,
            Self::placeholders(2, table_count),
            queries::COLUMNS_ORDER
        )
    }

    fn create_schema_sql(schema: &str, comment: &str) -> Vec<String> {
        let name = nstring(schema);
        let create = nstring(&format!("CREATE SCHEMA {}", Self::quote_ident(schema)));
        let property = format!(
            "@name = N'MS_Description', @value = {}, @level0type = N'SCHEMA', @level0name = {name}",
            nstring(comment)
        );
        vec![
            format!("IF NOT EXISTS (SELECT 1 FROM sys.schemas WHERE name = {name}) EXEC({create})"),
            format!(
                "IF EXISTS (SELECT 1 FROM sys.extended_properties \
                 WHERE class = 3 AND major_id = SCHEMA_ID({name}) AND minor_id = 0 AND name = N'MS_Description') \
                 EXEC sp_updateextendedproperty {property} \
                 ELSE EXEC sp_addextendedproperty {property}"
            ),
        ]
    }
}
