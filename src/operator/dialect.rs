//! Per-dialect SQL text.
//!
//! Everything that differs between engines lives behind [`Dialect`]: identifier
//! quoting, bind placeholder syntax, the page query shape, catalog queries and
//! schema creation. The shared operator logic in [`super::engine`] only builds
//! statements through these hooks.

use crate::db::registry::ConnectionRegistry;
use crate::models::DbType;
use std::sync::Arc;

pub trait Dialect: Send + Sync {
    const DB_TYPE: DbType;

    /// Comment reported for tables and columns that have none.
    const COMMENT_PLACEHOLDER: &'static str;

    /// Registry this operator resolves logical names against.
    fn connections(&self) -> &Arc<ConnectionRegistry>;

    fn quote_ident(ident: &str) -> String;

    /// Bind placeholder for the 1-based parameter `n`.
    fn placeholder(n: usize) -> String;

    /// `SELECT *` over `target` bounded to `limit` rows from `offset`.
    fn page_query(target: &str, limit: u64, offset: u64) -> String;

    /// Tables of the schemas bound to placeholders `1..=schema_count`.
    fn tables_in_schemas_sql(schema_count: usize) -> String;

    /// Tables of every user schema.
    fn tables_sql() -> &'static str;

    /// Columns of every user table.
    fn columns_sql() -> &'static str;

    /// Columns of the tables bound to placeholders `2..=table_count + 1`
    /// within the schema bound to placeholder 1.
    fn columns_in_tables_sql(table_count: usize) -> String;

    /// Statements creating `schema` if missing and setting its comment.
    fn create_schema_sql(schema: &str, comment: &str) -> Vec<String>;

    /// `"schema"."table"`, or just the quoted table when `schema` is empty.
    fn qualified_table(schema: &str, table: &str) -> String {
        if schema.is_empty() {
            Self::quote_ident(table)
        } else {
            format!("{}.{}", Self::quote_ident(schema), Self::quote_ident(table))
        }
    }

    /// Comma-separated placeholders `start..start + count`.
    fn placeholders(start: usize, count: usize) -> String {
        (start..start + count)
            .map(Self::placeholder)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Wrap `ident` in `open`/`close`, doubling embedded `close` characters.
pub(crate) fn quote_with(ident: &str, open: char, close: char) -> String {
    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push(open);
    for ch in ident.chars() {
        if ch == close {
            quoted.push(close);
        }
        quoted.push(ch);
    }
    quoted.push(close);
    quoted
}

/// Escape a value for a single-quoted SQL string literal.
pub(crate) fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
