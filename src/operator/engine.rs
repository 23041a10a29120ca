//! Operator logic shared by every dialect.
//!
//! Each function resolves the logical name through the dialect's connection
//! registry, builds its statement through [`Dialect`] hooks, and races the
//! driver call against the [`ExecContext`].

use super::context::ExecContext;
use super::dialect::Dialect;
use super::fold::{decode_rows, fold_columns, fold_table_columns, fold_tables};
use crate::db::registry::ConnectionHandle;
use crate::error::{DbError, DbResult};
use crate::models::{
    CatalogColumnRow, CatalogTableRow, DbConfig, LogicDbInfo, Pagination, QueryParam, Row,
    SchemaColumns, TableColInfo, row_u64,
};
use std::sync::Arc;
use tracing::debug;

fn require(value: &str, what: &str) -> DbResult<()> {
    if value.is_empty() {
        return Err(DbError::invalid_argument(format!("empty {what}")));
    }
    Ok(())
}

pub async fn open<D: Dialect>(op: &D, ctx: &ExecContext, config: &DbConfig) -> DbResult<()> {
    let mut config = config.clone();
    match config.db_type {
        None => config.db_type = Some(D::DB_TYPE),
        Some(t) if t != D::DB_TYPE => {
            return Err(DbError::invalid_config(format!(
                "'{}' is a {} database, not {}",
                config.db_name,
                t.display_name(),
                D::DB_TYPE.display_name()
            )));
        }
        Some(_) => {}
    }
    ctx.run("open", op.connections().init_config(&config)).await
}

pub async fn get_db<D: Dialect>(op: &D, name: &str) -> DbResult<Arc<ConnectionHandle>> {
    op.connections().get_db(name).await
}

pub async fn get_data_by_sql<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
    sql: &str,
) -> DbResult<Vec<Row>> {
    let handle = get_db(op, name).await?;
    ctx.run("query", handle.driver().query(sql, &[])).await
}

/// One page of `table`. The count and the page are read by separate
/// statements, so concurrent writes can make `total` disagree with the page.
pub async fn get_table_data<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
    schema: &str,
    table: &str,
    page: &mut Pagination,
) -> DbResult<Vec<Row>> {
    require(table, "table name")?;
    let handle = get_db(op, name).await?;
    let target = D::qualified_table(schema, table);

    let count_sql = format!("SELECT COUNT(*) AS total FROM {target}");
    let counted = ctx
        .run("count rows", handle.driver().query(&count_sql, &[]))
        .await?;
    let total = counted
        .first()
        .and_then(|row| row_u64(row, "total"))
        .ok_or_else(|| {
            DbError::statement(
                "Count query returned no 'total' column",
                None,
                "Check the table can be counted",
            )
        })?;
    page.set_total(total);

    let page_sql = D::page_query(&target, page.limit(), page.offset());
    let rows = ctx
        .run("read page", handle.driver().query(&page_sql, &[]))
        .await?;
    debug!(db_name = %name, table = %target, total, rows = rows.len(), "Read table page");
    Ok(rows)
}

pub async fn get_tables_under_schema<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
    schemas: &[String],
) -> DbResult<Vec<LogicDbInfo>> {
    require(name, "database name")?;
    let handle = get_db(op, name).await?;
    if schemas.is_empty() {
        return Ok(Vec::new());
    }

    let sql = D::tables_in_schemas_sql(schemas.len());
    let params: Vec<QueryParam> = schemas.iter().map(|s| QueryParam::from(s.as_str())).collect();
    let rows = ctx
        .run("list tables", handle.driver().query(&sql, &params))
        .await?;
    debug!(db_name = %name, rows = rows.len(), "Fetched catalog tables");
    let decoded = decode_rows(&rows, CatalogTableRow::from_row)?;
    Ok(fold_tables(decoded, D::COMMENT_PLACEHOLDER))
}

pub async fn get_tables_under_db<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
) -> DbResult<Vec<LogicDbInfo>> {
    require(name, "database name")?;
    let handle = get_db(op, name).await?;
    let rows = ctx
        .run("list tables", handle.driver().query(D::tables_sql(), &[]))
        .await?;
    debug!(db_name = %name, rows = rows.len(), "Fetched catalog tables");
    let decoded = decode_rows(&rows, CatalogTableRow::from_row)?;
    Ok(fold_tables(decoded, D::COMMENT_PLACEHOLDER))
}

pub async fn get_columns<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
) -> DbResult<Vec<SchemaColumns>> {
    require(name, "database name")?;
    let handle = get_db(op, name).await?;
    let rows = ctx
        .run("list columns", handle.driver().query(D::columns_sql(), &[]))
        .await?;
    debug!(db_name = %name, rows = rows.len(), "Fetched catalog columns");
    let decoded = decode_rows(&rows, CatalogColumnRow::from_row)?;
    Ok(fold_columns(decoded, D::COMMENT_PLACEHOLDER))
}

pub async fn get_columns_under_tables<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
    logic_db_name: &str,
    table_names: &[String],
) -> DbResult<Vec<TableColInfo>> {
    require(name, "database name")?;
    if table_names.is_empty() {
        return Err(DbError::invalid_argument("empty table names"));
    }
    let handle = get_db(op, name).await?;

    let sql = D::columns_in_tables_sql(table_names.len());
    let params: Vec<QueryParam> = std::iter::once(logic_db_name)
        .chain(table_names.iter().map(String::as_str))
        .map(QueryParam::from)
        .collect();
    let rows = ctx
        .run("list columns", handle.driver().query(&sql, &params))
        .await?;
    debug!(db_name = %name, schema = %logic_db_name, rows = rows.len(), "Fetched table columns");
    let decoded = decode_rows(&rows, CatalogColumnRow::from_row)?;
    Ok(fold_table_columns(decoded, D::COMMENT_PLACEHOLDER))
}

pub async fn create_schema<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
    schema_name: &str,
    comment: &str,
) -> DbResult<()> {
    require(name, "database name")?;
    require(schema_name, "schema name")?;
    let handle = get_db(op, name).await?;
    let comment = if comment.is_empty() { schema_name } else { comment };

    for statement in D::create_schema_sql(schema_name, comment) {
        ctx.run("create schema", handle.driver().execute(&statement, &[]))
            .await?;
    }
    debug!(db_name = %name, schema = %schema_name, "Schema ensured");
    Ok(())
}

pub async fn execute_ddl<D: Dialect>(
    op: &D,
    ctx: &ExecContext,
    name: &str,
    statement: &str,
) -> DbResult<()> {
    require(name, "database name")?;
    let handle = get_db(op, name).await?;
    ctx.run("execute ddl", handle.driver().execute(statement, &[]))
        .await?;
    Ok(())
}
