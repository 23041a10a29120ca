//! Dialect operators.
//!
//! An [`Operator`] answers introspection and execution calls for one dialect,
//! resolving logical database names through a [`ConnectionRegistry`]. The set
//! of dialects is closed; each variant wraps a type implementing [`Dialect`]
//! and every method runs the shared logic in [`engine`] against it.

pub mod context;
pub mod dialect;
pub mod engine;
pub mod fold;
pub mod mysql;
pub mod postgres;
pub mod registry;
pub mod sqlserver;

pub use context::ExecContext;
pub use dialect::Dialect;
pub use mysql::MySqlOperator;
pub use postgres::PostgresOperator;
pub use registry::OperatorRegistry;
pub use sqlserver::SqlServerOperator;

use crate::db::registry::{ConnectionHandle, ConnectionRegistry};
use crate::error::{DbError, DbResult};
use crate::impl_operator_dispatch;
use crate::models::{
    DbConfig, DbType, LogicDbInfo, Pagination, Row, SchemaColumns, TableColInfo,
};
use std::sync::Arc;

/// Introspection and execution for one dialect.
#[derive(Debug, Clone)]
pub enum Operator {
    Postgres(PostgresOperator),
    SqlServer(SqlServerOperator),
    MySql(MySqlOperator),
}

impl Operator {
    /// Built-in operator for `db_type`, resolving names through `connections`.
    pub fn for_dialect(db_type: DbType, connections: Arc<ConnectionRegistry>) -> DbResult<Self> {
        match db_type {
            DbType::Postgres => Ok(Self::Postgres(PostgresOperator::new(connections))),
            DbType::SqlServer => Ok(Self::SqlServer(SqlServerOperator::new(connections))),
            DbType::MySql => Ok(Self::MySql(MySqlOperator::new(connections))),
            DbType::Oracle => Err(DbError::unsupported_dialect(db_type.as_str())),
        }
    }

    pub fn db_type(&self) -> DbType {
        match self {
            Self::Postgres(_) => PostgresOperator::DB_TYPE,
            Self::SqlServer(_) => SqlServerOperator::DB_TYPE,
            Self::MySql(_) => MySqlOperator::DB_TYPE,
        }
    }

    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        impl_operator_dispatch!(self, op => op.connections())
    }

    /// Open `config` in the connection registry. A config without a dialect
    /// takes this operator's.
    pub async fn open(&self, ctx: &ExecContext, config: &DbConfig) -> DbResult<()> {
        impl_operator_dispatch!(self, op => engine::open(op, ctx, config).await)
    }

    pub async fn ping(&self, ctx: &ExecContext, name: &str) -> DbResult<()> {
        self.connections().ping(ctx, name).await
    }

    pub async fn close(&self, name: &str) -> DbResult<()> {
        self.connections().close(name).await
    }

    pub async fn get_db(&self, name: &str) -> DbResult<Arc<ConnectionHandle>> {
        self.connections().get_db(name).await
    }

    /// Run `sql` verbatim and return its rows. The statement is not checked or
    /// escaped in any way.
    pub async fn get_data_by_sql(
        &self,
        ctx: &ExecContext,
        name: &str,
        sql: &str,
    ) -> DbResult<Vec<Row>> {
        impl_operator_dispatch!(self, op => engine::get_data_by_sql(op, ctx, name, sql).await)
    }

    /// One page of `schema.table` (or `table` when `schema` is empty). Fills in
    /// `page.total` and `page.page_count`.
    pub async fn get_table_data(
        &self,
        ctx: &ExecContext,
        name: &str,
        schema: &str,
        table: &str,
        page: &mut Pagination,
    ) -> DbResult<Vec<Row>> {
        impl_operator_dispatch!(self, op => {
            engine::get_table_data(op, ctx, name, schema, table, page).await
        })
    }

    /// Tables of `schemas`, grouped by schema.
    pub async fn get_tables_under_schema(
        &self,
        ctx: &ExecContext,
        name: &str,
        schemas: &[String],
    ) -> DbResult<Vec<LogicDbInfo>> {
        impl_operator_dispatch!(self, op => {
            engine::get_tables_under_schema(op, ctx, name, schemas).await
        })
    }

    /// Tables of every user schema, grouped by schema.
    pub async fn get_tables_under_db(
        &self,
        ctx: &ExecContext,
        name: &str,
    ) -> DbResult<Vec<LogicDbInfo>> {
        impl_operator_dispatch!(self, op => engine::get_tables_under_db(op, ctx, name).await)
    }

    /// Columns of every user table, grouped by schema then table.
    pub async fn get_columns(
        &self,
        ctx: &ExecContext,
        name: &str,
    ) -> DbResult<Vec<SchemaColumns>> {
        impl_operator_dispatch!(self, op => engine::get_columns(op, ctx, name).await)
    }

    /// Columns of `table_names` within `logic_db_name`, grouped by table.
    pub async fn get_columns_under_tables(
        &self,
        ctx: &ExecContext,
        name: &str,
        logic_db_name: &str,
        table_names: &[String],
    ) -> DbResult<Vec<TableColInfo>> {
        impl_operator_dispatch!(self, op => {
            engine::get_columns_under_tables(op, ctx, name, logic_db_name, table_names).await
        })
    }

    /// Create `schema_name` if it does not exist. An empty `comment` defaults
    /// to the schema name.
    pub async fn create_schema(
        &self,
        ctx: &ExecContext,
        name: &str,
        schema_name: &str,
        comment: &str,
    ) -> DbResult<()> {
        impl_operator_dispatch!(self, op => {
            engine::create_schema(op, ctx, name, schema_name, comment).await
        })
    }

    pub async fn execute_ddl(
        &self,
        ctx: &ExecContext,
        name: &str,
        statement: &str,
    ) -> DbResult<()> {
        impl_operator_dispatch!(self, op => engine::execute_ddl(op, ctx, name, statement).await)
    }
}
