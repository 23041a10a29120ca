//! Statement execution over sqlx pools.
//!
//! `mysql` and `postgres` mirror each other and differ only in their argument
//! types. Rows are converted to JSON as they stream in. SQL Server goes through
//! tiberius and lives in [`super::mssql`].

use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{QueryParam, Row};
use futures_util::TryStreamExt;

pub use self::mysql::{execute as mysql_execute, fetch_rows as mysql_fetch_rows};
pub use self::postgres::{execute as postgres_execute, fetch_rows as postgres_fetch_rows};

mod mysql {
    use super::*;
    use sqlx::MySqlPool;
    use sqlx::mysql::MySqlArguments;

    pub async fn fetch_rows(
        pool: &MySqlPool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Vec<Row>> {
        // Unprepared when there is nothing to bind
        if params.is_empty() {
            use sqlx::Executor;
            return pool
                .fetch(sql)
                .map_ok(|r| r.to_json_map())
                .try_collect()
                .await
                .map_err(DbError::from);
        }
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        query
            .fetch(pool)
            .map_ok(|r| r.to_json_map())
            .try_collect()
            .await
            .map_err(DbError::from)
    }

    pub async fn execute(pool: &MySqlPool, sql: &str, params: &[QueryParam]) -> DbResult<u64> {
        // Some DDL (CREATE PROCEDURE) doesn't support prepared statements
        let result = if params.is_empty() {
            use sqlx::Executor;
            pool.execute(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.execute(pool).await
        };
        Ok(result?.rows_affected())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::MySql, MySqlArguments> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Bool(v) => query.bind(*v),
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::Float(v) => query.bind(*v),
            QueryParam::String(v) => query.bind(v.as_str()),
        }
    }
}

mod postgres {
    use super::*;
    use sqlx::PgPool;
    use sqlx::postgres::PgArguments;

    pub async fn fetch_rows(pool: &PgPool, sql: &str, params: &[QueryParam]) -> DbResult<Vec<Row>> {
        if params.is_empty() {
            use sqlx::Executor;
            return pool
                .fetch(sql)
                .map_ok(|r| r.to_json_map())
                .try_collect()
                .await
                .map_err(DbError::from);
        }
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        query
            .fetch(pool)
            .map_ok(|r| r.to_json_map())
            .try_collect()
            .await
            .map_err(DbError::from)
    }

    pub async fn execute(pool: &PgPool, sql: &str, params: &[QueryParam]) -> DbResult<u64> {
        let result = if params.is_empty() {
            use sqlx::Executor;
            pool.execute(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.execute(pool).await
        };
        Ok(result?.rows_affected())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
        param: &'q QueryParam,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
        match param {
            QueryParam::Null => query.bind(None::<String>),
            QueryParam::Bool(v) => query.bind(*v),
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::Float(v) => query.bind(*v),
            QueryParam::String(v) => query.bind(v.as_str()),
        }
    }
}
