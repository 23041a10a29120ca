//! Driver boundary.
//!
//! The connection registry never talks to a wire protocol directly. It asks a
//! [`Connector`] to open a pooled [`Driver`] for a dialect and DSN, and every
//! statement afterwards goes through that driver. The bundled implementation is
//! [`PoolConnector`](super::pool::PoolConnector); tests and embedders can supply
//! their own.

use crate::error::DbResult;
use crate::models::{DbConfig, DbType, QueryParam, Row};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Pool limits applied when a driver is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub max_open: u32,
    pub max_idle: u32,
    pub max_lifetime: Duration,
    pub max_idle_time: Duration,
}

impl PoolLimits {
    /// Limits from a config whose zero values were already replaced by defaults.
    pub fn from_config(config: &DbConfig) -> Self {
        Self {
            max_open: config.max_open_conn,
            max_idle: config.max_idle_conn.min(config.max_open_conn),
            max_lifetime: config.conn_max_lifetime,
            max_idle_time: config.conn_max_idle_time,
        }
    }
}

/// A pooled connection to one database.
///
/// Implementations must be safe to share across tasks; the registry hands out
/// the same driver to every caller of a logical name.
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Dialect this driver speaks.
    fn db_type(&self) -> DbType;

    /// Run a statement and return its rows.
    async fn query(&self, sql: &str, params: &[QueryParam]) -> DbResult<Vec<Row>>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[QueryParam]) -> DbResult<u64>;

    /// Check a connection can be acquired and used.
    async fn ping(&self) -> DbResult<()>;

    /// Close the pool. Subsequent calls on this driver fail.
    async fn close(&self) -> DbResult<()>;
}

/// Opens drivers for the connection registry.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        db_type: DbType,
        dsn: &str,
        limits: &PoolLimits,
    ) -> DbResult<Arc<dyn Driver>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_limits_clamp_idle_to_open() {
        let config = DbConfig::new("main", DbType::Postgres, "postgres://h/db")
            .with_pool(4, 8)
            .with_pool_defaults();
        let limits = PoolLimits::from_config(&config);
        assert_eq!(limits.max_open, 4);
        assert_eq!(limits.max_idle, 4);
    }
}
