//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - The driver boundary the registry talks to
//! - Connection pool creation (sqlx for PostgreSQL/MySQL, tiberius for SQL Server)
//! - Query execution
//! - Type mappings
//! - Database dispatch macros for reducing code duplication
//! - The connection registry keyed by logical database name

pub mod driver;
pub mod executor;
#[macro_use]
pub mod macros;
pub mod mssql;
pub mod pool;
pub mod registry;
pub mod types;

pub use driver::{Connector, Driver, PoolLimits};
pub use mssql::MssqlPool;
pub use pool::{DbPool, PoolConnector};
pub use registry::{ConnectionHandle, ConnectionRegistry};
