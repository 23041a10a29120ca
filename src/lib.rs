//! dbutil library
//!
//! A uniform introspection and execution API over PostgreSQL, SQL Server and
//! MySQL. Databases are registered once under a logical name; schemas, tables,
//! columns and raw statements are then reached through a dialect [`Operator`]
//! regardless of the engine behind the name.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod operator;

pub use db::{ConnectionRegistry, Connector, Driver};
pub use error::{DbError, DbResult};
pub use models::{DbConfig, DbType};
pub use operator::{ExecContext, Operator, OperatorRegistry};
