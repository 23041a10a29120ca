//! Data models for dbutil.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use connection::{DbConfig, DbType};
pub use query::{QueryParam, Row, row_str, row_u64};
pub use schema::{
    CatalogColumnRow, CatalogTableRow, ColumnInfo, LogicDbInfo, Pagination, SchemaColumns,
    TableColInfo, TableInfo,
};
