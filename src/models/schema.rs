//! Schema-related data models.
//!
//! This module defines the shared, dialect-independent result shapes for catalog
//! introspection, the typed catalog rows they are folded from, and pagination.

use crate::config::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// One schema and the tables found under it, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicDbInfo {
    pub schema_name: String,
    pub table_info_list: Vec<TableInfo>,
}

impl LogicDbInfo {
    pub fn table_names(&self) -> Vec<&str> {
        self.table_info_list
            .iter()
            .map(|t| t.table_name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_name: String,
    pub comment: String,
}

/// One table and its columns, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColInfo {
    pub table_name: String,
    pub column_info_list: Vec<ColumnInfo>,
}

impl TableColInfo {
    pub fn column_names(&self) -> Vec<&str> {
        self.column_info_list
            .iter()
            .map(|c| c.column_name.as_str())
            .collect()
    }
}

/// One schema and its tables' columns, produced by catalog-wide column listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumns {
    pub schema_name: String,
    pub tables: Vec<TableColInfo>,
}

impl SchemaColumns {
    /// Find a table by name.
    pub fn table(&self, table_name: &str) -> Option<&TableColInfo> {
        self.tables.iter().find(|t| t.table_name == table_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub comment: String,
}

/// A table-level catalog row: `(schema, table, comment)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTableRow {
    pub table_schema: String,
    pub table_name: String,
    pub comments: Option<String>,
}

/// A column-level catalog row: `(schema, table, column, type, comment)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumnRow {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub comments: Option<String>,
}

/// Page request and result counters.
///
/// `page_index` is 1-based. `total` and `page_count` are written by the query
/// that consumes the pagination; callers leave them at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: u64,
    pub page_size: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page_count: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_index: u64, page_size: u64) -> Self {
        Self {
            page_index,
            page_size,
            total: 0,
            page_count: 0,
        }
    }

    /// Rows per page, with zero replaced by the default page size.
    pub fn limit(&self) -> u64 {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Number of rows to skip. Page indexes below 1 are treated as the first page.
    pub fn offset(&self) -> u64 {
        self.page_index.saturating_sub(1).saturating_mul(self.limit())
    }

    /// Record the total row count and derive the page count.
    pub fn set_total(&mut self, total: u64) {
        self.total = total;
        self.page_count = total.div_ceil(self.limit());
    }
}
