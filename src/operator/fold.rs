//! Folding of flat catalog rows into the schema → table → column tree.
//!
//! Catalog queries return one row per table (or per column), already sorted by
//! the dialect. Folding groups rows by first-seen schema, then by first-seen
//! table, preserving arrival order. Repeated (schema, table) pairs in a table
//! listing are kept as separate entries.

use crate::error::{DbError, DbResult};
use crate::models::{
    CatalogColumnRow, CatalogTableRow, ColumnInfo, LogicDbInfo, Row, SchemaColumns, TableColInfo,
    TableInfo, row_str,
};
use std::collections::HashMap;

fn required(row: &Row, column: &str) -> DbResult<String> {
    row_str(row, column).ok_or_else(|| {
        DbError::statement(
            format!("Catalog row has no '{}' column", column),
            None,
            "Check the catalog query aliases",
        )
    })
}

impl CatalogTableRow {
    /// Decode a row aliased `table_schema`, `table_name`, `comments`.
    pub fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            table_schema: required(row, "table_schema")?,
            table_name: required(row, "table_name")?,
            comments: row_str(row, "comments"),
        })
    }
}

impl CatalogColumnRow {
    /// Decode a row aliased `table_schema`, `table_name`, `column_name`,
    /// `data_type`, `comments`.
    pub fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            table_schema: required(row, "table_schema")?,
            table_name: required(row, "table_name")?,
            column_name: required(row, "column_name")?,
            data_type: row_str(row, "data_type").unwrap_or_default(),
            comments: row_str(row, "comments"),
        })
    }
}

/// Decode every row with `decode`, failing on the first bad row.
pub fn decode_rows<T>(rows: &[Row], decode: fn(&Row) -> DbResult<T>) -> DbResult<Vec<T>> {
    rows.iter().map(decode).collect()
}

/// Group table rows by schema.
pub fn fold_tables(
    rows: impl IntoIterator<Item = CatalogTableRow>,
    placeholder: &str,
) -> Vec<LogicDbInfo> {
    let mut schemas: Vec<LogicDbInfo> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let table = TableInfo {
            table_name: row.table_name,
            comment: row.comments.unwrap_or_else(|| placeholder.to_string()),
        };
        match index.get(&row.table_schema) {
            Some(&i) => schemas[i].table_info_list.push(table),
            None => {
                index.insert(row.table_schema.clone(), schemas.len());
                schemas.push(LogicDbInfo {
                    schema_name: row.table_schema,
                    table_info_list: vec![table],
                });
            }
        }
    }
    schemas
}

/// Group column rows by schema, then by table.
pub fn fold_columns(
    rows: impl IntoIterator<Item = CatalogColumnRow>,
    placeholder: &str,
) -> Vec<SchemaColumns> {
    let mut schemas: Vec<SchemaColumns> = Vec::new();
    let mut schema_index: HashMap<String, usize> = HashMap::new();
    // (schema position, table name) -> table position within that schema
    let mut table_index: HashMap<(usize, String), usize> = HashMap::new();

    for row in rows {
        let column = ColumnInfo {
            column_name: row.column_name,
            data_type: row.data_type,
            comment: row.comments.unwrap_or_else(|| placeholder.to_string()),
        };

        let s = match schema_index.get(&row.table_schema) {
            Some(&s) => s,
            None => {
                schema_index.insert(row.table_schema.clone(), schemas.len());
                schemas.push(SchemaColumns {
                    schema_name: row.table_schema,
                    tables: Vec::new(),
                });
                schemas.len() - 1
            }
        };

        let tables = &mut schemas[s].tables;
        match table_index.get(&(s, row.table_name.clone())) {
            Some(&t) => tables[t].column_info_list.push(column),
            None => {
                table_index.insert((s, row.table_name.clone()), tables.len());
                tables.push(TableColInfo {
                    table_name: row.table_name,
                    column_info_list: vec![column],
                });
            }
        }
    }
    schemas
}

/// Group column rows of a single schema by table.
pub fn fold_table_columns(
    rows: impl IntoIterator<Item = CatalogColumnRow>,
    placeholder: &str,
) -> Vec<TableColInfo> {
    let mut tables: Vec<TableColInfo> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let column = ColumnInfo {
            column_name: row.column_name,
            data_type: row.data_type,
            comment: row.comments.unwrap_or_else(|| placeholder.to_string()),
        };
        match index.get(&row.table_name) {
            Some(&t) => tables[t].column_info_list.push(column),
            None => {
                index.insert(row.table_name.clone(), tables.len());
                tables.push(TableColInfo {
                    table_name: row.table_name,
                    column_info_list: vec![column],
                });
            }
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(schema: &str, name: &str) -> CatalogTableRow {
        CatalogTableRow {
            table_schema: schema.to_string(),
            table_name: name.to_string(),
            comments: None,
        }
    }

    fn column(schema: &str, table: &str, name: &str) -> CatalogColumnRow {
        CatalogColumnRow {
            table_schema: schema.to_string(),
            table_name: table.to_string(),
            column_name: name.to_string(),
            data_type: "int4".to_string(),
            comments: Some(format!("{name} comment")),
        }
    }

    #[test]
    fn test_fold_tables_groups_by_first_seen_schema() {
        let folded = fold_tables(
            vec![table("s1", "t1"), table("s1", "t2"), table("s2", "t1")],
            "",
        );
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].schema_name, "s1");
        assert_eq!(folded[0].table_names(), vec!["t1", "t2"]);
        assert_eq!(folded[1].schema_name, "s2");
        assert_eq!(folded[1].table_names(), vec!["t1"]);
    }

    #[test]
    fn test_fold_tables_keeps_interleaved_schemas_together() {
        let folded = fold_tables(
            vec![table("s2", "a"), table("s1", "b"), table("s2", "c")],
            "",
        );
        assert_eq!(folded[0].schema_name, "s2");
        assert_eq!(folded[0].table_names(), vec!["a", "c"]);
        assert_eq!(folded[1].table_names(), vec!["b"]);
    }

    #[test]
    fn test_fold_tables_does_not_deduplicate() {
        let folded = fold_tables(vec![table("s1", "t1"), table("s1", "t1")], "-");
        assert_eq!(folded[0].table_info_list.len(), 2);
        assert_eq!(folded[0].table_info_list[0].comment, "-");
    }

    #[test]
    fn test_fold_columns_three_levels() {
        let folded = fold_columns(
            vec![
                column("s1", "t1", "c1"),
                column("s1", "t1", "c2"),
                column("s1", "t2", "c1"),
            ],
            "",
        );
        assert_eq!(folded.len(), 1);
        let s1 = &folded[0];
        assert_eq!(s1.tables.len(), 2);
        assert_eq!(s1.table("t1").unwrap().column_names(), vec!["c1", "c2"]);
        assert_eq!(s1.table("t2").unwrap().column_names(), vec!["c1"]);
    }

    #[test]
    fn test_fold_columns_same_table_name_in_two_schemas() {
        let folded = fold_columns(
            vec![
                column("s1", "t", "a"),
                column("s2", "t", "b"),
                column("s1", "t", "c"),
            ],
            "",
        );
        assert_eq!(folded[0].table("t").unwrap().column_names(), vec!["a", "c"]);
        assert_eq!(folded[1].table("t").unwrap().column_names(), vec!["b"]);
    }

    #[test]
    fn test_fold_table_columns() {
        let mut rows = vec![
            column("public", "users", "id"),
            column("public", "orders", "id"),
            column("public", "users", "name"),
        ];
        rows[2].comments = None;
        let folded = fold_table_columns(rows, "");
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].column_names(), vec!["id", "name"]);
        assert_eq!(folded[0].column_info_list[1].comment, "");
        assert_eq!(folded[1].table_name, "orders");
    }

    #[test]
    fn test_catalog_row_decoding() {
        let row = json!({"table_schema": "dbo", "table_name": "users", "comments": null})
            .as_object()
            .cloned()
            .unwrap();
        let decoded = CatalogTableRow::from_row(&row).unwrap();
        assert_eq!(decoded, table("dbo", "users"));

        let row = json!({"table_schema": "dbo"}).as_object().cloned().unwrap();
        let err = CatalogTableRow::from_row(&row).unwrap_err();
        assert!(err.to_string().contains("table_name"));
    }

    #[test]
    fn test_decode_rows() {
        let rows: Vec<Row> = vec![
            json!({"table_schema": "s", "table_name": "t", "column_name": "c", "data_type": "int"})
                .as_object()
                .cloned()
                .unwrap(),
        ];
        let decoded = decode_rows(&rows, CatalogColumnRow::from_row).unwrap();
        assert_eq!(decoded[0].column_name, "c");
        assert_eq!(decoded[0].comments, None);
    }
}
