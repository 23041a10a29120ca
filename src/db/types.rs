//! Row decoding into JSON.
//!
//! MySQL and PostgreSQL values are decoded in two steps: the column's type name
//! is mapped to a [`TypeCategory`], then a per-driver decoder reads the value
//! as the matching Rust type. SQL Server rows come from tiberius'
//! `ColumnData`, which already carries the value's type.

use crate::models::{DbType, Row};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::{Column, Decode, Row as _, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// What a column's type name decodes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    Unknown,
}

/// Category of `type_name` as reported by a `db_type` driver.
pub fn categorize_type(type_name: &str, db: DbType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Before float: "numeric" would match there too
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    // Temporal types
    if lower == "timestamptz" {
        return TypeCategory::TimestampTz;
    }
    if lower == "timestamp" {
        // MySQL TIMESTAMP is stored in UTC
        return if db == DbType::MySql {
            TypeCategory::TimestampTz
        } else {
            TypeCategory::Timestamp
        };
    }
    if lower == "datetime" {
        return TypeCategory::Timestamp;
    }
    if lower == "date" {
        return TypeCategory::Date;
    }
    if lower == "time" {
        return TypeCategory::Time;
    }

    if is_integer_name(&lower) {
        return TypeCategory::Integer;
    }

    // Boolean
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    // Float types
    if lower.contains("float")
        || lower.contains("double")
        || lower == "real"
        || lower == "float4"
        || lower == "float8"
    {
        return TypeCategory::Float;
    }

    // JSON types
    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    // UUID (PostgreSQL)
    if lower == "uuid" {
        return TypeCategory::Uuid;
    }

    // Binary types
    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    if lower.contains("char") || lower.contains("text") || lower == "name" {
        return TypeCategory::Text;
    }

    TypeCategory::Unknown
}

/// Exact integer type names. Substring matching would catch `interval` and `point`.
fn is_integer_name(lower: &str) -> bool {
    let base = lower.strip_suffix(" unsigned").unwrap_or(lower);
    matches!(
        base,
        "tinyint"
            | "smallint"
            | "mediumint"
            | "int"
            | "integer"
            | "bigint"
            | "int2"
            | "int4"
            | "int8"
            | "smallserial"
            | "serial"
            | "bigserial"
    )
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// DECIMAL/NUMERIC read as the server's text, with no float rounding.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Shared Value Encoding
// =============================================================================

/// Encode binary data as a base64 JSON string.
pub fn binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    JsonValue::String(STANDARD.encode(bytes))
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn naive_datetime_value(v: NaiveDateTime) -> JsonValue {
    JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

fn date_value(v: NaiveDate) -> JsonValue {
    JsonValue::String(v.format("%Y-%m-%d").to_string())
}

fn time_value(v: NaiveTime) -> JsonValue {
    JsonValue::String(v.format("%H:%M:%S%.f").to_string())
}

fn opt<T>(value: Option<T>, f: impl FnOnce(T) -> JsonValue) -> JsonValue {
    value.map(f).unwrap_or(JsonValue::Null)
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Driver rows that can be turned into a [`Row`].
pub trait RowToJson {
    fn to_json_map(&self) -> Row;
}

impl RowToJson for MySqlRow {
    fn to_json_map(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DbType::MySql);
                let value = mysql::decode_column(self, idx, type_name, category);
                (col.name().to_string(), value)
            })
            .collect()
    }
}

impl RowToJson for PgRow {
    fn to_json_map(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DbType::Postgres);
                let value = postgres::decode_column(self, idx, category);
                (col.name().to_string(), value)
            })
            .collect()
    }
}

/// Convert a SQL Server row. Consumes the row because tiberius hands out
/// owned column values.
pub fn mssql_row_to_json(row: tiberius::Row) -> Row {
    let names: Vec<String> = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    names
        .into_iter()
        .zip(row)
        .map(|(name, data)| (name, mssql::column_data_to_json(data)))
        .collect()
}

// =============================================================================
// Per-driver decoders
// =============================================================================

mod mysql {
    use super::*;

    pub fn decode_column(
        row: &MySqlRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match category {
            TypeCategory::Decimal => decode_decimal(row, idx),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => decode_binary(row, idx),
            TypeCategory::Json => decode_json(row, idx),
            TypeCategory::TimestampTz => {
                opt(row.try_get::<Option<DateTime<Utc>>, _>(idx).ok().flatten(), |v| {
                    JsonValue::String(v.to_rfc3339())
                })
            }
            TypeCategory::Timestamp => opt(
                row.try_get::<Option<NaiveDateTime>, _>(idx).ok().flatten(),
                naive_datetime_value,
            ),
            TypeCategory::Date => opt(
                row.try_get::<Option<NaiveDate>, _>(idx).ok().flatten(),
                date_value,
            ),
            TypeCategory::Time => opt(
                row.try_get::<Option<NaiveTime>, _>(idx).ok().flatten(),
                time_value,
            ),
            _ => decode_text(row, idx, type_name),
        }
    }

    fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<RawDecimal>, _>(idx) {
            Ok(Some(v)) => JsonValue::String(v.0),
            Ok(None) => JsonValue::Null,
            Err(e) => {
                tracing::error!("Failed to decode DECIMAL: {:?}", e);
                JsonValue::Null
            }
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
        // Check NULL first
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Null;
        }
        // Try signed types
        if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        // Try unsigned types
        if let Ok(Some(v)) = row.try_get::<Option<u8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        JsonValue::Null
    }

    fn decode_boolean(row: &MySqlRow, idx: usize) -> JsonValue {
        opt(row.try_get::<Option<bool>, _>(idx).ok().flatten(), JsonValue::Bool)
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return float_value(v as f64);
        }
        JsonValue::Null
    }

    fn decode_binary(row: &MySqlRow, idx: usize) -> JsonValue {
        opt(row.try_get::<Option<Vec<u8>>, _>(idx).ok().flatten(), |v| {
            binary_value(&v)
        })
    }

    fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<Option<serde_json::Value>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null)
    }

    /// MySQL may return VARBINARY instead of VARCHAR depending on charset
    /// configuration, so fall back to UTF-8 bytes.
    fn decode_text(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
            if type_name.to_lowercase().contains("json") {
                if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                    return json;
                }
            }
            return JsonValue::String(v);
        }
        if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
            return match String::from_utf8(bytes) {
                Ok(s) => JsonValue::String(s),
                Err(e) => binary_value(e.as_bytes()),
            };
        }
        JsonValue::Null
    }
}

mod postgres {
    use super::*;
    use sqlx::ValueRef;
    use sqlx::postgres::PgValueFormat;
    use sqlx::types::Uuid;

    pub fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
        match category {
            TypeCategory::Decimal => decode_decimal(row, idx),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => {
                opt(row.try_get::<Option<bool>, _>(idx).ok().flatten(), JsonValue::Bool)
            }
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => opt(
                row.try_get::<Option<Vec<u8>>, _>(idx).ok().flatten(),
                |v| binary_value(&v),
            ),
            TypeCategory::Json => row
                .try_get::<Option<serde_json::Value>, _>(idx)
                .ok()
                .flatten()
                .unwrap_or(JsonValue::Null),
            TypeCategory::Uuid => opt(row.try_get::<Option<Uuid>, _>(idx).ok().flatten(), |v| {
                JsonValue::String(v.to_string())
            }),
            TypeCategory::TimestampTz => opt(
                row.try_get::<Option<DateTime<Utc>>, _>(idx).ok().flatten(),
                |v| JsonValue::String(v.to_rfc3339()),
            ),
            TypeCategory::Timestamp => opt(
                row.try_get::<Option<NaiveDateTime>, _>(idx).ok().flatten(),
                naive_datetime_value,
            ),
            TypeCategory::Date => opt(
                row.try_get::<Option<NaiveDate>, _>(idx).ok().flatten(),
                date_value,
            ),
            TypeCategory::Time => opt(
                row.try_get::<Option<NaiveTime>, _>(idx).ok().flatten(),
                time_value,
            ),
            TypeCategory::Text => opt(
                row.try_get::<Option<String>, _>(idx).ok().flatten(),
                JsonValue::String,
            ),
            TypeCategory::Unknown => decode_raw_text(row, idx),
        }
    }

    /// Types with no JSON mapping keep the server's text form. Rows fetched
    /// with bind parameters come back in binary format and may not have one.
    fn decode_raw_text(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
            return opt(v, JsonValue::String);
        }
        let raw: PgValueRef<'_> = match row.try_get_raw(idx) {
            Ok(raw) => raw,
            Err(_) => return JsonValue::Null,
        };
        if raw.is_null() {
            return JsonValue::Null;
        }
        if raw.format() == PgValueFormat::Text {
            if let Ok(text) = raw.as_str() {
                return JsonValue::String(text.to_string());
            }
        }
        tracing::debug!(
            "No text form for PostgreSQL type {}",
            raw.type_info().name()
        );
        JsonValue::Null
    }

    fn decode_decimal(row: &PgRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<RawDecimal>, _>(idx) {
            Ok(Some(v)) => JsonValue::String(v.0),
            Ok(None) => JsonValue::Null,
            Err(e) => {
                tracing::error!("Failed to decode NUMERIC: {:?}", e);
                JsonValue::Null
            }
        }
    }

    fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Null;
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        JsonValue::Null
    }

    fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return float_value(v as f64);
        }
        JsonValue::Null
    }
}

mod mssql {
    use super::*;
    use tiberius::{ColumnData, FromSql};

    pub fn column_data_to_json(data: ColumnData<'static>) -> JsonValue {
        match data {
            ColumnData::U8(v) => opt(v, |v| JsonValue::Number(v.into())),
            ColumnData::I16(v) => opt(v, |v| JsonValue::Number(v.into())),
            ColumnData::I32(v) => opt(v, |v| JsonValue::Number(v.into())),
            ColumnData::I64(v) => opt(v, |v| JsonValue::Number(v.into())),
            ColumnData::F32(v) => opt(v, |v| float_value(v as f64)),
            ColumnData::F64(v) => opt(v, float_value),
            ColumnData::Bit(v) => opt(v, JsonValue::Bool),
            ColumnData::String(v) => opt(v, |s| JsonValue::String(s.into_owned())),
            ColumnData::Guid(v) => opt(v, |g| JsonValue::String(g.to_string())),
            ColumnData::Binary(v) => opt(v, |b| binary_value(&b)),
            ColumnData::Numeric(v) => opt(v, |n| JsonValue::String(n.to_string())),
            other => decode_temporal(&other),
        }
    }

    fn decode_temporal(data: &ColumnData<'static>) -> JsonValue {
        if let Ok(Some(v)) = DateTime::<FixedOffset>::from_sql(data) {
            return JsonValue::String(v.to_rfc3339());
        }
        if let Ok(Some(v)) = NaiveDateTime::from_sql(data) {
            return naive_datetime_value(v);
        }
        if let Ok(Some(v)) = NaiveDate::from_sql(data) {
            return date_value(v);
        }
        if let Ok(Some(v)) = NaiveTime::from_sql(data) {
            return time_value(v);
        }
        tracing::debug!(data = ?data, "Unsupported SQL Server value, returning null");
        JsonValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(
            categorize_type("INT", DbType::MySql),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("BIGINT", DbType::Postgres),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("TINYINT", DbType::MySql),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INT8", DbType::Postgres),
            TypeCategory::Integer
        );
    }

    #[test]
    fn test_categorize_type_integer_names_are_exact() {
        assert_eq!(
            categorize_type("INT UNSIGNED", DbType::MySql),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("MEDIUMINT", DbType::MySql),
            TypeCategory::Integer
        );
        assert_eq!(categorize_type("INT2", DbType::Postgres), TypeCategory::Integer);
        assert_eq!(
            categorize_type("bigserial", DbType::Postgres),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INTERVAL", DbType::Postgres),
            TypeCategory::Unknown
        );
        assert_eq!(categorize_type("POINT", DbType::Postgres), TypeCategory::Unknown);
        assert_eq!(
            categorize_type("INT4RANGE", DbType::Postgres),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(
            categorize_type("DECIMAL", DbType::MySql),
            TypeCategory::Decimal
        );
        assert_eq!(
            categorize_type("NUMERIC", DbType::Postgres),
            TypeCategory::Decimal
        );
    }

    #[test]
    fn test_categorize_type_temporal() {
        assert_eq!(
            categorize_type("TIMESTAMPTZ", DbType::Postgres),
            TypeCategory::TimestampTz
        );
        assert_eq!(
            categorize_type("TIMESTAMP", DbType::Postgres),
            TypeCategory::Timestamp
        );
        assert_eq!(
            categorize_type("TIMESTAMP", DbType::MySql),
            TypeCategory::TimestampTz
        );
        assert_eq!(
            categorize_type("DATETIME", DbType::MySql),
            TypeCategory::Timestamp
        );
        assert_eq!(categorize_type("DATE", DbType::Postgres), TypeCategory::Date);
        assert_eq!(categorize_type("TIME", DbType::MySql), TypeCategory::Time);
    }

    #[test]
    fn test_categorize_type_text() {
        assert_eq!(categorize_type("NAME", DbType::Postgres), TypeCategory::Text);
        assert_eq!(
            categorize_type("VARCHAR", DbType::MySql),
            TypeCategory::Text
        );
        assert_eq!(
            categorize_type("jsonb", DbType::Postgres),
            TypeCategory::Json
        );
        assert_eq!(
            categorize_type("VARBINARY", DbType::MySql),
            TypeCategory::Binary
        );
    }

    #[test]
    fn test_binary_value() {
        assert_eq!(
            binary_value(b"hello world"),
            JsonValue::String("aGVsbG8gd29ybGQ=".to_string())
        );
        assert_eq!(binary_value(&[]), JsonValue::String(String::new()));
    }

    #[test]
    fn test_mssql_column_data() {
        use std::borrow::Cow;
        use tiberius::ColumnData;

        assert_eq!(
            mssql::column_data_to_json(ColumnData::I32(Some(7))),
            JsonValue::from(7)
        );
        assert_eq!(
            mssql::column_data_to_json(ColumnData::String(Some(Cow::Borrowed("dbo")))),
            JsonValue::from("dbo")
        );
        assert_eq!(
            mssql::column_data_to_json(ColumnData::Bit(None)),
            JsonValue::Null
        );
        assert_eq!(
            mssql::column_data_to_json(ColumnData::F64(Some(f64::NAN))),
            JsonValue::from("NaN")
        );
    }

    #[test]
    fn test_temporal_formats() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        assert_eq!(naive_datetime_value(dt), JsonValue::from("2024-03-09T08:05:00"));
        assert_eq!(date_value(dt.date()), JsonValue::from("2024-03-09"));
        assert_eq!(time_value(dt.time()), JsonValue::from("08:05:00"));
    }
}
