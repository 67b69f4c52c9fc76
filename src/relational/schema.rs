//! Derived table schemas and row translation
//!
//! A [`TableSchema`] is derived from a [`Table`] and is a pure function of
//! it: the key schema projects the primary-key columns in key order, the
//! value schema covers all columns in position order. The extractors turn
//! positional row tuples into JSON objects matching those schemas.
//!
//! The type mapping is externally observable and must stay stable:
//!
//! | MySQL | field type |
//! |---|---|
//! | TINYINT | int8 |
//! | SMALLINT | int16 |
//! | INT / MEDIUMINT / YEAR | int32 |
//! | BIGINT | int64 |
//! | FLOAT | float32 |
//! | DOUBLE | float64 |
//! | DECIMAL / NUMERIC | decimal(precision, scale) |
//! | CHAR / VARCHAR / TEXT | string |
//! | BINARY / VARBINARY / BLOB | bytes |
//! | DATE | int32 days since epoch |
//! | TIME | int64 microseconds |
//! | DATETIME / TIMESTAMP | int64 microseconds since epoch |
//! | BIT | bytes |
//! | BOOLEAN | bool |

use crate::mysql::event::{ColumnBitmap, ColumnValue};
use crate::relational::column::{Column, JdbcType};
use crate::relational::table::{Table, TableId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Logical field types for emitted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum FieldType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal { precision: u32, scale: u32 },
    String,
    Bytes,
    /// Days since the Unix epoch, int32.
    Date,
    /// Microseconds past midnight, int64; negative for negative TIME.
    TimeMicros,
    /// Microseconds since the Unix epoch, int64.
    TimestampMicros,
    Boolean,
    Struct,
}

/// One named field within a struct schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// 0-based index of the source column within the row tuple.
    pub index: usize,
    pub schema: Schema,
}

/// A field or record schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub field_type: FieldType,
    pub optional: bool,
    /// Present only for struct schemas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(field_type: FieldType, optional: bool) -> Self {
        Self {
            field_type,
            optional,
            fields: Vec::new(),
        }
    }

    pub fn structure(fields: Vec<Field>) -> Self {
        Self {
            field_type: FieldType::Struct,
            optional: false,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Map a column's JDBC type to the logical field type.
pub fn field_type_for(column: &Column) -> FieldType {
    match column.jdbc_type() {
        JdbcType::TinyInt => FieldType::Int8,
        JdbcType::SmallInt => FieldType::Int16,
        JdbcType::Integer => FieldType::Int32,
        JdbcType::BigInt => FieldType::Int64,
        JdbcType::Float => FieldType::Float32,
        JdbcType::Double => FieldType::Float64,
        JdbcType::Decimal => FieldType::Decimal {
            precision: column.length().max(1) as u32,
            scale: column.scale().max(0) as u32,
        },
        JdbcType::Char | JdbcType::Varchar | JdbcType::LongVarchar => FieldType::String,
        JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Bit => {
            FieldType::Bytes
        }
        JdbcType::Date => FieldType::Date,
        JdbcType::Time => FieldType::TimeMicros,
        JdbcType::Timestamp => FieldType::TimestampMicros,
        JdbcType::Boolean => FieldType::Boolean,
        JdbcType::Other => FieldType::String,
    }
}

/// Convert one decoded column value to its JSON form for the given field
/// type. Mismatched combinations degrade to null rather than failing the
/// row.
pub fn convert_value(field_type: &FieldType, value: &ColumnValue) -> Value {
    match (field_type, value) {
        (_, ColumnValue::Null) => Value::Null,

        (
            FieldType::Int8 | FieldType::Int16 | FieldType::Int32 | FieldType::Int64,
            ColumnValue::Int(v),
        ) => json!(v),
        (
            FieldType::Int8 | FieldType::Int16 | FieldType::Int32 | FieldType::Int64,
            ColumnValue::UInt(v),
        ) => json!(v),
        (FieldType::Int8 | FieldType::Int16, ColumnValue::Bool(b)) => json!(*b as i64),

        (FieldType::Float32, ColumnValue::Float(v)) => json!(v),
        (FieldType::Float64, ColumnValue::Double(v)) => json!(v),
        (FieldType::Float64, ColumnValue::Float(v)) => json!(*v as f64),

        // Decimals travel as strings so precision survives JSON.
        (FieldType::Decimal { .. }, ColumnValue::Decimal(d)) => json!(d.to_string()),
        (FieldType::Decimal { .. }, ColumnValue::Int(v)) => json!(v.to_string()),

        (FieldType::String, ColumnValue::String(s)) => json!(s),
        (FieldType::String, ColumnValue::Bytes(b)) => {
            json!(String::from_utf8_lossy(b).into_owned())
        }

        (FieldType::Bytes, ColumnValue::Bytes(b)) => json!(b),
        (FieldType::Bytes, ColumnValue::Bit(b)) => json!(b),
        (FieldType::Bytes, ColumnValue::String(s)) => json!(s.as_bytes()),

        (FieldType::Date, ColumnValue::Date { year, month, day }) => {
            // 719163 = days from 0001-01-01 (CE) to 1970-01-01.
            match NaiveDate::from_ymd_opt(*year, *month, *day) {
                Some(date) => json!(i64::from(date.num_days_from_ce()) - 719_163),
                None => Value::Null,
            }
        }

        (
            FieldType::TimeMicros,
            ColumnValue::Time {
                negative,
                hours,
                minutes,
                seconds,
                microseconds,
            },
        ) => {
            let total = (*hours as i64 * 3600 + *minutes as i64 * 60 + *seconds as i64)
                * 1_000_000
                + *microseconds as i64;
            json!(if *negative { -total } else { total })
        }

        (
            FieldType::TimestampMicros,
            ColumnValue::DateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
                microsecond,
            },
        ) => NaiveDate::from_ymd_opt(*year, *month, *day)
            .and_then(|d| d.and_hms_micro_opt(*hour, *minute, *second, *microsecond))
            .map(|dt| json!(dt.and_utc().timestamp_micros()))
            .unwrap_or(Value::Null),
        (
            FieldType::TimestampMicros,
            ColumnValue::Timestamp {
                epoch_secs,
                microseconds,
            },
        ) => json!(epoch_secs * 1_000_000 + *microseconds as i64),

        (FieldType::Boolean, ColumnValue::Bool(b)) => json!(b),
        (FieldType::Boolean, ColumnValue::Int(v)) => json!(*v != 0),

        _ => Value::Null,
    }
}

/// Derived description used to translate row tuples into keyed records.
///
/// Referentially transparent given its table: rebuilding from the same
/// table yields an equal schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    table_id: TableId,
    key_schema: Option<Schema>,
    value_schema: Schema,
}

impl TableSchema {
    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    /// Absent when the table has no primary key.
    pub fn key_schema(&self) -> Option<&Schema> {
        self.key_schema.as_ref()
    }

    pub fn value_schema(&self) -> &Schema {
        &self.value_schema
    }

    /// Project the primary-key columns of a row into the key object, in
    /// key order. Returns `None` for tables without a primary key.
    pub fn key_from_row(&self, row: &[ColumnValue]) -> Option<Value> {
        let key_schema = self.key_schema.as_ref()?;
        let mut out = Map::with_capacity(key_schema.fields.len());
        for field in &key_schema.fields {
            let value = row
                .get(field.index)
                .map(|v| convert_value(&field.schema.field_type, v))
                .unwrap_or(Value::Null);
            out.insert(field.name.clone(), value);
        }
        Some(Value::Object(out))
    }

    /// Build the value object for a row. Columns excluded by the event's
    /// bitmap are absent from the result.
    pub fn value_from_row(&self, row: &[ColumnValue], included: &ColumnBitmap) -> Value {
        let mut out = Map::with_capacity(self.value_schema.fields.len());
        for field in &self.value_schema.fields {
            if !included.contains(field.index) {
                continue;
            }
            let value = row
                .get(field.index)
                .map(|v| convert_value(&field.schema.field_type, v))
                .unwrap_or(Value::Null);
            out.insert(field.name.clone(), value);
        }
        Value::Object(out)
    }
}

/// Builds [`TableSchema`] instances from table definitions.
#[derive(Debug, Default)]
pub struct TableSchemaBuilder;

impl TableSchemaBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Derive the key and value schemas for a table.
    pub fn create(&self, table: &Table) -> TableSchema {
        let value_fields = table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, column)| Field {
                name: column.name().to_string(),
                index,
                schema: Schema::new(field_type_for(column), column.is_optional()),
            })
            .collect();

        let key_schema = if table.has_primary_key() {
            let fields = table
                .pk_column_names()
                .iter()
                .filter_map(|pk| {
                    let index = table.column_index(pk)?;
                    let column = &table.columns()[index];
                    Some(Field {
                        name: column.name().to_string(),
                        index,
                        // A key field is never optional.
                        schema: Schema::new(field_type_for(column), false),
                    })
                })
                .collect();
            Some(Schema::structure(fields))
        } else {
            None
        };

        TableSchema {
            table_id: table.id().clone(),
            key_schema,
            value_schema: Schema::structure(value_fields),
        }
    }
}
