//! Column model
//!
//! Columns are immutable snapshots described by a plain [`ColumnSpec`]
//! record. The spec carries the same defaults MySQL reports for an
//! unconstrained column: unspecified length and scale (-1), position 1,
//! nullable.

use serde::{Deserialize, Serialize};

/// JDBC-style type codes for the column types the MySQL dialect produces.
///
/// The numeric values follow `java.sql.Types` so persisted schema history
/// stays comparable across implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum JdbcType {
    Bit = -7,
    TinyInt = -6,
    SmallInt = 5,
    Integer = 4,
    BigInt = -5,
    Float = 7,
    Double = 8,
    Decimal = 3,
    Char = 1,
    Varchar = 12,
    LongVarchar = -1,
    Binary = -2,
    VarBinary = -3,
    LongVarBinary = -4,
    Date = 91,
    Time = 92,
    Timestamp = 93,
    Boolean = 16,
    Other = 1111,
}

impl JdbcType {
    /// Resolve a MySQL type name (as written in DDL) to a JDBC type code.
    ///
    /// Unrecognized names map to [`JdbcType::Other`]; the schema builder
    /// treats those as opaque strings.
    pub fn from_type_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "BIT" => JdbcType::Bit,
            "TINYINT" => JdbcType::TinyInt,
            "SMALLINT" => JdbcType::SmallInt,
            // YEAR values range past i16 in the wire encoding.
            "INT" | "INTEGER" | "MEDIUMINT" | "YEAR" => JdbcType::Integer,
            "BIGINT" => JdbcType::BigInt,
            "FLOAT" | "REAL" => JdbcType::Float,
            "DOUBLE" | "DOUBLE PRECISION" => JdbcType::Double,
            "DECIMAL" | "NUMERIC" | "DEC" | "FIXED" => JdbcType::Decimal,
            "CHAR" => JdbcType::Char,
            "VARCHAR" => JdbcType::Varchar,
            "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" | "JSON" => {
                JdbcType::LongVarchar
            }
            "BINARY" => JdbcType::Binary,
            "VARBINARY" => JdbcType::VarBinary,
            "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => JdbcType::LongVarBinary,
            "DATE" => JdbcType::Date,
            "TIME" => JdbcType::Time,
            "DATETIME" | "TIMESTAMP" => JdbcType::Timestamp,
            "BOOLEAN" | "BOOL" => JdbcType::Boolean,
            _ => JdbcType::Other,
        }
    }
}

/// Description of a column, all fields named.
///
/// Build one with struct-update syntax over [`ColumnSpec::default`] and
/// freeze it into a [`Column`] with [`ColumnSpec::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    /// 1-based position within the table; positions are dense.
    pub position: u32,
    pub jdbc_type: JdbcType,
    /// Vendor type name as written in the DDL, uppercased.
    pub type_name: String,
    /// Declared length, -1 when unspecified.
    pub length: i32,
    /// Declared scale, -1 when unspecified.
    pub scale: i32,
    pub optional: bool,
    pub auto_incremented: bool,
    pub generated: bool,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: 1,
            jdbc_type: JdbcType::Integer,
            type_name: String::new(),
            length: -1,
            scale: -1,
            optional: true,
            auto_incremented: false,
            generated: false,
        }
    }
}

impl ColumnSpec {
    /// Freeze this description into an immutable column.
    pub fn create(self) -> Column {
        Column {
            name: self.name,
            position: self.position,
            jdbc_type: self.jdbc_type,
            type_name: self.type_name,
            length: self.length,
            scale: self.scale,
            optional: self.optional,
            auto_incremented: self.auto_incremented,
            generated: self.generated,
        }
    }
}

/// An immutable column within a table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    position: u32,
    jdbc_type: JdbcType,
    type_name: String,
    length: i32,
    scale: i32,
    optional: bool,
    auto_incremented: bool,
    generated: bool,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based position within the owning table.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn jdbc_type(&self) -> JdbcType {
        self.jdbc_type
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared length, -1 when unspecified.
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Declared scale, -1 when unspecified.
    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_auto_incremented(&self) -> bool {
        self.auto_incremented
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Copy this column back into a mutable description.
    pub fn to_spec(&self) -> ColumnSpec {
        ColumnSpec {
            name: self.name.clone(),
            position: self.position,
            jdbc_type: self.jdbc_type,
            type_name: self.type_name.clone(),
            length: self.length,
            scale: self.scale,
            optional: self.optional,
            auto_incremented: self.auto_incremented,
            generated: self.generated,
        }
    }
}
