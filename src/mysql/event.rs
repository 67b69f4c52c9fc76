//! Typed binlog events consumed by the processor
//!
//! The wire-level client decodes binary frames into these shapes; the
//! translation core only ever sees decoded events. Rows are positional
//! tuples of [`ColumnValue`], ordered by column position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A decoded value for one column position within a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date {
        year: i32,
        month: u32,
        day: u32,
    },
    Time {
        negative: bool,
        hours: u32,
        minutes: u32,
        seconds: u32,
        microseconds: u32,
    },
    DateTime {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    },
    /// Seconds plus fractional micros since the Unix epoch (TIMESTAMP).
    Timestamp {
        epoch_secs: i64,
        microseconds: u32,
    },
    Bit(Vec<u8>),
    Bool(bool),
}

/// A positional row tuple.
pub type Row = Vec<ColumnValue>;

/// Bitmap of column positions included in a row event.
///
/// Bit `i` covers the column at 0-based position `i`, packed LSB-first per
/// byte the way the binlog encodes included-column sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBitmap(Vec<u8>);

impl ColumnBitmap {
    /// Bitmap covering all `column_count` columns.
    pub fn all(column_count: usize) -> Self {
        let mut bytes = vec![0xFFu8; column_count.div_ceil(8)];
        let tail = column_count % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last = (1u8 << tail) - 1;
            }
        }
        Self(bytes)
    }

    /// Bitmap with exactly the given 0-based positions set.
    pub fn from_indices(column_count: usize, indices: &[usize]) -> Self {
        let mut bytes = vec![0u8; column_count.div_ceil(8)];
        for &idx in indices {
            if idx < column_count {
                bytes[idx / 8] |= 1 << (idx % 8);
            }
        }
        Self(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn contains(&self, index: usize) -> bool {
        let byte = index / 8;
        byte < self.0.len() && (self.0[byte] & (1 << (index % 8))) != 0
    }

    pub fn count_set(&self) -> usize {
        self.0.iter().map(|b| b.count_ones() as usize).sum()
    }
}

/// Rotation to a new binlog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateEvent {
    pub next_binlog_filename: String,
    /// Starting byte position within the next file; 4 when absent.
    pub position: Option<u64>,
}

/// A statement executed on the server, usually DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEvent {
    pub database: String,
    pub sql: String,
}

/// Binds a numeric table id to a qualified table name for the current file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMapEvent {
    pub table_number: u64,
    pub database: String,
    pub table: String,
    /// Per-column binlog type metadata as carried on the wire; the
    /// processor relies on the catalog instead and only logs this.
    pub column_metadata: Vec<u16>,
}

/// One or more inserted rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRowsEvent {
    pub table_number: u64,
    pub included_columns: ColumnBitmap,
    pub rows: Vec<Row>,
}

/// One or more updated rows as (before, after) image pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRowsEvent {
    pub table_number: u64,
    pub included_columns: ColumnBitmap,
    pub included_columns_before: ColumnBitmap,
    pub rows: Vec<(Row, Row)>,
}

/// One or more deleted rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRowsEvent {
    pub table_number: u64,
    pub included_columns: ColumnBitmap,
    pub rows: Vec<Row>,
}

/// A decoded binlog event, in log order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BinlogEvent {
    Rotate(RotateEvent),
    Query(QueryEvent),
    TableMap(TableMapEvent),
    WriteRows(WriteRowsEvent),
    UpdateRows(UpdateRowsEvent),
    DeleteRows(DeleteRowsEvent),
}

impl BinlogEvent {
    pub fn is_row_event(&self) -> bool {
        matches!(
            self,
            BinlogEvent::WriteRows(_) | BinlogEvent::UpdateRows(_) | BinlogEvent::DeleteRows(_)
        )
    }
}
