//! Source position tracking
//!
//! Tracks how far into the server's binary log the processor has read.
//! The *partition* identifies the logical server whose log is consumed:
//!
//! ```json
//! { "server": "production" }
//! ```
//!
//! The *offset* identifies the resumption point within that log:
//!
//! ```json
//! { "file": "mysql-bin.000003", "pos": 105586, "row": 0 }
//! ```
//!
//! `row` is the 0-based index within a multi-row event. Offsets are
//! flushed by the runner on a timer, so a crash between emit and flush can
//! replay rows: the delivery contract is at-least-once.

use crate::common::{CdcError, Result};
use serde_json::{json, Value};

pub const SERVER_PARTITION_KEY: &str = "server";
pub const BINLOG_FILENAME_OFFSET_KEY: &str = "file";
pub const BINLOG_POSITION_OFFSET_KEY: &str = "pos";
pub const BINLOG_ROW_OFFSET_KEY: &str = "row";

/// Position within the source binary log. Owned and mutated only by the
/// event processor.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    server_name: String,
    binlog_filename: Option<String>,
    binlog_position: u64,
    event_row: u32,
}

impl SourceInfo {
    /// Create a tracker for the given logical server name.
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            binlog_filename: None,
            // Byte 4 is the first event in a binlog file, after the magic.
            binlog_position: 4,
            event_row: 0,
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn binlog_filename(&self) -> Option<&str> {
        self.binlog_filename.as_deref()
    }

    pub fn binlog_position(&self) -> u64 {
        self.binlog_position
    }

    /// 0-based row index within the current event.
    pub fn event_row(&self) -> u32 {
        self.event_row
    }

    pub fn set_binlog_filename(&mut self, filename: impl Into<String>) {
        self.binlog_filename = Some(filename.into());
    }

    pub fn set_binlog_position(&mut self, position: u64) {
        self.binlog_position = position;
    }

    pub fn set_row_in_event(&mut self, row: u32) {
        self.event_row = row;
    }

    /// The source partition map identifying the server.
    pub fn partition(&self) -> Value {
        json!({ "server": self.server_name })
    }

    /// The current offset map.
    pub fn offset(&self) -> Value {
        json!({
            "file": self.binlog_filename,
            "pos": self.binlog_position,
            "row": self.event_row,
        })
    }

    /// Set the row index, then return the offset map.
    pub fn offset_for_row(&mut self, row: u32) -> Value {
        self.set_row_in_event(row);
        self.offset()
    }

    /// Restore a previously persisted offset.
    ///
    /// Tolerates `pos`/`row` encoded as JSON numbers or as decimal
    /// strings, and a missing `row` (defaults to 0). A missing or
    /// non-string `file` is fatal.
    pub fn set_offset(&mut self, offset: &Value) -> Result<()> {
        let file = offset
            .get(BINLOG_FILENAME_OFFSET_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CdcError::offset(format!(
                    "source offset '{}' parameter is missing",
                    BINLOG_FILENAME_OFFSET_KEY
                ))
            })?;
        self.binlog_filename = Some(file.to_string());
        self.binlog_position = long_offset_value(offset, BINLOG_POSITION_OFFSET_KEY)?;
        self.event_row = long_offset_value(offset, BINLOG_ROW_OFFSET_KEY)? as u32;
        Ok(())
    }
}

/// Decode an integer offset field, accepting numbers and decimal strings.
/// A missing field decodes to 0.
fn long_offset_value(offset: &Value, key: &str) -> Result<u64> {
    match offset.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
            CdcError::offset(format!("source offset '{}' value {} is out of range", key, n))
        }),
        Some(Value::String(s)) => s.parse::<u64>().map_err(|_| {
            CdcError::offset(format!(
                "source offset '{}' value {:?} could not be converted to an integer",
                key, s
            ))
        }),
        Some(other) => Err(CdcError::offset(format!(
            "source offset '{}' value {} has the wrong type",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition() {
        let source = SourceInfo::new("prod");
        assert_eq!(source.partition(), json!({"server": "prod"}));
    }

    #[test]
    fn test_offset_defaults() {
        let source = SourceInfo::new("prod");
        let offset = source.offset();
        assert_eq!(offset["pos"], 4);
        assert_eq!(offset["row"], 0);
        assert!(offset["file"].is_null());
    }

    #[test]
    fn test_offset_for_row() {
        let mut source = SourceInfo::new("prod");
        source.set_binlog_filename("mysql-bin.000003");
        source.set_binlog_position(105_586);

        let offset = source.offset_for_row(2);
        assert_eq!(offset["file"], "mysql-bin.000003");
        assert_eq!(offset["pos"], 105_586);
        assert_eq!(offset["row"], 2);
        assert_eq!(source.event_row(), 2);
    }

    #[test]
    fn test_offset_round_trip() {
        let mut source = SourceInfo::new("prod");
        source.set_binlog_filename("mysql-bin.000007");
        source.set_binlog_position(42);
        let offset = source.offset_for_row(3);

        let mut restored = SourceInfo::new("prod");
        restored.set_offset(&offset).unwrap();
        assert_eq!(restored.offset(), offset);
    }

    #[test]
    fn test_set_offset_tolerates_strings() {
        let mut source = SourceInfo::new("prod");
        source
            .set_offset(&json!({"file": "mysql-bin.000001", "pos": "204", "row": "1"}))
            .unwrap();
        assert_eq!(source.binlog_position(), 204);
        assert_eq!(source.event_row(), 1);
    }

    #[test]
    fn test_set_offset_missing_row_defaults() {
        let mut source = SourceInfo::new("prod");
        source
            .set_offset(&json!({"file": "mysql-bin.000001", "pos": 204}))
            .unwrap();
        assert_eq!(source.event_row(), 0);
    }

    #[test]
    fn test_set_offset_missing_file_is_fatal() {
        let mut source = SourceInfo::new("prod");
        let err = source.set_offset(&json!({"pos": 204})).unwrap_err();
        assert!(matches!(err, CdcError::Offset(_)));
    }

    #[test]
    fn test_set_offset_bad_number() {
        let mut source = SourceInfo::new("prod");
        let err = source
            .set_offset(&json!({"file": "f", "pos": "not-a-number"}))
            .unwrap_err();
        assert!(matches!(err, CdcError::Offset(_)));
    }
}
