//! Emitted records and the sink contract

use crate::common::{CdcError, Result};
use crate::relational::schema::Schema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row-level change record, annotated with enough source metadata for
/// a consumer to resume from the exact point of interruption.
///
/// A delete is emitted as a tombstone: `value` and `value_schema` are both
/// `None` while the key identifies the removed row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Source partition map, e.g. `{"server": "prod"}`.
    pub partition: Value,
    /// Source offset map, e.g. `{"file": "...", "pos": 200, "row": 0}`.
    pub offset: Value,
    pub topic: String,
    /// Optional partition hint routed by the sink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_hint: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Before-image of an update, populated only when the engine is
    /// configured to include it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
}

impl SourceRecord {
    /// Whether this record is a deletion tombstone.
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none() && self.key.is_some()
    }
}

/// Downstream consumer of emitted records.
///
/// The core considers a record delivered once `emit` returns; an error is
/// fatal and propagates to the driver. The sink is invoked synchronously
/// from the single processing task, so backpressure is applied by simply
/// taking time here.
#[async_trait]
pub trait Sink: Send {
    async fn emit(&mut self, record: SourceRecord) -> Result<()>;
}

/// Callback signalled by the driver when a run completes.
pub trait CompletionCallback: Send {
    fn done(&mut self, success: bool, message: &str, error: Option<&CdcError>);
}

/// Collects records in memory, for tests and tooling.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<SourceRecord>,
    fail_next: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn take_records(&mut self) -> Vec<SourceRecord> {
        std::mem::take(&mut self.records)
    }

    /// Make the next emit fail, to exercise fatal sink handling.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn emit(&mut self, record: SourceRecord) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(CdcError::sink("memory sink rejected record"));
        }
        self.records.push(record);
        Ok(())
    }
}
