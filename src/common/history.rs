//! Durable schema history
//!
//! Every DDL statement observed on the stream is appended here together
//! with the position it was seen at. Replaying the records through the
//! DDL parser reconstructs the catalog on restart, so a successful
//! `record` must be durable before the corresponding records are emitted.

use crate::common::{CdcError, Result};
use crate::relational::catalog::Tables;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// One appended history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub partition: Value,
    pub offset: Value,
    #[serde(rename = "databaseName")]
    pub database_name: String,
    pub ddl: String,
}

/// Append-only, replayable log of schema-changing statements.
///
/// `record` receives the catalog as built after the statement so that
/// implementations may snapshot periodically and truncate older records;
/// neither shipped store uses it.
#[async_trait]
pub trait SchemaHistory: Send + Sync {
    async fn record(
        &self,
        partition: &Value,
        offset: &Value,
        database: &str,
        tables: &Tables,
        ddl: &str,
    ) -> Result<()>;

    /// Deliver every record, in the exact order it was appended.
    async fn replay(&self, consumer: &mut (dyn FnMut(HistoryRecord) + Send)) -> Result<()>;
}

/// File-backed history: one JSON document per line, fsynced per append.
pub struct FileSchemaHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSchemaHistory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SchemaHistory for FileSchemaHistory {
    async fn record(
        &self,
        partition: &Value,
        offset: &Value,
        database: &str,
        _tables: &Tables,
        ddl: &str,
    ) -> Result<()> {
        let entry = HistoryRecord {
            partition: partition.clone(),
            offset: offset.clone(),
            database_name: database.to_string(),
            ddl: ddl.to_string(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| CdcError::history(format!("cannot open {}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| CdcError::history(format!("append failed: {}", e)))?;
        // Durable before the caller may emit downstream.
        file.sync_all()
            .await
            .map_err(|e| CdcError::history(format!("fsync failed: {}", e)))?;

        debug!(database, %ddl, "recorded schema history entry");
        Ok(())
    }

    async fn replay(&self, consumer: &mut (dyn FnMut(HistoryRecord) + Send)) -> Result<()> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no schema history to replay");
                return Ok(());
            }
            Err(e) => {
                return Err(CdcError::history(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut replayed = 0usize;
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: HistoryRecord = serde_json::from_str(line)
                .map_err(|e| CdcError::history(format!("corrupt history line: {}", e)))?;
            consumer(entry);
            replayed += 1;
        }
        info!(replayed, path = %self.path.display(), "replayed schema history");
        Ok(())
    }
}

/// In-memory history, for tests and ephemeral engines.
#[derive(Debug, Default)]
pub struct MemorySchemaHistory {
    records: Mutex<Vec<HistoryRecord>>,
}

impl MemorySchemaHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl SchemaHistory for MemorySchemaHistory {
    async fn record(
        &self,
        partition: &Value,
        offset: &Value,
        database: &str,
        _tables: &Tables,
        ddl: &str,
    ) -> Result<()> {
        self.records.lock().await.push(HistoryRecord {
            partition: partition.clone(),
            offset: offset.clone(),
            database_name: database.to_string(),
            ddl: ddl.to_string(),
        });
        Ok(())
    }

    async fn replay(&self, consumer: &mut (dyn FnMut(HistoryRecord) + Send)) -> Result<()> {
        for entry in self.records.lock().await.iter() {
            consumer(entry.clone());
        }
        Ok(())
    }
}
