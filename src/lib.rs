//! # binrow - MySQL binlog change-data-capture core
//!
//! Tails a MySQL server's binary log (through an external decoder) and
//! emits a totally ordered stream of row-level change records, each
//! annotated with enough source metadata for a consumer to resume from
//! the exact point of interruption.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐      ┌────────────────────────────────────┐
//! │ binlog      │      │           EventProcessor           │
//! │ reader      │─────▶│  ┌────────┐ ┌───────┐ ┌─────────┐  │
//! │ (external)  │ typed│  │ DDL    │ │ Tables│ │Converter│  │
//! └─────────────┘ event│  │ parser │▶│catalog│▶│ cache   │  │
//!                      │  └────────┘ └───────┘ └─────────┘  │
//!                      └──────┬──────────────────────┬──────┘
//!                             │ durable DDL          │ SourceRecord
//!                             ▼                      ▼
//!                      ┌─────────────┐        ┌───────────┐
//!                      │SchemaHistory│        │   Sink    │
//!                      └─────────────┘        └───────────┘
//! ```
//!
//! The processor is single-writer: one driver task owns the catalog, the
//! converter cache, the DDL parser and the source position. Schema
//! history is written durably before records are emitted, so replaying
//! it on restart always reconstructs a catalog at least as new as the
//! last emitted offset. Delivery is at-least-once.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use binrow::common::{MemorySchemaHistory, MemorySink, DefaultTopicSelector};
//! use binrow::mysql::{CdcConfig, EventProcessor};
//! use std::sync::Arc;
//!
//! # async fn example() -> binrow::common::Result<()> {
//! let mut processor = EventProcessor::new(
//!     CdcConfig::new("production"),
//!     Arc::new(MemorySchemaHistory::new()),
//!     Arc::new(DefaultTopicSelector::new()),
//!     MemorySink::new(),
//! )?;
//! processor.load_history().await?;
//! // for each decoded event: processor.handle_event(event).await?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod mysql;
pub mod relational;

pub use common::{CdcError, Result, SourceRecord};
pub use mysql::{BinlogEvent, CdcConfig, EventProcessor};
pub use relational::{Table, TableId, Tables};
