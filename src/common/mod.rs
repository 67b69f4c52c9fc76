//! Database-agnostic pieces of the CDC core: errors, emitted records,
//! schema history, table filtering, and topic selection.

mod error;
pub mod filter;
pub mod history;
pub mod record;
pub mod topic;

pub use error::{CdcError, Result};
pub use filter::TableFilter;
pub use history::{FileSchemaHistory, HistoryRecord, MemorySchemaHistory, SchemaHistory};
pub use record::{CompletionCallback, MemorySink, Sink, SourceRecord};
pub use topic::{DefaultTopicSelector, TopicSelector};
