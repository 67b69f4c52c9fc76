//! Error types for the CDC translation core
//!
//! The policy split is deliberate: anything that endangers the correctness
//! of the emitted stream is fatal (offset decode, history writes, sink
//! failures), while anything scoped to a single statement or row is logged
//! and skipped so the stream keeps flowing.

use thiserror::Error;

/// CDC-specific errors
#[derive(Error, Debug)]
pub enum CdcError {
    /// DDL statement could not be parsed. Recoverable: the statement is
    /// skipped and the catalog is left untouched.
    #[error("DDL parse error: {0}")]
    Parse(String),

    /// Schema derivation or catalog inconsistency error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Persisted offset could not be decoded. Fatal at startup.
    #[error("Offset error: {0}")]
    Offset(String),

    /// Schema history could not be written or replayed. Fatal: the core
    /// cannot advance without durable history.
    #[error("History error: {0}")]
    History(String),

    /// The downstream sink rejected a record. Fatal; the runner decides
    /// whether to halt the engine.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CdcError {
    /// Create a new DDL parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new offset error
    pub fn offset(msg: impl Into<String>) -> Self {
        Self::Offset(msg.into())
    }

    /// Create a new history error
    pub fn history(msg: impl Into<String>) -> Self {
        Self::History(msg.into())
    }

    /// Create a new sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check whether the processor may continue after this error.
    ///
    /// Recoverable errors affect a single statement or row; fatal errors
    /// compromise the emitted stream itself.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Schema(_))
    }
}

/// Result type for CDC operations
pub type Result<T> = std::result::Result<T, CdcError>;
