//! Engine configuration

use crate::common::{CdcError, Result};

/// Configuration for the binlog translation engine.
#[derive(Debug, Clone)]
pub struct CdcConfig {
    /// Logical name for the source server; keys the persisted partition
    /// and prefixes topic names.
    pub server_name: String,
    /// Emit a record to the schema-change topic for every DDL statement.
    pub include_schema_changes: bool,
    /// Attach the before-image to update records. Defaults off: the
    /// emitted value is the after-image either way.
    pub include_update_before: bool,
    /// Let `CREATE VIEW` register catalog entries.
    pub include_views: bool,
    /// Glob patterns of tables to include (empty includes all).
    pub table_include: Vec<String>,
    /// Glob patterns of tables to exclude.
    pub table_exclude: Vec<String>,
    /// Prefix prepended to every emitted topic name.
    pub topic_prefix: Option<String>,
}

impl CdcConfig {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            include_schema_changes: false,
            include_update_before: false,
            include_views: false,
            table_include: Vec::new(),
            table_exclude: Vec::new(),
            topic_prefix: None,
        }
    }

    pub fn with_schema_changes(mut self, include: bool) -> Self {
        self.include_schema_changes = include;
        self
    }

    pub fn with_update_before(mut self, include: bool) -> Self {
        self.include_update_before = include;
        self
    }

    pub fn with_views(mut self, include: bool) -> Self {
        self.include_views = include;
        self
    }

    pub fn include_table(mut self, pattern: impl Into<String>) -> Self {
        self.table_include.push(pattern.into());
        self
    }

    pub fn exclude_table(mut self, pattern: impl Into<String>) -> Self {
        self.table_exclude.push(pattern.into());
        self
    }

    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = Some(prefix.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(CdcError::config("server name must not be empty"));
        }
        Ok(())
    }
}
