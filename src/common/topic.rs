//! Topic selection for emitted records

/// Chooses the destination topic for a table's change records and for
/// schema-change records. Implementations must be pure: the same inputs
/// always yield the same topic.
pub trait TopicSelector: Send + Sync {
    /// Topic for row-level change records of one table.
    fn topic_for(&self, server: &str, database: &str, table: &str) -> String;

    /// Topic for schema-change records of the whole server.
    fn schema_change_topic(&self, server: &str) -> String;
}

/// Default dotted-name selector: `server.database.table`, with schema
/// changes on the server-named topic. A configured prefix is prepended
/// to both, e.g. `cdc.server.database.table`.
#[derive(Debug, Default, Clone)]
pub struct DefaultTopicSelector {
    prefix: Option<String>,
}

impl DefaultTopicSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector that prepends `prefix` to every topic name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Build from an optional prefix, as carried by the engine config.
    pub fn with_optional_prefix(prefix: Option<String>) -> Self {
        Self { prefix }
    }
}

impl TopicSelector for DefaultTopicSelector {
    fn topic_for(&self, server: &str, database: &str, table: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}.{}.{}.{}", prefix, server, database, table),
            None => format!("{}.{}.{}", server, database, table),
        }
    }

    fn schema_change_topic(&self, server: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}.{}", prefix, server),
            None => server.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topics() {
        let selector = DefaultTopicSelector::new();
        assert_eq!(selector.topic_for("prod", "db", "users"), "prod.db.users");
        assert_eq!(selector.schema_change_topic("prod"), "prod");
    }

    #[test]
    fn test_prefixed_topics() {
        let selector = DefaultTopicSelector::with_prefix("cdc");
        assert_eq!(
            selector.topic_for("prod", "db", "users"),
            "cdc.prod.db.users"
        );
        assert_eq!(selector.schema_change_topic("prod"), "cdc.prod");
    }

    #[test]
    fn test_optional_prefix() {
        let unset = DefaultTopicSelector::with_optional_prefix(None);
        assert_eq!(unset.topic_for("prod", "db", "users"), "prod.db.users");

        let set = DefaultTopicSelector::with_optional_prefix(Some("cdc".to_string()));
        assert_eq!(set.topic_for("prod", "db", "users"), "cdc.prod.db.users");
    }
}
