//! Table filtering
//!
//! Include/exclude filters over qualified table names using glob patterns
//! (`*` and `?`). Excludes win over includes; with no include patterns at
//! all, every table passes the include check.

use crate::relational::table::TableId;
use regex::Regex;

/// Compiled table filter.
#[derive(Debug, Default)]
pub struct TableFilter {
    include_patterns: Vec<Regex>,
    exclude_patterns: Vec<Regex>,
}

impl TableFilter {
    /// Compile include/exclude glob patterns. Patterns match against both
    /// the qualified `database.table` name and the bare table name.
    pub fn new(
        include: &[String],
        exclude: &[String],
    ) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            include_patterns: compile(include)?,
            exclude_patterns: compile(exclude)?,
        })
    }

    /// Filter that passes every table.
    pub fn pass_all() -> Self {
        Self::default()
    }

    pub fn is_included(&self, id: &TableId) -> bool {
        let qualified = match id.schema() {
            Some(schema) => format!("{}.{}", schema, id.table()),
            None => id.table().to_string(),
        };
        let table = id.table();

        for pattern in &self.exclude_patterns {
            if pattern.is_match(&qualified) || pattern.is_match(table) {
                return false;
            }
        }
        if self.include_patterns.is_empty() {
            return true;
        }
        self.include_patterns
            .iter()
            .any(|p| p.is_match(&qualified) || p.is_match(table))
    }
}

fn compile(patterns: &[String]) -> std::result::Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| glob_to_regex(p)).collect()
}

fn glob_to_regex(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let escaped = regex::escape(pattern);
    let regex_pattern = escaped.replace(r"\*", ".*").replace(r"\?", ".");
    Regex::new(&format!("^{}$", regex_pattern))
}
