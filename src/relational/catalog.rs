//! In-memory table catalog
//!
//! The catalog is an explicit owned value with a single writer: the event
//! processor mutates it through `&mut self`, readers take snapshots.
//! Every mutation records the affected id in a change set that the
//! processor drains after each DDL statement to rebuild derived schemas.

use crate::relational::table::{Table, TableId};
use std::collections::{HashMap, HashSet};

/// The set of table definitions the CDC engine currently knows about.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    tables_by_id: HashMap<TableId, Table>,
    changes: HashSet<TableId>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the current definition for an id.
    pub fn get(&self, id: &TableId) -> Option<&Table> {
        self.tables_by_id.get(id)
    }

    /// Create or replace a table definition. The previous entry, if any, is
    /// replaced wholesale; the id is recorded as changed.
    pub fn overwrite(&mut self, table: Table) -> Option<Table> {
        let id = table.id().clone();
        self.changes.insert(id.clone());
        self.tables_by_id.insert(id, table)
    }

    /// Remove a table definition, recording the id as changed. Returns the
    /// removed table, if it existed.
    pub fn remove(&mut self, id: &TableId) -> Option<Table> {
        let removed = self.tables_by_id.remove(id);
        if removed.is_some() {
            self.changes.insert(id.clone());
        }
        removed
    }

    /// Move a definition to a new id, marking both ids changed. No-op when
    /// the old id is unknown.
    pub fn rename(&mut self, old: &TableId, new: TableId) -> crate::common::Result<()> {
        if let Some(table) = self.tables_by_id.remove(old) {
            self.changes.insert(old.clone());
            let renamed = Table::new(
                new.clone(),
                table.columns().to_vec(),
                table.pk_column_names().to_vec(),
                table.default_charset().map(str::to_string),
            )?;
            self.changes.insert(new.clone());
            self.tables_by_id.insert(new, renamed);
        }
        Ok(())
    }

    /// All known ids. Ordering is unspecified but stable within a snapshot.
    pub fn ids(&self) -> Vec<TableId> {
        self.tables_by_id.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables_by_id.is_empty()
    }

    /// Atomically take and clear the set of ids mutated since the last
    /// drain.
    pub fn drain_changes(&mut self) -> HashSet<TableId> {
        std::mem::take(&mut self.changes)
    }

    /// Consistent copy of the catalog for readers; the change set is not
    /// carried over.
    pub fn snapshot(&self) -> Tables {
        Tables {
            tables_by_id: self.tables_by_id.clone(),
            changes: HashSet::new(),
        }
    }
}

impl PartialEq for Tables {
    /// Catalog equality compares table definitions only, not pending
    /// change sets.
    fn eq(&self, other: &Self) -> bool {
        self.tables_by_id == other.tables_by_id
    }
}

impl Eq for Tables {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relational::column::{ColumnSpec, JdbcType};

    fn table(db: &str, name: &str) -> Table {
        let col = ColumnSpec {
            name: "id".to_string(),
            jdbc_type: JdbcType::Integer,
            type_name: "INT".to_string(),
            optional: false,
            ..Default::default()
        }
        .create();
        Table::new(
            TableId::with_schema(db, name),
            vec![col],
            vec!["id".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_overwrite_and_get() {
        let mut tables = Tables::new();
        let t = table("db", "t1");
        let id = t.id().clone();

        assert!(tables.overwrite(t).is_none());
        assert!(tables.get(&id).is_some());
        assert_eq!(tables.len(), 1);

        // Replacing returns the prior definition.
        let replaced = tables.overwrite(table("db", "t1"));
        assert!(replaced.is_some());
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn test_drain_changes() {
        let mut tables = Tables::new();
        tables.overwrite(table("db", "t1"));
        tables.overwrite(table("db", "t2"));
        tables.remove(&TableId::with_schema("db", "t1"));

        let changes = tables.drain_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes.contains(&TableId::with_schema("db", "t1")));
        assert!(changes.contains(&TableId::with_schema("db", "t2")));

        // Drained: the set resets.
        assert!(tables.drain_changes().is_empty());
    }

    #[test]
    fn test_remove_unknown_records_nothing() {
        let mut tables = Tables::new();
        assert!(tables.remove(&TableId::with_schema("db", "nope")).is_none());
        assert!(tables.drain_changes().is_empty());
    }

    #[test]
    fn test_rename() {
        let mut tables = Tables::new();
        tables.overwrite(table("db", "old"));
        tables.drain_changes();

        let old = TableId::with_schema("db", "old");
        let new = TableId::with_schema("db", "new");
        tables.rename(&old, new.clone()).unwrap();

        assert!(tables.get(&old).is_none());
        let renamed = tables.get(&new).unwrap();
        assert_eq!(renamed.id(), &new);

        let changes = tables.drain_changes();
        assert!(changes.contains(&old));
        assert!(changes.contains(&new));
    }

    #[test]
    fn test_snapshot_is_consistent() {
        let mut tables = Tables::new();
        tables.overwrite(table("db", "t1"));

        let mut snap = tables.snapshot();
        tables.overwrite(table("db", "t2"));

        assert_eq!(snap.len(), 1);
        assert_eq!(tables.len(), 2);
        assert!(snap.drain_changes().is_empty());
    }

    #[test]
    fn test_catalog_equality_ignores_changes() {
        let mut a = Tables::new();
        let mut b = Tables::new();
        a.overwrite(table("db", "t1"));
        b.overwrite(table("db", "t1"));
        b.drain_changes();
        assert_eq!(a, b);
    }
}
