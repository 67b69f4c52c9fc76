//! Table identifiers and immutable table definitions

use crate::relational::column::Column;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualified identifier of a table: (catalog, schema, table).
///
/// Catalog and schema may be absent; two ids compare equal only when all
/// three components match (an absent component equals another absent one).
/// Acts as the stable key for catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
    catalog: Option<String>,
    schema: Option<String>,
    table: String,
}

impl TableId {
    pub fn new(
        catalog: Option<impl Into<String>>,
        schema: Option<impl Into<String>>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.map(Into::into),
            schema: schema.map(Into::into),
            table: table.into(),
        }
    }

    /// Id qualified by database name only, the common MySQL case.
    pub fn with_schema(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(None::<String>, Some(schema), table)
    }

    /// Unqualified id, resolved later against a current-schema hint.
    pub fn unqualified(table: impl Into<String>) -> Self {
        Self::new(None::<String>, None::<String>, table)
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Same id with the table component replaced.
    pub fn with_table_name(&self, table: impl Into<String>) -> Self {
        Self {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{}.", catalog)?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        write!(f, "{}", self.table)
    }
}

/// An immutable snapshot of a table definition.
///
/// Tables are replaced wholesale in the catalog, never mutated in place.
/// Every primary-key name resolves to a column in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    id: TableId,
    columns: Vec<Column>,
    pk_column_names: Vec<String>,
    default_charset: Option<String>,
}

impl Table {
    /// Assemble a table, validating the primary-key invariant.
    pub fn new(
        id: TableId,
        columns: Vec<Column>,
        pk_column_names: Vec<String>,
        default_charset: Option<String>,
    ) -> crate::common::Result<Self> {
        for pk in &pk_column_names {
            if !columns.iter().any(|c| c.name() == pk) {
                return Err(crate::common::CdcError::schema(format!(
                    "primary key column '{}' is not defined in table {}",
                    pk, id
                )));
            }
        }
        Ok(Self {
            id,
            columns,
            pk_column_names,
            default_charset,
        })
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    /// Columns in position order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Primary-key column names in key order; empty when the table has no
    /// primary key.
    pub fn pk_column_names(&self) -> &[String] {
        &self.pk_column_names
    }

    pub fn default_charset(&self) -> Option<&str> {
        self.default_charset.as_deref()
    }

    pub fn column_with_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// 0-based index of a column within the positional row tuple.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn has_primary_key(&self) -> bool {
        !self.pk_column_names.is_empty()
    }
}
