//! The relational model: column and table definitions, the catalog, and
//! the schemas derived from them.

pub mod catalog;
pub mod column;
pub mod schema;
pub mod table;

pub use catalog::Tables;
pub use column::{Column, ColumnSpec, JdbcType};
pub use schema::{Field, FieldType, Schema, TableSchema, TableSchemaBuilder};
pub use table::{Table, TableId};
