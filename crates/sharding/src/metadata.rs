//! Schema metadata consumed from the binder.
//!
//! Only two facts are needed: the ordered columns of a table (for inserts
//! that omit their column list and for resolving unqualified columns in
//! joins) and the index names a table declares (for `DROP INDEX` without a
//! table).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata of one logic table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetaData {
    /// Column names in declaration order.
    pub columns: Vec<String>,

    /// Index names.
    #[serde(default)]
    pub indexes: Vec<String>,
}

impl TableMetaData {
    /// Creates table metadata.
    pub fn new<C, I>(columns: C, indexes: I) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            indexes: indexes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the table has the column (case-insensitive).
    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    /// Returns true if the table declares the index (case-insensitive).
    pub fn contains_index(&self, index: &str) -> bool {
        self.indexes.iter().any(|i| i.eq_ignore_ascii_case(index))
    }
}

/// Metadata of every known logic table, keyed by lowercase table name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetaData {
    tables: IndexMap<String, TableMetaData>,
}

impl SchemaMetaData {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any previous entry.
    pub fn with_table(mut self, name: &str, table: TableMetaData) -> Self {
        self.put(name, table);
        self
    }

    /// Adds a table, replacing any previous entry.
    pub fn put(&mut self, name: &str, table: TableMetaData) {
        self.tables.insert(name.to_ascii_lowercase(), table);
    }

    /// Looks up a table.
    pub fn table(&self, name: &str) -> Option<&TableMetaData> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    /// Returns true if the table is known and has the column.
    pub fn contains_column(&self, table: &str, column: &str) -> bool {
        self.table(table).is_some_and(|t| t.contains_column(column))
    }

    /// Returns the tables declaring an index, in registration order.
    pub fn find_tables_by_index(&self, index: &str) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|(_, table)| table.contains_index(index))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
