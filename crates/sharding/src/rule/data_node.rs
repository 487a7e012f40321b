//! Actual data nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete (data source, table) pair that physically stores rows of a logic table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataNode {
    /// The data source name.
    pub data_source: String,
    /// The actual table name.
    pub table: String,
}

impl DataNode {
    /// Creates a data node.
    pub fn new(data_source: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            table: table.into(),
        }
    }

    /// Parses `data_source.table` notation.
    ///
    /// Returns `None` when the text is not exactly two non-empty, dot-separated parts.
    pub fn parse(text: &str) -> Option<Self> {
        let (data_source, table) = text.trim().split_once('.')?;
        if data_source.is_empty() || table.is_empty() || table.contains('.') {
            return None;
        }
        Some(Self::new(data_source, table))
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}
