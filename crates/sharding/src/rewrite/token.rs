//! SQL tokens: positional edits against the original SQL text.
//!
//! Every token covers a half-open byte range `[start, end)` of the original
//! text and renders its replacement, possibly per route unit. Insertion
//! tokens have `start == end`.

use crate::context::QuoteCharacter;
use crate::route::RouteUnit;
use crate::rule::DataNode;

/// One row of a rewritten VALUES clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertValuesRow {
    /// The row text, parentheses included.
    pub text: String,
    /// Data nodes the row was routed to; `None` when the row goes everywhere.
    pub data_nodes: Option<Vec<DataNode>>,
}

impl InsertValuesRow {
    fn belongs_to(&self, unit: &RouteUnit) -> bool {
        self.data_nodes
            .as_ref()
            .is_none_or(|nodes| nodes.iter().any(|n| unit.contains_data_node(n)))
    }
}

/// A positional edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlToken {
    /// A logic table name, or an owner qualifier naming one.
    Table {
        /// First byte of the name.
        start: usize,
        /// Last byte of the name (inclusive).
        stop: usize,
        /// The logic table the name refers to.
        logic_table: String,
        /// Quoting of the original identifier, kept on the actual name.
        quote: QuoteCharacter,
    },

    /// The whole VALUES row list of an INSERT.
    InsertValues {
        /// `(` of the first row.
        start: usize,
        /// `)` of the last row (inclusive).
        stop: usize,
        /// Rows in statement order.
        rows: Vec<InsertValuesRow>,
    },

    /// `, key` appended to an explicit column list.
    GeneratedKeyInsertColumn {
        /// Offset of the closing `)`; the column is inserted before it.
        position: usize,
        /// The generated key column.
        column: String,
    },

    /// A full column list for an INSERT that omits one.
    UseDefaultInsertColumns {
        /// Insertion point.
        position: usize,
        /// Columns in value order, key column last.
        columns: Vec<String>,
    },

    /// A literal OFFSET rewritten to `0`.
    Offset {
        /// First byte of the literal.
        start: usize,
        /// Last byte of the literal (inclusive).
        stop: usize,
    },

    /// A literal row count rewritten to `offset + count`.
    RowCount {
        /// First byte of the literal.
        start: usize,
        /// Last byte of the literal (inclusive).
        stop: usize,
        /// The revised count.
        revised: i64,
    },
}

impl SqlToken {
    /// First byte covered.
    pub fn start(&self) -> usize {
        match self {
            SqlToken::Table { start, .. }
            | SqlToken::InsertValues { start, .. }
            | SqlToken::Offset { start, .. }
            | SqlToken::RowCount { start, .. } => *start,
            SqlToken::GeneratedKeyInsertColumn { position, .. }
            | SqlToken::UseDefaultInsertColumns { position, .. } => *position,
        }
    }

    /// One past the last byte covered; equal to `start()` for insertions.
    pub fn end(&self) -> usize {
        match self {
            SqlToken::Table { stop, .. }
            | SqlToken::InsertValues { stop, .. }
            | SqlToken::Offset { stop, .. }
            | SqlToken::RowCount { stop, .. } => stop + 1,
            SqlToken::GeneratedKeyInsertColumn { position, .. }
            | SqlToken::UseDefaultInsertColumns { position, .. } => *position,
        }
    }

    /// Returns true when the rendered text depends on the route unit.
    pub fn is_route_dependent(&self) -> bool {
        matches!(self, SqlToken::Table { .. } | SqlToken::InsertValues { .. })
    }

    /// Renders the replacement text for a unit, or for the unrouted
    /// statement when `unit` is `None`.
    pub fn render(&self, unit: Option<&RouteUnit>) -> String {
        match self {
            SqlToken::Table {
                logic_table, quote, ..
            } => {
                let actual = match unit {
                    Some(unit) => unit.actual_table_name(logic_table).unwrap_or_else(|| {
                        tracing::debug!(
                            table = %logic_table,
                            unit = %unit,
                            "No actual table mapped, keeping logic name"
                        );
                        logic_table.as_str()
                    }),
                    None => logic_table.as_str(),
                };
                quote.wrap(actual)
            }
            SqlToken::InsertValues { rows, .. } => rows
                .iter()
                .filter(|row| unit.is_none_or(|u| row.belongs_to(u)))
                .map(|row| row.text.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            SqlToken::GeneratedKeyInsertColumn { column, .. } => format!(", {column}"),
            SqlToken::UseDefaultInsertColumns { columns, .. } => {
                format!("({})", columns.join(", "))
            }
            SqlToken::Offset { .. } => "0".to_string(),
            SqlToken::RowCount { revised, .. } => revised.to_string(),
        }
    }
}
