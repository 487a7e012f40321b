//! INSERT statement context.

use crate::context::segment::{ColumnSegment, ExpressionSegment};
use crate::error::{RewriteError, RewriteResultOf};
use crate::metadata::SchemaMetaData;

/// The parenthesized column list of an INSERT.
///
/// For `INSERT INTO t VALUES ...` the binder supplies an empty segment
/// positioned where a column list would go (`start == stop`, no columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertColumnsSegment {
    /// Offset of `(`, or the insertion point of an omitted list.
    pub start: usize,
    /// Offset of `)`, or the insertion point of an omitted list.
    pub stop: usize,
    /// Declared columns.
    pub columns: Vec<ColumnSegment>,
}

impl InsertColumnsSegment {
    /// Creates an explicit column list.
    pub fn new(start: usize, stop: usize, columns: Vec<ColumnSegment>) -> Self {
        Self {
            start,
            stop,
            columns,
        }
    }

    /// Creates the empty segment of an omitted column list.
    pub fn omitted(position: usize) -> Self {
        Self {
            start: position,
            stop: position,
            columns: Vec::new(),
        }
    }

    /// Returns true when the statement relies on the table's default columns.
    pub fn is_omitted(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One parenthesized row of the VALUES clause.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertValuesSegment {
    /// Offset of `(`.
    pub start: usize,
    /// Offset of `)`.
    pub stop: usize,
    /// Value expressions in column order.
    pub values: Vec<ExpressionSegment>,
}

impl InsertValuesSegment {
    /// Creates a row segment.
    pub fn new(start: usize, stop: usize, values: Vec<ExpressionSegment>) -> Self {
        Self {
            start,
            stop,
            values,
        }
    }
}

/// Per-row view used by routing and parameter grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertValueContext {
    /// Value expressions of the row.
    pub values: Vec<ExpressionSegment>,
    /// Number of `?` markers in the row.
    pub parameter_count: usize,
    /// Index of the row's first parameter in the flat parameter list.
    pub parameter_offset: usize,
}

/// The INSERT-specific part of a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatementContext {
    /// Target logic table, lowercased.
    pub table: String,
    /// Column list; `None` when the dialect's parser does not expose one.
    pub columns_segment: Option<InsertColumnsSegment>,
    /// Rows of the VALUES clause.
    pub values: Vec<InsertValuesSegment>,
}

impl InsertStatementContext {
    /// Creates an insert context.
    pub fn new(
        table: &str,
        columns_segment: Option<InsertColumnsSegment>,
        values: Vec<InsertValuesSegment>,
    ) -> Self {
        Self {
            table: table.to_ascii_lowercase(),
            columns_segment,
            values,
        }
    }

    /// Returns true when the column list is omitted or unavailable.
    pub fn uses_default_columns(&self) -> bool {
        self.columns_segment
            .as_ref()
            .is_none_or(InsertColumnsSegment::is_omitted)
    }

    /// Builds the per-row contexts with their parameter offsets.
    pub fn insert_value_contexts(&self) -> Vec<InsertValueContext> {
        let mut offset = 0;
        self.values
            .iter()
            .map(|row| {
                let parameter_count =
                    row.values.iter().map(ExpressionSegment::parameter_count).sum();
                let context = InsertValueContext {
                    values: row.values.clone(),
                    parameter_count,
                    parameter_offset: offset,
                };
                offset += parameter_count;
                context
            })
            .collect()
    }

    /// Resolves the column names every row supplies, in value order.
    ///
    /// An explicit column list is used as written. Otherwise the table's
    /// metadata columns are used; when rows carry one value fewer than the
    /// metadata declares and `key_column` is set, the key column is the one
    /// left out and is dropped from the list.
    pub fn column_names(
        &self,
        schema: &SchemaMetaData,
        key_column: Option<&str>,
    ) -> RewriteResultOf<Vec<String>> {
        if !self.uses_default_columns() {
            return Ok(self
                .columns_segment
                .iter()
                .flat_map(|segment| segment.columns.iter())
                .map(|c| c.name().to_string())
                .collect());
        }
        let table = schema
            .table(&self.table)
            .ok_or_else(|| RewriteError::TableMetaNotFound {
                logic_table: self.table.clone(),
            })?;
        let row_width = self.values.first().map_or(table.columns.len(), |r| r.values.len());
        match key_column {
            Some(key)
                if table.contains_column(key) && row_width + 1 == table.columns.len() =>
            {
                Ok(table
                    .columns
                    .iter()
                    .filter(|c| !c.eq_ignore_ascii_case(key))
                    .cloned()
                    .collect())
            }
            _ => Ok(table.columns.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TableMetaData;
    use crate::value::SqlValue;

    fn literal(at: usize, value: i64) -> ExpressionSegment {
        ExpressionSegment::Literal {
            start: at,
            stop: at,
            value: SqlValue::Int(value),
        }
    }

    fn parameter(at: usize, index: usize) -> ExpressionSegment {
        ExpressionSegment::Parameter {
            start: at,
            stop: at,
            index,
        }
    }

    #[test]
    fn test_parameter_offsets() {
        let insert = InsertStatementContext::new(
            "t_order",
            Some(InsertColumnsSegment::new(20, 40, vec![])),
            vec![
                InsertValuesSegment::new(50, 55, vec![parameter(51, 0), parameter(54, 1)]),
                InsertValuesSegment::new(58, 63, vec![literal(59, 1), parameter(62, 2)]),
                InsertValuesSegment::new(66, 71, vec![parameter(67, 3), parameter(70, 4)]),
            ],
        );
        let rows = insert.insert_value_contexts();
        assert_eq!(
            rows.iter()
                .map(|r| (r.parameter_offset, r.parameter_count))
                .collect::<Vec<_>>(),
            vec![(0, 2), (2, 1), (3, 2)]
        );
    }

    #[test]
    fn test_default_column_names() {
        let schema = SchemaMetaData::new().with_table(
            "t_order",
            TableMetaData::new(["order_id", "user_id", "status"], Vec::<String>::new()),
        );
        let short_rows = InsertStatementContext::new(
            "t_order",
            Some(InsertColumnsSegment::omitted(20)),
            vec![InsertValuesSegment::new(28, 33, vec![literal(29, 1), literal(32, 2)])],
        );
        assert_eq!(
            short_rows.column_names(&schema, Some("order_id")).unwrap(),
            vec!["user_id", "status"]
        );

        let full_rows = InsertStatementContext::new(
            "t_order",
            Some(InsertColumnsSegment::omitted(20)),
            vec![InsertValuesSegment::new(
                28,
                36,
                vec![literal(29, 9), literal(32, 1), literal(35, 2)],
            )],
        );
        assert_eq!(
            full_rows.column_names(&schema, Some("order_id")).unwrap(),
            vec!["order_id", "user_id", "status"]
        );

        let unknown = InsertStatementContext::new("t_other", None, vec![]);
        assert_eq!(
            unknown.column_names(&schema, None),
            Err(RewriteError::TableMetaNotFound {
                logic_table: "t_other".to_string()
            })
        );
    }
}
