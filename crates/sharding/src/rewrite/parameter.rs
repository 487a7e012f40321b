//! Parameter lists of rewritten statements.
//!
//! Text rewriting and parameter rewriting are independent. Statements other
//! than INSERT pass their parameters through, with LIMIT/OFFSET markers
//! replaced when pagination is revised. INSERT parameters are grouped per
//! row so each unit receives only the groups of the rows it owns, followed
//! by any trailing parameters (e.g. those of `ON DUPLICATE KEY UPDATE`).

use std::collections::BTreeMap;

use crate::context::PaginationValueSegment;
use crate::error::{RewriteError, RewriteResultOf};
use crate::rewrite::generator::{TokenGenerateContext, pagination_revision};
use crate::route::{RouteResult, RouteUnit};
use crate::value::SqlValue;

/// Builds the parameter list of each rewritten statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterBuilder {
    /// The same list for every unit.
    Standard(StandardParameterBuilder),
    /// Row-grouped INSERT parameters.
    Grouped(GroupedParameterBuilder),
}

impl ParameterBuilder {
    /// Creates the builder for a statement.
    pub fn build(context: &TokenGenerateContext<'_>) -> RewriteResultOf<Self> {
        if context.statement.insert().is_some() {
            return GroupedParameterBuilder::build(context).map(ParameterBuilder::Grouped);
        }

        let mut builder = StandardParameterBuilder::new(context.parameters.to_vec());
        if let Some((pagination, revision)) =
            pagination_revision(context.statement, context.route_result, context.parameters)?
        {
            if let Some(PaginationValueSegment::Parameter { index, .. }) = pagination.offset {
                builder.replace(index, SqlValue::Int(0));
            }
            if let Some(PaginationValueSegment::Parameter { index, .. }) = pagination.row_count
                && let Some(revised) = revision.revised_row_count()
            {
                builder.replace(index, SqlValue::Int(revised));
            }
        }
        Ok(ParameterBuilder::Standard(builder))
    }

    /// Parameters for one unit, or for the unrouted statement.
    pub fn parameters_for(
        &self,
        route_result: &RouteResult,
        unit: Option<&RouteUnit>,
    ) -> Vec<SqlValue> {
        match self {
            ParameterBuilder::Standard(builder) => builder.parameters(),
            ParameterBuilder::Grouped(builder) => match unit {
                Some(unit) if !route_result.original_data_nodes().is_empty() => {
                    builder.parameters(&route_result.row_indexes_for(unit))
                }
                _ => builder.all_parameters(),
            },
        }
    }
}

/// Pass-through parameters with positional replacements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardParameterBuilder {
    parameters: Vec<SqlValue>,
    replacements: BTreeMap<usize, SqlValue>,
}

impl StandardParameterBuilder {
    /// Wraps the original parameters.
    pub fn new(parameters: Vec<SqlValue>) -> Self {
        Self {
            parameters,
            replacements: BTreeMap::new(),
        }
    }

    /// Replaces the parameter at `index`.
    pub fn replace(&mut self, index: usize, value: SqlValue) {
        self.replacements.insert(index, value);
    }

    /// The parameters with replacements applied.
    pub fn parameters(&self) -> Vec<SqlValue> {
        let mut parameters = self.parameters.clone();
        for (index, value) in &self.replacements {
            if let Some(slot) = parameters.get_mut(*index) {
                *slot = value.clone();
            }
        }
        parameters
    }
}

/// INSERT parameters grouped per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedParameterBuilder {
    groups: Vec<Vec<SqlValue>>,
    derived: Vec<Vec<SqlValue>>,
    trailing: Vec<SqlValue>,
}

impl GroupedParameterBuilder {
    /// Splits the parameters of an INSERT by row and appends the generated
    /// key of each row when it is injected as a parameter marker.
    pub fn build(context: &TokenGenerateContext<'_>) -> RewriteResultOf<Self> {
        let mut builder = Self::default();
        let Some(insert) = context.statement.insert() else {
            return Ok(builder);
        };
        let parameters = context.parameters;
        let injected_keys = context
            .generated_key
            .filter(|k| k.is_generated() && !parameters.is_empty());

        let mut consumed = 0;
        for (row, value_context) in insert.insert_value_contexts().into_iter().enumerate() {
            let end = value_context.parameter_offset + value_context.parameter_count;
            let group = parameters
                .get(value_context.parameter_offset..end)
                .ok_or(RewriteError::ParameterCountMismatch {
                    expected: end,
                    supplied: parameters.len(),
                })?;
            builder.groups.push(group.to_vec());
            builder.derived.push(
                injected_keys
                    .and_then(|k| k.values().get(row))
                    .cloned()
                    .into_iter()
                    .collect(),
            );
            consumed = end;
        }
        builder.trailing = parameters.get(consumed..).map(<[SqlValue]>::to_vec).unwrap_or_default();
        Ok(builder)
    }

    /// Parameters of the given rows, in row order, then the trailing ones.
    pub fn parameters(&self, rows: &[usize]) -> Vec<SqlValue> {
        let mut parameters = Vec::new();
        for &row in rows {
            if let Some(group) = self.groups.get(row) {
                parameters.extend(group.iter().cloned());
            }
            if let Some(derived) = self.derived.get(row) {
                parameters.extend(derived.iter().cloned());
            }
        }
        parameters.extend(self.trailing.iter().cloned());
        parameters
    }

    /// Parameters of every row.
    pub fn all_parameters(&self) -> Vec<SqlValue> {
        let rows: Vec<usize> = (0..self.groups.len()).collect();
        self.parameters(&rows)
    }

    /// The number of rows.
    pub fn row_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped() -> GroupedParameterBuilder {
        GroupedParameterBuilder {
            groups: vec![
                vec![SqlValue::Int(1), SqlValue::Int(10)],
                vec![SqlValue::Int(2), SqlValue::Int(20)],
                vec![SqlValue::Int(3), SqlValue::Int(30)],
            ],
            derived: vec![
                vec![SqlValue::Int(100)],
                vec![SqlValue::Int(200)],
                vec![SqlValue::Int(300)],
            ],
            trailing: vec![SqlValue::text("x")],
        }
    }

    #[test]
    fn test_grouped_selects_rows() {
        let builder = grouped();
        assert_eq!(
            builder.parameters(&[0, 2]),
            vec![
                SqlValue::Int(1),
                SqlValue::Int(10),
                SqlValue::Int(100),
                SqlValue::Int(3),
                SqlValue::Int(30),
                SqlValue::Int(300),
                SqlValue::text("x"),
            ]
        );
        assert_eq!(builder.all_parameters().len(), 10);
        assert_eq!(builder.row_count(), 3);
    }

    #[test]
    fn test_standard_replacements() {
        let mut builder = StandardParameterBuilder::new(vec![
            SqlValue::Int(7),
            SqlValue::Int(20),
            SqlValue::Int(10),
        ]);
        builder.replace(1, SqlValue::Int(0));
        builder.replace(2, SqlValue::Int(30));
        builder.replace(9, SqlValue::Int(1));
        assert_eq!(
            builder.parameters(),
            vec![SqlValue::Int(7), SqlValue::Int(0), SqlValue::Int(30)]
        );
    }
}
