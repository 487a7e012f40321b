//! Shard condition extraction.
//!
//! A WHERE clause arrives as an OR of AND groups. Each group becomes one
//! [`ShardingCondition`] holding the merged values of every sharding column
//! it constrains; routing takes the union over groups. An INSERT yields one
//! condition per row.

use std::ops::Bound;

use indexmap::IndexMap;

use crate::context::{
    CompareOperator, ExpressionSegment, InsertStatementContext, PredicateRightValue,
    PredicateSegment, StatementContext,
};
use crate::error::{RouteError, RouteResultOf};
use crate::keygen::GeneratedKeyContext;
use crate::metadata::SchemaMetaData;
use crate::rule::{ShardingRule, ShardingValue};
use crate::value::SqlValue;

/// Merged sharding values of one AND group (or one INSERT row).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardingCondition {
    // (lowercase table, lowercase column) -> merged value
    values: IndexMap<(String, String), ShardingValue>,
}

impl ShardingCondition {
    /// Creates an empty condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, intersecting with any existing value of the column.
    pub fn add(&mut self, table: &str, column: &str, value: ShardingValue) {
        let key = (table.to_ascii_lowercase(), column.to_ascii_lowercase());
        match self.values.swap_remove(&key) {
            Some(existing) => {
                self.values.insert(key, existing.intersect(value));
            }
            None => {
                self.values.insert(key, value);
            }
        }
    }

    /// Returns true when no row can satisfy the condition.
    pub fn is_always_false(&self) -> bool {
        self.values.values().any(ShardingValue::is_empty)
    }

    /// Returns true when the condition constrains no sharding column.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value of a column across the given tables.
    ///
    /// Binding tables share their sharding values, so values recorded for
    /// any of `tables` apply and are intersected.
    pub fn value_for(&self, tables: &[&str], column: &str) -> Option<ShardingValue> {
        let mut result: Option<ShardingValue> = None;
        for ((table, col), value) in &self.values {
            if col.eq_ignore_ascii_case(column)
                && tables.iter().any(|t| t.eq_ignore_ascii_case(table))
            {
                result = Some(match result {
                    Some(existing) => existing.intersect(value.clone()),
                    None => value.clone(),
                });
            }
        }
        result
    }
}

/// Shard conditions of a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardingConditions {
    conditions: Vec<ShardingCondition>,
}

impl ShardingConditions {
    /// Wraps conditions.
    pub fn new(conditions: Vec<ShardingCondition>) -> Self {
        Self { conditions }
    }

    /// The conditions.
    pub fn conditions(&self) -> &[ShardingCondition] {
        &self.conditions
    }

    /// Returns true when the statement carries no condition at all.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns true when every condition is unsatisfiable.
    pub fn is_always_false(&self) -> bool {
        !self.conditions.is_empty()
            && self
                .conditions
                .iter()
                .all(ShardingCondition::is_always_false)
    }

    /// Extracts conditions from a statement.
    ///
    /// INSERT statements read their rows; `insert_columns` are the columns
    /// the rows supply and `generated_key` the keys injected for them.
    /// Other statements read their WHERE clause.
    pub fn for_statement(
        rule: &ShardingRule,
        schema: &SchemaMetaData,
        context: &StatementContext,
        parameters: &[SqlValue],
        insert_columns: &[String],
        generated_key: Option<&GeneratedKeyContext>,
    ) -> RouteResultOf<Self> {
        match context.insert() {
            Some(insert) => {
                Self::from_insert(rule, insert, insert_columns, generated_key, parameters)
            }
            None => Self::from_where(rule, schema, context, parameters),
        }
    }

    /// Extracts one condition per INSERT row.
    pub fn from_insert(
        rule: &ShardingRule,
        insert: &InsertStatementContext,
        columns: &[String],
        generated_key: Option<&GeneratedKeyContext>,
        parameters: &[SqlValue],
    ) -> RouteResultOf<Self> {
        let table = insert.table.as_str();
        let injected_key = generated_key
            .filter(|k| k.is_generated() && rule.is_sharding_column(k.column_name(), table));

        let mut conditions = Vec::with_capacity(insert.values.len());
        for (row_index, row) in insert.values.iter().enumerate() {
            let mut condition = ShardingCondition::new();
            for (position, column) in columns.iter().enumerate() {
                if !rule.is_sharding_column(column, table) {
                    continue;
                }
                let value = match row.values.get(position) {
                    Some(expr) => expr.evaluate(parameters)?,
                    None => None,
                };
                let value = value.ok_or_else(|| RouteError::UnresolvableShardingValue {
                    column: column.clone(),
                    row: row_index,
                })?;
                condition.add(table, column, ShardingValue::List(vec![value]));
            }
            if let Some(key) = injected_key
                && let Some(value) = key.values().get(row_index)
            {
                condition.add(table, key.column_name(), ShardingValue::List(vec![value.clone()]));
            }
            conditions.push(condition);
        }
        Ok(Self::new(conditions))
    }

    /// Extracts one condition per OR-ed AND group of the WHERE clause.
    pub fn from_where(
        rule: &ShardingRule,
        schema: &SchemaMetaData,
        context: &StatementContext,
        parameters: &[SqlValue],
    ) -> RouteResultOf<Self> {
        let Some(where_segment) = context.where_segment() else {
            return Ok(Self::default());
        };
        let tables = context.tables();
        let table_names = tables.table_names();

        let mut conditions = Vec::with_capacity(where_segment.and_predicates.len());
        for group in &where_segment.and_predicates {
            let mut condition = ShardingCondition::new();
            for predicate in &group.predicates {
                let column = &predicate.column;
                if !table_names
                    .iter()
                    .any(|t| rule.is_sharding_column(column.name(), t))
                {
                    continue;
                }
                let table = match &column.owner {
                    Some(owner) => tables.find_table_by_owner(owner.identifier.value())?,
                    None => tables.find_table_name(column, schema)?,
                };
                if !rule.is_sharding_column(column.name(), &table) {
                    continue;
                }
                if let Some(value) = sharding_value(predicate, parameters)? {
                    condition.add(&table, column.name(), value);
                }
            }
            conditions.push(condition);
        }
        // A group without sharding values scans the whole table.
        if conditions.iter().all(ShardingCondition::is_empty) {
            return Ok(Self::default());
        }
        Ok(Self::new(conditions))
    }
}

fn sharding_value(
    predicate: &PredicateSegment,
    parameters: &[SqlValue],
) -> RouteResultOf<Option<ShardingValue>> {
    let evaluate = |expr: &ExpressionSegment| expr.evaluate(parameters);
    let value = match &predicate.right {
        PredicateRightValue::Compare { operator, value } => {
            let Some(v) = evaluate(value)? else {
                return Ok(None);
            };
            match operator {
                CompareOperator::Eq => ShardingValue::List(vec![v]),
                CompareOperator::NotEq => return Ok(None),
                CompareOperator::Lt => ShardingValue::Range {
                    lower: Bound::Unbounded,
                    upper: Bound::Excluded(v),
                },
                CompareOperator::LtEq => ShardingValue::Range {
                    lower: Bound::Unbounded,
                    upper: Bound::Included(v),
                },
                CompareOperator::Gt => ShardingValue::Range {
                    lower: Bound::Excluded(v),
                    upper: Bound::Unbounded,
                },
                CompareOperator::GtEq => ShardingValue::Range {
                    lower: Bound::Included(v),
                    upper: Bound::Unbounded,
                },
            }
        }
        PredicateRightValue::In(values) => {
            let mut list = Vec::with_capacity(values.len());
            for expr in values {
                match evaluate(expr)? {
                    Some(v) => list.push(v),
                    None => return Ok(None),
                }
            }
            ShardingValue::List(list)
        }
        PredicateRightValue::Between { lower, upper } => {
            let (Some(lower), Some(upper)) = (evaluate(lower)?, evaluate(upper)?) else {
                return Ok(None);
            };
            ShardingValue::Range {
                lower: Bound::Included(lower),
                upper: Bound::Included(upper),
            }
        }
        PredicateRightValue::Column(_) => return Ok(None),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlgorithmConfig, ShardingRuleConfig, StrategyConfig, TableRuleConfig};
    use crate::context::{
        AndPredicate, ColumnSegment, OwnerSegment, StatementKind, TableSegment, WhereSegment,
    };

    fn rule() -> ShardingRule {
        let by_user =
            StrategyConfig::standard("user_id", AlgorithmConfig::Mod { sharding_count: 2 });
        ShardingRule::new(
            ShardingRuleConfig::builder()
                .data_sources(["ds_0", "ds_1"])
                .table(TableRuleConfig::new("t_order").with_database_strategy(by_user.clone()))
                .table(TableRuleConfig::new("t_order_item").with_database_strategy(by_user))
                .build(),
        )
        .unwrap()
    }

    fn literal(value: i64) -> ExpressionSegment {
        ExpressionSegment::Literal {
            start: 0,
            stop: 0,
            value: SqlValue::Int(value),
        }
    }

    fn select(where_segment: WhereSegment) -> StatementContext {
        StatementContext::builder(StatementKind::Select, "SELECT ...")
            .table(TableSegment::new(0, 0, "t_order").with_alias("o"))
            .where_segment(where_segment)
            .build()
    }

    #[test]
    fn test_equal_and_in_merge() {
        let ctx = select(WhereSegment::and(
            0,
            0,
            vec![
                PredicateSegment::equal(ColumnSegment::new(0, 0, "user_id"), literal(1)),
                PredicateSegment::in_list(
                    ColumnSegment::new(0, 0, "user_id"),
                    vec![literal(1), literal(3)],
                    0,
                ),
            ],
        ));
        let conditions =
            ShardingConditions::from_where(&rule(), &SchemaMetaData::new(), &ctx, &[]).unwrap();
        assert_eq!(conditions.conditions().len(), 1);
        assert_eq!(
            conditions.conditions()[0].value_for(&["t_order"], "user_id"),
            Some(ShardingValue::single(1))
        );
        assert!(!conditions.is_always_false());
    }

    #[test]
    fn test_contradiction_is_always_false() {
        let ctx = select(WhereSegment::and(
            0,
            0,
            vec![
                PredicateSegment::equal(ColumnSegment::new(0, 0, "user_id"), literal(1)),
                PredicateSegment::equal(ColumnSegment::new(0, 0, "user_id"), literal(2)),
            ],
        ));
        let conditions =
            ShardingConditions::from_where(&rule(), &SchemaMetaData::new(), &ctx, &[]).unwrap();
        assert!(conditions.is_always_false());
    }

    #[test]
    fn test_or_groups_and_parameters() {
        let ctx = select(WhereSegment::or(
            0,
            0,
            vec![
                AndPredicate::new(vec![PredicateSegment::equal(
                    ColumnSegment::new(0, 0, "o.user_id").with_owner(OwnerSegment::new(0, 0, "o")),
                    ExpressionSegment::Parameter {
                        start: 0,
                        stop: 0,
                        index: 0,
                    },
                )]),
                AndPredicate::new(vec![PredicateSegment::between(
                    ColumnSegment::new(0, 0, "user_id"),
                    literal(5),
                    literal(9),
                )]),
            ],
        ));
        let conditions = ShardingConditions::from_where(
            &rule(),
            &SchemaMetaData::new(),
            &ctx,
            &[SqlValue::Int(7)],
        )
        .unwrap();
        assert_eq!(conditions.conditions().len(), 2);
        assert_eq!(
            conditions.conditions()[0].value_for(&["t_order"], "user_id"),
            Some(ShardingValue::single(7))
        );
        assert_eq!(
            conditions.conditions()[1].value_for(&["t_order"], "user_id"),
            Some(ShardingValue::between(5, 9))
        );
    }

    #[test]
    fn test_non_sharding_predicates_yield_no_condition() {
        let ctx = select(WhereSegment::and(
            0,
            0,
            vec![
                PredicateSegment::equal(ColumnSegment::new(0, 0, "status"), literal(1)),
                PredicateSegment::compare(
                    ColumnSegment::new(0, 0, "user_id"),
                    CompareOperator::NotEq,
                    literal(1),
                ),
            ],
        ));
        let conditions =
            ShardingConditions::from_where(&rule(), &SchemaMetaData::new(), &ctx, &[]).unwrap();
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_ambiguous_column_in_join() {
        let ctx = StatementContext::builder(StatementKind::Select, "SELECT ...")
            .table(TableSegment::new(0, 0, "t_order"))
            .table(TableSegment::new(0, 0, "t_order_item"))
            .where_segment(WhereSegment::and(
                0,
                0,
                vec![PredicateSegment::equal(ColumnSegment::new(0, 0, "user_id"), literal(1))],
            ))
            .build();
        let err =
            ShardingConditions::from_where(&rule(), &SchemaMetaData::new(), &ctx, &[]).unwrap_err();
        assert_eq!(
            err,
            RouteError::AmbiguousColumn {
                column: "user_id".to_string()
            }
        );
    }
}
