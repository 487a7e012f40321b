use crate::context::InsertStatementContext;
use crate::error::ShardingResult;
use crate::rule::ShardingRule;
use crate::value::SqlValue;

/// Key values of one INSERT, one per row in row order.
///
/// When the statement omits the key column the values are freshly
/// generated and must be injected into the rewritten SQL; otherwise they
/// are the values the statement supplies. Either way they are what the
/// caller reports as generated keys.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedKeyContext {
    column_name: String,
    generated: bool,
    values: Vec<SqlValue>,
}

impl GeneratedKeyContext {
    /// Builds the key context of an INSERT.
    ///
    /// `column_names` are the columns every row supplies, as resolved by
    /// [`InsertStatementContext::column_names`]. Returns `None` when the
    /// table has no key generator.
    pub fn get(
        rule: &ShardingRule,
        insert: &InsertStatementContext,
        column_names: &[String],
        parameters: &[SqlValue],
    ) -> ShardingResult<Option<Self>> {
        let Some(strategy) = rule
            .find_table_rule(&insert.table)
            .and_then(|r| r.key_generate())
        else {
            return Ok(None);
        };
        let column_name = strategy.column().to_string();

        if let Some(position) = column_names
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&column_name))
        {
            let mut values = Vec::with_capacity(insert.values.len());
            for row in &insert.values {
                let value = match row.values.get(position) {
                    Some(expr) => expr.evaluate(parameters)?.unwrap_or(SqlValue::Null),
                    None => SqlValue::Null,
                };
                values.push(value);
            }
            return Ok(Some(Self {
                column_name,
                generated: false,
                values,
            }));
        }

        let mut values = Vec::with_capacity(insert.values.len());
        for _ in &insert.values {
            values.push(strategy.generate_key()?);
        }
        tracing::debug!(
            table = %insert.table,
            column = %column_name,
            count = values.len(),
            "Generated keys"
        );
        Ok(Some(Self {
            column_name,
            generated: true,
            values,
        }))
    }

    /// The key column.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Returns true when the values were generated and must be injected.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Key values in row order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeyGeneratorConfig, ShardingRuleConfig, TableRuleConfig};
    use crate::context::{ExpressionSegment, InsertColumnsSegment, InsertValuesSegment};

    fn rule() -> ShardingRule {
        ShardingRule::new(
            ShardingRuleConfig::builder()
                .data_sources(["ds_0"])
                .table(
                    TableRuleConfig::new("t_order")
                        .with_key_generator(KeyGeneratorConfig::snowflake("order_id")),
                )
                .table(TableRuleConfig::new("t_plain"))
                .build(),
        )
        .unwrap()
    }

    fn insert(table: &str, rows: usize) -> InsertStatementContext {
        let values = (0..rows)
            .map(|i| {
                InsertValuesSegment::new(
                    i * 10,
                    i * 10 + 4,
                    vec![ExpressionSegment::Parameter {
                        start: i * 10 + 1,
                        stop: i * 10 + 1,
                        index: i,
                    }],
                )
            })
            .collect();
        InsertStatementContext::new(table, Some(InsertColumnsSegment::new(0, 0, vec![])), values)
    }

    #[test]
    fn test_generates_one_key_per_row() {
        let params = vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)];
        let context = GeneratedKeyContext::get(
            &rule(),
            &insert("t_order", 3),
            &["user_id".to_string()],
            &params,
        )
        .unwrap()
        .unwrap();
        assert!(context.is_generated());
        assert_eq!(context.column_name(), "order_id");
        assert_eq!(context.values().len(), 3);
        let mut keys: Vec<i64> = context.values().iter().filter_map(SqlValue::as_i64).collect();
        let sorted = {
            let mut s = keys.clone();
            s.sort_unstable();
            s
        };
        assert_eq!(keys, sorted);
        keys.dedup();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_supplied_key_is_reported() {
        let params = vec![SqlValue::Int(100), SqlValue::Int(200)];
        let context = GeneratedKeyContext::get(
            &rule(),
            &insert("t_order", 2),
            &["ORDER_ID".to_string()],
            &params,
        )
        .unwrap()
        .unwrap();
        assert!(!context.is_generated());
        assert_eq!(context.values(), &[SqlValue::Int(100), SqlValue::Int(200)]);
    }

    #[test]
    fn test_no_key_generator() {
        let context = GeneratedKeyContext::get(
            &rule(),
            &insert("t_plain", 1),
            &["id".to_string()],
            &[SqlValue::Int(1)],
        )
        .unwrap();
        assert!(context.is_none());
    }
}
