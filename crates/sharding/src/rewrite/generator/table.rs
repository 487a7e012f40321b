//! Table name tokens.

use std::collections::BTreeMap;

use crate::context::{OwnerSegment, TablesContext};
use crate::rewrite::generator::TokenGenerateContext;
use crate::rewrite::token::SqlToken;
use crate::rule::ShardingRule;

/// One token per table reference with a rule, plus one per owner qualifier
/// that names such a table directly. Qualifiers matching an alias are left
/// alone.
pub(super) fn generate(context: &TokenGenerateContext<'_>) -> Vec<SqlToken> {
    let tables = context.statement.tables();
    // Keyed by start so a segment reachable through two paths yields one token.
    let mut tokens: BTreeMap<usize, SqlToken> = BTreeMap::new();

    for segment in tables.segments() {
        let logic_table = segment.table_name().to_ascii_lowercase();
        if !has_rule(context.rule, &logic_table) {
            continue;
        }
        tokens.insert(
            segment.start,
            SqlToken::Table {
                start: segment.start,
                stop: segment.stop,
                logic_table,
                quote: segment.identifier.quote(),
            },
        );
    }

    let owners = context
        .statement
        .projections()
        .iter()
        .filter_map(|p| p.owner())
        .chain(
            context
                .statement
                .owned_columns()
                .into_iter()
                .filter_map(|c| c.owner.as_ref()),
        );
    for owner in owners {
        if let Some(token) = owner_token(context.rule, tables, owner) {
            tokens.entry(owner.start).or_insert(token);
        }
    }
    tokens.into_values().collect()
}

fn owner_token(
    rule: &ShardingRule,
    tables: &TablesContext,
    owner: &OwnerSegment,
) -> Option<SqlToken> {
    let name = owner.identifier.value();
    if tables.is_alias(name) {
        return None;
    }
    let logic_table = name.to_ascii_lowercase();
    let is_statement_table = tables.table_names().contains(&logic_table);
    (is_statement_table && has_rule(rule, &logic_table)).then(|| SqlToken::Table {
        start: owner.start,
        stop: owner.stop,
        logic_table,
        quote: owner.identifier.quote(),
    })
}

fn has_rule(rule: &ShardingRule, logic_table: &str) -> bool {
    rule.is_sharding_table(logic_table) || rule.is_broadcast_table(logic_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ShardingRuleConfig, TableRuleConfig};
    use crate::context::{
        ColumnSegment, ProjectionSegment, StatementContext, StatementKind, TableSegment,
    };
    use crate::route::RouteResult;

    fn rule() -> ShardingRule {
        ShardingRule::new(
            ShardingRuleConfig::builder()
                .data_sources(["ds_0"])
                .table(TableRuleConfig::new("t_order"))
                .build(),
        )
        .unwrap()
    }

    fn tokens(statement: &StatementContext) -> Vec<SqlToken> {
        let rule = rule();
        let route_result = RouteResult::new();
        generate(&TokenGenerateContext {
            rule: &rule,
            statement,
            route_result: &route_result,
            parameters: &[],
            generated_key: None,
            insert_columns: &[],
        })
    }

    #[test]
    fn test_table_and_owner_tokens() {
        // SELECT t_order.order_id FROM t_order, t_log ORDER BY t_order.order_id
        let sql = "SELECT t_order.order_id FROM t_order, t_log ORDER BY t_order.order_id";
        let statement = StatementContext::builder(StatementKind::Select, sql)
            .projection(ProjectionSegment::Column(
                ColumnSegment::new(15, 22, "order_id")
                    .with_owner(OwnerSegment::new(7, 13, "t_order")),
            ))
            .table(TableSegment::new(29, 35, "t_order"))
            .table(TableSegment::new(38, 42, "t_log"))
            .order_by(
                ColumnSegment::new(61, 68, "order_id")
                    .with_owner(OwnerSegment::new(53, 59, "t_order")),
            )
            .build();
        let starts: Vec<usize> = tokens(&statement).iter().map(SqlToken::start).collect();
        assert_eq!(starts, vec![7, 29, 53]);
    }

    #[test]
    fn test_alias_owner_is_skipped() {
        let sql = "SELECT o.order_id FROM t_order o";
        let statement = StatementContext::builder(StatementKind::Select, sql)
            .projection(ProjectionSegment::Column(
                ColumnSegment::new(9, 16, "order_id").with_owner(OwnerSegment::new(7, 7, "o")),
            ))
            .table(TableSegment::new(23, 29, "t_order").with_alias("o"))
            .build();
        let tokens = tokens(&statement);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].start(), 23);
    }
}
