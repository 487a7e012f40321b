//! Unicast routing: any single valid target.

use crate::error::{RouteError, RouteResultOf};
use crate::route::unit::{RouteMapper, RouteResult, RouteUnit};
use crate::rule::ShardingRule;

/// Picks the first data source hosting every table, and on it the first
/// actual table of each.
///
/// Falls back to the first data source when no tables are involved, and
/// fails when the tables share no data source.
pub(crate) fn route(rule: &ShardingRule, logic_tables: &[String]) -> RouteResultOf<RouteResult> {
    let mut table_rules = Vec::with_capacity(logic_tables.len());
    for logic_table in logic_tables {
        table_rules.push(rule.table_rule(logic_table)?);
    }

    let candidate = rule.data_source_names().iter().find(|ds| {
        table_rules
            .iter()
            .all(|r| r.actual_data_source_names().contains(*ds))
    });
    let Some(data_source) = candidate else {
        return Err(RouteError::NoCommonDataSource {
            tables: logic_tables.to_vec(),
        });
    };

    let mut mappers = Vec::with_capacity(table_rules.len());
    for table_rule in &table_rules {
        if let Some(actual) = table_rule.actual_table_names(data_source).into_iter().next() {
            mappers.push(RouteMapper::new(table_rule.logic_table(), actual));
        }
    }
    Ok([RouteUnit::on(data_source, mappers)].into_iter().collect())
}
