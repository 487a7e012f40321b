//! Broadcast routing: every node of a table, or every data source.

use crate::error::{RouteError, RouteResultOf};
use crate::metadata::SchemaMetaData;
use crate::route::unit::{RouteMapper, RouteResult, RouteUnit};
use crate::rule::ShardingRule;

/// One unit per actual data node of each table.
pub(crate) fn route_tables(
    rule: &ShardingRule,
    logic_tables: &[String],
) -> RouteResultOf<RouteResult> {
    let mut result = RouteResult::new();
    for logic_table in logic_tables {
        let table_rule = rule.table_rule(logic_table)?;
        for node in table_rule.actual_data_nodes() {
            result.add(RouteUnit::on(
                &node.data_source,
                vec![RouteMapper::new(logic_table.as_str(), node.table.clone())],
            ));
        }
    }
    Ok(result)
}

/// Resolves the tables owning the indexes, then broadcasts to them.
pub(crate) fn route_indexes(
    rule: &ShardingRule,
    schema: &SchemaMetaData,
    indexes: &[String],
) -> RouteResultOf<RouteResult> {
    let mut logic_tables: Vec<String> = Vec::new();
    for index in indexes {
        let owners = schema.find_tables_by_index(index);
        if owners.is_empty() {
            return Err(RouteError::IndexNotFound {
                index: index.clone(),
            });
        }
        for owner in owners {
            if !logic_tables.iter().any(|t| t == owner) {
                logic_tables.push(owner.to_string());
            }
        }
    }
    tracing::debug!(?indexes, tables = ?logic_tables, "Resolved index owners");
    route_tables(rule, &logic_tables)
}

/// One unit per data source without table mappings.
pub(crate) fn route_database(rule: &ShardingRule) -> RouteResult {
    rule.data_source_names()
        .iter()
        .map(|ds| RouteUnit::on(ds, Vec::new()))
        .collect()
}
