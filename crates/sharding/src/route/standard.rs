//! Standard sharding routing.
//!
//! Tables are routed per binding group: the first table of a group is
//! evaluated against the conditions and every other member follows it
//! positionally. Independent groups are combined per data source by
//! cartesian product.

use indexmap::IndexSet;

use crate::config::ShardingProps;
use crate::error::{RouteError, RouteResultOf};
use crate::route::condition::{ShardingCondition, ShardingConditions};
use crate::route::unit::{RouteMapper, RouteResult, RouteUnit};
use crate::rule::{DataNode, ShardingRule, ShardingStrategy, TableRule};

/// Routes sharded tables of a DML statement.
pub(crate) fn route(
    rule: &ShardingRule,
    logic_tables: &[String],
    broadcast_tables: &[String],
    conditions: &ShardingConditions,
    is_insert: bool,
) -> RouteResultOf<RouteResult> {
    if is_insert {
        let [table] = logic_tables else {
            return Err(RouteError::TableRuleNotFound {
                logic_table: logic_tables.join(", "),
            });
        };
        return route_insert(rule, table, conditions);
    }

    let groups = binding_groups(rule, logic_tables);
    let mut routed: Vec<Vec<NodeMappers>> = Vec::with_capacity(groups.len());
    let mut per_group_sources: Vec<IndexSet<String>> = Vec::with_capacity(groups.len());
    for group in &groups {
        let primary = rule.table_rule(&group[0])?;
        let members: Vec<&str> = group.iter().map(String::as_str).collect();
        let nodes = route_table(rule, primary, &members, conditions)?;
        let mut sources = IndexSet::new();
        let mut mappers = Vec::with_capacity(nodes.len());
        for node in nodes {
            sources.insert(node.data_source.clone());
            mappers.push(binding_mappers(rule, &members, &node));
        }
        per_group_sources.push(sources);
        routed.push(mappers);
    }

    let mut result = RouteResult::new();
    if groups.len() == 1 {
        for mappers in routed.into_iter().flatten() {
            let data_source = mappers.data_source;
            let mut tables = mappers.tables;
            tables.extend(broadcast_tables.iter().map(RouteMapper::identity));
            result.add(RouteUnit::on(&data_source, tables));
        }
        return Ok(result);
    }

    // Cartesian: only data sources every group routes to can host the join.
    let Some(first_sources) = per_group_sources.first() else {
        return Ok(result);
    };
    for data_source in first_sources {
        if !per_group_sources.iter().all(|s| s.contains(data_source)) {
            continue;
        }
        let choices: Vec<Vec<&Vec<RouteMapper>>> = routed
            .iter()
            .map(|group| {
                group
                    .iter()
                    .filter(|m| &m.data_source == data_source)
                    .map(|m| &m.tables)
                    .collect()
            })
            .collect();
        for combination in cartesian(&choices) {
            let mut tables: Vec<RouteMapper> = combination.into_iter().flatten().cloned().collect();
            tables.extend(broadcast_tables.iter().map(RouteMapper::identity));
            result.add(RouteUnit::on(data_source, tables));
        }
    }
    tracing::debug!(units = result.len(), "Cartesian routing");
    Ok(result)
}

fn route_insert(
    rule: &ShardingRule,
    logic_table: &str,
    conditions: &ShardingConditions,
) -> RouteResultOf<RouteResult> {
    let table_rule = rule.table_rule(logic_table)?;
    let mut result = RouteResult::new();
    let mut original_data_nodes = Vec::with_capacity(conditions.conditions().len());
    for condition in conditions.conditions() {
        // A row may land on several nodes, or on none.
        let nodes = route_condition(rule, table_rule, &[logic_table], condition)?;
        for node in &nodes {
            result.add(RouteUnit::on(
                &node.data_source,
                vec![RouteMapper::new(logic_table, node.table.clone())],
            ));
        }
        original_data_nodes.push(nodes);
    }
    result.set_original_data_nodes(original_data_nodes);
    Ok(result)
}

/// Splits tables into binding groups, each led by its first table in
/// statement order.
fn binding_groups(rule: &ShardingRule, logic_tables: &[String]) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    for table in logic_tables {
        let joined = rule
            .find_binding_rule(table)
            .and_then(|binding| groups.iter().position(|g| binding.has_logic_table(&g[0])));
        match joined {
            Some(index) => groups[index].push(table.clone()),
            None => groups.push(vec![table.clone()]),
        }
    }
    groups
}

struct NodeMappers {
    data_source: String,
    tables: Vec<RouteMapper>,
}

fn binding_mappers(rule: &ShardingRule, members: &[&str], node: &DataNode) -> NodeMappers {
    let primary = members[0];
    let mut tables = vec![RouteMapper::new(primary, node.table.clone())];
    if let Some(binding) = rule.find_binding_rule(primary) {
        for member in &members[1..] {
            if let Some(actual) =
                binding.binding_actual_table(&node.data_source, member, primary, &node.table)
            {
                tables.push(RouteMapper::new(*member, actual));
            }
        }
    }
    NodeMappers {
        data_source: node.data_source.clone(),
        tables,
    }
}

/// Routes one table (with its binding members) over all conditions.
fn route_table(
    rule: &ShardingRule,
    table_rule: &TableRule,
    members: &[&str],
    conditions: &ShardingConditions,
) -> RouteResultOf<Vec<DataNode>> {
    if conditions.is_empty() {
        return route_condition(rule, table_rule, members, &ShardingCondition::new());
    }
    let mut nodes: IndexSet<DataNode> = IndexSet::new();
    for condition in conditions.conditions() {
        if condition.is_always_false() {
            continue;
        }
        nodes.extend(route_condition(rule, table_rule, members, condition)?);
    }
    Ok(nodes.into_iter().collect())
}

fn route_condition(
    rule: &ShardingRule,
    table_rule: &TableRule,
    members: &[&str],
    condition: &ShardingCondition,
) -> RouteResultOf<Vec<DataNode>> {
    let value_of = |strategy: &ShardingStrategy| {
        strategy
            .sharding_column()
            .and_then(|column| condition.value_for(members, column))
    };
    let database_value = value_of(table_rule.database_strategy());
    let table_value = value_of(table_rule.table_strategy());
    let props: &ShardingProps = rule.props();

    let sharded =
        |strategy: &ShardingStrategy| matches!(strategy, ShardingStrategy::Standard { .. });
    if database_value.is_none()
        && table_value.is_none()
        && (sharded(table_rule.database_strategy()) || sharded(table_rule.table_strategy()))
    {
        tracing::warn!(
            table = table_rule.logic_table(),
            "No sharding condition found, routing to all data nodes"
        );
    }

    let data_sources = table_rule.database_strategy().do_sharding(
        &table_rule.actual_data_source_names(),
        database_value.as_ref(),
        table_rule.logic_table(),
        props,
    )?;
    let mut nodes = Vec::new();
    for data_source in data_sources {
        let tables = table_rule.table_strategy().do_sharding(
            &table_rule.actual_table_names(&data_source),
            table_value.as_ref(),
            table_rule.logic_table(),
            props,
        )?;
        nodes.extend(tables.into_iter().map(|t| DataNode::new(data_source.clone(), t)));
    }
    Ok(nodes)
}

fn cartesian<'a, T>(choices: &[Vec<&'a T>]) -> Vec<Vec<&'a T>> {
    let mut combinations: Vec<Vec<&'a T>> = vec![Vec::new()];
    for options in choices {
        let mut next = Vec::with_capacity(combinations.len() * options.len());
        for prefix in &combinations {
            for option in options {
                let mut combination = prefix.clone();
                combination.push(*option);
                next.push(combination);
            }
        }
        combinations = next;
    }
    combinations
}
