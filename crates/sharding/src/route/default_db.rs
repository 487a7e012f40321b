//! Routing of unsharded tables to the default data source.

use crate::error::{RouteError, RouteResultOf};
use crate::route::unit::{RouteMapper, RouteResult, RouteUnit};
use crate::rule::ShardingRule;

/// A single unit on the default data source with identity table mappings.
pub(crate) fn route(rule: &ShardingRule, logic_tables: &[String]) -> RouteResultOf<RouteResult> {
    let data_source = rule
        .default_data_source()
        .ok_or_else(|| RouteError::NoDefaultDataSource {
            tables: logic_tables.to_vec(),
        })?;
    let mappers = logic_tables.iter().map(RouteMapper::identity).collect();
    Ok([RouteUnit::on(data_source, mappers)].into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShardingRuleConfig;

    #[test]
    fn test_identity_mapping() {
        let rule = ShardingRule::new(
            ShardingRuleConfig::builder()
                .data_sources(["ds_0", "ds_1"])
                .default_data_source("ds_1")
                .build(),
        )
        .unwrap();
        let result = route(&rule, &["t_user".to_string()]).unwrap();
        let unit = result.units().next().unwrap();
        assert_eq!(unit.data_source_name(), "ds_1");
        assert_eq!(unit.actual_table_name("t_user"), Some("t_user"));
    }

    #[test]
    fn test_no_default() {
        let rule = ShardingRule::new(
            ShardingRuleConfig::builder()
                .data_sources(["ds_0", "ds_1"])
                .build(),
        )
        .unwrap();
        assert_eq!(
            route(&rule, &["t_user".to_string()]).unwrap_err(),
            RouteError::NoDefaultDataSource {
                tables: vec!["t_user".to_string()]
            }
        );
    }
}
