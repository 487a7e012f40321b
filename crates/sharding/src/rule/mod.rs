//! The immutable sharding rule snapshot.
//!
//! A [`ShardingRule`] is built once from a [`ShardingRuleConfig`] and then
//! only read. All configuration errors surface from [`ShardingRule::new`];
//! a rule that exists is internally consistent. Reconfiguration builds a
//! new rule and swaps it in through [`RuleHolder`].

pub mod binding;
pub mod data_node;
pub mod holder;
pub mod inline;
pub mod strategy;
pub mod table_rule;

pub use binding::BindingTableRule;
pub use data_node::DataNode;
pub use holder::RuleHolder;
pub use strategy::{InlineTemplate, ShardingAlgorithm, ShardingStrategy, ShardingValue};
pub use table_rule::TableRule;

use indexmap::IndexMap;

use crate::config::{ShardingProps, ShardingRuleConfig};
use crate::error::{ConfigError, RouteError, RouteResultOf};

/// Resolved sharding rules for all logic tables.
#[derive(Debug, Clone)]
pub struct ShardingRule {
    data_sources: Vec<String>,
    table_rules: IndexMap<String, TableRule>,
    broadcast_rules: IndexMap<String, TableRule>,
    binding_rules: Vec<BindingTableRule>,
    default_data_source: Option<String>,
    props: ShardingProps,
}

impl ShardingRule {
    /// Builds and validates a rule from configuration.
    pub fn new(config: ShardingRuleConfig) -> Result<Self, ConfigError> {
        if config.data_sources.is_empty() {
            return Err(ConfigError::NoDataSources);
        }
        if let Some(ds) = &config.default_data_source
            && !config.data_sources.contains(ds)
        {
            return Err(ConfigError::UnknownDefaultDataSource {
                data_source: ds.clone(),
            });
        }

        let mut table_rules = IndexMap::new();
        for table in &config.tables {
            let rule = TableRule::new(
                table,
                &config.data_sources,
                config.default_database_strategy.as_ref(),
                config.default_table_strategy.as_ref(),
            )?;
            let name = rule.logic_table().to_string();
            if table_rules.insert(name.clone(), rule).is_some() {
                return Err(ConfigError::DuplicateTableRule { logic_table: name });
            }
        }

        let mut broadcast_rules = IndexMap::new();
        for table in &config.broadcast_tables {
            let name = table.to_ascii_lowercase();
            if table_rules.contains_key(&name) {
                return Err(ConfigError::BroadcastTableSharded { logic_table: name });
            }
            broadcast_rules.insert(name, TableRule::broadcast(table, &config.data_sources));
        }

        let mut binding_rules = Vec::with_capacity(config.binding_tables.len());
        for group in &config.binding_tables {
            let mut members: Vec<TableRule> = Vec::with_capacity(group.len());
            for table in group {
                let name = table.to_ascii_lowercase();
                let rule = table_rules
                    .get(&name)
                    .ok_or(ConfigError::UnknownBindingTable { logic_table: name })?;
                if let Some(first) = members.first()
                    && !first.has_same_topology(rule)
                {
                    return Err(ConfigError::InconsistentBindingTables {
                        first: first.logic_table().to_string(),
                        second: rule.logic_table().to_string(),
                    });
                }
                members.push(rule.clone());
            }
            binding_rules.push(BindingTableRule::new(members));
        }

        tracing::debug!(
            data_sources = config.data_sources.len(),
            tables = table_rules.len(),
            broadcast_tables = broadcast_rules.len(),
            binding_groups = binding_rules.len(),
            "Built sharding rule"
        );

        Ok(Self {
            data_sources: config.data_sources,
            table_rules,
            broadcast_rules,
            binding_rules,
            default_data_source: config.default_data_source,
            props: config.props,
        })
    }

    /// Data source names in configuration order.
    pub fn data_source_names(&self) -> &[String] {
        &self.data_sources
    }

    /// The default data source for unsharded tables.
    ///
    /// With a single configured data source that one is the default.
    pub fn default_data_source(&self) -> Option<&str> {
        match (&self.default_data_source, self.data_sources.as_slice()) {
            (Some(ds), _) => Some(ds.as_str()),
            (None, [only]) => Some(only.as_str()),
            (None, _) => None,
        }
    }

    /// Runtime properties.
    pub fn props(&self) -> &ShardingProps {
        &self.props
    }

    /// Table rules of sharded tables.
    pub fn table_rules(&self) -> impl Iterator<Item = &TableRule> {
        self.table_rules.values()
    }

    /// Finds the rule of a sharded table.
    pub fn find_table_rule(&self, logic_table: &str) -> Option<&TableRule> {
        self.table_rules.get(&logic_table.to_ascii_lowercase())
    }

    /// Returns the rule of a sharded or broadcast table.
    pub fn table_rule(&self, logic_table: &str) -> RouteResultOf<&TableRule> {
        let name = logic_table.to_ascii_lowercase();
        self.table_rules
            .get(&name)
            .or_else(|| self.broadcast_rules.get(&name))
            .ok_or(RouteError::TableRuleNotFound { logic_table: name })
    }

    /// Finds the sharded table owning an actual table name.
    pub fn find_table_rule_by_actual_table(&self, actual_table: &str) -> Option<&TableRule> {
        self.table_rules.values().find(|r| r.is_existed(actual_table))
    }

    /// Returns true for a table with a table rule.
    pub fn is_sharding_table(&self, logic_table: &str) -> bool {
        self.find_table_rule(logic_table).is_some()
    }

    /// Returns true for a broadcast table.
    pub fn is_broadcast_table(&self, logic_table: &str) -> bool {
        self.broadcast_rules.contains_key(&logic_table.to_ascii_lowercase())
    }

    /// Returns true for a table that is neither sharded nor broadcast.
    pub fn is_unsharded_table(&self, logic_table: &str) -> bool {
        !self.is_sharding_table(logic_table) && !self.is_broadcast_table(logic_table)
    }

    /// Returns true if every table is a broadcast table.
    pub fn is_all_broadcast_tables(&self, logic_tables: &[String]) -> bool {
        !logic_tables.is_empty() && logic_tables.iter().all(|t| self.is_broadcast_table(t))
    }

    /// Returns true if every table lives on the default data source.
    pub fn is_all_unsharded_tables(&self, logic_tables: &[String]) -> bool {
        !logic_tables.is_empty() && logic_tables.iter().all(|t| self.is_unsharded_table(t))
    }

    /// Finds the binding group containing a table.
    pub fn find_binding_rule(&self, logic_table: &str) -> Option<&BindingTableRule> {
        self.binding_rules
            .iter()
            .find(|b| b.has_logic_table(logic_table))
    }

    /// Returns true if all tables belong to one binding group.
    pub fn is_all_binding_tables(&self, logic_tables: &[String]) -> bool {
        let Some(first) = logic_tables.first() else {
            return false;
        };
        self.find_binding_rule(first)
            .is_some_and(|b| logic_tables.iter().all(|t| b.has_logic_table(t)))
    }

    /// The generated key column of a table.
    pub fn generate_key_column(&self, logic_table: &str) -> Option<&str> {
        self.find_table_rule(logic_table)
            .and_then(TableRule::generate_key_column)
    }

    /// Returns true if the column shards the table.
    pub fn is_sharding_column(&self, column: &str, logic_table: &str) -> bool {
        self.find_table_rule(logic_table)
            .is_some_and(|r| r.is_sharding_column(column))
    }

    /// Finds the logic table owning an actual table name.
    pub fn find_logic_table_by_actual(&self, actual_table: &str) -> Option<&str> {
        self.find_table_rule_by_actual_table(actual_table)
            .map(TableRule::logic_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlgorithmConfig, StrategyConfig, TableRuleConfig};

    fn config() -> ShardingRuleConfig {
        ShardingRuleConfig::builder()
            .data_sources(["ds_0", "ds_1"])
            .table(
                TableRuleConfig::new("t_order")
                    .with_actual_data_nodes("ds_${0..1}.t_order_${0..1}")
                    .with_database_strategy(StrategyConfig::standard(
                        "user_id",
                        AlgorithmConfig::Mod { sharding_count: 2 },
                    )),
            )
            .table(
                TableRuleConfig::new("t_order_item")
                    .with_actual_data_nodes("ds_${0..1}.t_order_item_${0..1}"),
            )
            .binding_group(["t_order", "t_order_item"])
            .broadcast_table("t_config")
            .default_data_source("ds_0")
            .build()
    }

    #[test]
    fn test_new() {
        let rule = ShardingRule::new(config()).unwrap();
        assert_eq!(rule.data_source_names(), &["ds_0", "ds_1"]);
        assert!(rule.is_sharding_table("T_ORDER"));
        assert!(rule.is_broadcast_table("t_config"));
        assert!(rule.is_unsharded_table("t_user"));
        assert!(rule.is_all_binding_tables(&["t_order".to_string(), "t_order_item".to_string()]));
        assert!(!rule.is_all_binding_tables(&["t_order".to_string(), "t_config".to_string()]));
        assert_eq!(rule.table_rule("t_config").unwrap().actual_data_nodes().len(), 2);
        assert_eq!(
            rule.table_rule("t_missing").unwrap_err(),
            RouteError::TableRuleNotFound {
                logic_table: "t_missing".to_string()
            }
        );
        assert_eq!(rule.find_logic_table_by_actual("t_order_item_1"), Some("t_order_item"));
        assert!(rule.is_sharding_column("user_id", "t_order"));
    }

    #[test]
    fn test_no_data_sources() {
        let err = ShardingRule::new(ShardingRuleConfig::default()).unwrap_err();
        assert_eq!(err, ConfigError::NoDataSources);
    }

    #[test]
    fn test_unknown_default_data_source() {
        let mut config = config();
        config.default_data_source = Some("ds_9".to_string());
        assert_eq!(
            ShardingRule::new(config).unwrap_err(),
            ConfigError::UnknownDefaultDataSource {
                data_source: "ds_9".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_table_rule() {
        let mut config = config();
        config.tables.push(TableRuleConfig::new("T_ORDER"));
        assert_eq!(
            ShardingRule::new(config).unwrap_err(),
            ConfigError::DuplicateTableRule {
                logic_table: "t_order".to_string()
            }
        );
    }

    #[test]
    fn test_broadcast_table_sharded() {
        let mut config = config();
        config.broadcast_tables.push("t_order".to_string());
        assert!(matches!(
            ShardingRule::new(config),
            Err(ConfigError::BroadcastTableSharded { .. })
        ));
    }

    #[test]
    fn test_binding_validation() {
        let mut unknown = config();
        unknown.binding_tables.push(vec!["t_order".to_string(), "t_unknown".to_string()]);
        assert_eq!(
            ShardingRule::new(unknown).unwrap_err(),
            ConfigError::UnknownBindingTable {
                logic_table: "t_unknown".to_string()
            }
        );

        let mut mismatched = config();
        mismatched.tables[1].actual_data_nodes = Some("ds_${0..1}.t_order_item".to_string());
        assert!(matches!(
            ShardingRule::new(mismatched),
            Err(ConfigError::InconsistentBindingTables { .. })
        ));
    }
}
