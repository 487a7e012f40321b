//! Per logic table rules.

use crate::config::{StrategyConfig, TableRuleConfig};
use crate::error::ConfigError;
use crate::keygen::KeyGenerateStrategy;
use crate::rule::data_node::DataNode;
use crate::rule::inline;
use crate::rule::strategy::ShardingStrategy;

/// The resolved rule of one logic table.
#[derive(Debug, Clone)]
pub struct TableRule {
    logic_table: String,
    actual_data_nodes: Vec<DataNode>,
    database_strategy: ShardingStrategy,
    table_strategy: ShardingStrategy,
    key_generate: Option<KeyGenerateStrategy>,
}

impl TableRule {
    /// Builds a table rule from configuration.
    ///
    /// Strategies missing from `config` fall back to the defaults; a missing
    /// default means no sharding on that level.
    pub fn new(
        config: &TableRuleConfig,
        data_sources: &[String],
        default_database_strategy: Option<&StrategyConfig>,
        default_table_strategy: Option<&StrategyConfig>,
    ) -> Result<Self, ConfigError> {
        let logic_table = config.logic_table.to_ascii_lowercase();
        let actual_data_nodes = match &config.actual_data_nodes {
            Some(expression) => {
                let mut nodes = Vec::new();
                for text in inline::expand(expression)? {
                    let node = DataNode::parse(&text).ok_or_else(|| {
                        ConfigError::InvalidDataNodeExpression {
                            expression: expression.clone(),
                            message: format!("'{text}' is not in data_source.table form"),
                        }
                    })?;
                    if !data_sources.contains(&node.data_source) {
                        return Err(ConfigError::UnknownDataSource {
                            logic_table,
                            data_source: node.data_source,
                        });
                    }
                    if !nodes.contains(&node) {
                        nodes.push(node);
                    }
                }
                nodes
            }
            None => data_sources
                .iter()
                .map(|ds| DataNode::new(ds.clone(), logic_table.clone()))
                .collect(),
        };

        let strategy = |own: &Option<StrategyConfig>, fallback: Option<&StrategyConfig>| {
            own.as_ref()
                .or(fallback)
                .map(ShardingStrategy::from_config)
                .transpose()
                .map(|s| s.unwrap_or(ShardingStrategy::None))
        };

        Ok(Self {
            database_strategy: strategy(&config.database_strategy, default_database_strategy)?,
            table_strategy: strategy(&config.table_strategy, default_table_strategy)?,
            key_generate: config
                .key_generator
                .as_ref()
                .map(KeyGenerateStrategy::from_config),
            logic_table,
            actual_data_nodes,
        })
    }

    /// Creates the rule of a broadcast table: one node per data source,
    /// named like the logic table.
    pub fn broadcast(logic_table: &str, data_sources: &[String]) -> Self {
        let logic_table = logic_table.to_ascii_lowercase();
        Self {
            actual_data_nodes: data_sources
                .iter()
                .map(|ds| DataNode::new(ds.clone(), logic_table.clone()))
                .collect(),
            logic_table,
            database_strategy: ShardingStrategy::None,
            table_strategy: ShardingStrategy::None,
            key_generate: None,
        }
    }

    /// Replaces the key generation strategy.
    pub fn with_key_generate(mut self, key_generate: KeyGenerateStrategy) -> Self {
        self.key_generate = Some(key_generate);
        self
    }

    /// The lowercase logic table name.
    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    /// Actual data nodes in configuration order.
    pub fn actual_data_nodes(&self) -> &[DataNode] {
        &self.actual_data_nodes
    }

    /// The database strategy.
    pub fn database_strategy(&self) -> &ShardingStrategy {
        &self.database_strategy
    }

    /// The table strategy.
    pub fn table_strategy(&self) -> &ShardingStrategy {
        &self.table_strategy
    }

    /// The key generation strategy.
    pub fn key_generate(&self) -> Option<&KeyGenerateStrategy> {
        self.key_generate.as_ref()
    }

    /// The generated key column.
    pub fn generate_key_column(&self) -> Option<&str> {
        self.key_generate.as_ref().map(KeyGenerateStrategy::column)
    }

    /// Returns true if the column drives either strategy.
    pub fn is_sharding_column(&self, column: &str) -> bool {
        [&self.database_strategy, &self.table_strategy]
            .iter()
            .filter_map(|s| s.sharding_column())
            .any(|c| c.eq_ignore_ascii_case(column))
    }

    /// Distinct data source names in node order.
    pub fn actual_data_source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for node in &self.actual_data_nodes {
            if !names.contains(&node.data_source) {
                names.push(node.data_source.clone());
            }
        }
        names
    }

    /// Actual table names on one data source, in node order.
    pub fn actual_table_names(&self, data_source: &str) -> Vec<String> {
        self.actual_data_nodes
            .iter()
            .filter(|n| n.data_source == data_source)
            .map(|n| n.table.clone())
            .collect()
    }

    /// Position of an actual table among the tables of its data source.
    pub fn find_actual_table_index(&self, data_source: &str, actual_table: &str) -> Option<usize> {
        self.actual_data_nodes
            .iter()
            .filter(|n| n.data_source == data_source)
            .position(|n| n.table.eq_ignore_ascii_case(actual_table))
    }

    /// Returns true if any node uses the actual table name.
    pub fn is_existed(&self, actual_table: &str) -> bool {
        self.actual_data_nodes
            .iter()
            .any(|n| n.table.eq_ignore_ascii_case(actual_table))
    }

    /// Returns true when the two rules have the same number of tables on
    /// the same data sources.
    pub fn has_same_topology(&self, other: &TableRule) -> bool {
        let sources = self.actual_data_source_names();
        sources == other.actual_data_source_names()
            && sources
                .iter()
                .all(|ds| self.actual_table_names(ds).len() == other.actual_table_names(ds).len())
    }
}
