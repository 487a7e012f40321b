//! Configuration types for sharding rules.
//!
//! The configuration describes, per logic table, where its actual data nodes
//! live and how shard values map onto them. It is plain data: loading it from
//! YAML/JSON happens outside this crate, and turning it into an immutable
//! [`ShardingRule`](crate::rule::ShardingRule) validates it.
//!
//! # Example
//!
//! ```
//! use helios_sharding::config::{
//!     AlgorithmConfig, KeyGeneratorConfig, ShardingRuleConfig, StrategyConfig, TableRuleConfig,
//! };
//!
//! let config = ShardingRuleConfig::builder()
//!     .data_sources(["ds_0", "ds_1"])
//!     .table(
//!         TableRuleConfig::new("t_order")
//!             .with_actual_data_nodes("ds_${0..1}.t_order_${0..1}")
//!             .with_database_strategy(StrategyConfig::standard(
//!                 "user_id",
//!                 AlgorithmConfig::Mod { sharding_count: 2 },
//!             ))
//!             .with_table_strategy(StrategyConfig::standard(
//!                 "order_id",
//!                 AlgorithmConfig::Mod { sharding_count: 2 },
//!             ))
//!             .with_key_generator(KeyGeneratorConfig::snowflake("order_id")),
//!     )
//!     .broadcast_table("t_config")
//!     .build();
//!
//! assert_eq!(config.tables.len(), 1);
//! assert_eq!(config.broadcast_tables, vec!["t_config".to_string()]);
//! ```

use serde::{Deserialize, Serialize};

/// Complete sharding rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardingRuleConfig {
    /// Names of all physical data sources, in routing order.
    pub data_sources: Vec<String>,

    /// Table rules for sharded logic tables.
    #[serde(default)]
    pub tables: Vec<TableRuleConfig>,

    /// Groups of logic tables that always route together.
    #[serde(default)]
    pub binding_tables: Vec<Vec<String>>,

    /// Tables replicated on every data source.
    #[serde(default)]
    pub broadcast_tables: Vec<String>,

    /// Data source for tables without a table rule.
    #[serde(default)]
    pub default_data_source: Option<String>,

    /// Database strategy for table rules that do not declare one.
    #[serde(default)]
    pub default_database_strategy: Option<StrategyConfig>,

    /// Table strategy for table rules that do not declare one.
    #[serde(default)]
    pub default_table_strategy: Option<StrategyConfig>,

    /// Runtime properties.
    #[serde(default)]
    pub props: ShardingProps,
}

impl ShardingRuleConfig {
    /// Creates a builder for constructing configuration.
    pub fn builder() -> ShardingRuleConfigBuilder {
        ShardingRuleConfigBuilder::new()
    }

    /// Parses configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Rule configuration for one logic table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRuleConfig {
    /// The table name as written in SQL.
    pub logic_table: String,

    /// Inline expression of actual data nodes, e.g. `ds_${0..1}.t_order_${0..1}`.
    ///
    /// When absent the table has one node per data source named like the
    /// logic table.
    #[serde(default)]
    pub actual_data_nodes: Option<String>,

    /// Strategy choosing data sources.
    #[serde(default)]
    pub database_strategy: Option<StrategyConfig>,

    /// Strategy choosing actual tables within a data source.
    #[serde(default)]
    pub table_strategy: Option<StrategyConfig>,

    /// Key generation for inserts that omit the key column.
    #[serde(default)]
    pub key_generator: Option<KeyGeneratorConfig>,
}

impl TableRuleConfig {
    /// Creates a table rule configuration for a logic table.
    pub fn new(logic_table: impl Into<String>) -> Self {
        Self {
            logic_table: logic_table.into(),
            actual_data_nodes: None,
            database_strategy: None,
            table_strategy: None,
            key_generator: None,
        }
    }

    /// Sets the actual data nodes expression.
    pub fn with_actual_data_nodes(mut self, expression: impl Into<String>) -> Self {
        self.actual_data_nodes = Some(expression.into());
        self
    }

    /// Sets the database strategy.
    pub fn with_database_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.database_strategy = Some(strategy);
        self
    }

    /// Sets the table strategy.
    pub fn with_table_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.table_strategy = Some(strategy);
        self
    }

    /// Sets the key generator.
    pub fn with_key_generator(mut self, key_generator: KeyGeneratorConfig) -> Self {
        self.key_generator = Some(key_generator);
        self
    }
}

/// Sharding strategy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// No sharding: every available target is used.
    None,

    /// Single-column sharding through an algorithm.
    Standard {
        /// Column whose value selects the target.
        sharding_column: String,
        /// Algorithm mapping the value to a target.
        algorithm: AlgorithmConfig,
    },
}

impl StrategyConfig {
    /// Creates a standard strategy.
    pub fn standard(sharding_column: impl Into<String>, algorithm: AlgorithmConfig) -> Self {
        StrategyConfig::Standard {
            sharding_column: sharding_column.into(),
            algorithm,
        }
    }
}

/// Sharding algorithm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlgorithmConfig {
    /// Integer value modulo the shard count, matched against target suffixes.
    Mod {
        /// Number of shards.
        sharding_count: u32,
    },

    /// CRC32 of the value text modulo the shard count.
    HashMod {
        /// Number of shards.
        sharding_count: u32,
    },

    /// Expression such as `t_order_${order_id % 2}`.
    Inline {
        /// The inline expression.
        expression: String,
    },

    /// Ascending boundaries splitting the integer line into partitions.
    BoundaryRange {
        /// Partition boundaries; partition `i` ends before `boundaries[i]`.
        boundaries: Vec<i64>,
    },
}

/// Key generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyGeneratorConfig {
    /// The generated column.
    pub column: String,

    /// The generator kind.
    #[serde(default)]
    pub generator: KeyGeneratorKind,
}

impl KeyGeneratorConfig {
    /// Creates a snowflake key generator with worker id 0.
    pub fn snowflake(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            generator: KeyGeneratorKind::default(),
        }
    }

    /// Creates a UUID key generator.
    pub fn uuid(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            generator: KeyGeneratorKind::Uuid,
        }
    }
}

/// Kind of key generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyGeneratorKind {
    /// Time-ordered 64-bit ids.
    Snowflake {
        /// Worker id, 0..=1023.
        #[serde(default)]
        worker_id: u16,
        /// Tolerated clock regression in milliseconds.
        #[serde(default = "default_max_tolerate_time_difference")]
        max_tolerate_time_difference_ms: u32,
    },

    /// Random UUIDs without hyphens.
    Uuid,
}

fn default_max_tolerate_time_difference() -> u32 {
    10
}

impl Default for KeyGeneratorKind {
    fn default() -> Self {
        KeyGeneratorKind::Snowflake {
            worker_id: 0,
            max_tolerate_time_difference_ms: default_max_tolerate_time_difference(),
        }
    }
}

/// Runtime properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardingProps {
    /// Log the logic SQL and every rewritten SQL at info level.
    #[serde(default)]
    pub sql_show: bool,

    /// Let inline algorithms answer range conditions with every target.
    #[serde(default)]
    pub allow_range_query_with_inline_sharding: bool,
}

/// Builder for [`ShardingRuleConfig`].
#[derive(Debug, Default)]
pub struct ShardingRuleConfigBuilder {
    config: ShardingRuleConfig,
}

impl ShardingRuleConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data source names.
    pub fn data_sources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.data_sources = names.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a table rule.
    pub fn table(mut self, table: TableRuleConfig) -> Self {
        self.config.tables.push(table);
        self
    }

    /// Adds a binding table group.
    pub fn binding_group<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .binding_tables
            .push(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a broadcast table.
    pub fn broadcast_table(mut self, table: impl Into<String>) -> Self {
        self.config.broadcast_tables.push(table.into());
        self
    }

    /// Sets the default data source.
    pub fn default_data_source(mut self, name: impl Into<String>) -> Self {
        self.config.default_data_source = Some(name.into());
        self
    }

    /// Sets the default database strategy.
    pub fn default_database_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.config.default_database_strategy = Some(strategy);
        self
    }

    /// Sets the default table strategy.
    pub fn default_table_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.config.default_table_strategy = Some(strategy);
        self
    }

    /// Sets runtime properties.
    pub fn props(mut self, props: ShardingProps) -> Self {
        self.config.props = props;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> ShardingRuleConfig {
        self.config
    }
}
