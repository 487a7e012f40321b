//! Rule and schema fixtures.
//!
//! The order schema used throughout the tests:
//!
//! - `t_order` on `ds_${0..1}.t_order_${0..1}`, databases by `user_id % 2`,
//!   tables by `order_id % 2`, snowflake keys on `order_id`
//! - `t_order_item` with the same layout, bound to `t_order`
//! - `t_config`, a broadcast table
//! - `t_log`, unsharded, living on `ds_0`

use helios_sharding::config::{
    AlgorithmConfig, KeyGeneratorConfig, ShardingProps, ShardingRuleConfig, StrategyConfig,
    TableRuleConfig,
};
use helios_sharding::metadata::{SchemaMetaData, TableMetaData};
use helios_sharding::{ShardingKernel, ShardingRule};

/// Initializes a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Configuration of the order schema.
pub fn order_config() -> ShardingRuleConfig {
    order_config_with_props(ShardingProps::default())
}

/// Configuration of the order schema with runtime properties.
pub fn order_config_with_props(props: ShardingProps) -> ShardingRuleConfig {
    let by_user = StrategyConfig::standard("user_id", AlgorithmConfig::Mod { sharding_count: 2 });
    let by_order = StrategyConfig::standard("order_id", AlgorithmConfig::Mod { sharding_count: 2 });
    ShardingRuleConfig::builder()
        .data_sources(["ds_0", "ds_1"])
        .default_data_source("ds_0")
        .table(
            TableRuleConfig::new("t_order")
                .with_actual_data_nodes("ds_${0..1}.t_order_${0..1}")
                .with_database_strategy(by_user.clone())
                .with_table_strategy(by_order.clone())
                .with_key_generator(KeyGeneratorConfig::snowflake("order_id")),
        )
        .table(
            TableRuleConfig::new("t_order_item")
                .with_actual_data_nodes("ds_${0..1}.t_order_item_${0..1}")
                .with_database_strategy(by_user)
                .with_table_strategy(by_order),
        )
        .binding_group(["t_order", "t_order_item"])
        .broadcast_table("t_config")
        .props(props)
        .build()
}

/// The order rule.
pub fn order_rule() -> ShardingRule {
    ShardingRule::new(order_config()).expect("order rule is valid")
}

/// Column and index metadata of the order schema.
pub fn order_schema() -> SchemaMetaData {
    SchemaMetaData::new()
        .with_table(
            "t_order",
            TableMetaData::new(["order_id", "user_id", "status"], ["idx_1"]),
        )
        .with_table(
            "t_order_item",
            TableMetaData::new(["item_id", "order_id", "user_id"], ["idx_item"]),
        )
        .with_table("t_config", TableMetaData::new(["name", "value"], Vec::<String>::new()))
        .with_table("t_log", TableMetaData::new(["id", "message"], Vec::<String>::new()))
}

/// A kernel over the order rule and schema.
pub fn order_kernel() -> ShardingKernel {
    ShardingKernel::new(order_rule(), order_schema())
}
