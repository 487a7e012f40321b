//! Helios Sharding Engine
//!
//! This crate routes SQL statements written against logic tables to the
//! physical data sources and tables that hold their rows, and rewrites each
//! statement for every target by editing spans of the original SQL text.
//!
//! # Features
//!
//! - **Routing**: standard sharding on equality, IN and range conditions,
//!   binding tables, cartesian joins, table/index/database broadcast,
//!   default data source and unicast routing
//! - **Rewriting**: table names, per-target INSERT rows, generated key
//!   columns and pagination, with byte-exact preservation of everything else
//! - **Key generation**: snowflake and UUID generators, run before routing so
//!   a generated key can itself be the sharding column
//! - **Copy-on-write rules**: statements route against an immutable rule
//!   snapshot; reconfiguration swaps in a new one
//!
//! # Architecture
//!
//! - [`config`] - Serde rule configuration and builders
//! - [`rule`] - The immutable [`ShardingRule`](rule::ShardingRule) snapshot
//! - [`context`] - Positioned statement contexts handed over by a parser
//! - [`metadata`] - Table columns and indexes
//! - [`keygen`] - Key generators and the generated key coordinator
//! - [`route`] - Shard conditions, route engines and route results
//! - [`rewrite`] - SQL tokens, token generators and the rewrite engine
//! - [`kernel`] - The preparation pipeline and batch accumulation
//! - [`error`] - Error types for all stages
//!
//! # Quick Start
//!
//! ```
//! use helios_sharding::config::{AlgorithmConfig, ShardingRuleConfig, StrategyConfig, TableRuleConfig};
//! use helios_sharding::context::{
//!     ColumnSegment, ExpressionSegment, PredicateSegment, StatementContext, StatementKind,
//!     TableSegment, WhereSegment,
//! };
//! use helios_sharding::metadata::SchemaMetaData;
//! use helios_sharding::{ShardingKernel, SqlValue};
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
//!                 AlgorithmConfig::Inline { expression: "t_order_${order_id % 2}".to_string() },
//!             )),
//!     )
//!     .build();
//! let kernel = ShardingKernel::from_config(config, SchemaMetaData::new()).unwrap();
//!
//! // SELECT * FROM t_order WHERE user_id = ? AND order_id = ?
//! let sql = "SELECT * FROM t_order WHERE user_id = ? AND order_id = ?";
//! let statement = StatementContext::builder(StatementKind::Select, sql)
//!     .table(TableSegment::new(14, 20, "t_order"))
//!     .where_segment(WhereSegment::and(28, 55, vec![
//!         PredicateSegment::equal(
//!             ColumnSegment::new(28, 34, "user_id"),
//!             ExpressionSegment::Parameter { start: 38, stop: 38, index: 0 },
//!         ),
//!         PredicateSegment::equal(
//!             ColumnSegment::new(44, 51, "order_id"),
//!             ExpressionSegment::Parameter { start: 55, stop: 55, index: 1 },
//!         ),
//!     ]))
//!     .build();
//!
//! let context = kernel.prepare(&statement, &[SqlValue::Int(7), SqlValue::Int(10)]).unwrap();
//! let (unit, result) = context.rewrite().iter().next().unwrap();
//! assert_eq!(unit.unwrap().data_source_name(), "ds_1");
//! assert_eq!(result.sql, "SELECT * FROM t_order_0 WHERE user_id = ? AND order_id = ?");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod keygen;
pub mod kernel;
pub mod metadata;
pub mod rewrite;
pub mod route;
pub mod rule;
pub mod value;

// Re-export commonly used types at crate root
pub use error::{
    ConfigError, KeyGenerateError, RewriteError, RouteError, ShardingError, ShardingResult,
};
pub use kernel::{BatchExecutionContext, ExecutionContext, ShardingKernel};
pub use rewrite::{SqlRewriteOutput, SqlRewriteResult};
pub use route::{RouteMapper, RouteResult, RouteUnit};
pub use rule::{RuleHolder, ShardingRule};
pub use value::SqlValue;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
