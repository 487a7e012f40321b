//! SQL rewriting.
//!
//! Rewriting never re-serializes a syntax tree. Generators produce
//! [`SqlToken`]s addressing byte spans of the original text, and the
//! [`SqlRewriteEngine`] splices their renderings into the text once per
//! route unit. Parameters are rebuilt alongside by a [`ParameterBuilder`].
//!
//! # Example
//!
//! ```
//! use helios_sharding::config::{ShardingRuleConfig, TableRuleConfig};
//! use helios_sharding::context::{StatementContext, StatementKind, TableSegment};
//! use helios_sharding::rewrite::{TokenGenerateContext, rewrite};
//! use helios_sharding::route::{RouteMapper, RouteResult, RouteUnit};
//! use helios_sharding::rule::ShardingRule;
//!
//! let rule = ShardingRule::new(
//!     ShardingRuleConfig::builder()
//!         .data_sources(["ds_0"])
//!         .table(TableRuleConfig::new("t_order").with_actual_data_nodes("ds_0.t_order_${0..1}"))
//!         .build(),
//! )
//! .unwrap();
//! let statement = StatementContext::builder(StatementKind::Select, "SELECT * FROM t_order")
//!     .table(TableSegment::new(14, 20, "t_order"))
//!     .build();
//! let unit = RouteUnit::on("ds_0", vec![RouteMapper::new("t_order", "t_order_1")]);
//! let route_result: RouteResult = [unit.clone()].into_iter().collect();
//!
//! let output = rewrite(&TokenGenerateContext {
//!     rule: &rule,
//!     statement: &statement,
//!     route_result: &route_result,
//!     parameters: &[],
//!     generated_key: None,
//!     insert_columns: &[],
//! })
//! .unwrap();
//! assert_eq!(output.get(&unit).unwrap().sql, "SELECT * FROM t_order_1");
//! ```

mod engine;
pub mod generator;
pub mod parameter;
pub mod token;

pub use engine::{SqlRewriteEngine, SqlRewriteOutput, SqlRewriteResult};
pub use generator::{TokenGenerateContext, TokenGenerator, generate_tokens};
pub use parameter::{GroupedParameterBuilder, ParameterBuilder, StandardParameterBuilder};
pub use token::{InsertValuesRow, SqlToken};

use crate::error::RewriteResultOf;

/// Generates the tokens and parameters of a routed statement and rewrites it.
pub fn rewrite(context: &TokenGenerateContext<'_>) -> RewriteResultOf<SqlRewriteOutput> {
    let tokens = generate_tokens(context)?;
    let parameters = ParameterBuilder::build(context)?;
    SqlRewriteEngine::rewrite(context.statement.sql(), &tokens, context.route_result, &parameters)
}
