//! Statement routing.
//!
//! The router turns a statement context and its shard conditions into a
//! [`RouteResult`]: the set of physical targets the statement must run on.
//!
//! # Routing Rules
//!
//! Exactly one [`RouteEngine`] is selected per statement:
//!
//! - **DROP INDEX without a table**: index broadcast; the owning tables are
//!   discovered from schema metadata.
//! - **DDL/DCL without tables**: database broadcast, one unit per data source.
//! - **DDL on unsharded tables**: the default data source.
//! - **Other DDL/DCL**: table broadcast, one unit per actual data node.
//! - **DAL**: unicast, any single valid target.
//! - **DML on unsharded tables only**: the default data source.
//! - **DML on broadcast tables only**: unicast for queries, table broadcast
//!   for writes.
//! - **Other DML**: standard sharding over the sharded tables, with any
//!   broadcast tables mapped by identity.
//!
//! # Example
//!
//! ```
//! use helios_sharding::config::{ShardingRuleConfig, TableRuleConfig};
//! use helios_sharding::context::{StatementContext, StatementKind, TableSegment};
//! use helios_sharding::metadata::SchemaMetaData;
//! use helios_sharding::route::{RouteEngine, ShardingConditions, ShardingRouter};
//! use helios_sharding::rule::ShardingRule;
//!
//! let rule = ShardingRule::new(
//!     ShardingRuleConfig::builder()
//!         .data_sources(["ds_0", "ds_1"])
//!         .table(TableRuleConfig::new("t_order").with_actual_data_nodes("ds_${0..1}.t_order"))
//!         .build(),
//! )
//! .unwrap();
//! let schema = SchemaMetaData::new();
//! let ctx = StatementContext::builder(StatementKind::Select, "SELECT * FROM t_order")
//!     .table(TableSegment::new(14, 20, "t_order"))
//!     .build();
//!
//! assert!(matches!(
//!     RouteEngine::select(&rule, &ctx).unwrap(),
//!     RouteEngine::Standard { .. }
//! ));
//! let result = ShardingRouter::new(&rule, &schema)
//!     .route(&ctx, &ShardingConditions::default())
//!     .unwrap();
//! assert_eq!(result.len(), 2);
//! ```

mod broadcast;
pub mod condition;
mod default_db;
mod standard;
mod unicast;
pub mod unit;

pub use condition::{ShardingCondition, ShardingConditions};
pub use unit::{RouteMapper, RouteResult, RouteUnit};

use crate::context::{DdlKind, StatementContext, StatementKind};
use crate::error::{RouteError, RouteResultOf};
use crate::metadata::SchemaMetaData;
use crate::rule::ShardingRule;

/// The routing strategy chosen for one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteEngine {
    /// One unit per data source, no table mappings.
    DatabaseBroadcast,

    /// One unit per actual data node of every table.
    TableBroadcast {
        /// Tables to broadcast.
        logic_tables: Vec<String>,
    },

    /// Table broadcast over the tables that declare the indexes.
    IndexBroadcast {
        /// Dropped index names.
        indexes: Vec<String>,
    },

    /// A single unit on the default data source.
    DefaultDatabase {
        /// Unsharded tables, mapped by identity.
        logic_tables: Vec<String>,
    },

    /// Shard-condition driven routing.
    Standard {
        /// Sharded tables, in statement order.
        logic_tables: Vec<String>,
        /// Broadcast tables joined with them.
        broadcast_tables: Vec<String>,
    },

    /// Any one valid target.
    Unicast {
        /// Tables that must exist on the chosen target.
        logic_tables: Vec<String>,
    },
}

impl RouteEngine {
    /// Selects the engine for a statement.
    ///
    /// Fails with [`RouteError::TableRuleNotFound`] when a DML statement
    /// mixes sharded tables with tables the rule does not know.
    pub fn select(rule: &ShardingRule, context: &StatementContext) -> RouteResultOf<Self> {
        let tables = context.tables().table_names();
        let engine = match context.kind() {
            StatementKind::Ddl(DdlKind::DropIndex) if tables.is_empty() => {
                RouteEngine::IndexBroadcast {
                    indexes: context
                        .indexes()
                        .iter()
                        .map(|i| i.identifier.value().to_ascii_lowercase())
                        .collect(),
                }
            }
            StatementKind::Ddl(_) | StatementKind::Dcl if tables.is_empty() => {
                RouteEngine::DatabaseBroadcast
            }
            StatementKind::Ddl(_) if rule.is_all_unsharded_tables(&tables) => {
                RouteEngine::DefaultDatabase { logic_tables: tables }
            }
            StatementKind::Ddl(_) => RouteEngine::TableBroadcast { logic_tables: tables },
            StatementKind::Dcl if rule.is_all_unsharded_tables(&tables) => {
                RouteEngine::DatabaseBroadcast
            }
            StatementKind::Dcl => RouteEngine::TableBroadcast { logic_tables: tables },
            StatementKind::Dal if !tables.is_empty() && rule.is_all_unsharded_tables(&tables) => {
                RouteEngine::DefaultDatabase { logic_tables: tables }
            }
            StatementKind::Dal => RouteEngine::Unicast { logic_tables: tables },
            kind => Self::select_dml(rule, kind, tables)?,
        };
        tracing::debug!(?engine, kind = ?context.kind(), "Selected route engine");
        Ok(engine)
    }

    fn select_dml(
        rule: &ShardingRule,
        kind: StatementKind,
        tables: Vec<String>,
    ) -> RouteResultOf<Self> {
        if tables.is_empty() {
            return Ok(match rule.default_data_source() {
                Some(_) => RouteEngine::DefaultDatabase { logic_tables: tables },
                None => RouteEngine::Unicast { logic_tables: tables },
            });
        }
        if rule.is_all_unsharded_tables(&tables) {
            return Ok(RouteEngine::DefaultDatabase { logic_tables: tables });
        }
        if rule.is_all_broadcast_tables(&tables) {
            return Ok(match kind {
                StatementKind::Select => RouteEngine::Unicast { logic_tables: tables },
                _ => RouteEngine::TableBroadcast { logic_tables: tables },
            });
        }

        let mut logic_tables = Vec::new();
        let mut broadcast_tables = Vec::new();
        for table in tables {
            if rule.is_sharding_table(&table) {
                logic_tables.push(table);
            } else if rule.is_broadcast_table(&table) {
                broadcast_tables.push(table);
            } else {
                return Err(RouteError::TableRuleNotFound { logic_table: table });
            }
        }
        Ok(RouteEngine::Standard {
            logic_tables,
            broadcast_tables,
        })
    }
}

/// Routes statements against one rule snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ShardingRouter<'a> {
    rule: &'a ShardingRule,
    schema: &'a SchemaMetaData,
}

impl<'a> ShardingRouter<'a> {
    /// Creates a router over a rule snapshot and schema metadata.
    pub fn new(rule: &'a ShardingRule, schema: &'a SchemaMetaData) -> Self {
        Self { rule, schema }
    }

    /// Routes a statement.
    ///
    /// `conditions` must have been extracted from the same statement; they
    /// are only read by the standard engine.
    pub fn route(
        &self,
        context: &StatementContext,
        conditions: &ShardingConditions,
    ) -> RouteResultOf<RouteResult> {
        // 1. Pick the engine
        let engine = RouteEngine::select(self.rule, context)?;

        // 2. Run it
        let result = match &engine {
            RouteEngine::DatabaseBroadcast => broadcast::route_database(self.rule),
            RouteEngine::TableBroadcast { logic_tables } => {
                broadcast::route_tables(self.rule, logic_tables)?
            }
            RouteEngine::IndexBroadcast { indexes } => {
                broadcast::route_indexes(self.rule, self.schema, indexes)?
            }
            RouteEngine::DefaultDatabase { logic_tables } => {
                default_db::route(self.rule, logic_tables)?
            }
            RouteEngine::Standard {
                logic_tables,
                broadcast_tables,
            } => standard::route(
                self.rule,
                logic_tables,
                broadcast_tables,
                conditions,
                context.kind() == StatementKind::Insert,
            )?,
            RouteEngine::Unicast { logic_tables } => unicast::route(self.rule, logic_tables)?,
        };

        // 3. Report
        tracing::debug!(
            units = result.len(),
            data_sources = ?result.actual_data_source_names(),
            "Routed statement"
        );
        Ok(result)
    }
}
