//! The statement preparation pipeline.
//!
//! [`ShardingKernel::prepare`] runs the fixed sequence every statement goes
//! through against one rule snapshot:
//!
//! 1. resolve INSERT columns and generate keys (routing may need them),
//! 2. extract shard conditions and route,
//! 3. generate tokens and rewrite SQL and parameters per unit.
//!
//! The result is an [`ExecutionContext`] an executor can run as is.

mod batch;

pub use batch::{BatchExecutionContext, BatchExecutionUnit};

use std::sync::Arc;

use crate::config::ShardingRuleConfig;
use crate::context::StatementContext;
use crate::error::{ConfigError, ShardingResult};
use crate::keygen::GeneratedKeyContext;
use crate::metadata::SchemaMetaData;
use crate::rewrite::{self, SqlRewriteOutput, TokenGenerateContext};
use crate::route::{RouteResult, ShardingConditions, ShardingRouter};
use crate::rule::{RuleHolder, ShardingRule};
use crate::value::SqlValue;

/// A prepared statement, ready for execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    rule: Arc<ShardingRule>,
    route_result: RouteResult,
    rewrite: SqlRewriteOutput,
    generated_key: Option<GeneratedKeyContext>,
}

impl ExecutionContext {
    /// The rule snapshot the statement was prepared with.
    pub fn rule(&self) -> &Arc<ShardingRule> {
        &self.rule
    }

    /// The route result.
    pub fn route_result(&self) -> &RouteResult {
        &self.route_result
    }

    /// The rewritten statements.
    pub fn rewrite(&self) -> &SqlRewriteOutput {
        &self.rewrite
    }

    /// The key context of an INSERT into a table with a key generator.
    pub fn generated_key(&self) -> Option<&GeneratedKeyContext> {
        self.generated_key.as_ref()
    }

    /// Keys generated for the statement, in row order.
    pub fn generated_keys(&self) -> &[SqlValue] {
        match &self.generated_key {
            Some(key) if key.is_generated() => key.values(),
            _ => &[],
        }
    }
}

/// Prepares statements against the active rule.
#[derive(Debug, Clone)]
pub struct ShardingKernel {
    rules: Arc<RuleHolder>,
    schema: Arc<SchemaMetaData>,
}

impl ShardingKernel {
    /// Creates a kernel over a fixed rule.
    pub fn new(rule: ShardingRule, schema: SchemaMetaData) -> Self {
        Self::with_holder(Arc::new(RuleHolder::new(rule)), Arc::new(schema))
    }

    /// Builds the rule from configuration.
    pub fn from_config(
        config: ShardingRuleConfig,
        schema: SchemaMetaData,
    ) -> Result<Self, ConfigError> {
        ShardingRule::new(config).map(|rule| Self::new(rule, schema))
    }

    /// Creates a kernel over a shared, replaceable rule.
    pub fn with_holder(rules: Arc<RuleHolder>, schema: Arc<SchemaMetaData>) -> Self {
        Self { rules, schema }
    }

    /// The rule holder; replacing its rule affects later preparations only.
    pub fn rules(&self) -> &Arc<RuleHolder> {
        &self.rules
    }

    /// The schema metadata.
    pub fn schema(&self) -> &SchemaMetaData {
        &self.schema
    }

    /// Prepares a statement.
    pub fn prepare(
        &self,
        statement: &StatementContext,
        parameters: &[SqlValue],
    ) -> ShardingResult<ExecutionContext> {
        let rule = self.rules.snapshot();

        // 1. Resolve insert columns and keys
        let mut insert_columns = Vec::new();
        let mut generated_key = None;
        if let Some(insert) = statement.insert()
            && rule.is_sharding_table(&insert.table)
        {
            insert_columns =
                insert.column_names(&self.schema, rule.generate_key_column(&insert.table))?;
            generated_key = GeneratedKeyContext::get(&rule, insert, &insert_columns, parameters)?;
        }

        // 2. Route
        let conditions = ShardingConditions::for_statement(
            &rule,
            &self.schema,
            statement,
            parameters,
            &insert_columns,
            generated_key.as_ref(),
        )?;
        let route_result = ShardingRouter::new(&rule, &self.schema).route(statement, &conditions)?;

        // 3. Rewrite
        let rewrite = rewrite::rewrite(&TokenGenerateContext {
            rule: &rule,
            statement,
            route_result: &route_result,
            parameters,
            generated_key: generated_key.as_ref(),
            insert_columns: &insert_columns,
        })?;

        let context = ExecutionContext {
            rule,
            route_result,
            rewrite,
            generated_key,
        };
        if context.rule.props().sql_show {
            log_sql(statement, &context);
        }
        Ok(context)
    }
}

fn log_sql(statement: &StatementContext, context: &ExecutionContext) {
    tracing::info!("Logic SQL: {}", statement.sql());
    for (unit, result) in context.rewrite.iter() {
        let data_source = unit.map_or("", |u| u.data_source_name());
        let parameters: Vec<String> = result
            .parameters
            .iter()
            .map(SqlValue::to_sql_literal)
            .collect();
        tracing::info!(
            "Actual SQL: {} ::: {} ::: [{}]",
            data_source,
            result.sql,
            parameters.join(", ")
        );
    }
}
