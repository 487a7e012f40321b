//! Batch accumulation.

use indexmap::IndexMap;

use crate::context::StatementContext;
use crate::error::ShardingResult;
use crate::kernel::ShardingKernel;
use crate::rewrite::SqlRewriteOutput;
use crate::route::RouteUnit;
use crate::value::SqlValue;

/// One physical statement of a batch with every parameter set bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchExecutionUnit {
    unit: RouteUnit,
    sql: String,
    parameter_sets: Vec<Vec<SqlValue>>,
    batch_indexes: Vec<usize>,
}

impl BatchExecutionUnit {
    /// The target.
    pub fn unit(&self) -> &RouteUnit {
        &self.unit
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter sets in the order they were added.
    pub fn parameter_sets(&self) -> &[Vec<SqlValue>] {
        &self.parameter_sets
    }

    /// The batch index each parameter set came from.
    pub fn batch_indexes(&self) -> &[usize] {
        &self.batch_indexes
    }
}

/// Accumulates the statements of a prepared-statement batch.
///
/// Every added parameter set is prepared on its own; its rewritten
/// statements are merged into units keyed by target and SQL text, so an
/// executor runs one batched statement per unit.
#[derive(Debug)]
pub struct BatchExecutionContext<'k> {
    kernel: &'k ShardingKernel,
    units: IndexMap<(RouteUnit, String), BatchExecutionUnit>,
    batch_count: usize,
    generated_keys: Vec<SqlValue>,
}

impl<'k> BatchExecutionContext<'k> {
    /// Creates an empty batch.
    pub fn new(kernel: &'k ShardingKernel) -> Self {
        Self {
            kernel,
            units: IndexMap::new(),
            batch_count: 0,
            generated_keys: Vec::new(),
        }
    }

    /// Prepares one parameter set and adds its statements to the batch.
    ///
    /// A failing parameter set leaves the batch unchanged.
    pub fn add_batch(
        &mut self,
        statement: &StatementContext,
        parameters: &[SqlValue],
    ) -> ShardingResult<()> {
        let context = self.kernel.prepare(statement, parameters)?;
        let batch_index = self.batch_count;
        if let SqlRewriteOutput::Routed(results) = context.rewrite() {
            for (unit, result) in results {
                let entry = self
                    .units
                    .entry((unit.clone(), result.sql.clone()))
                    .or_insert_with(|| BatchExecutionUnit {
                        unit: unit.clone(),
                        sql: result.sql.clone(),
                        parameter_sets: Vec::new(),
                        batch_indexes: Vec::new(),
                    });
                entry.parameter_sets.push(result.parameters.clone());
                entry.batch_indexes.push(batch_index);
            }
        }
        self.generated_keys.extend(context.generated_keys().iter().cloned());
        self.batch_count += 1;
        tracing::trace!(batch_index, units = self.units.len(), "Added batch");
        Ok(())
    }

    /// Discards everything added so far.
    pub fn clear_batch(&mut self) {
        self.units.clear();
        self.generated_keys.clear();
        self.batch_count = 0;
    }

    /// The statements to execute, in first-seen order.
    pub fn units(&self) -> impl ExactSizeIterator<Item = &BatchExecutionUnit> {
        self.units.values()
    }

    /// The number of parameter sets added.
    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// Keys generated across the batch, in order.
    pub fn generated_keys(&self) -> &[SqlValue] {
        &self.generated_keys
    }
}
