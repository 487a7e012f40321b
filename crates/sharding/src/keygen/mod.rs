//! Key generation for inserts that omit their key column.
//!
//! Two generators are provided:
//!
//! - [`SnowflakeKeyGenerator`]: time-ordered 64-bit integers laid out as
//!   41 bits of milliseconds since 2016-11-01, 10 bits of worker id and
//!   12 bits of sequence.
//! - [`UuidKeyGenerator`]: random UUIDs in simple (hyphenless) form.
//!
//! [`GeneratedKeyContext`] is the per-statement coordinator that decides
//! whether keys are needed and holds the generated values, one per row.

mod context;

pub use context::GeneratedKeyContext;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::{KeyGeneratorConfig, KeyGeneratorKind};
use crate::error::KeyGenerateError;
use crate::value::SqlValue;

/// Produces values for a generated key column.
pub trait KeyGenerator: Send + Sync + fmt::Debug {
    /// Generates the next key.
    fn generate_key(&self) -> Result<SqlValue, KeyGenerateError>;
}

/// Milliseconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// 2016-11-01T00:00:00Z in epoch milliseconds.
pub const SNOWFLAKE_EPOCH_MILLIS: i64 = 1_477_929_600_000;

const SEQUENCE_BITS: u32 = 12;
const WORKER_ID_BITS: u32 = 10;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;

/// Largest accepted worker id.
pub const MAX_WORKER_ID: u16 = (1 << WORKER_ID_BITS) - 1;

#[derive(Debug, Default)]
struct SnowflakeState {
    last_wall_millis: i64,
    last_millis: i64,
    sequence: i64,
    // Alternates the first sequence of each millisecond between 0 and 1 so
    // that low-traffic keys do not all land on even shards.
    sequence_offset: i64,
}

/// Snowflake key generator.
///
/// Never sleeps: when the sequence of a millisecond is exhausted, or the
/// clock stepped back within the tolerated window, the generator continues
/// on a logical timestamp ahead of the wall clock.
pub struct SnowflakeKeyGenerator {
    worker_id: i64,
    max_tolerate_time_difference_ms: i64,
    clock: Clock,
    state: Mutex<SnowflakeState>,
}

impl fmt::Debug for SnowflakeKeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeKeyGenerator")
            .field("worker_id", &self.worker_id)
            .field(
                "max_tolerate_time_difference_ms",
                &self.max_tolerate_time_difference_ms,
            )
            .finish_non_exhaustive()
    }
}

impl SnowflakeKeyGenerator {
    /// Creates a generator reading the system clock.
    ///
    /// Worker ids above [`MAX_WORKER_ID`] are masked to 10 bits.
    pub fn new(worker_id: u16, max_tolerate_time_difference_ms: u32) -> Self {
        Self::with_clock(
            worker_id,
            max_tolerate_time_difference_ms,
            Arc::new(|| chrono::Utc::now().timestamp_millis()),
        )
    }

    /// Creates a generator reading the given clock.
    pub fn with_clock(worker_id: u16, max_tolerate_time_difference_ms: u32, clock: Clock) -> Self {
        Self {
            worker_id: i64::from(worker_id & MAX_WORKER_ID),
            max_tolerate_time_difference_ms: i64::from(max_tolerate_time_difference_ms),
            clock,
            state: Mutex::new(SnowflakeState::default()),
        }
    }

    /// Returns the configured worker id.
    pub fn worker_id(&self) -> u16 {
        self.worker_id as u16
    }

    /// Splits a key into (epoch millis, worker id, sequence).
    pub fn decompose(key: i64) -> (i64, u16, u16) {
        let millis = (key >> TIMESTAMP_SHIFT) + SNOWFLAKE_EPOCH_MILLIS;
        let worker = ((key >> WORKER_ID_SHIFT) & i64::from(MAX_WORKER_ID)) as u16;
        let sequence = (key & SEQUENCE_MASK) as u16;
        (millis, worker, sequence)
    }

    fn next_id(&self) -> Result<i64, KeyGenerateError> {
        let now = (self.clock)();
        let mut state = self.state.lock();

        if now < state.last_wall_millis {
            let behind = state.last_wall_millis - now;
            if behind > self.max_tolerate_time_difference_ms {
                return Err(KeyGenerateError::ClockMovedBackwards { millis: behind });
            }
            tracing::debug!(behind_ms = behind, "Clock moved backwards within tolerance");
        }
        state.last_wall_millis = state.last_wall_millis.max(now);

        let mut millis = now.max(state.last_millis);
        if millis == state.last_millis {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted: continue on the next logical millisecond.
                millis += 1;
            }
        } else {
            state.sequence_offset ^= 1;
            state.sequence = state.sequence_offset;
        }
        state.last_millis = millis;

        Ok(((millis - SNOWFLAKE_EPOCH_MILLIS) << TIMESTAMP_SHIFT)
            | (self.worker_id << WORKER_ID_SHIFT)
            | state.sequence)
    }
}

impl KeyGenerator for SnowflakeKeyGenerator {
    fn generate_key(&self) -> Result<SqlValue, KeyGenerateError> {
        self.next_id().map(SqlValue::Int)
    }
}

/// UUID key generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate_key(&self) -> Result<SqlValue, KeyGenerateError> {
        Ok(SqlValue::Text(Uuid::new_v4().simple().to_string()))
    }
}

/// The generated key column of a table rule and its generator.
#[derive(Debug, Clone)]
pub struct KeyGenerateStrategy {
    column: String,
    generator: Arc<dyn KeyGenerator>,
}

impl KeyGenerateStrategy {
    /// Creates a strategy with an explicit generator.
    pub fn new(column: impl Into<String>, generator: Arc<dyn KeyGenerator>) -> Self {
        Self {
            column: column.into(),
            generator,
        }
    }

    /// Creates a strategy from configuration.
    pub fn from_config(config: &KeyGeneratorConfig) -> Self {
        let generator: Arc<dyn KeyGenerator> = match &config.generator {
            KeyGeneratorKind::Snowflake {
                worker_id,
                max_tolerate_time_difference_ms,
            } => Arc::new(SnowflakeKeyGenerator::new(
                *worker_id,
                *max_tolerate_time_difference_ms,
            )),
            KeyGeneratorKind::Uuid => Arc::new(UuidKeyGenerator),
        };
        Self::new(config.column.clone(), generator)
    }

    /// Returns the generated column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Generates the next key.
    pub fn generate_key(&self) -> Result<SqlValue, KeyGenerateError> {
        self.generator.generate_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn fixed_clock(millis: &Arc<AtomicI64>) -> Clock {
        let millis = Arc::clone(millis);
        Arc::new(move || millis.load(Ordering::SeqCst))
    }

    #[test]
    fn test_snowflake_layout() {
        let now = Arc::new(AtomicI64::new(SNOWFLAKE_EPOCH_MILLIS + 1_000));
        let generator = SnowflakeKeyGenerator::with_clock(7, 10, fixed_clock(&now));

        let key = generator.next_id().unwrap();
        let (millis, worker, sequence) = SnowflakeKeyGenerator::decompose(key);
        assert_eq!(millis, SNOWFLAKE_EPOCH_MILLIS + 1_000);
        assert_eq!(worker, 7);
        assert_eq!(sequence, 1);
    }

    #[test]
    fn test_snowflake_increasing_and_unique() {
        let now = Arc::new(AtomicI64::new(SNOWFLAKE_EPOCH_MILLIS + 5));
        let generator = SnowflakeKeyGenerator::with_clock(1, 10, fixed_clock(&now));

        let mut seen = HashSet::new();
        let mut previous = 0;
        // More than one millisecond's worth of sequence on a frozen clock.
        for _ in 0..5_000 {
            let key = generator.next_id().unwrap();
            assert!(key > previous);
            assert!(seen.insert(key));
            previous = key;
        }
    }

    #[test]
    fn test_snowflake_alternates_parity_across_milliseconds() {
        let now = Arc::new(AtomicI64::new(SNOWFLAKE_EPOCH_MILLIS + 100));
        let generator = SnowflakeKeyGenerator::with_clock(0, 10, fixed_clock(&now));

        let first = generator.next_id().unwrap();
        now.fetch_add(1, Ordering::SeqCst);
        let second = generator.next_id().unwrap();
        assert_ne!(first % 2, second % 2);
    }

    #[test]
    fn test_snowflake_clock_regression() {
        let now = Arc::new(AtomicI64::new(SNOWFLAKE_EPOCH_MILLIS + 1_000));
        let generator = SnowflakeKeyGenerator::with_clock(0, 10, fixed_clock(&now));
        let first = generator.next_id().unwrap();

        now.store(SNOWFLAKE_EPOCH_MILLIS + 995, Ordering::SeqCst);
        let second = generator.next_id().unwrap();
        assert!(second > first);

        now.store(SNOWFLAKE_EPOCH_MILLIS + 900, Ordering::SeqCst);
        let err = generator.next_id().unwrap_err();
        assert_eq!(err, KeyGenerateError::ClockMovedBackwards { millis: 100 });
    }

    #[test]
    fn test_uuid_simple_form() {
        let key = UuidKeyGenerator.generate_key().unwrap();
        match key {
            SqlValue::Text(text) => {
                assert_eq!(text.len(), 32);
                assert!(!text.contains('-'));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_strategy_from_config() {
        let strategy = KeyGenerateStrategy::from_config(&KeyGeneratorConfig::snowflake("order_id"));
        assert_eq!(strategy.column(), "order_id");
        assert!(matches!(strategy.generate_key().unwrap(), SqlValue::Int(_)));

        let strategy = KeyGenerateStrategy::from_config(&KeyGeneratorConfig::uuid("id"));
        assert!(matches!(strategy.generate_key().unwrap(), SqlValue::Text(_)));
    }
}
