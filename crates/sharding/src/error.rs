//! Error types for the sharding engine.
//!
//! Errors are split by the stage that raises them. Configuration errors are
//! fatal when a rule snapshot is built; route, rewrite and key generation
//! errors are scoped to the single statement being prepared and never touch
//! the shared rule.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for statement preparation.
#[derive(Error, Debug)]
pub enum ShardingError {
    /// Rule configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Routing errors
    #[error(transparent)]
    Route(#[from] RouteError),

    /// SQL rewrite errors
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// Key generation errors
    #[error(transparent)]
    KeyGenerate(#[from] KeyGenerateError),
}

/// Errors raised while building a rule snapshot from configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No data source was configured.
    #[error("no data sources configured")]
    NoDataSources,

    /// A data node refers to a data source that is not configured.
    #[error("table '{logic_table}' references unknown data source '{data_source}'")]
    UnknownDataSource {
        logic_table: String,
        data_source: String,
    },

    /// The default data source is not one of the configured data sources.
    #[error("default data source '{data_source}' is not configured")]
    UnknownDefaultDataSource { data_source: String },

    /// An actual data node expression could not be parsed.
    #[error("invalid data node expression '{expression}': {message}")]
    InvalidDataNodeExpression { expression: String, message: String },

    /// A logic table is configured more than once.
    #[error("duplicate table rule for '{logic_table}'")]
    DuplicateTableRule { logic_table: String },

    /// A binding group names a table without a table rule.
    #[error("binding table '{logic_table}' has no table rule")]
    UnknownBindingTable { logic_table: String },

    /// Tables in one binding group do not share a topology.
    #[error("binding tables '{first}' and '{second}' have different data node topologies")]
    InconsistentBindingTables { first: String, second: String },

    /// A table is both broadcast and sharded.
    #[error("table '{logic_table}' cannot be both broadcast and sharded")]
    BroadcastTableSharded { logic_table: String },

    /// A sharding algorithm has invalid parameters.
    #[error("invalid sharding algorithm: {message}")]
    InvalidAlgorithm { message: String },
}

/// Errors raised while routing a statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The logic table has no table rule and is not a broadcast table.
    #[error("cannot find table rule with logic table: '{logic_table}'")]
    TableRuleNotFound { logic_table: String },

    /// No table declares the dropped index.
    #[error("cannot find index name '{index}'")]
    IndexNotFound { index: String },

    /// A column without owner matches several joined tables, or none.
    #[error("cannot resolve owner table of column '{column}'")]
    AmbiguousColumn { column: String },

    /// A column owner is neither a table name nor an alias in the statement.
    #[error("cannot find owner '{owner}' among statement tables")]
    OwnerNotFound { owner: String },

    /// The statement touches only unsharded tables and there is no default data source.
    #[error("no default data source configured for unsharded tables: {tables:?}")]
    NoDefaultDataSource { tables: Vec<String> },

    /// No data source hosts every table the statement needs.
    #[error("no data source hosts all of the tables {tables:?}")]
    NoCommonDataSource { tables: Vec<String> },

    /// A range condition was used with an algorithm that cannot evaluate it.
    #[error("range sharding is not supported by the inline algorithm of '{logic_table}'")]
    RangeNotSupported { logic_table: String },

    /// A sharding column value is not a literal or parameter marker.
    #[error("value of sharding column '{column}' in insert row {row} cannot be evaluated")]
    UnresolvableShardingValue { column: String, row: usize },

    /// A parameter marker points past the end of the parameter list.
    #[error("parameter index {index} out of range, {count} parameters supplied")]
    ParameterOutOfRange { index: usize, count: usize },

    /// The algorithm cannot shard on this value (e.g. non-integer for `mod`).
    #[error("sharding value {value} is not supported by algorithm '{algorithm}'")]
    UnsupportedShardingValue { value: String, algorithm: String },
}

/// Errors raised while generating tokens or rewriting SQL text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// A generated key must be injected but the statement has no insert-columns span.
    #[error(
        "insert into '{logic_table}' has no insert columns segment for generated key '{column}'"
    )]
    InsertColumnsSegmentMissing { logic_table: String, column: String },

    /// Default-column insertion needs table metadata that is not loaded.
    #[error("no metadata for table '{logic_table}'")]
    TableMetaNotFound { logic_table: String },

    /// Two tokens address overlapping text.
    #[error("tokens overlap at [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    OverlappingTokens {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    /// A token span lies outside the SQL text or splits a character.
    #[error("token span [{start}, {end}) is invalid for SQL of length {length}")]
    InvalidSpan {
        start: usize,
        end: usize,
        length: usize,
    },

    /// The statement declares more parameter markers than were supplied.
    #[error("statement expects {expected} parameters, {supplied} supplied")]
    ParameterCountMismatch { expected: usize, supplied: usize },

    /// A LIMIT/OFFSET parameter is missing or not an integer.
    #[error("pagination parameter {index} is missing or not an integer")]
    InvalidPaginationParameter { index: usize },
}

/// Errors raised by key generators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyGenerateError {
    /// The wall clock went backwards further than the tolerated window.
    #[error("clock moved backwards by {millis}ms")]
    ClockMovedBackwards { millis: i64 },
}

/// Result type alias for statement preparation.
pub type ShardingResult<T> = Result<T, ShardingError>;

/// Result type alias for routing.
pub type RouteResultOf<T> = Result<T, RouteError>;

/// Result type alias for rewriting.
pub type RewriteResultOf<T> = Result<T, RewriteError>;
