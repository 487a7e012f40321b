//! Sharding strategies and algorithms.
//!
//! A strategy names the sharding column and delegates to an algorithm that
//! narrows a list of available targets (data source names or actual table
//! names) down to the ones a shard value can live in.
//!
//! # Algorithms
//!
//! | Algorithm | Equality / IN | Range |
//! |-----------|---------------|-------|
//! | `Mod` | `value mod n` matched to the target suffix | enumerated when shorter than `n`, else all |
//! | `HashMod` | `crc32(value) mod n` | all targets |
//! | `Inline` | rendered template | all targets if allowed, else an error |
//! | `BoundaryRange` | partition containing the value | every overlapping partition |

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Bound;

use regex::Regex;

use crate::config::{AlgorithmConfig, ShardingProps, StrategyConfig};
use crate::error::{ConfigError, RouteError, RouteResultOf};
use crate::value::SqlValue;

/// Values of one sharding column extracted from a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ShardingValue {
    /// Discrete values (`=` and `IN`, or insert values).
    List(Vec<SqlValue>),

    /// A range (`BETWEEN`, `<`, `<=`, `>`, `>=`).
    Range {
        /// Lower bound.
        lower: Bound<SqlValue>,
        /// Upper bound.
        upper: Bound<SqlValue>,
    },
}

impl ShardingValue {
    /// Creates a single-value list.
    pub fn single(value: impl Into<SqlValue>) -> Self {
        ShardingValue::List(vec![value.into()])
    }

    /// Creates an inclusive range.
    pub fn between(lower: impl Into<SqlValue>, upper: impl Into<SqlValue>) -> Self {
        ShardingValue::Range {
            lower: Bound::Included(lower.into()),
            upper: Bound::Included(upper.into()),
        }
    }

    /// Returns true when no value can satisfy this condition.
    pub fn is_empty(&self) -> bool {
        match self {
            ShardingValue::List(values) => values.is_empty(),
            ShardingValue::Range { lower, upper } => range_is_empty(lower, upper),
        }
    }

    /// Intersects two conditions on the same column.
    pub fn intersect(self, other: ShardingValue) -> ShardingValue {
        match (self, other) {
            (ShardingValue::List(left), ShardingValue::List(right)) => ShardingValue::List(
                left.into_iter()
                    .filter(|v| {
                        right
                            .iter()
                            .any(|r| v.compare(r) == Some(std::cmp::Ordering::Equal))
                    })
                    .collect(),
            ),
            (ShardingValue::List(values), ShardingValue::Range { lower, upper })
            | (ShardingValue::Range { lower, upper }, ShardingValue::List(values)) => {
                ShardingValue::List(
                    values
                        .into_iter()
                        .filter(|v| range_contains(&lower, &upper, v))
                        .collect(),
                )
            }
            (
                ShardingValue::Range {
                    lower: l1,
                    upper: u1,
                },
                ShardingValue::Range {
                    lower: l2,
                    upper: u2,
                },
            ) => ShardingValue::Range {
                lower: tighter_lower(l1, l2),
                upper: tighter_upper(u1, u2),
            },
        }
    }
}

fn range_contains(lower: &Bound<SqlValue>, upper: &Bound<SqlValue>, value: &SqlValue) -> bool {
    use std::cmp::Ordering::*;
    let above = match lower {
        Bound::Unbounded => true,
        Bound::Included(l) => matches!(value.compare(l), Some(Greater | Equal)),
        Bound::Excluded(l) => matches!(value.compare(l), Some(Greater)),
    };
    let below = match upper {
        Bound::Unbounded => true,
        Bound::Included(u) => matches!(value.compare(u), Some(Less | Equal)),
        Bound::Excluded(u) => matches!(value.compare(u), Some(Less)),
    };
    above && below
}

fn range_is_empty(lower: &Bound<SqlValue>, upper: &Bound<SqlValue>) -> bool {
    use std::cmp::Ordering::*;
    match (lower, upper) {
        (Bound::Included(l), Bound::Included(u)) => matches!(l.compare(u), Some(Greater)),
        (Bound::Included(l), Bound::Excluded(u))
        | (Bound::Excluded(l), Bound::Included(u))
        | (Bound::Excluded(l), Bound::Excluded(u)) => matches!(l.compare(u), Some(Greater | Equal)),
        _ => false,
    }
}

fn tighter_lower(a: Bound<SqlValue>, b: Bound<SqlValue>) -> Bound<SqlValue> {
    if prefer_first(&a, &b, std::cmp::Ordering::Greater) { a } else { b }
}

fn tighter_upper(a: Bound<SqlValue>, b: Bound<SqlValue>) -> Bound<SqlValue> {
    if prefer_first(&a, &b, std::cmp::Ordering::Less) { a } else { b }
}

/// Returns true when `a` is at least as tight as `b`; `tighter` is the
/// ordering of `a` against `b` that makes `a` the narrower bound.
fn prefer_first(a: &Bound<SqlValue>, b: &Bound<SqlValue>, tighter: std::cmp::Ordering) -> bool {
    match (a, b) {
        (Bound::Unbounded, _) => false,
        (_, Bound::Unbounded) => true,
        (Bound::Included(x) | Bound::Excluded(x), Bound::Included(y) | Bound::Excluded(y)) => {
            match x.compare(y) {
                Some(ordering) if ordering == tighter => true,
                Some(std::cmp::Ordering::Equal) | None => !matches!(b, Bound::Excluded(_)),
                Some(_) => false,
            }
        }
    }
}

/// Integer bounds of a range, inclusive; `None` means unbounded or not integral.
fn integer_bounds(lower: &Bound<SqlValue>, upper: &Bound<SqlValue>) -> (Option<i64>, Option<i64>) {
    let lo = match lower {
        Bound::Included(v) => v.as_i64(),
        Bound::Excluded(v) => v.as_i64().and_then(|v| v.checked_add(1)),
        Bound::Unbounded => None,
    };
    let hi = match upper {
        Bound::Included(v) => v.as_i64(),
        Bound::Excluded(v) => v.as_i64().and_then(|v| v.checked_sub(1)),
        Bound::Unbounded => None,
    };
    (lo, hi)
}

/// A sharding strategy.
#[derive(Debug, Clone)]
pub enum ShardingStrategy {
    /// No sharding; every target is used.
    None,

    /// Single-column sharding.
    Standard {
        /// The sharding column.
        sharding_column: String,
        /// The algorithm.
        algorithm: ShardingAlgorithm,
    },
}

impl ShardingStrategy {
    /// Builds a strategy from configuration.
    pub fn from_config(config: &StrategyConfig) -> Result<Self, ConfigError> {
        match config {
            StrategyConfig::None => Ok(ShardingStrategy::None),
            StrategyConfig::Standard {
                sharding_column,
                algorithm,
            } => Ok(ShardingStrategy::Standard {
                sharding_column: sharding_column.clone(),
                algorithm: ShardingAlgorithm::from_config(algorithm)?,
            }),
        }
    }

    /// Returns the sharding column, if any.
    pub fn sharding_column(&self) -> Option<&str> {
        match self {
            ShardingStrategy::None => None,
            ShardingStrategy::Standard {
                sharding_column, ..
            } => Some(sharding_column),
        }
    }

    /// Narrows `available` to the targets that may hold `value`.
    ///
    /// `None` means the statement carries no condition on the sharding
    /// column, in which case every available target is returned. The result
    /// keeps the order of `available` and has no duplicates.
    pub fn do_sharding(
        &self,
        available: &[String],
        value: Option<&ShardingValue>,
        logic_table: &str,
        props: &ShardingProps,
    ) -> RouteResultOf<Vec<String>> {
        match (self, value) {
            (ShardingStrategy::None, _) | (_, None) => Ok(available.to_vec()),
            (ShardingStrategy::Standard { algorithm, .. }, Some(value)) => {
                let selected = algorithm.do_sharding(available, value, logic_table, props)?;
                Ok(available
                    .iter()
                    .filter(|target| selected.contains(target.as_str()))
                    .cloned()
                    .collect())
            }
        }
    }
}

/// A sharding algorithm.
#[derive(Debug, Clone)]
pub enum ShardingAlgorithm {
    /// Integer modulo.
    Mod {
        /// Number of shards.
        sharding_count: u32,
    },

    /// CRC32 hash modulo.
    HashMod {
        /// Number of shards.
        sharding_count: u32,
    },

    /// Inline template.
    Inline(InlineTemplate),

    /// Boundary partitions.
    BoundaryRange {
        /// Ascending boundaries.
        boundaries: Vec<i64>,
    },
}

impl ShardingAlgorithm {
    /// Builds an algorithm from configuration.
    pub fn from_config(config: &AlgorithmConfig) -> Result<Self, ConfigError> {
        match config {
            AlgorithmConfig::Mod { sharding_count } | AlgorithmConfig::HashMod { sharding_count }
                if *sharding_count == 0 =>
            {
                Err(ConfigError::InvalidAlgorithm {
                    message: "sharding_count must be positive".to_string(),
                })
            }
            AlgorithmConfig::Mod { sharding_count } => Ok(ShardingAlgorithm::Mod {
                sharding_count: *sharding_count,
            }),
            AlgorithmConfig::HashMod { sharding_count } => Ok(ShardingAlgorithm::HashMod {
                sharding_count: *sharding_count,
            }),
            AlgorithmConfig::Inline { expression } => {
                Ok(ShardingAlgorithm::Inline(InlineTemplate::parse(expression)?))
            }
            AlgorithmConfig::BoundaryRange { boundaries } => {
                if boundaries.is_empty() || boundaries.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(ConfigError::InvalidAlgorithm {
                        message: format!(
                            "boundaries must be non-empty and strictly ascending: {boundaries:?}"
                        ),
                    });
                }
                Ok(ShardingAlgorithm::BoundaryRange {
                    boundaries: boundaries.clone(),
                })
            }
        }
    }

    /// Returns the algorithm name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            ShardingAlgorithm::Mod { .. } => "mod",
            ShardingAlgorithm::HashMod { .. } => "hash_mod",
            ShardingAlgorithm::Inline(_) => "inline",
            ShardingAlgorithm::BoundaryRange { .. } => "boundary_range",
        }
    }

    fn do_sharding(
        &self,
        available: &[String],
        value: &ShardingValue,
        logic_table: &str,
        props: &ShardingProps,
    ) -> RouteResultOf<BTreeSet<String>> {
        match value {
            ShardingValue::List(values) => {
                let mut result = BTreeSet::new();
                for value in values {
                    result.extend(self.precise(available, value)?);
                }
                Ok(result)
            }
            ShardingValue::Range { lower, upper } => {
                self.range(available, lower, upper, logic_table, props)
            }
        }
    }

    fn precise(&self, available: &[String], value: &SqlValue) -> RouteResultOf<Vec<String>> {
        match self {
            ShardingAlgorithm::Mod { sharding_count } => {
                let v = self.integer(value)?;
                Ok(targets_with_suffix(available, v.rem_euclid(i64::from(*sharding_count))))
            }
            ShardingAlgorithm::HashMod { sharding_count } => {
                let hash = crc32fast::hash(value.canonical_text().as_bytes());
                Ok(targets_with_suffix(
                    available,
                    i64::from(hash % *sharding_count),
                ))
            }
            ShardingAlgorithm::Inline(template) => {
                let target = template.render(value).ok_or_else(|| self.unsupported(value))?;
                Ok(available.iter().filter(|t| **t == target).cloned().collect())
            }
            ShardingAlgorithm::BoundaryRange { boundaries } => {
                let v = self.integer(value)?;
                let partition = boundaries.partition_point(|b| *b <= v);
                Ok(targets_with_suffix(available, partition as i64))
            }
        }
    }

    fn range(
        &self,
        available: &[String],
        lower: &Bound<SqlValue>,
        upper: &Bound<SqlValue>,
        logic_table: &str,
        props: &ShardingProps,
    ) -> RouteResultOf<BTreeSet<String>> {
        if range_is_empty(lower, upper) {
            return Ok(BTreeSet::new());
        }
        let all = || available.iter().cloned().collect::<BTreeSet<_>>();
        match self {
            ShardingAlgorithm::Mod { sharding_count } => {
                let (Some(lo), Some(hi)) = integer_bounds(lower, upper) else {
                    return Ok(all());
                };
                if hi < lo {
                    return Ok(BTreeSet::new());
                }
                if hi.saturating_sub(lo) >= i64::from(*sharding_count) - 1 {
                    return Ok(all());
                }
                let mut result = BTreeSet::new();
                for v in lo..=hi {
                    result.extend(targets_with_suffix(
                        available,
                        v.rem_euclid(i64::from(*sharding_count)),
                    ));
                }
                Ok(result)
            }
            ShardingAlgorithm::HashMod { .. } => Ok(all()),
            ShardingAlgorithm::Inline(_) => {
                if props.allow_range_query_with_inline_sharding {
                    Ok(all())
                } else {
                    Err(RouteError::RangeNotSupported {
                        logic_table: logic_table.to_string(),
                    })
                }
            }
            ShardingAlgorithm::BoundaryRange { boundaries } => {
                let (lo, hi) = integer_bounds(lower, upper);
                let first = lo.map_or(0, |lo| boundaries.partition_point(|b| *b <= lo));
                let last = hi.map_or(boundaries.len(), |hi| {
                    boundaries.partition_point(|b| *b <= hi)
                });
                let mut result = BTreeSet::new();
                for partition in first..=last {
                    result.extend(targets_with_suffix(available, partition as i64));
                }
                Ok(result)
            }
        }
    }

    fn integer(&self, value: &SqlValue) -> RouteResultOf<i64> {
        value.as_i64().ok_or_else(|| self.unsupported(value))
    }

    fn unsupported(&self, value: &SqlValue) -> RouteError {
        RouteError::UnsupportedShardingValue {
            value: value.to_string(),
            algorithm: self.name().to_string(),
        }
    }
}

/// Returns the targets whose trailing number equals `suffix`.
fn targets_with_suffix(available: &[String], suffix: i64) -> Vec<String> {
    available
        .iter()
        .filter(|target| numeric_suffix(target) == Some(suffix))
        .cloned()
        .collect()
}

fn numeric_suffix(target: &str) -> Option<i64> {
    let digits = target.len() - target.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    target[target.len() - digits..].parse().ok()
}

/// A parsed inline algorithm expression such as `t_order_${order_id % 2}`.
#[derive(Clone)]
pub struct InlineTemplate {
    expression: String,
    prefix: String,
    column: String,
    modulo: Option<i64>,
    suffix: String,
}

impl fmt::Debug for InlineTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InlineTemplate").field(&self.expression).finish()
    }
}

impl InlineTemplate {
    /// Parses `prefix${column}suffix` or `prefix${column % n}suffix`.
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidAlgorithm {
            message: format!("inline expression '{expression}': {message}"),
        };
        let pattern = Regex::new(r"^(.*?)\$(?:->)?\{\s*(\w+)\s*(?:%\s*(\d+)\s*)?\}(.*)$")
            .map_err(|e| invalid(&e.to_string()))?;
        let captures = pattern
            .captures(expression)
            .ok_or_else(|| invalid("expected a single ${column} or ${column % n} placeholder"))?;
        let group = |i: usize| captures.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
        let modulo = match captures.get(3) {
            Some(m) => {
                let n: i64 = m.as_str().parse().map_err(|_| invalid("modulo is not a number"))?;
                if n == 0 {
                    return Err(invalid("modulo must be positive"));
                }
                Some(n)
            }
            None => None,
        };
        let suffix = group(4);
        if suffix.contains('{') {
            return Err(invalid("only one placeholder is supported"));
        }
        Ok(Self {
            expression: expression.to_string(),
            prefix: group(1),
            column: group(2),
            modulo,
            suffix,
        })
    }

    /// Returns the column named in the placeholder.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Renders the target name for a value.
    pub fn render(&self, value: &SqlValue) -> Option<String> {
        let middle = match self.modulo {
            Some(n) => value.as_i64()?.rem_euclid(n).to_string(),
            None => {
                if value.is_null() {
                    return None;
                }
                value.canonical_text()
            }
        };
        Some(format!("{}{}{}", self.prefix, middle, self.suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn mod_strategy(column: &str, count: u32) -> ShardingStrategy {
        ShardingStrategy::from_config(&StrategyConfig::standard(
            column,
            AlgorithmConfig::Mod {
                sharding_count: count,
            },
        ))
        .unwrap()
    }

    #[test]
    fn test_mod_precise() {
        let strategy = mod_strategy("user_id", 2);
        let available = targets(&["ds_0", "ds_1"]);
        let props = ShardingProps::default();

        let result = strategy
            .do_sharding(&available, Some(&ShardingValue::single(3)), "t", &props)
            .unwrap();
        assert_eq!(result, vec!["ds_1"]);

        let result = strategy
            .do_sharding(
                &available,
                Some(&ShardingValue::List(vec![SqlValue::Int(2), SqlValue::Int(4)])),
                "t",
                &props,
            )
            .unwrap();
        assert_eq!(result, vec!["ds_0"]);
    }

    #[test]
    fn test_mod_suffix_is_exact() {
        let strategy = mod_strategy("id", 11);
        let available: Vec<String> = (0..11).map(|i| format!("t_{i}")).collect();
        let value = ShardingValue::single(10);
        let result = strategy
            .do_sharding(&available, Some(&value), "t", &ShardingProps::default())
            .unwrap();
        assert_eq!(result, vec!["t_10"]);
    }

    #[test]
    fn test_mod_negative_value() {
        let strategy = mod_strategy("id", 2);
        let result = strategy
            .do_sharding(
                &targets(&["t_0", "t_1"]),
                Some(&ShardingValue::single(-3)),
                "t",
                &ShardingProps::default(),
            )
            .unwrap();
        assert_eq!(result, vec!["t_1"]);
    }

    #[test]
    fn test_mod_range() {
        let strategy = mod_strategy("id", 4);
        let available = targets(&["t_0", "t_1", "t_2", "t_3"]);
        let props = ShardingProps::default();

        let result = strategy
            .do_sharding(&available, Some(&ShardingValue::between(5, 6)), "t", &props)
            .unwrap();
        assert_eq!(result, vec!["t_1", "t_2"]);

        let result = strategy
            .do_sharding(&available, Some(&ShardingValue::between(1, 100)), "t", &props)
            .unwrap();
        assert_eq!(result, available);

        let open = ShardingValue::Range {
            lower: Bound::Excluded(SqlValue::Int(10)),
            upper: Bound::Unbounded,
        };
        let result = strategy.do_sharding(&available, Some(&open), "t", &props).unwrap();
        assert_eq!(result, available);
    }

    #[test]
    fn test_mod_rejects_text() {
        let strategy = mod_strategy("id", 2);
        let err = strategy
            .do_sharding(
                &targets(&["t_0", "t_1"]),
                Some(&ShardingValue::single("abc")),
                "t",
                &ShardingProps::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RouteError::UnsupportedShardingValue { .. }));
    }

    #[test]
    fn test_no_value_returns_all() {
        let strategy = mod_strategy("id", 2);
        let available = targets(&["t_0", "t_1"]);
        assert_eq!(
            strategy
                .do_sharding(&available, None, "t", &ShardingProps::default())
                .unwrap(),
            available
        );
        assert_eq!(
            ShardingStrategy::None
                .do_sharding(
                    &available,
                    Some(&ShardingValue::single(1)),
                    "t",
                    &ShardingProps::default(),
                )
                .unwrap(),
            available
        );
    }

    #[test]
    fn test_hash_mod_is_stable() {
        let strategy = ShardingStrategy::from_config(&StrategyConfig::standard(
            "code",
            AlgorithmConfig::HashMod { sharding_count: 3 },
        ))
        .unwrap();
        let available = targets(&["t_0", "t_1", "t_2"]);
        let value = ShardingValue::single("patient-123");
        let first = strategy
            .do_sharding(&available, Some(&value), "t", &ShardingProps::default())
            .unwrap();
        let second = strategy
            .do_sharding(&available, Some(&value), "t", &ShardingProps::default())
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        let expected = format!("t_{}", crc32fast::hash(b"patient-123") % 3);
        assert_eq!(first[0], expected);
    }

    #[test]
    fn test_inline() {
        let strategy = ShardingStrategy::from_config(&StrategyConfig::standard(
            "order_id",
            AlgorithmConfig::Inline {
                expression: "t_order_${order_id % 2}".to_string(),
            },
        ))
        .unwrap();
        let available = targets(&["t_order_0", "t_order_1"]);
        let props = ShardingProps::default();

        let result = strategy
            .do_sharding(&available, Some(&ShardingValue::single(7)), "t_order", &props)
            .unwrap();
        assert_eq!(result, vec!["t_order_1"]);

        let err = strategy
            .do_sharding(&available, Some(&ShardingValue::between(1, 2)), "t_order", &props)
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::RangeNotSupported {
                logic_table: "t_order".to_string()
            }
        );

        let permissive = ShardingProps {
            allow_range_query_with_inline_sharding: true,
            ..Default::default()
        };
        let result = strategy
            .do_sharding(&available, Some(&ShardingValue::between(1, 2)), "t_order", &permissive)
            .unwrap();
        assert_eq!(result, available);
    }

    #[test]
    fn test_inline_template_parse() {
        let template = InlineTemplate::parse("ds_$->{user_id}").unwrap();
        assert_eq!(template.column(), "user_id");
        assert_eq!(template.render(&SqlValue::Int(3)).as_deref(), Some("ds_3"));

        assert!(InlineTemplate::parse("t_order").is_err());
        assert!(InlineTemplate::parse("t_${a % 0}").is_err());
        assert!(InlineTemplate::parse("t_${a}_${b}").is_err());
    }

    #[test]
    fn test_boundary_range() {
        let strategy = ShardingStrategy::from_config(&StrategyConfig::standard(
            "id",
            AlgorithmConfig::BoundaryRange {
                boundaries: vec![100, 200],
            },
        ))
        .unwrap();
        let available = targets(&["t_0", "t_1", "t_2"]);
        let props = ShardingProps::default();

        let pick = |value: ShardingValue| {
            strategy
                .do_sharding(&available, Some(&value), "t", &props)
                .unwrap()
        };
        assert_eq!(pick(ShardingValue::single(99)), vec!["t_0"]);
        assert_eq!(pick(ShardingValue::single(100)), vec!["t_1"]);
        assert_eq!(pick(ShardingValue::single(1000)), vec!["t_2"]);
        assert_eq!(pick(ShardingValue::between(150, 250)), vec!["t_1", "t_2"]);
        assert_eq!(
            pick(ShardingValue::Range {
                lower: Bound::Unbounded,
                upper: Bound::Excluded(SqlValue::Int(100)),
            }),
            vec!["t_0"]
        );
    }

    #[test]
    fn test_invalid_algorithms() {
        assert!(
            ShardingAlgorithm::from_config(&AlgorithmConfig::Mod { sharding_count: 0 }).is_err()
        );
        assert!(
            ShardingAlgorithm::from_config(&AlgorithmConfig::BoundaryRange {
                boundaries: vec![5, 5]
            })
            .is_err()
        );
    }

    #[test]
    fn test_intersect() {
        let merged = ShardingValue::List(vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)])
            .intersect(ShardingValue::List(vec![SqlValue::Int(2), SqlValue::Int(3)]));
        assert_eq!(merged, ShardingValue::List(vec![SqlValue::Int(2), SqlValue::Int(3)]));

        let merged = ShardingValue::List(vec![SqlValue::Int(1), SqlValue::Int(20)])
            .intersect(ShardingValue::between(10, 30));
        assert_eq!(merged, ShardingValue::List(vec![SqlValue::Int(20)]));

        let merged = ShardingValue::between(1, 10).intersect(ShardingValue::between(5, 20));
        assert_eq!(merged, ShardingValue::between(5, 10));

        let empty = ShardingValue::between(1, 3).intersect(ShardingValue::between(5, 7));
        assert!(empty.is_empty());
        assert!(ShardingValue::single(1).intersect(ShardingValue::single(2)).is_empty());
    }
}
