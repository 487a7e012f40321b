//! Copy-on-write holder of the active rule.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::ShardingRuleConfig;
use crate::error::ConfigError;
use crate::rule::ShardingRule;

/// Holds the active [`ShardingRule`].
///
/// Statements take a snapshot and route against it for their whole
/// preparation; a concurrent [`replace`](Self::replace) only affects
/// snapshots taken afterwards.
#[derive(Debug)]
pub struct RuleHolder {
    current: RwLock<Arc<ShardingRule>>,
}

impl RuleHolder {
    /// Creates a holder with an initial rule.
    pub fn new(rule: ShardingRule) -> Self {
        Self {
            current: RwLock::new(Arc::new(rule)),
        }
    }

    /// Builds a rule from configuration and holds it.
    pub fn from_config(config: ShardingRuleConfig) -> Result<Self, ConfigError> {
        ShardingRule::new(config).map(Self::new)
    }

    /// Returns the current rule.
    pub fn snapshot(&self) -> Arc<ShardingRule> {
        Arc::clone(&self.current.read())
    }

    /// Swaps in a new rule and returns the previous one.
    pub fn replace(&self, rule: ShardingRule) -> Arc<ShardingRule> {
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(rule));
        tracing::debug!("Replaced sharding rule");
        previous
    }

    /// Validates a new configuration and swaps it in.
    ///
    /// On error the current rule stays active.
    pub fn reload(&self, config: ShardingRuleConfig) -> Result<Arc<ShardingRule>, ConfigError> {
        let rule = ShardingRule::new(config)?;
        Ok(self.replace(rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableRuleConfig;

    fn config(data_sources: &[&str]) -> ShardingRuleConfig {
        ShardingRuleConfig::builder()
            .data_sources(data_sources.iter().copied())
            .table(TableRuleConfig::new("t_order"))
            .build()
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let holder = RuleHolder::from_config(config(&["ds_0"])).unwrap();
        let before = holder.snapshot();

        holder.reload(config(&["ds_0", "ds_1"])).unwrap();
        let after = holder.snapshot();

        assert_eq!(before.data_source_names().len(), 1);
        assert_eq!(after.data_source_names().len(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_rule() {
        let holder = RuleHolder::from_config(config(&["ds_0"])).unwrap();
        assert!(holder.reload(config(&[])).is_err());
        assert_eq!(holder.snapshot().data_source_names(), &["ds_0"]);
    }
}
