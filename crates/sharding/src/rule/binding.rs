//! Binding table groups.

use crate::rule::table_rule::TableRule;

/// Logic tables that always route to matching actual tables.
///
/// Matching is positional: the n-th actual table of one member on a data
/// source pairs with the n-th actual table of every other member there.
#[derive(Debug, Clone)]
pub struct BindingTableRule {
    table_rules: Vec<TableRule>,
}

impl BindingTableRule {
    /// Creates a group; the first rule is the primary table.
    pub fn new(table_rules: Vec<TableRule>) -> Self {
        Self { table_rules }
    }

    /// Returns true if the group contains the logic table.
    pub fn has_logic_table(&self, logic_table: &str) -> bool {
        self.find(logic_table).is_some()
    }

    /// Logic table names of the group.
    pub fn logic_tables(&self) -> Vec<&str> {
        self.table_rules.iter().map(TableRule::logic_table).collect()
    }

    /// Maps an actual table of one member to the matching actual table of
    /// another member on the same data source.
    pub fn binding_actual_table(
        &self,
        data_source: &str,
        logic_table: &str,
        other_logic_table: &str,
        other_actual_table: &str,
    ) -> Option<String> {
        let other = self.find(other_logic_table)?;
        let index = other.find_actual_table_index(data_source, other_actual_table)?;
        self.find(logic_table)?
            .actual_table_names(data_source)
            .into_iter()
            .nth(index)
    }

    fn find(&self, logic_table: &str) -> Option<&TableRule> {
        self.table_rules
            .iter()
            .find(|r| r.logic_table().eq_ignore_ascii_case(logic_table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableRuleConfig;

    fn rule(name: &str, nodes: &str) -> TableRule {
        let data_sources = vec!["ds_0".to_string(), "ds_1".to_string()];
        TableRule::new(
            &TableRuleConfig::new(name).with_actual_data_nodes(nodes),
            &data_sources,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_binding_actual_table() {
        let binding = BindingTableRule::new(vec![
            rule("t_order", "ds_${0..1}.t_order_${0..1}"),
            rule("t_order_item", "ds_${0..1}.t_order_item_${0..1}"),
        ]);
        assert!(binding.has_logic_table("T_ORDER_ITEM"));
        assert_eq!(
            binding
                .binding_actual_table("ds_1", "t_order_item", "t_order", "t_order_1")
                .as_deref(),
            Some("t_order_item_1")
        );
        assert_eq!(
            binding.binding_actual_table("ds_1", "t_order_item", "t_order", "t_order_9"),
            None
        );
        assert_eq!(binding.logic_tables(), vec!["t_order", "t_order_item"]);
    }
}
