//! Tables referenced by a statement.

use crate::context::segment::{ColumnSegment, TableSegment};
use crate::error::{RouteError, RouteResultOf};
use crate::metadata::SchemaMetaData;

/// The table references of a statement with alias resolution.
#[derive(Debug, Clone, Default)]
pub struct TablesContext {
    tables: Vec<TableSegment>,
}

impl TablesContext {
    /// Creates a context from table segments in statement order.
    pub fn new(tables: Vec<TableSegment>) -> Self {
        Self { tables }
    }

    /// Returns the table segments.
    pub fn segments(&self) -> &[TableSegment] {
        &self.tables
    }

    /// Returns true when no table is referenced.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns distinct logic table names, lowercased, in statement order.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let name = table.table_name().to_ascii_lowercase();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Returns true if `identifier` is an alias declared in this statement
    /// and not also a table name.
    pub fn is_alias(&self, identifier: &str) -> bool {
        let is_table = self
            .tables
            .iter()
            .any(|t| t.table_name().eq_ignore_ascii_case(identifier));
        !is_table
            && self.tables.iter().any(|t| {
                t.alias
                    .as_deref()
                    .is_some_and(|a| a.eq_ignore_ascii_case(identifier))
            })
    }

    /// Resolves an owner qualifier (table name or alias) to a lowercase
    /// logic table name.
    pub fn find_table_by_owner(&self, owner: &str) -> RouteResultOf<String> {
        self.tables
            .iter()
            .find(|t| {
                t.alias
                    .as_deref()
                    .is_some_and(|a| a.eq_ignore_ascii_case(owner))
            })
            .or_else(|| {
                self.tables
                    .iter()
                    .find(|t| t.table_name().eq_ignore_ascii_case(owner))
            })
            .map(|t| t.table_name().to_ascii_lowercase())
            .ok_or_else(|| RouteError::OwnerNotFound {
                owner: owner.to_string(),
            })
    }

    /// Resolves the logic table a column belongs to.
    ///
    /// Qualified columns resolve through their owner. Unqualified columns
    /// resolve to the only table of a single-table statement; in joins the
    /// schema metadata must name exactly one candidate, otherwise the column
    /// is ambiguous.
    pub fn find_table_name(
        &self,
        column: &ColumnSegment,
        schema: &SchemaMetaData,
    ) -> RouteResultOf<String> {
        if let Some(owner) = &column.owner {
            return self.find_table_by_owner(owner.identifier.value());
        }
        let names = self.table_names();
        if let [only] = names.as_slice() {
            return Ok(only.clone());
        }
        let candidates: Vec<&String> = names
            .iter()
            .filter(|name| schema.contains_column(name, column.name()))
            .collect();
        match candidates.as_slice() {
            [only] => Ok((*only).clone()),
            _ => Err(RouteError::AmbiguousColumn {
                column: column.name().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::segment::OwnerSegment;
    use crate::metadata::TableMetaData;

    fn join_context() -> TablesContext {
        TablesContext::new(vec![
            TableSegment::new(14, 20, "t_order").with_alias("o"),
            TableSegment::new(29, 40, "t_order_item").with_alias("i"),
        ])
    }

    #[test]
    fn test_owner_resolution() {
        let tables = join_context();
        assert_eq!(tables.find_table_by_owner("O").unwrap(), "t_order");
        assert_eq!(tables.find_table_by_owner("t_order_item").unwrap(), "t_order_item");
        assert_eq!(
            tables.find_table_by_owner("x"),
            Err(RouteError::OwnerNotFound {
                owner: "x".to_string()
            })
        );
        assert!(tables.is_alias("o"));
        assert!(!tables.is_alias("t_order"));
    }

    #[test]
    fn test_unqualified_column_in_join() {
        let tables = join_context();
        let schema = SchemaMetaData::new()
            .with_table(
                "t_order",
                TableMetaData::new(["order_id", "user_id"], Vec::<String>::new()),
            )
            .with_table(
                "t_order_item",
                TableMetaData::new(["item_id", "order_id"], Vec::<String>::new()),
            );

        let column = ColumnSegment::new(0, 6, "item_id");
        assert_eq!(tables.find_table_name(&column, &schema).unwrap(), "t_order_item");

        let column = ColumnSegment::new(0, 7, "order_id");
        assert_eq!(
            tables.find_table_name(&column, &schema),
            Err(RouteError::AmbiguousColumn {
                column: "order_id".to_string()
            })
        );

        let column =
            ColumnSegment::new(0, 9, "o.order_id").with_owner(OwnerSegment::new(0, 0, "o"));
        assert_eq!(tables.find_table_name(&column, &schema).unwrap(), "t_order");
    }

    #[test]
    fn test_single_table_needs_no_metadata() {
        let tables = TablesContext::new(vec![TableSegment::new(14, 20, "T_ORDER")]);
        let column = ColumnSegment::new(0, 6, "user_id");
        assert_eq!(
            tables.find_table_name(&column, &SchemaMetaData::new()).unwrap(),
            "t_order"
        );
        assert_eq!(tables.table_names(), vec!["t_order"]);
    }
}
