//! Route units and results.

use std::fmt;

use indexmap::IndexSet;

use crate::rule::DataNode;

/// A logic name mapped to an actual name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteMapper {
    /// The name used in the logic SQL.
    pub logic_name: String,
    /// The physical name.
    pub actual_name: String,
}

impl RouteMapper {
    /// Creates a mapper.
    pub fn new(logic_name: impl Into<String>, actual_name: impl Into<String>) -> Self {
        Self {
            logic_name: logic_name.into(),
            actual_name: actual_name.into(),
        }
    }

    /// Creates an identity mapper.
    pub fn identity(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }
}

/// One physical execution target.
///
/// Equality covers the data source mapper and the ordered table mappers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteUnit {
    data_source_mapper: RouteMapper,
    table_mappers: Vec<RouteMapper>,
}

impl RouteUnit {
    /// Creates a unit.
    pub fn new(data_source_mapper: RouteMapper, table_mappers: Vec<RouteMapper>) -> Self {
        Self {
            data_source_mapper,
            table_mappers,
        }
    }

    /// Creates a unit on a data source with identity data source mapping.
    pub fn on(data_source: &str, table_mappers: Vec<RouteMapper>) -> Self {
        Self::new(RouteMapper::identity(data_source), table_mappers)
    }

    /// The data source mapper.
    pub fn data_source_mapper(&self) -> &RouteMapper {
        &self.data_source_mapper
    }

    /// The actual data source name.
    pub fn data_source_name(&self) -> &str {
        &self.data_source_mapper.actual_name
    }

    /// Table mappers in statement order.
    pub fn table_mappers(&self) -> &[RouteMapper] {
        &self.table_mappers
    }

    /// Finds the mapper of a logic table.
    pub fn find_table_mapper(&self, logic_table: &str) -> Option<&RouteMapper> {
        self.table_mappers
            .iter()
            .find(|m| m.logic_name.eq_ignore_ascii_case(logic_table))
    }

    /// The actual name of a logic table on this unit.
    pub fn actual_table_name(&self, logic_table: &str) -> Option<&str> {
        self.find_table_mapper(logic_table)
            .map(|m| m.actual_name.as_str())
    }

    /// Returns true if this unit is the data node.
    pub fn contains_data_node(&self, node: &DataNode) -> bool {
        self.data_source_name() == node.data_source
            && self
                .table_mappers
                .iter()
                .any(|m| m.actual_name.eq_ignore_ascii_case(&node.table))
    }
}

impl fmt::Display for RouteUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data_source_name())?;
        let tables: Vec<String> = self
            .table_mappers
            .iter()
            .map(|m| format!("{}->{}", m.logic_name, m.actual_name))
            .collect();
        if !tables.is_empty() {
            write!(f, "[{}]", tables.join(", "))?;
        }
        Ok(())
    }
}

/// The targets of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteResult {
    units: IndexSet<RouteUnit>,
    original_data_nodes: Vec<Vec<DataNode>>,
}

impl RouteResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit unless an equal one is present; returns true if added.
    pub fn add(&mut self, unit: RouteUnit) -> bool {
        self.units.insert(unit)
    }

    /// Sets the data nodes of each INSERT row, in row order.
    pub fn set_original_data_nodes(&mut self, nodes: Vec<Vec<DataNode>>) {
        self.original_data_nodes = nodes;
    }

    /// Units in routing order.
    pub fn units(&self) -> impl ExactSizeIterator<Item = &RouteUnit> {
        self.units.iter()
    }

    /// The number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true when the statement routes nowhere.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns true when exactly one unit is targeted.
    pub fn is_single_routing(&self) -> bool {
        self.units.len() == 1
    }

    /// Data nodes of each INSERT row; empty for other statements.
    pub fn original_data_nodes(&self) -> &[Vec<DataNode>] {
        &self.original_data_nodes
    }

    /// Distinct actual data source names in routing order.
    pub fn actual_data_source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for unit in &self.units {
            if !names.contains(&unit.data_source_name()) {
                names.push(unit.data_source_name());
            }
        }
        names
    }

    /// Indexes of the INSERT rows assigned to a unit.
    pub fn row_indexes_for(&self, unit: &RouteUnit) -> Vec<usize> {
        self.original_data_nodes
            .iter()
            .enumerate()
            .filter(|(_, nodes)| nodes.iter().any(|n| unit.contains_data_node(n)))
            .map(|(i, _)| i)
            .collect()
    }
}

impl FromIterator<RouteUnit> for RouteResult {
    fn from_iter<T: IntoIterator<Item = RouteUnit>>(iter: T) -> Self {
        Self {
            units: iter.into_iter().collect(),
            original_data_nodes: Vec::new(),
        }
    }
}
