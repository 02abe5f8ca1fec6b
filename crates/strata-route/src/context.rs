//! Route result model.

use strata_core::DataNode;
use strata_parser::StatementContext;

/// A logical name bound to the physical name it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMapper {
    pub logic_name: String,
    pub actual_name: String,
}

impl RouteMapper {
    pub fn new(logic_name: impl Into<String>, actual_name: impl Into<String>) -> Self {
        Self {
            logic_name: logic_name.into(),
            actual_name: actual_name.into(),
        }
    }
}

/// One resolved routing target: a data source plus the table mappings that
/// execute on it. Immutable once constructed; decorators build replacement
/// units instead of editing existing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteUnit {
    pub data_source: RouteMapper,
    pub tables: Vec<RouteMapper>,
}

impl RouteUnit {
    pub fn new(data_source: RouteMapper, tables: Vec<RouteMapper>) -> Self {
        Self {
            data_source,
            tables,
        }
    }

    /// Find the table mapper targeting `table` on the logical source
    /// `data_source`, if this unit carries one.
    ///
    /// Data nodes name logical sources, so the match goes against the
    /// unit's logical name; the actual name may have been rewritten for
    /// read/write splitting.
    pub fn find_table_mapper(&self, data_source: &str, table: &str) -> Option<&RouteMapper> {
        if !self.data_source.logic_name.eq_ignore_ascii_case(data_source) {
            return None;
        }
        self.tables
            .iter()
            .find(|mapper| mapper.actual_name.eq_ignore_ascii_case(table))
    }

    /// The actual table resolved for a logical table, if mapped here.
    pub fn actual_table(&self, logic_table: &str) -> Option<&str> {
        self.tables
            .iter()
            .find(|mapper| mapper.logic_name.eq_ignore_ascii_case(logic_table))
            .map(|mapper| mapper.actual_name.as_str())
    }
}

/// The deduplicated collection of route units for one statement, plus the
/// per-row data-node groupings INSERT parameter grouping depends on.
#[derive(Debug, Clone, Default)]
pub struct RouteResult {
    units: Vec<RouteUnit>,
    original_data_nodes: Vec<Vec<DataNode>>,
}

impl RouteResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit unless an equal one is already present. Insertion order
    /// is preserved.
    pub fn push_unit(&mut self, unit: RouteUnit) {
        if !self.units.contains(&unit) {
            self.units.push(unit);
        }
    }

    pub fn units(&self) -> &[RouteUnit] {
        &self.units
    }

    /// An empty unit collection means no sharding rule matched.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Distinct actual data-source names, in unit order.
    pub fn actual_data_source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for unit in &self.units {
            if !names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&unit.data_source.actual_name))
            {
                names.push(unit.data_source.actual_name.clone());
            }
        }
        names
    }

    /// Data nodes each original value row was routed to, in row order.
    pub fn original_data_nodes(&self) -> &[Vec<DataNode>] {
        &self.original_data_nodes
    }

    pub fn set_original_data_nodes(&mut self, nodes: Vec<Vec<DataNode>>) {
        self.original_data_nodes = nodes;
    }
}

/// The statement plus its routing outcome, threaded through the decorator
/// chain.
#[derive(Debug, Clone)]
pub struct RouteContext {
    pub statement: StatementContext,
    pub result: RouteResult,
}

impl RouteContext {
    /// Start a route with an empty result.
    pub fn new(statement: StatementContext) -> Self {
        Self {
            statement,
            result: RouteResult::new(),
        }
    }
}
