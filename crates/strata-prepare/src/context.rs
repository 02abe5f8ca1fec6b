//! Execution context model.

use strata_core::SqlValue;
use strata_parser::StatementContext;

/// The SQL text and parameters one physical statement executes with.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlUnit {
    pub sql: String,
    pub parameters: Vec<SqlValue>,
}

impl SqlUnit {
    pub fn new(sql: impl Into<String>, parameters: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }
}

/// One statement bound to the physical data source that executes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionUnit {
    pub data_source: String,
    pub sql_unit: SqlUnit,
}

impl ExecutionUnit {
    pub fn new(data_source: impl Into<String>, sql_unit: SqlUnit) -> Self {
        Self {
            data_source: data_source.into(),
            sql_unit,
        }
    }
}

/// The outcome of one `prepare` call.
#[derive(Debug)]
pub struct ExecutionContext {
    pub statement: StatementContext,
    execution_units: Vec<ExecutionUnit>,
    /// Set on the fast path: the units carry the original SQL and
    /// downstream execution bypasses per-unit rewriting.
    pub skip_sharding: bool,
}

impl ExecutionContext {
    pub fn new(statement: StatementContext, skip_sharding: bool) -> Self {
        Self {
            statement,
            execution_units: Vec::new(),
            skip_sharding,
        }
    }

    /// Append a unit unless an equal one is already present. Insertion
    /// order is preserved.
    pub fn push_unit(&mut self, unit: ExecutionUnit) {
        if !self.execution_units.contains(&unit) {
            self.execution_units.push(unit);
        }
    }

    pub fn execution_units(&self) -> &[ExecutionUnit] {
        &self.execution_units
    }
}
