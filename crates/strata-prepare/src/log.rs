//! SQL-show logging.

use crate::context::ExecutionUnit;

/// Log the logic SQL and every actual SQL produced for it.
///
/// With `simple` set, parameter lists are omitted and only the target data
/// sources and unit count are shown.
pub fn log_sql(sql: &str, simple: bool, units: &[ExecutionUnit]) {
    tracing::info!(target: "strata::sql", "Logic SQL: {sql}");
    if simple {
        let mut data_sources: Vec<&str> = Vec::new();
        for unit in units {
            if !data_sources.contains(&unit.data_source.as_str()) {
                data_sources.push(&unit.data_source);
            }
        }
        tracing::info!(
            target: "strata::sql",
            "Actual SQL(simple): {data_sources:?} ::: {}",
            units.len()
        );
        return;
    }
    for unit in units {
        if unit.sql_unit.parameters.is_empty() {
            tracing::info!(
                target: "strata::sql",
                "Actual SQL: {} ::: {}",
                unit.data_source,
                unit.sql_unit.sql
            );
        } else {
            tracing::info!(
                target: "strata::sql",
                "Actual SQL: {} ::: {} ::: {:?}",
                unit.data_source,
                unit.sql_unit.sql,
                unit.sql_unit.parameters
            );
        }
    }
}
