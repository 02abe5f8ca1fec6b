//! Rewrite engines.

use strata_core::SqlValue;
use strata_route::{RouteResult, RouteUnit};

use crate::builder::{to_sql, to_sql_for_unit};
use crate::context::SqlRewriteContext;

/// The rewritten SQL and the parameters that go with it.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRewriteResult {
    pub sql: String,
    pub parameters: Vec<SqlValue>,
}

/// Rewrites a statement with no route in play.
#[derive(Debug, Default)]
pub struct SqlRewriteEngine;

impl SqlRewriteEngine {
    pub fn rewrite(&self, context: &SqlRewriteContext) -> SqlRewriteResult {
        SqlRewriteResult {
            sql: to_sql(context),
            parameters: context.parameter_builder.parameters(),
        }
    }
}

/// Rewrites a statement once per route unit, slicing parameters per unit.
#[derive(Debug, Default)]
pub struct SqlRouteRewriteEngine;

impl SqlRouteRewriteEngine {
    /// One rewrite result per route unit, in unit order.
    pub fn rewrite(
        &self,
        context: &SqlRewriteContext,
        route_result: &RouteResult,
    ) -> Vec<(RouteUnit, SqlRewriteResult)> {
        route_result
            .units()
            .iter()
            .map(|unit| {
                let result = SqlRewriteResult {
                    sql: to_sql_for_unit(context, unit),
                    parameters: self.parameters_for_unit(context, route_result, unit),
                };
                (unit.clone(), result)
            })
            .collect()
    }

    /// A standard builder, no per-row groupings, or no parameters at all:
    /// every unit receives the full list. Otherwise concatenate, in row
    /// order, every row-group whose data nodes include this unit.
    fn parameters_for_unit(
        &self,
        context: &SqlRewriteContext,
        route_result: &RouteResult,
        unit: &RouteUnit,
    ) -> Vec<SqlValue> {
        let builder = &context.parameter_builder;
        if !builder.is_grouped()
            || route_result.original_data_nodes().is_empty()
            || builder.is_empty()
        {
            return builder.parameters();
        }
        let mut parameters = Vec::new();
        for (row, nodes) in route_result.original_data_nodes().iter().enumerate() {
            let in_unit = nodes.is_empty()
                || nodes
                    .iter()
                    .any(|node| unit.find_table_mapper(&node.data_source, &node.table).is_some());
            if in_unit {
                parameters.extend_from_slice(builder.group(row));
            }
        }
        parameters
    }
}
