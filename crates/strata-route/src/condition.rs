//! Sharding conditions for INSERT statements.

use strata_core::{ShardingValue, SqlValue};
use strata_parser::{StatementContext, ValueExpr};

use crate::error::RouteError;
use crate::sharding::ShardingRule;
use crate::time::TimeService;

/// One routing predicate: a column of a table restricted to a value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteValue {
    pub column: String,
    pub table: String,
    pub values: Vec<ShardingValue>,
}

/// The routing predicates derived from one INSERT value row, in column
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardingCondition {
    pub route_values: Vec<RouteValue>,
}

/// Derives sharding conditions from an INSERT statement.
///
/// Produces exactly one condition per value row, in row order; parameter
/// grouping downstream depends on that correspondence.
pub struct InsertShardingConditionEngine<'a> {
    rule: &'a ShardingRule,
    time: &'a dyn TimeService,
}

impl<'a> InsertShardingConditionEngine<'a> {
    pub fn new(rule: &'a ShardingRule, time: &'a dyn TimeService) -> Self {
        Self { rule, time }
    }

    /// Create the per-row conditions, generating key values where the rule
    /// owns the key column. Generated values are surfaced on the statement
    /// context in row order.
    pub fn create_sharding_conditions(
        &self,
        statement: &mut StatementContext,
        parameters: &[SqlValue],
    ) -> Result<Vec<ShardingCondition>, RouteError> {
        let Some(insert) = statement.insert.clone() else {
            return Ok(Vec::new());
        };
        let table = insert.table.as_str();
        let table_rule = self.rule.table_rule(table);
        let generated_key_column = table_rule
            .and_then(|rule| generated_key_column(rule, &insert.columns));
        let column_names: Vec<&String> = insert
            .columns
            .iter()
            .filter(|column| {
                generated_key_column
                    .as_deref()
                    .is_none_or(|key| !column.eq_ignore_ascii_case(key))
            })
            .collect();

        let mut conditions = Vec::with_capacity(insert.value_rows.len());
        for row in &insert.value_rows {
            if row.len() != column_names.len() {
                return Err(RouteError::ValueCountMismatch {
                    table: table.to_string(),
                    columns: column_names.len(),
                    values: row.len(),
                });
            }
            conditions.push(self.create_condition(table, &column_names, row, parameters)?);
        }

        if let (Some(rule), Some(key_column)) = (table_rule, generated_key_column) {
            // One generated value per row, produced up front.
            let generated: Vec<ShardingValue> =
                (0..insert.row_count()).map(|_| rule.generate_key()).collect();
            if self.rule.is_sharding_column(&key_column, table) {
                for (condition, value) in conditions.iter_mut().zip(&generated) {
                    condition.route_values.push(RouteValue {
                        column: key_column.clone(),
                        table: table.to_string(),
                        values: vec![value.clone()],
                    });
                }
            }
            statement.generated_key_values = generated;
        }
        Ok(conditions)
    }

    fn create_condition(
        &self,
        table: &str,
        column_names: &[&String],
        row: &[ValueExpr],
        parameters: &[SqlValue],
    ) -> Result<ShardingCondition, RouteError> {
        let mut condition = ShardingCondition::default();
        for (column, expr) in column_names.iter().zip(row) {
            if !self.rule.is_sharding_column(column, table) {
                continue;
            }
            if let Some(value) = self.resolve(table, column, expr, parameters)? {
                condition.route_values.push(RouteValue {
                    column: (*column).clone(),
                    table: table.to_string(),
                    values: vec![value],
                });
            }
        }
        Ok(condition)
    }

    fn resolve(
        &self,
        table: &str,
        column: &str,
        expr: &ValueExpr,
        parameters: &[SqlValue],
    ) -> Result<Option<ShardingValue>, RouteError> {
        match expr {
            ValueExpr::Literal(value) => self.orderable(table, column, value).map(Some),
            ValueExpr::Marker(index) => {
                let value = parameters
                    .get(*index)
                    .ok_or(RouteError::MarkerOutOfRange {
                        index: *index,
                        count: parameters.len(),
                    })?;
                self.orderable(table, column, value).map(Some)
            }
            ValueExpr::Now => Ok(Some(ShardingValue::Timestamp(self.time.now()))),
            // Expressions routing cannot see through contribute no condition.
            ValueExpr::Complex => Ok(None),
        }
    }

    fn orderable(
        &self,
        table: &str,
        column: &str,
        value: &SqlValue,
    ) -> Result<ShardingValue, RouteError> {
        if value.is_null() {
            return Err(RouteError::NullShardingValue {
                column: column.to_string(),
            });
        }
        value
            .as_sharding_value()
            .ok_or_else(|| RouteError::UnorderableShardingValue {
                table: table.to_string(),
                column: column.to_string(),
                value: value.to_string(),
            })
    }
}

/// The key column a rule generates for an INSERT: configured on the table
/// rule and absent from the statement's column list.
fn generated_key_column(rule: &crate::sharding::TableRule, columns: &[String]) -> Option<String> {
    let key_column = rule.key_column()?;
    let listed = columns
        .iter()
        .any(|column| column.eq_ignore_ascii_case(key_column));
    (!listed).then(|| key_column.to_string())
}
