//! Sharding rule and the sharding route decorator.

use std::sync::Arc;

use strata_core::config::{ClusterConfig, ConfigError, ShardingAlgorithmKind};
use strata_core::{ConfigProps, DataNode, ShardingValue, SqlValue};
use strata_parser::{StatementKind, ValueExpr};

use crate::condition::{InsertShardingConditionEngine, ShardingCondition};
use crate::context::{RouteContext, RouteMapper, RouteResult, RouteUnit};
use crate::decorator::RouteDecorator;
use crate::error::RouteError;
use crate::keygen::{KeyGenerator, SnowflakeKeyGenerator};
use crate::state::RoutingState;
use crate::time::{SystemTimeService, TimeService};

/// Sharding rule for one logical table.
pub struct TableRule {
    logic_table: String,
    data_nodes: Vec<DataNode>,
    sharding_column: String,
    key_column: Option<String>,
    key_generator: Arc<dyn KeyGenerator>,
    algorithm: ShardingAlgorithmKind,
}

impl TableRule {
    pub fn new(
        logic_table: impl Into<String>,
        data_nodes: Vec<DataNode>,
        sharding_column: impl Into<String>,
        key_column: Option<String>,
        key_generator: Arc<dyn KeyGenerator>,
    ) -> Self {
        Self {
            logic_table: logic_table.into(),
            data_nodes,
            sharding_column: sharding_column.into(),
            key_column,
            key_generator,
            algorithm: ShardingAlgorithmKind::Modulo,
        }
    }

    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    pub fn data_nodes(&self) -> &[DataNode] {
        &self.data_nodes
    }

    pub fn sharding_column(&self) -> &str {
        &self.sharding_column
    }

    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }

    pub fn generate_key(&self) -> ShardingValue {
        self.key_generator.generate()
    }

    /// Pick the data node a sharding value maps to.
    ///
    /// Values that carry no usable numeric form fall back to `None`; the
    /// caller then routes the statement to every node.
    pub fn shard(&self, value: &ShardingValue) -> Option<&DataNode> {
        let count = self.data_nodes.len() as u64;
        let index = match self.algorithm {
            ShardingAlgorithmKind::Modulo => shard_index(value, count)?,
        };
        Some(&self.data_nodes[index as usize])
    }
}

/// Index into a node list of size `count` for a sharding value.
fn shard_index(value: &ShardingValue, count: u64) -> Option<u64> {
    if count == 0 {
        return None;
    }
    match value {
        ShardingValue::Int(v) => Some(v.rem_euclid(count as i64) as u64),
        ShardingValue::Float(v) => {
            let index = v.rem_euclid(count as f64).round() as u64;
            Some(index % count)
        }
        ShardingValue::Text(text) => text
            .parse::<i64>()
            .ok()
            .map(|v| v.rem_euclid(count as i64) as u64),
        ShardingValue::Timestamp(ts) => Some(ts.timestamp_millis().rem_euclid(count as i64) as u64),
        ShardingValue::Bool(_) => None,
    }
}

/// The full set of sharding rules in effect.
pub struct ShardingRule {
    table_rules: Vec<TableRule>,
}

impl ShardingRule {
    pub fn new(table_rules: Vec<TableRule>) -> Self {
        Self { table_rules }
    }

    /// Build the runtime rule set from configuration. Each table with a
    /// configured key column gets its own key generator.
    pub fn from_config(config: &ClusterConfig) -> Result<Self, ConfigError> {
        let mut table_rules = Vec::with_capacity(config.sharding.len());
        for (table, rule) in &config.sharding {
            table_rules.push(TableRule {
                logic_table: table.clone(),
                data_nodes: rule.parsed_data_nodes()?,
                sharding_column: rule.sharding_column.clone(),
                key_column: rule.key_column.clone(),
                key_generator: Arc::new(SnowflakeKeyGenerator::default()),
                algorithm: rule.algorithm,
            });
        }
        Ok(Self { table_rules })
    }

    pub fn table_rule(&self, table: &str) -> Option<&TableRule> {
        self.table_rules
            .iter()
            .find(|rule| rule.logic_table.eq_ignore_ascii_case(table))
    }

    /// Whether `column` decides the placement of rows in `table`.
    pub fn is_sharding_column(&self, column: &str, table: &str) -> bool {
        self.table_rule(table)
            .is_some_and(|rule| rule.sharding_column.eq_ignore_ascii_case(column))
    }

    /// Whether any of this rule set's logical tables appears in the token
    /// set of a statement text.
    pub fn contains_sharding_table(&self, tokens: &[&str]) -> bool {
        self.table_rules.iter().any(|rule| {
            tokens
                .iter()
                .any(|token| token.eq_ignore_ascii_case(&rule.logic_table))
        })
    }

    pub fn logic_tables(&self) -> impl Iterator<Item = &str> {
        self.table_rules.iter().map(|rule| rule.logic_table.as_str())
    }
}

/// Routes statements over sharded tables to their data nodes.
///
/// Runs before data-source identity is touched: every unit it emits keeps
/// `logic == actual` on the data-source mapper, leaving the master/replica
/// decorator free to rewrite it.
pub struct ShardingRouteDecorator {
    rule: Arc<ShardingRule>,
    time: Arc<dyn TimeService>,
}

impl ShardingRouteDecorator {
    pub fn new(rule: Arc<ShardingRule>) -> Self {
        Self {
            rule,
            time: Arc::new(SystemTimeService),
        }
    }

    pub fn with_time_service(rule: Arc<ShardingRule>, time: Arc<dyn TimeService>) -> Self {
        Self { rule, time }
    }

    fn route_insert(
        &self,
        context: &mut RouteContext,
        table_index: usize,
        parameters: &[SqlValue],
    ) -> Result<(), RouteError> {
        let engine = InsertShardingConditionEngine::new(&self.rule, self.time.as_ref());
        let conditions = engine.create_sharding_conditions(&mut context.statement, parameters)?;
        let table_rule = &self.rule.table_rules[table_index];

        let mut result = RouteResult::new();
        let mut original_nodes = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            let nodes = nodes_for_condition(table_rule, condition);
            for node in &nodes {
                result.push_unit(route_unit(table_rule, node));
            }
            original_nodes.push(nodes.into_iter().cloned().collect());
        }
        result.set_original_data_nodes(original_nodes);
        context.result = result;
        Ok(())
    }

    fn route_by_predicates(&self, context: &mut RouteContext, table_index: usize, parameters: &[SqlValue]) {
        let table_rule = &self.rule.table_rules[table_index];
        let value = context
            .statement
            .where_predicates
            .iter()
            .filter(|p| p.column.eq_ignore_ascii_case(&table_rule.sharding_column))
            .find_map(|p| resolve_where_value(&p.value, parameters));

        let nodes: Vec<&DataNode> = match value.as_ref().and_then(|v| table_rule.shard(v)) {
            Some(node) => vec![node],
            None => {
                tracing::debug!(
                    table = table_rule.logic_table(),
                    "no usable sharding predicate, routing to all data nodes"
                );
                table_rule.data_nodes.iter().collect()
            }
        };

        let mut result = RouteResult::new();
        for node in nodes {
            result.push_unit(route_unit(table_rule, node));
        }
        context.result = result;
    }
}

impl RouteDecorator for ShardingRouteDecorator {
    fn order(&self) -> i32 {
        0
    }

    fn decorate(
        &self,
        mut context: RouteContext,
        parameters: &[SqlValue],
        _state: &mut RoutingState,
        _props: &ConfigProps,
    ) -> Result<RouteContext, RouteError> {
        // No matching rule instance: this decorator does not apply.
        let Some(table_index) = context.statement.tables.iter().find_map(|table| {
            self.rule
                .table_rules
                .iter()
                .position(|rule| rule.logic_table.eq_ignore_ascii_case(&table.name))
        }) else {
            return Ok(context);
        };

        match context.statement.kind {
            StatementKind::Insert => self.route_insert(&mut context, table_index, parameters)?,
            _ => self.route_by_predicates(&mut context, table_index, parameters),
        }
        Ok(context)
    }
}

fn nodes_for_condition<'a>(
    table_rule: &'a TableRule,
    condition: &ShardingCondition,
) -> Vec<&'a DataNode> {
    let value = condition
        .route_values
        .iter()
        .filter(|rv| rv.column.eq_ignore_ascii_case(&table_rule.sharding_column))
        .flat_map(|rv| rv.values.first())
        .next();
    match value.and_then(|v| table_rule.shard(v)) {
        Some(node) => vec![node],
        None => table_rule.data_nodes.iter().collect(),
    }
}

fn resolve_where_value(expr: &ValueExpr, parameters: &[SqlValue]) -> Option<ShardingValue> {
    match expr {
        ValueExpr::Literal(value) => value.as_sharding_value(),
        ValueExpr::Marker(index) => parameters.get(*index)?.as_sharding_value(),
        ValueExpr::Now | ValueExpr::Complex => None,
    }
}

fn route_unit(table_rule: &TableRule, node: &DataNode) -> RouteUnit {
    RouteUnit::new(
        RouteMapper::new(node.data_source.clone(), node.data_source.clone()),
        vec![RouteMapper::new(
            table_rule.logic_table.clone(),
            node.table.clone(),
        )],
    )
}
