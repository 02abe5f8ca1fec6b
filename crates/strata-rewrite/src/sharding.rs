//! Sharding rewrite-context decorator.

use std::sync::Arc;

use strata_parser::{StatementContext, ValueExpr};
use strata_route::{RouteResult, ShardingRule};

use crate::context::{SqlRewriteContext, SqlRewriteContextDecorator};
use crate::error::RewriteError;
use crate::param::ParameterBuilder;
use crate::scan::{insert_values_span, table_tokens};
use crate::token::{InsertValue, Token};

/// Attaches table tokens for every sharded logical table and, for INSERT
/// statements over a sharded table, regroups the flat parameter list into
/// one group per value row and replaces the VALUES list with a token that
/// renders only the rows routed to each unit.
pub struct ShardingRewriteDecorator {
    rule: Arc<ShardingRule>,
}

impl ShardingRewriteDecorator {
    pub fn new(rule: Arc<ShardingRule>) -> Self {
        Self { rule }
    }

    fn decorate_insert(
        &self,
        context: &mut SqlRewriteContext,
        statement: &StatementContext,
        route_result: &RouteResult,
    ) -> Result<(), RewriteError> {
        let Some(insert) = &statement.insert else {
            return Ok(());
        };
        if self.rule.table_rule(&insert.table).is_none() {
            return Ok(());
        }

        // Row-major regrouping: each row's group holds exactly the
        // parameters its markers consumed, in marker order.
        let parameters = context.parameter_builder.parameters();
        let mut groups = Vec::with_capacity(insert.value_rows.len());
        for row in &insert.value_rows {
            let mut group = Vec::new();
            for expr in row {
                if let ValueExpr::Marker(index) = expr {
                    let value = parameters
                        .get(*index)
                        .ok_or(RewriteError::MarkerOutOfRange {
                            index: *index,
                            count: parameters.len(),
                        })?;
                    group.push(value.clone());
                }
            }
            groups.push(group);
        }
        context.parameter_builder = ParameterBuilder::Grouped { groups };

        // Rows split across units render only where they were routed.
        match insert_values_span(&context.sql) {
            Some((start, stop, rows)) if rows.len() == insert.value_rows.len() => {
                let values = rows
                    .iter()
                    .enumerate()
                    .map(|(index, (row_start, row_stop))| InsertValue {
                        text: context.sql[*row_start..=*row_stop].to_string(),
                        data_nodes: route_result
                            .original_data_nodes()
                            .get(index)
                            .cloned()
                            .unwrap_or_default(),
                    })
                    .collect();
                context.tokens.push(Token::InsertValues { start, stop, values });
            }
            _ => {
                tracing::debug!(
                    table = %insert.table,
                    "VALUES list not rewritten, row spans not recognized"
                );
            }
        }
        Ok(())
    }
}

impl SqlRewriteContextDecorator for ShardingRewriteDecorator {
    fn order(&self) -> i32 {
        0
    }

    fn decorate(
        &self,
        context: &mut SqlRewriteContext,
        statement: &StatementContext,
        route_result: &RouteResult,
    ) -> Result<(), RewriteError> {
        let logic_tables: Vec<&str> = self.rule.logic_tables().collect();
        if logic_tables.is_empty() {
            return Ok(());
        }
        context
            .tokens
            .extend(table_tokens(&context.sql, &logic_tables));
        self.decorate_insert(context, statement, route_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicI64, Ordering};
    use strata_core::{DataNode, ShardingValue, SqlValue};
    use strata_parser::SqlAnalyzer;
    use strata_route::{KeyGenerator, TableRule};

    struct SequenceKeys(AtomicI64);

    impl KeyGenerator for SequenceKeys {
        fn generate(&self) -> ShardingValue {
            ShardingValue::Int(self.0.fetch_add(1, Ordering::Relaxed))
        }
    }

    fn order_rule() -> Arc<ShardingRule> {
        Arc::new(ShardingRule::new(vec![TableRule::new(
            "t_order",
            vec![
                DataNode::new("ds_0", "t_order_0"),
                DataNode::new("ds_1", "t_order_1"),
            ],
            "order_id",
            None,
            Arc::new(SequenceKeys(AtomicI64::new(0))),
        )]))
    }

    fn decorate(sql: &str, parameters: Vec<SqlValue>, route_result: &RouteResult) -> SqlRewriteContext {
        let decorator = ShardingRewriteDecorator::new(order_rule());
        let statement = SqlAnalyzer::new().analyze(sql).unwrap();
        let mut context = SqlRewriteContext::new(sql, parameters);
        decorator
            .decorate(&mut context, &statement, route_result)
            .unwrap();
        context
    }

    #[test]
    fn select_gets_table_tokens_and_keeps_standard_builder() {
        let context = decorate(
            "SELECT * FROM t_order WHERE order_id = ?",
            vec![SqlValue::Int(1)],
            &RouteResult::new(),
        );
        assert_eq!(context.tokens.len(), 1);
        assert!(!context.parameter_builder.is_grouped());
    }

    #[test]
    fn insert_parameters_group_by_row() {
        let context = decorate(
            "INSERT INTO t_order (order_id, status) VALUES (?, ?), (?, ?)",
            vec![
                SqlValue::Int(1),
                SqlValue::Text("a".into()),
                SqlValue::Int(2),
                SqlValue::Text("b".into()),
            ],
            &RouteResult::new(),
        );
        assert!(context.parameter_builder.is_grouped());
        assert_eq!(
            context.parameter_builder.group(0),
            &[SqlValue::Int(1), SqlValue::Text("a".into())]
        );
        assert_eq!(
            context.parameter_builder.group(1),
            &[SqlValue::Int(2), SqlValue::Text("b".into())]
        );
    }

    #[test]
    fn insert_with_literal_rows_gets_empty_groups() {
        let context = decorate(
            "INSERT INTO t_order (order_id, status) VALUES (1, 'a'), (2, ?)",
            vec![SqlValue::Text("b".into())],
            &RouteResult::new(),
        );
        assert_eq!(context.parameter_builder.group(0), &[] as &[SqlValue]);
        assert_eq!(
            context.parameter_builder.group(1),
            &[SqlValue::Text("b".into())]
        );
    }

    #[test]
    fn insert_values_token_carries_row_data_nodes() {
        let mut route_result = RouteResult::new();
        route_result.set_original_data_nodes(vec![
            vec![DataNode::new("ds_1", "t_order_1")],
            vec![DataNode::new("ds_0", "t_order_0")],
        ]);
        let context = decorate(
            "INSERT INTO t_order (order_id, status) VALUES (1, 'a'), (2, 'b')",
            vec![],
            &route_result,
        );

        let values_token = context
            .tokens
            .iter()
            .find(|token| matches!(token, Token::InsertValues { .. }))
            .unwrap();
        let Token::InsertValues { values, .. } = values_token else {
            unreachable!();
        };
        assert_eq!(values[0].text, "(1, 'a')");
        assert_eq!(values[0].data_nodes, vec![DataNode::new("ds_1", "t_order_1")]);
        assert_eq!(values[1].data_nodes, vec![DataNode::new("ds_0", "t_order_0")]);
    }

    #[test]
    fn unrelated_insert_keeps_standard_builder() {
        let context = decorate(
            "INSERT INTO t_user (id) VALUES (?)",
            vec![SqlValue::Int(1)],
            &RouteResult::new(),
        );
        assert!(!context.parameter_builder.is_grouped());
        assert!(context.tokens.is_empty());
    }
}
