//! SQL parsing and analysis.

use sqlparser::ast::{
    Expr, Insert, SetExpr, Statement, TableFactor, TableWithJoins, Value,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

use strata_core::SqlValue;

use crate::error::ParseError;
use crate::statement::{
    EqualityPredicate, InsertContext, StatementContext, StatementKind, TableReference, ValueExpr,
};

/// Analyzes SQL statements into [`StatementContext`]s.
pub struct SqlAnalyzer {
    dialect: MySqlDialect,
}

impl Clone for SqlAnalyzer {
    fn clone(&self) -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }
}

impl Default for SqlAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlAnalyzer {
    /// Create a new SQL analyzer.
    pub fn new() -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }

    /// Analyze the first statement of the given SQL text.
    pub fn analyze(&self, sql: &str) -> Result<StatementContext, ParseError> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| ParseError::Syntax(e.to_string()))?;
        let statement = statements.first().ok_or(ParseError::EmptyStatement)?;

        let kind = self.classify(statement);
        let tables = self.extract_tables(statement);
        let insert = match statement {
            Statement::Insert(insert) => self.extract_insert(insert),
            _ => None,
        };
        let where_predicates = self.extract_where_predicates(statement);

        Ok(StatementContext {
            kind,
            tables,
            insert,
            where_predicates,
            generated_key_values: Vec::new(),
        })
    }

    fn classify(&self, statement: &Statement) -> StatementKind {
        match statement {
            Statement::Query(query) => StatementKind::Select {
                has_lock: !query.locks.is_empty(),
            },
            Statement::Insert { .. } => StatementKind::Insert,
            Statement::Update { .. } => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::CreateTable { .. }
            | Statement::AlterTable { .. }
            | Statement::Drop { .. }
            | Statement::Truncate { .. }
            | Statement::CreateIndex { .. }
            | Statement::CreateView { .. } => StatementKind::Ddl,
            _ => StatementKind::Other,
        }
    }

    fn extract_tables(&self, statement: &Statement) -> Vec<TableReference> {
        let mut tables = Vec::new();
        match statement {
            Statement::Query(query) => {
                if let Some(body) = query.body.as_select() {
                    for table_with_joins in &body.from {
                        self.visit_table_with_joins(table_with_joins, &mut tables);
                    }
                }
            }
            Statement::Insert(insert) => {
                tables.push(TableReference {
                    name: strip_schema(&insert.table.to_string()),
                    alias: None,
                });
            }
            Statement::Update(update) => {
                self.visit_table_with_joins(&update.table, &mut tables);
            }
            Statement::Delete(delete) => {
                let from = match &delete.from {
                    sqlparser::ast::FromTable::WithFromKeyword(twj) => twj,
                    sqlparser::ast::FromTable::WithoutKeyword(twj) => twj,
                };
                for table_with_joins in from {
                    self.visit_table_with_joins(table_with_joins, &mut tables);
                }
            }
            _ => {}
        }
        tables
    }

    fn visit_table_with_joins(
        &self,
        table_with_joins: &TableWithJoins,
        tables: &mut Vec<TableReference>,
    ) {
        self.visit_table_factor(&table_with_joins.relation, tables);
        for join in &table_with_joins.joins {
            self.visit_table_factor(&join.relation, tables);
        }
    }

    fn visit_table_factor(&self, table_factor: &TableFactor, tables: &mut Vec<TableReference>) {
        if let TableFactor::Table { name, alias, .. } = table_factor {
            tables.push(TableReference {
                name: strip_schema(&name.to_string()),
                alias: alias.as_ref().map(|a| a.name.value.clone()),
            });
        }
    }

    fn extract_insert(&self, insert: &Insert) -> Option<InsertContext> {
        let source = insert.source.as_ref()?;
        let SetExpr::Values(values) = source.body.as_ref() else {
            // INSERT ... SELECT carries no value rows to shard on.
            tracing::debug!("INSERT source is not a VALUES list");
            return None;
        };

        let columns: Vec<String> = insert.columns.iter().map(|c| c.value.clone()).collect();
        let mut marker_index = 0usize;
        let value_rows = values
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|expr| self.classify_value_expr(expr, &mut marker_index))
                    .collect()
            })
            .collect();

        Some(InsertContext {
            table: strip_schema(&insert.table.to_string()),
            columns,
            value_rows,
        })
    }

    fn extract_where_predicates(&self, statement: &Statement) -> Vec<EqualityPredicate> {
        let mut marker_index = 0usize;
        let mut predicates = Vec::new();
        match statement {
            Statement::Query(query) => {
                if let Some(body) = query.body.as_select()
                    && let Some(selection) = &body.selection
                {
                    self.visit_conjunction(selection, &mut marker_index, &mut predicates);
                }
            }
            Statement::Update(update) => {
                // SET-clause markers consume positions before the WHERE ones.
                for assignment in &update.assignments {
                    self.classify_value_expr(&assignment.value, &mut marker_index);
                }
                if let Some(selection) = &update.selection {
                    self.visit_conjunction(selection, &mut marker_index, &mut predicates);
                }
            }
            Statement::Delete(delete) => {
                if let Some(selection) = &delete.selection {
                    self.visit_conjunction(selection, &mut marker_index, &mut predicates);
                }
            }
            _ => {}
        }
        predicates
    }

    fn visit_conjunction(
        &self,
        expr: &Expr,
        marker_index: &mut usize,
        predicates: &mut Vec<EqualityPredicate>,
    ) {
        match expr {
            Expr::BinaryOp { left, op, right } => match op {
                sqlparser::ast::BinaryOperator::And => {
                    self.visit_conjunction(left, marker_index, predicates);
                    self.visit_conjunction(right, marker_index, predicates);
                }
                sqlparser::ast::BinaryOperator::Eq => {
                    if let Some(column) = column_name(left) {
                        let value = self.classify_value_expr(right, marker_index);
                        predicates.push(EqualityPredicate { column, value });
                    } else if let Some(column) = column_name(right) {
                        let value = self.classify_value_expr(left, marker_index);
                        predicates.push(EqualityPredicate { column, value });
                    } else {
                        self.count_markers(left, marker_index);
                        self.count_markers(right, marker_index);
                    }
                }
                _ => {
                    self.count_markers(left, marker_index);
                    self.count_markers(right, marker_index);
                }
            },
            Expr::Nested(inner) => self.visit_conjunction(inner, marker_index, predicates),
            other => self.count_markers(other, marker_index),
        }
    }

    /// Advance the marker counter over an expression we otherwise ignore.
    fn count_markers(&self, expr: &Expr, marker_index: &mut usize) {
        match expr {
            Expr::Value(value) => {
                if matches!(value.value, Value::Placeholder(_)) {
                    *marker_index += 1;
                }
            }
            Expr::BinaryOp { left, right, .. } => {
                self.count_markers(left, marker_index);
                self.count_markers(right, marker_index);
            }
            Expr::Nested(inner) => self.count_markers(inner, marker_index),
            Expr::UnaryOp { expr, .. } => self.count_markers(expr, marker_index),
            _ => {}
        }
    }

    fn classify_value_expr(&self, expr: &Expr, marker_index: &mut usize) -> ValueExpr {
        match expr {
            Expr::Value(value) => match &value.value {
                Value::Placeholder(_) => {
                    let index = *marker_index;
                    *marker_index += 1;
                    ValueExpr::Marker(index)
                }
                other => match literal_value(other) {
                    Some(value) => ValueExpr::Literal(value),
                    None => ValueExpr::Complex,
                },
            },
            Expr::Function(function) => {
                let name = function.name.to_string().to_lowercase();
                if name == "now" || name == "current_timestamp" {
                    ValueExpr::Now
                } else {
                    ValueExpr::Complex
                }
            }
            other => {
                self.count_markers(other, marker_index);
                ValueExpr::Complex
            }
        }
    }
}

fn column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(idents) => idents.last().map(|i| i.value.clone()),
        _ => None,
    }
}

fn literal_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::Number(text, _) => {
            if let Ok(int) = text.parse::<i64>() {
                Some(SqlValue::Int(int))
            } else {
                text.parse::<f64>().ok().map(SqlValue::Float)
            }
        }
        Value::SingleQuotedString(text) | Value::DoubleQuotedString(text) => {
            Some(SqlValue::Text(text.clone()))
        }
        Value::Boolean(flag) => Some(SqlValue::Bool(*flag)),
        Value::Null => Some(SqlValue::Null),
        _ => None,
    }
}

fn strip_schema(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).trim_matches('`').to_string()
}
