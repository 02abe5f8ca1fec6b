//! SQL rewrite tokens.

use std::borrow::Cow;

use strata_core::DataNode;
use strata_route::RouteUnit;

/// One row of an INSERT VALUES list: its original text and the data nodes
/// the row was routed to (empty = every unit receives it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertValue {
    pub text: String,
    pub data_nodes: Vec<DataNode>,
}

/// A text-replacement directive anchored at a byte offset of the original
/// SQL. Tokens sort by start index and must not overlap; their producers
/// validate that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Replace the span `start..=stop` with fixed text.
    Substitutable {
        start: usize,
        stop: usize,
        text: String,
    },

    /// Replace the span `start..=stop` (a logical table name) with the
    /// actual table the route unit mapped it to.
    Table {
        start: usize,
        stop: usize,
        logic_table: String,
    },

    /// Replace the span `start..=stop` (a whole VALUES list) with only the
    /// rows routed to the unit being rendered.
    InsertValues {
        start: usize,
        stop: usize,
        values: Vec<InsertValue>,
    },

    /// Insert fixed text at `start` without consuming original text.
    Insertable { start: usize, text: String },
}

impl Token {
    pub fn start(&self) -> usize {
        match self {
            Token::Substitutable { start, .. }
            | Token::Table { start, .. }
            | Token::InsertValues { start, .. }
            | Token::Insertable { start, .. } => *start,
        }
    }

    /// Where the unchanged text after this token resumes: one past the
    /// replaced span for substituting tokens, the anchor itself otherwise.
    pub fn conjunction_start(&self) -> usize {
        match self {
            Token::Substitutable { stop, .. }
            | Token::Table { stop, .. }
            | Token::InsertValues { stop, .. } => stop + 1,
            Token::Insertable { start, .. } => *start,
        }
    }

    /// The replacement text, resolved against a route unit when one is in
    /// play. A table token with no mapping in the unit keeps the logical
    /// name; an insert-values token with no unit renders every row.
    pub fn render<'a>(&'a self, unit: Option<&'a RouteUnit>) -> Cow<'a, str> {
        match self {
            Token::Substitutable { text, .. } | Token::Insertable { text, .. } => {
                Cow::Borrowed(text.as_str())
            }
            Token::Table { logic_table, .. } => Cow::Borrowed(
                unit.and_then(|unit| unit.actual_table(logic_table))
                    .unwrap_or(logic_table),
            ),
            Token::InsertValues { values, .. } => {
                let rows: Vec<&str> = values
                    .iter()
                    .filter(|value| row_in_unit(value, unit))
                    .map(|value| value.text.as_str())
                    .collect();
                Cow::Owned(rows.join(", "))
            }
        }
    }
}

fn row_in_unit(value: &InsertValue, unit: Option<&RouteUnit>) -> bool {
    let Some(unit) = unit else {
        return true;
    };
    value.data_nodes.is_empty()
        || value
            .data_nodes
            .iter()
            .any(|node| unit.find_table_mapper(&node.data_source, &node.table).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_route::RouteMapper;

    fn unit(ds: &str, table: &str) -> RouteUnit {
        RouteUnit::new(
            RouteMapper::new(ds, ds),
            vec![RouteMapper::new("t_order", table)],
        )
    }

    #[test]
    fn table_token_resolves_against_unit() {
        let token = Token::Table {
            start: 14,
            stop: 20,
            logic_table: "t_order".to_string(),
        };
        assert_eq!(token.render(Some(&unit("ds_0", "t_order_0"))), "t_order_0");
        assert_eq!(token.render(None), "t_order");
    }

    #[test]
    fn insertable_token_consumes_no_span() {
        let token = Token::Insertable {
            start: 5,
            text: ", extra".to_string(),
        };
        assert_eq!(token.conjunction_start(), 5);
    }

    #[test]
    fn insert_values_token_filters_rows_per_unit() {
        let token = Token::InsertValues {
            start: 0,
            stop: 10,
            values: vec![
                InsertValue {
                    text: "(1, 'a')".to_string(),
                    data_nodes: vec![DataNode::new("ds_0", "t_order_0")],
                },
                InsertValue {
                    text: "(2, 'b')".to_string(),
                    data_nodes: vec![DataNode::new("ds_1", "t_order_1")],
                },
            ],
        };
        assert_eq!(token.render(Some(&unit("ds_0", "t_order_0"))), "(1, 'a')");
        assert_eq!(token.render(Some(&unit("ds_1", "t_order_1"))), "(2, 'b')");
        assert_eq!(token.render(None), "(1, 'a'), (2, 'b')");
    }

    #[test]
    fn ungrouped_rows_render_everywhere() {
        let token = Token::InsertValues {
            start: 0,
            stop: 10,
            values: vec![InsertValue {
                text: "(1)".to_string(),
                data_nodes: vec![],
            }],
        };
        assert_eq!(token.render(Some(&unit("ds_0", "t_order_0"))), "(1)");
    }
}
