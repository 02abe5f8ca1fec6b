//! Token-based SQL text reconstruction.
//!
//! One left-to-right pass: the prefix before the first token, then for each
//! token its rewritten text followed by the unchanged span up to the next
//! token (or end of text). Tokens are sorted by start index and assumed
//! non-overlapping; producers validate that.

use strata_route::RouteUnit;

use crate::context::SqlRewriteContext;
use crate::token::Token;

/// Reconstruct the SQL with no route unit in play (tokens render their
/// logical form).
pub fn to_sql(context: &SqlRewriteContext) -> String {
    build(&context.sql, &context.tokens, None)
}

/// Reconstruct the SQL for one route unit (table tokens resolve to the
/// unit's actual tables).
pub fn to_sql_for_unit(context: &SqlRewriteContext, unit: &RouteUnit) -> String {
    build(&context.sql, &context.tokens, Some(unit))
}

fn build(sql: &str, tokens: &[Token], unit: Option<&RouteUnit>) -> String {
    if tokens.is_empty() {
        return sql.to_string();
    }

    let mut sorted: Vec<&Token> = tokens.iter().collect();
    sorted.sort_by_key(|token| token.start());

    let mut result = String::with_capacity(sql.len());
    result.push_str(&sql[..sorted[0].start().min(sql.len())]);
    for (i, token) in sorted.iter().enumerate() {
        result.push_str(&token.render(unit));
        let conjunction_start = token.conjunction_start().min(sql.len());
        let conjunction_stop = match sorted.get(i + 1) {
            Some(next) => next.start().min(sql.len()),
            None => sql.len(),
        };
        result.push_str(&sql[conjunction_start..conjunction_stop]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use pretty_assertions::assert_eq;
    use strata_route::RouteMapper;

    fn context(sql: &str, tokens: Vec<Token>) -> SqlRewriteContext {
        let mut context = SqlRewriteContext::new(sql, Vec::new());
        context.tokens = tokens;
        context
    }

    #[test]
    fn empty_token_list_returns_sql_unchanged() {
        let sql = "SELECT * FROM t_order WHERE id=1";
        assert_eq!(to_sql(&context(sql, Vec::new())), sql);
    }

    #[test]
    fn single_substitution_replaces_exact_span() {
        let sql = "SELECT * FROM t_order_x WHERE id=1";
        let tokens = vec![Token::Substitutable {
            start: 14,
            stop: 22,
            text: "t_order_0".to_string(),
        }];
        assert_eq!(
            to_sql(&context(sql, tokens)),
            "SELECT * FROM t_order_0 WHERE id=1"
        );
    }

    #[test]
    fn tokens_are_sorted_before_splicing() {
        let sql = "SELECT a, b FROM t";
        let tokens = vec![
            Token::Substitutable {
                start: 10,
                stop: 10,
                text: "bb".to_string(),
            },
            Token::Substitutable {
                start: 7,
                stop: 7,
                text: "aa".to_string(),
            },
        ];
        assert_eq!(to_sql(&context(sql, tokens)), "SELECT aa, bb FROM t");
    }

    #[test]
    fn insertable_token_adds_text_without_consuming() {
        let sql = "SELECT * FROM t_order";
        let tokens = vec![Token::Insertable {
            start: 21,
            text: " WHERE tenant_id = 1".to_string(),
        }];
        assert_eq!(
            to_sql(&context(sql, tokens)),
            "SELECT * FROM t_order WHERE tenant_id = 1"
        );
    }

    #[test]
    fn table_token_resolves_per_unit() {
        let sql = "SELECT * FROM t_order WHERE id=1";
        let tokens = vec![Token::Table {
            start: 14,
            stop: 20,
            logic_table: "t_order".to_string(),
        }];
        let unit = strata_route::RouteUnit::new(
            RouteMapper::new("ds_0", "ds_0"),
            vec![RouteMapper::new("t_order", "t_order_1")],
        );
        assert_eq!(
            to_sql_for_unit(&context(sql, tokens), &unit),
            "SELECT * FROM t_order_1 WHERE id=1"
        );
    }

    #[test]
    fn trailing_token_reaches_end_of_text() {
        let sql = "SELECT * FROM t_order";
        let tokens = vec![Token::Table {
            start: 14,
            stop: 20,
            logic_table: "t_order".to_string(),
        }];
        assert_eq!(to_sql(&context(sql, tokens)), sql);
    }
}
