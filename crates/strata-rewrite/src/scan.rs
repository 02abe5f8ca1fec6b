//! Lexical table-token scanner.
//!
//! Finds occurrences of logical table names in the raw SQL text so they can
//! be replaced per route unit. The scan walks the text once, skipping quoted
//! strings and quoted identifiers, and matches whole identifiers only.

use crate::token::Token;

/// Produce one table token per occurrence of any logical table name.
///
/// Matching is case-insensitive and respects identifier boundaries:
/// `t_order` does not match inside `t_order_item`.
pub fn table_tokens(sql: &str, logic_tables: &[&str]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_quoted(bytes, i),
            c if is_ident_byte(c) => {
                let start = i;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                let word = &sql[start..i];
                if let Some(table) = logic_tables
                    .iter()
                    .find(|table| table.eq_ignore_ascii_case(word))
                {
                    tokens.push(Token::Table {
                        start,
                        stop: i - 1,
                        logic_table: (*table).to_string(),
                    });
                }
            }
            _ => i += 1,
        }
    }
    tokens
}

/// Locate the VALUES row list of an INSERT: the overall span plus the span
/// of each parenthesized row, in order.
///
/// Returns `None` when the text carries no recognizable VALUES list.
pub fn insert_values_span(sql: &str) -> Option<(usize, usize, Vec<(usize, usize)>)> {
    let bytes = sql.as_bytes();
    let mut i = 0;
    let mut after_values = None;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_quoted(bytes, i),
            c if is_ident_byte(c) => {
                let start = i;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                if sql[start..i].eq_ignore_ascii_case("values") {
                    after_values = Some(i);
                    break;
                }
            }
            _ => i += 1,
        }
    }

    let mut i = after_values?;
    let mut rows = Vec::new();
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'(' {
            break;
        }
        let row_start = i;
        let row_stop = matching_paren(bytes, i)?;
        rows.push((row_start, row_stop));
        i = row_stop + 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b',' {
            i += 1;
        } else {
            break;
        }
    }

    let first = rows.first()?.0;
    let last = rows.last()?.1;
    Some((first, last, rows))
}

/// Index of the `)` closing the `(` at `open`, honoring nesting and quoted
/// regions.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Skip a quoted region starting at `start`; returns the index after the
/// closing quote (or end of text if unterminated).
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            return i + 1;
        }
        if bytes[i] == b'\\' {
            i += 1;
        }
        i += 1;
    }
    i
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}
