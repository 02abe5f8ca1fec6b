//! Error types for SQL analysis.

use thiserror::Error;

/// Errors that can occur while analyzing a statement.
#[derive(Debug, Error)]
pub enum ParseError {
    /// SQL parsing failed.
    #[error("failed to parse SQL: {0}")]
    Syntax(String),

    /// The text contained no statement.
    #[error("no statement found in SQL text")]
    EmptyStatement,
}
