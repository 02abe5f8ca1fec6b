//! Error types for rewriting.

use thiserror::Error;

/// Errors raised while building a rewrite context.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A parameter marker points past the bound parameter list.
    #[error("parameter marker {index} out of range, {count} parameters bound")]
    MarkerOutOfRange { index: usize, count: usize },
}
