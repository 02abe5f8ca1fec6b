//! Error types for routing.

use thiserror::Error;

/// Errors raised while routing a statement.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A sharding column resolved to a value that cannot be ordered.
    #[error("sharding value for `{table}`.`{column}` must be orderable, got `{value}`")]
    UnorderableShardingValue {
        table: String,
        column: String,
        value: String,
    },

    /// An INSERT bound NULL to a sharding column.
    #[error("insert sharding column `{column}` cannot be NULL")]
    NullShardingValue { column: String },

    /// A parameter marker points past the bound parameter list.
    #[error("parameter marker {index} out of range, {count} parameters bound")]
    MarkerOutOfRange { index: usize, count: usize },

    /// An INSERT value row is shorter or longer than the column list.
    #[error("insert into `{table}` has {columns} columns but a value row with {values} values")]
    ValueCountMismatch {
        table: String,
        columns: usize,
        values: usize,
    },
}
