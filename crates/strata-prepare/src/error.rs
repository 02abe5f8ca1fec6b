//! Error types for the prepare pipeline.

use thiserror::Error;

use strata_core::config::ConfigError;
use strata_parser::ParseError;
use strata_rewrite::RewriteError;
use strata_route::RouteError;

/// Errors raised while preparing a statement. Any of these aborts the whole
/// `prepare` call; no partial execution context is returned.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// The statement can skip sharding but its route did not collapse to a
    /// single data source.
    #[error("statement can skip sharding but route is ambiguous, sql=`{sql}`, route units: {route_units}")]
    AmbiguousSkipRoute { sql: String, route_units: String },

    /// The configuration names no data source to fall back to.
    #[error("no data sources configured")]
    NoDataSources,

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
