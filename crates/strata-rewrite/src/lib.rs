//! # strata-rewrite
//!
//! Token-based SQL rewriting for the Strata sharding middleware.
//!
//! Rewrite-context decorators inspect the analyzed statement and attach
//! [`Token`]s (text-replacement directives anchored at byte offsets of the
//! original SQL) plus a parameter builder to a [`SqlRewriteContext`]. The
//! engines then produce, per route unit, the rewritten SQL text and the
//! parameter slice belonging to that unit.

pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod param;
pub mod scan;
pub mod sharding;
pub mod token;

pub use builder::{to_sql, to_sql_for_unit};
pub use context::{RewriteDecoratorRegistry, SqlRewriteContext, SqlRewriteContextDecorator};
pub use engine::{SqlRewriteEngine, SqlRewriteResult, SqlRouteRewriteEngine};
pub use error::RewriteError;
pub use param::ParameterBuilder;
pub use scan::{insert_values_span, table_tokens};
pub use sharding::ShardingRewriteDecorator;
pub use token::{InsertValue, Token};
