//! # strata-prepare
//!
//! The prepare pipeline: the sole entry point of the Strata routing core.
//!
//! [`PrepareEngine::prepare`] takes SQL text, bound parameters, and the
//! caller's [`strata_route::RoutingState`], and produces an
//! [`ExecutionContext`] whose execution units an external executor
//! dispatches to their physical data sources. The pipeline is one
//! synchronous pass: clone parameters, detect skip-sharding, route through
//! the decorator chain, then either fast-path the original SQL or rewrite
//! it per route unit.

pub mod context;
pub mod engine;
pub mod error;
pub mod log;
pub mod registry;
pub mod skip;

pub use context::{ExecutionContext, ExecutionUnit, SqlUnit};
pub use engine::PrepareEngine;
pub use error::PrepareError;
pub use skip::{LexicalSkipDetector, SkipShardingDetector};
