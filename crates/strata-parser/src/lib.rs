//! # strata-parser
//!
//! SQL analysis for the Strata routing core.
//!
//! This crate wraps `sqlparser` behind a narrow surface: it turns SQL text
//! into a [`StatementContext`] exposing exactly what routing and rewriting
//! need: the statement kind (with its lock-clause flag), the referenced
//! tables, the INSERT column/value-row structure, and the equality
//! predicates of a WHERE conjunction. Nothing downstream touches the AST.

pub mod analyzer;
pub mod error;
pub mod statement;

pub use analyzer::SqlAnalyzer;
pub use error::ParseError;
pub use statement::{
    EqualityPredicate, InsertContext, StatementContext, StatementKind, TableReference, ValueExpr,
};
