//! Rewrite context and context decorators.

use std::sync::Arc;

use strata_core::SqlValue;
use strata_parser::StatementContext;
use strata_route::RouteResult;

use crate::error::RewriteError;
use crate::param::ParameterBuilder;
use crate::token::Token;

/// Everything needed to rewrite one statement: the original SQL, the tokens
/// decorators attached, and the parameter builder.
#[derive(Debug, Clone)]
pub struct SqlRewriteContext {
    pub sql: String,
    pub tokens: Vec<Token>,
    pub parameter_builder: ParameterBuilder,
}

impl SqlRewriteContext {
    /// A fresh context with no tokens and the flat parameter list.
    pub fn new(sql: impl Into<String>, parameters: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            tokens: Vec::new(),
            parameter_builder: ParameterBuilder::Standard { parameters },
        }
    }
}

/// One step of rewrite-context preparation: attaches tokens and may replace
/// the parameter builder. A decorator whose rule does not apply leaves the
/// context untouched.
pub trait SqlRewriteContextDecorator: Send + Sync {
    /// Chain position; lower orders run first.
    fn order(&self) -> i32;

    fn decorate(
        &self,
        context: &mut SqlRewriteContext,
        statement: &StatementContext,
        route_result: &RouteResult,
    ) -> Result<(), RewriteError>;
}

/// The ordered, immutable rewrite-decorator chain. Built once from
/// configuration; reconfiguration replaces the whole registry.
#[derive(Clone)]
pub struct RewriteDecoratorRegistry {
    decorators: Vec<Arc<dyn SqlRewriteContextDecorator>>,
}

impl RewriteDecoratorRegistry {
    pub fn new(mut decorators: Vec<Arc<dyn SqlRewriteContextDecorator>>) -> Self {
        decorators.sort_by_key(|decorator| decorator.order());
        Self { decorators }
    }

    /// Build the rewrite context for one statement by running every
    /// decorator over it.
    pub fn create_context(
        &self,
        sql: &str,
        parameters: Vec<SqlValue>,
        statement: &StatementContext,
        route_result: &RouteResult,
    ) -> Result<SqlRewriteContext, RewriteError> {
        let mut context = SqlRewriteContext::new(sql, parameters);
        for decorator in &self.decorators {
            decorator.decorate(&mut context, statement, route_result)?;
        }
        Ok(context)
    }
}
