//! Route decorator chain.

use std::sync::Arc;

use strata_core::{ConfigProps, SqlValue};
use strata_parser::StatementContext;

use crate::context::RouteContext;
use crate::error::RouteError;
use crate::state::RoutingState;

/// One step of the routing chain.
///
/// A decorator receives the context produced so far and returns a new one;
/// it never edits a route result in place. A decorator whose rule does not
/// apply to the statement returns the context unchanged.
pub trait RouteDecorator: Send + Sync {
    /// Chain position; lower orders run first. Sharding decorators rewrite
    /// table identity early, the master/replica decorator rewrites
    /// data-source identity last.
    fn order(&self) -> i32;

    fn decorate(
        &self,
        context: RouteContext,
        parameters: &[SqlValue],
        state: &mut RoutingState,
        props: &ConfigProps,
    ) -> Result<RouteContext, RouteError>;
}

/// The ordered, immutable decorator chain.
///
/// Built once from configuration; concurrent routes read it without locking.
/// Reconfiguration replaces the whole registry, never individual entries.
#[derive(Clone)]
pub struct RouteDecoratorRegistry {
    decorators: Vec<Arc<dyn RouteDecorator>>,
}

impl RouteDecoratorRegistry {
    pub fn new(mut decorators: Vec<Arc<dyn RouteDecorator>>) -> Self {
        decorators.sort_by_key(|decorator| decorator.order());
        Self { decorators }
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Run the full chain over a fresh, empty route context.
    pub fn route(
        &self,
        statement: StatementContext,
        parameters: &[SqlValue],
        state: &mut RoutingState,
        props: &ConfigProps,
    ) -> Result<RouteContext, RouteError> {
        let mut context = RouteContext::new(statement);
        for decorator in &self.decorators {
            context = decorator.decorate(context, parameters, state, props)?;
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RouteMapper, RouteUnit};
    use strata_parser::SqlAnalyzer;

    struct TagDecorator {
        order: i32,
        name: &'static str,
    }

    impl RouteDecorator for TagDecorator {
        fn order(&self) -> i32 {
            self.order
        }

        fn decorate(
            &self,
            mut context: RouteContext,
            _parameters: &[SqlValue],
            _state: &mut RoutingState,
            _props: &ConfigProps,
        ) -> Result<RouteContext, RouteError> {
            context
                .result
                .push_unit(RouteUnit::new(RouteMapper::new(self.name, self.name), vec![]));
            Ok(context)
        }
    }

    #[test]
    fn decorators_run_in_order() {
        let registry = RouteDecoratorRegistry::new(vec![
            Arc::new(TagDecorator { order: 10, name: "second" }),
            Arc::new(TagDecorator { order: 0, name: "first" }),
        ]);

        let statement = SqlAnalyzer::new().analyze("SELECT 1").unwrap();
        let mut state = RoutingState::new();
        let context = registry
            .route(statement, &[], &mut state, &ConfigProps::default())
            .unwrap();

        let names: Vec<&str> = context
            .result
            .units()
            .iter()
            .map(|u| u.data_source.actual_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
