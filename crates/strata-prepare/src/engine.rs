//! The prepare engine.

use std::sync::Arc;

use strata_core::config::ClusterConfig;
use strata_core::{ConfigProps, PropKey, SqlValue};
use strata_parser::SqlAnalyzer;
use strata_rewrite::{RewriteDecoratorRegistry, SqlRewriteEngine, SqlRouteRewriteEngine};
use strata_route::{RouteContext, RouteDecoratorRegistry, RoutingState, ShardingRule};

use crate::context::{ExecutionContext, ExecutionUnit, SqlUnit};
use crate::error::PrepareError;
use crate::log;
use crate::registry;
use crate::skip::{LexicalSkipDetector, SkipShardingDetector};

/// Orchestrates parse, route, and rewrite into execution units.
///
/// Built once from configuration; the decorator registries are immutable
/// afterwards and shared by every concurrent `prepare`. Reconfiguration
/// means building a new engine.
pub struct PrepareEngine {
    props: ConfigProps,
    analyzer: SqlAnalyzer,
    sharding_rule: Arc<ShardingRule>,
    route_registry: RouteDecoratorRegistry,
    rewrite_registry: RewriteDecoratorRegistry,
    skip_detector: Box<dyn SkipShardingDetector>,
    instance_data_sources: Vec<String>,
}

impl PrepareEngine {
    /// Build the engine from a validated configuration.
    pub fn from_config(config: &ClusterConfig) -> Result<Self, PrepareError> {
        config.validate()?;
        let props = ConfigProps::new(&config.props)?;
        let sharding_rule = Arc::new(ShardingRule::from_config(config)?);
        let route_registry = registry::route_decorators(config, &sharding_rule);
        let rewrite_registry = registry::rewrite_decorators(config, &sharding_rule);
        Ok(Self {
            props,
            analyzer: SqlAnalyzer::new(),
            sharding_rule,
            route_registry,
            rewrite_registry,
            skip_detector: Box::new(LexicalSkipDetector),
            instance_data_sources: config.instance_data_source_names(),
        })
    }

    /// Replace the skip-sharding detector.
    pub fn with_skip_detector(mut self, detector: Box<dyn SkipShardingDetector>) -> Self {
        self.skip_detector = detector;
        self
    }

    pub fn props(&self) -> &ConfigProps {
        &self.props
    }

    /// Refresh one property at runtime. Invalid updates are rejected and
    /// leave every property untouched.
    pub fn refresh_prop(&mut self, key: &str, value: &str) -> bool {
        self.props.refresh(key, value)
    }

    /// Prepare one statement for execution.
    ///
    /// Deterministic for identical inputs and identical routing state. The
    /// caller owns `state` for the whole unit of work and clears it when
    /// the unit ends.
    pub fn prepare(
        &self,
        sql: &str,
        parameters: &[SqlValue],
        state: &mut RoutingState,
    ) -> Result<ExecutionContext, PrepareError> {
        // Later steps must never observe caller-side mutation.
        let cloned_parameters = parameters.to_vec();

        state.set_skip_sharding(self.skip_detector.should_skip(sql, &self.sharding_rule));

        let statement = self.analyzer.analyze(sql)?;
        let route_context =
            self.route_registry
                .route(statement, &cloned_parameters, state, &self.props)?;

        let result = if state.is_skip_sharding() {
            self.prepare_skip(sql, cloned_parameters, route_context)?
        } else {
            self.prepare_rewrite(sql, cloned_parameters, route_context)?
        };

        if self.props.bool_value(PropKey::SqlShow) {
            log::log_sql(
                sql,
                self.props.bool_value(PropKey::SqlSimple),
                result.execution_units(),
            );
        }
        Ok(result)
    }

    /// Fast path: the statement bypasses rewriting and executes verbatim on
    /// the single data source routing resolved.
    ///
    /// Valid shapes: no units with a single-member pool (no read/write
    /// split), or exactly one unit (split case). Anything else means the
    /// route is ambiguous and the call fails.
    fn prepare_skip(
        &self,
        sql: &str,
        parameters: Vec<SqlValue>,
        route_context: RouteContext,
    ) -> Result<ExecutionContext, PrepareError> {
        tracing::debug!(sql, "statement skips sharding");
        let RouteContext { statement, result } = route_context;

        let unit_count = result.units().len();
        let single_instance = self.instance_data_sources.len() == 1;
        if !((unit_count == 0 && single_instance) || unit_count == 1) {
            return Err(PrepareError::AmbiguousSkipRoute {
                sql: sql.to_string(),
                route_units: format!("{:?}", result.units()),
            });
        }

        let data_source = result
            .actual_data_source_names()
            .into_iter()
            .next()
            .or_else(|| self.instance_data_sources.first().cloned())
            .ok_or(PrepareError::NoDataSources)?;

        let mut context = ExecutionContext::new(statement, true);
        context.push_unit(ExecutionUnit::new(data_source, SqlUnit::new(sql, parameters)));
        Ok(context)
    }

    /// Full path: build the rewrite context and produce one unit per route
    /// unit, or a single unit against the pool when routing matched nothing.
    fn prepare_rewrite(
        &self,
        sql: &str,
        parameters: Vec<SqlValue>,
        route_context: RouteContext,
    ) -> Result<ExecutionContext, PrepareError> {
        let RouteContext { statement, result } = route_context;
        let rewrite_context = self
            .rewrite_registry
            .create_context(sql, parameters, &statement, &result)?;

        let mut context = ExecutionContext::new(statement, false);
        if result.is_empty() {
            let rewritten = SqlRewriteEngine.rewrite(&rewrite_context);
            let data_source = self
                .instance_data_sources
                .first()
                .cloned()
                .ok_or(PrepareError::NoDataSources)?;
            context.push_unit(ExecutionUnit::new(
                data_source,
                SqlUnit::new(rewritten.sql, rewritten.parameters),
            ));
        } else {
            for (route_unit, rewritten) in SqlRouteRewriteEngine.rewrite(&rewrite_context, &result) {
                context.push_unit(ExecutionUnit::new(
                    route_unit.data_source.actual_name,
                    SqlUnit::new(rewritten.sql, rewritten.parameters),
                ));
            }
        }
        Ok(context)
    }
}
