//! Static decorator registries.
//!
//! Decorators are built from configuration through a fixed table of factory
//! functions, populated at startup. A factory whose rule type has no
//! matching configuration contributes nothing; that is not an error.

use std::sync::Arc;

use strata_core::config::ClusterConfig;
use strata_rewrite::{RewriteDecoratorRegistry, ShardingRewriteDecorator, SqlRewriteContextDecorator};
use strata_route::{
    MasterReplicaRouteDecorator, MasterReplicaRule, RouteDecorator, RouteDecoratorRegistry,
    ShardingRouteDecorator, ShardingRule,
};

type RouteFactory = fn(&ClusterConfig, &Arc<ShardingRule>) -> Vec<Arc<dyn RouteDecorator>>;
type RewriteFactory = fn(&ClusterConfig, &Arc<ShardingRule>) -> Vec<Arc<dyn SqlRewriteContextDecorator>>;

const ROUTE_FACTORIES: &[RouteFactory] = &[sharding_route, master_replica_route];
const REWRITE_FACTORIES: &[RewriteFactory] = &[sharding_rewrite];

/// Build the route-decorator chain for a configuration.
pub fn route_decorators(config: &ClusterConfig, rule: &Arc<ShardingRule>) -> RouteDecoratorRegistry {
    let decorators = ROUTE_FACTORIES
        .iter()
        .flat_map(|factory| factory(config, rule))
        .collect();
    RouteDecoratorRegistry::new(decorators)
}

/// Build the rewrite-decorator chain for a configuration.
pub fn rewrite_decorators(
    config: &ClusterConfig,
    rule: &Arc<ShardingRule>,
) -> RewriteDecoratorRegistry {
    let decorators = REWRITE_FACTORIES
        .iter()
        .flat_map(|factory| factory(config, rule))
        .collect();
    RewriteDecoratorRegistry::new(decorators)
}

fn sharding_route(_config: &ClusterConfig, rule: &Arc<ShardingRule>) -> Vec<Arc<dyn RouteDecorator>> {
    if rule.logic_tables().next().is_none() {
        return Vec::new();
    }
    vec![Arc::new(ShardingRouteDecorator::new(rule.clone()))]
}

fn master_replica_route(
    config: &ClusterConfig,
    _rule: &Arc<ShardingRule>,
) -> Vec<Arc<dyn RouteDecorator>> {
    config
        .master_replica
        .iter()
        .map(|(name, group)| {
            Arc::new(MasterReplicaRouteDecorator::new(Arc::new(
                MasterReplicaRule::from_config(name, group),
            ))) as Arc<dyn RouteDecorator>
        })
        .collect()
}

fn sharding_rewrite(
    _config: &ClusterConfig,
    rule: &Arc<ShardingRule>,
) -> Vec<Arc<dyn SqlRewriteContextDecorator>> {
    if rule.logic_tables().next().is_none() {
        return Vec::new();
    }
    vec![Arc::new(ShardingRewriteDecorator::new(rule.clone()))]
}
