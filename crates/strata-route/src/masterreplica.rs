//! Master/replica routing for read/write splitting.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use strata_core::config::{LoadBalanceKind, MasterReplicaGroupConfig};
use strata_core::{ConfigProps, PropKey, SqlValue};
use strata_parser::StatementContext;

use crate::context::{RouteContext, RouteMapper, RouteResult, RouteUnit};
use crate::decorator::RouteDecorator;
use crate::error::RouteError;
use crate::state::RoutingState;

/// Picks one replica from a pool.
///
/// Strategies are shared across every concurrent caller routing through the
/// same group.
pub trait LoadBalanceStrategy: Send + Sync {
    fn choose<'a>(&self, group: &str, master: &str, replicas: &'a [String]) -> &'a str;
}

/// Fair cyclic selection over the pool: a shared monotonically increasing
/// counter, modulo pool size.
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    counter: AtomicUsize,
}

impl LoadBalanceStrategy for RoundRobinStrategy {
    fn choose<'a>(&self, _group: &str, _master: &str, replicas: &'a [String]) -> &'a str {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % replicas.len();
        &replicas[index]
    }
}

/// Uniform random selection.
#[derive(Debug, Default)]
pub struct RandomStrategy;

impl LoadBalanceStrategy for RandomStrategy {
    fn choose<'a>(&self, _group: &str, _master: &str, replicas: &'a [String]) -> &'a str {
        let index = rand::rng().random_range(0..replicas.len());
        &replicas[index]
    }
}

/// One master/replica group: the logical data-source name applications
/// address, bound to a master and its replica pool.
pub struct MasterReplicaRule {
    pub name: String,
    pub master: String,
    pub replicas: Vec<String>,
    load_balance: Arc<dyn LoadBalanceStrategy>,
}

impl MasterReplicaRule {
    pub fn new(
        name: impl Into<String>,
        master: impl Into<String>,
        replicas: Vec<String>,
        load_balance: Arc<dyn LoadBalanceStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            master: master.into(),
            replicas,
            load_balance,
        }
    }

    pub fn from_config(name: &str, config: &MasterReplicaGroupConfig) -> Self {
        let load_balance: Arc<dyn LoadBalanceStrategy> = match config.load_balance {
            LoadBalanceKind::RoundRobin => Arc::new(RoundRobinStrategy::default()),
            LoadBalanceKind::Random => Arc::new(RandomStrategy),
        };
        Self::new(name, config.master.clone(), config.replicas.clone(), load_balance)
    }
}

/// Chooses master or a replica for one statement.
pub struct MasterReplicaRouter<'a> {
    rule: &'a MasterReplicaRule,
}

impl<'a> MasterReplicaRouter<'a> {
    pub fn new(rule: &'a MasterReplicaRule) -> Self {
        Self { rule }
    }

    /// The physical data source this statement executes on.
    ///
    /// Every master decision marks the scope as master-visited, so later
    /// reads in the scope stick to the master.
    pub fn route(&self, statement: &StatementContext, state: &mut RoutingState) -> String {
        if self.is_master_route(statement, state) {
            state.set_master_visited();
            return self.rule.master.clone();
        }
        if self.rule.replicas.is_empty() {
            return self.rule.master.clone();
        }
        self.rule
            .load_balance
            .choose(&self.rule.name, &self.rule.master, &self.rule.replicas)
            .to_string()
    }

    fn is_master_route(&self, statement: &StatementContext, state: &RoutingState) -> bool {
        !statement.is_plain_select() || state.is_master_visited() || state.is_master_route_only()
    }
}

/// Reconciles a sharding route with master/replica selection.
///
/// Runs after every sharding decorator: it only ever rewrites data-source
/// identity, never table identity.
pub struct MasterReplicaRouteDecorator {
    rule: Arc<MasterReplicaRule>,
}

impl MasterReplicaRouteDecorator {
    pub fn new(rule: Arc<MasterReplicaRule>) -> Self {
        Self { rule }
    }
}

impl RouteDecorator for MasterReplicaRouteDecorator {
    fn order(&self) -> i32 {
        10
    }

    fn decorate(
        &self,
        context: RouteContext,
        _parameters: &[SqlValue],
        state: &mut RoutingState,
        props: &ConfigProps,
    ) -> Result<RouteContext, RouteError> {
        // The global property overrides every per-call decision.
        if props.bool_value(PropKey::MasterRouteOnly) {
            state.set_master_visited();
        }

        let router = MasterReplicaRouter::new(&self.rule);

        // No units: sharding routing did not apply, synthesize the single
        // unit for the chosen source.
        if context.result.is_empty() {
            let chosen = router.route(&context.statement, state);
            let mut result = RouteResult::new();
            result.push_unit(RouteUnit::new(RouteMapper::new(chosen.clone(), chosen), vec![]));
            return Ok(RouteContext {
                statement: context.statement,
                result,
            });
        }

        // Replace the data-source identity of every unit addressing this
        // group; unrelated units pass through. The result is rebuilt in one
        // step so no reader observes old and new units side by side.
        let RouteContext { statement, result } = context;
        let mut replaced = RouteResult::new();
        for unit in result.units() {
            if unit.data_source.actual_name.eq_ignore_ascii_case(&self.rule.name) {
                let chosen = router.route(&statement, state);
                replaced.push_unit(RouteUnit::new(
                    RouteMapper::new(unit.data_source.logic_name.clone(), chosen),
                    unit.tables.clone(),
                ));
            } else {
                replaced.push_unit(unit.clone());
            }
        }
        replaced.set_original_data_nodes(result.original_data_nodes().to_vec());
        Ok(RouteContext {
            statement,
            result: replaced,
        })
    }
}
