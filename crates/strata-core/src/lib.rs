//! # strata-core
//!
//! Shared types for the Strata sharding middleware core:
//! - Cluster configuration (data sources, sharding rules, master/replica
//!   groups), loadable from YAML files
//! - The typed property store with live refresh
//! - The SQL value model used for bound parameters and sharding values
//! - The data-node model mapping logical tables to physical placements

pub mod config;
pub mod node;
pub mod props;
pub mod value;

pub use config::{
    ClusterConfig, ConfigError, DataSourceConfig, MasterReplicaGroupConfig, LoadBalanceKind,
    ShardingAlgorithmKind, TableRuleConfig,
};
pub use node::DataNode;
pub use props::{ConfigProps, PropKey, PropValue};
pub use value::{ShardingValue, SqlValue};
