//! Cluster configuration for the Strata routing core.
//!
//! Configuration is loaded from a single YAML file and describes the physical
//! data sources, the sharding rules (logical table -> data nodes), the
//! master/replica groups for read/write splitting, and free-form properties
//! consumed by the typed property store.
//!
//! # Example
//!
//! ```yaml
//! data_sources:
//!   ds_master_0: { url: "mysql://db-master-0/orders" }
//!   ds_replica_0: { url: "mysql://db-replica-0/orders" }
//!
//! sharding:
//!   t_order:
//!     data_nodes: ["ds_0.t_order_0", "ds_0.t_order_1"]
//!     sharding_column: order_id
//!     key_column: order_id
//!
//! master_replica:
//!   ds_0:
//!     master: ds_master_0
//!     replicas: [ds_replica_0]
//!     load_balance: round_robin
//!
//! props:
//!   sql_show: "true"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::node::DataNode;

/// Complete cluster configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Project name, informational only.
    #[serde(default)]
    pub project: Option<String>,

    /// Physical data sources by name.
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSourceConfig>,

    /// Sharding rules keyed by logical table name.
    #[serde(default)]
    pub sharding: BTreeMap<String, TableRuleConfig>,

    /// Master/replica groups keyed by the logical group name.
    #[serde(default)]
    pub master_replica: BTreeMap<String, MasterReplicaGroupConfig>,

    /// Raw properties for the typed property store.
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

/// One physical data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Connection URL understood by the downstream executor.
    pub url: String,
}

/// Sharding rule for one logical table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRuleConfig {
    /// Physical placements, `data_source.table` expressions.
    pub data_nodes: Vec<String>,

    /// The column whose value decides the target data node.
    pub sharding_column: String,

    /// Sharding algorithm over the data-node list.
    #[serde(default)]
    pub algorithm: ShardingAlgorithmKind,

    /// Auto-generated key column, if the rule owns key generation.
    #[serde(default)]
    pub key_column: Option<String>,
}

impl TableRuleConfig {
    /// Parse the configured data nodes in declaration order.
    pub fn parsed_data_nodes(&self) -> Result<Vec<DataNode>, ConfigError> {
        self.data_nodes.iter().map(|n| DataNode::parse(n)).collect()
    }
}

/// Sharding algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardingAlgorithmKind {
    /// `value % data_node_count` picks the node.
    #[default]
    Modulo,
}

/// One master/replica group for read/write splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterReplicaGroupConfig {
    /// The write-capable data source.
    pub master: String,

    /// Read-only copies, in configuration order.
    #[serde(default)]
    pub replicas: Vec<String>,

    /// Replica selection strategy.
    #[serde(default)]
    pub load_balance: LoadBalanceKind,
}

/// Replica load-balance strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalanceKind {
    #[default]
    RoundRobin,
    Random,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("invalid property values: {0}")]
    InvalidProps(String),
}

impl ClusterConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Check referential integrity between data nodes, groups, and sources.
    ///
    /// A data node may name a physical source directly or go through a
    /// master/replica group; group members must be physical sources.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, group) in &self.master_replica {
            if !self.data_sources.contains_key(&group.master) {
                return Err(ConfigError::Config(format!(
                    "master `{}` of group `{}` is not a configured data source",
                    group.master, name
                )));
            }
            for replica in &group.replicas {
                if !self.data_sources.contains_key(replica) {
                    return Err(ConfigError::Config(format!(
                        "replica `{}` of group `{}` is not a configured data source",
                        replica, name
                    )));
                }
            }
        }
        for (table, rule) in &self.sharding {
            if rule.data_nodes.is_empty() {
                return Err(ConfigError::Config(format!(
                    "sharding rule for `{table}` has no data nodes"
                )));
            }
            for node in rule.parsed_data_nodes()? {
                let known = self.data_sources.contains_key(&node.data_source)
                    || self.master_replica.contains_key(&node.data_source);
                if !known {
                    return Err(ConfigError::Config(format!(
                        "data node `{node}` of `{table}` references unknown data source"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Names of the addressable data-source instances.
    ///
    /// Each master/replica group counts as one instance (its master); replica
    /// members are not independently addressable.
    pub fn instance_data_source_names(&self) -> Vec<String> {
        let mut replicas: Vec<&str> = Vec::new();
        for group in self.master_replica.values() {
            replicas.extend(group.replicas.iter().map(String::as_str));
        }
        self.data_sources
            .keys()
            .filter(|name| !replicas.contains(&name.as_str()))
            .cloned()
            .collect()
    }
}
