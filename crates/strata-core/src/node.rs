//! Physical data-node model.

use std::fmt;

use crate::config::ConfigError;

/// One physical placement of a logical table: a data source plus the actual
/// table living on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataNode {
    pub data_source: String,
    pub table: String,
}

impl DataNode {
    pub fn new(data_source: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            table: table.into(),
        }
    }

    /// Parse a `data_source.table` expression from configuration.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        match text.split_once('.') {
            Some((data_source, table)) if !data_source.is_empty() && !table.is_empty() => {
                Ok(Self::new(data_source, table))
            }
            _ => Err(ConfigError::Config(format!(
                "invalid data node `{text}`, expected `data_source.table`"
            ))),
        }
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_node() {
        let node = DataNode::parse("ds_0.t_order_1").unwrap();
        assert_eq!(node.data_source, "ds_0");
        assert_eq!(node.table, "t_order_1");
        assert_eq!(node.to_string(), "ds_0.t_order_1");
    }

    #[test]
    fn parse_rejects_missing_table() {
        assert!(DataNode::parse("ds_0").is_err());
        assert!(DataNode::parse("ds_0.").is_err());
        assert!(DataNode::parse(".t_order").is_err());
    }
}
