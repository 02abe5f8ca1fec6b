//! SQL value model.
//!
//! `SqlValue` is what callers bind as statement parameters. `ShardingValue`
//! is the orderable subset a sharding column may resolve to; values that
//! cannot be ordered (NULL, structured JSON) are configuration errors when
//! they reach a sharding column.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

/// A bound parameter or literal value in a SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Structured value (e.g. a JSON column payload). Not orderable.
    Json(serde_json::Value),
}

impl SqlValue {
    /// Resolve this value into a sharding value, if it is orderable.
    ///
    /// Returns `None` for NULL and structured values.
    pub fn as_sharding_value(&self) -> Option<ShardingValue> {
        match self {
            SqlValue::Null | SqlValue::Json(_) => None,
            SqlValue::Bool(v) => Some(ShardingValue::Bool(*v)),
            SqlValue::Int(v) => Some(ShardingValue::Int(*v)),
            SqlValue::Float(v) => Some(ShardingValue::Float(*v)),
            SqlValue::Text(v) => Some(ShardingValue::Text(v.clone())),
            SqlValue::Timestamp(v) => Some(ShardingValue::Timestamp(*v)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "{v}"),
            SqlValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            SqlValue::Json(v) => write!(f, "{v}"),
        }
    }
}

/// An orderable value resolved from a sharding column.
#[derive(Debug, Clone, PartialEq)]
pub enum ShardingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl ShardingValue {
    fn rank(&self) -> u8 {
        match self {
            ShardingValue::Bool(_) => 0,
            ShardingValue::Int(_) => 1,
            ShardingValue::Float(_) => 2,
            ShardingValue::Text(_) => 3,
            ShardingValue::Timestamp(_) => 4,
        }
    }
}

impl Eq for ShardingValue {}

impl PartialOrd for ShardingValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShardingValue {
    // Values of different kinds order by kind; floats use total ordering.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ShardingValue::Bool(a), ShardingValue::Bool(b)) => a.cmp(b),
            (ShardingValue::Int(a), ShardingValue::Int(b)) => a.cmp(b),
            (ShardingValue::Float(a), ShardingValue::Float(b)) => a.total_cmp(b),
            (ShardingValue::Text(a), ShardingValue::Text(b)) => a.cmp(b),
            (ShardingValue::Timestamp(a), ShardingValue::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for ShardingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardingValue::Bool(v) => write!(f, "{v}"),
            ShardingValue::Int(v) => write!(f, "{v}"),
            ShardingValue::Float(v) => write!(f, "{v}"),
            ShardingValue::Text(v) => write!(f, "{v}"),
            ShardingValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<ShardingValue> for SqlValue {
    fn from(value: ShardingValue) -> Self {
        match value {
            ShardingValue::Bool(v) => SqlValue::Bool(v),
            ShardingValue::Int(v) => SqlValue::Int(v),
            ShardingValue::Float(v) => SqlValue::Float(v),
            ShardingValue::Text(v) => SqlValue::Text(v),
            ShardingValue::Timestamp(v) => SqlValue::Timestamp(v),
        }
    }
}
