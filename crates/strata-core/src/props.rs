//! Typed property store.
//!
//! Properties arrive as raw strings from configuration and are validated into
//! typed values once, up front. A single key can be refreshed at runtime
//! without touching the others; an invalid refresh is rejected and logged.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::ConfigError;

/// Known property keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropKey {
    /// Log the logic SQL and every actual SQL produced for it.
    SqlShow,
    /// When showing SQL, omit the parameter lists.
    SqlSimple,
    /// Force every statement to the master, regardless of per-call decisions.
    MasterRouteOnly,
}

impl PropKey {
    pub const ALL: [PropKey; 3] = [PropKey::SqlShow, PropKey::SqlSimple, PropKey::MasterRouteOnly];

    /// The configuration key string.
    pub fn key(&self) -> &'static str {
        match self {
            PropKey::SqlShow => "sql_show",
            PropKey::SqlSimple => "sql_simple",
            PropKey::MasterRouteOnly => "master_route_only",
        }
    }

    /// Raw default used when the key is absent or reset.
    pub fn default_value(&self) -> &'static str {
        "false"
    }

    /// Find a known key by its configuration string.
    pub fn from_key(key: &str) -> Option<PropKey> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }

    fn parse(&self, raw: &str) -> Result<PropValue, String> {
        match raw {
            "true" => Ok(PropValue::Bool(true)),
            "false" => Ok(PropValue::Bool(false)),
            other => Err(format!(
                "value `{other}` for key `{}` is not a boolean",
                self.key()
            )),
        }
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A validated property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropValue {
    Bool(bool),
}

impl PropValue {
    pub fn as_bool(&self) -> bool {
        match self {
            PropValue::Bool(v) => *v,
        }
    }
}

/// Validated property cache with single-key live refresh.
#[derive(Debug, Clone)]
pub struct ConfigProps {
    raw: BTreeMap<String, String>,
    cache: BTreeMap<PropKey, PropValue>,
}

impl ConfigProps {
    /// Preload and validate every known key.
    ///
    /// All invalid keys are reported together; construction fails if any
    /// value does not validate.
    pub fn new(raw: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut cache = BTreeMap::new();
        let mut errors = Vec::new();
        for key in PropKey::ALL {
            let value = raw
                .get(key.key())
                .map(String::as_str)
                .unwrap_or_else(|| key.default_value());
            match key.parse(value) {
                Ok(parsed) => {
                    cache.insert(key, parsed);
                }
                Err(message) => errors.push(message),
            }
        }
        if !errors.is_empty() {
            return Err(ConfigError::InvalidProps(errors.join("\n")));
        }
        Ok(Self {
            raw: raw.clone(),
            cache,
        })
    }

    /// The validated value for a key.
    pub fn value(&self, key: PropKey) -> PropValue {
        // Every known key is preloaded in `new`.
        self.cache[&key]
    }

    /// Convenience accessor for the boolean keys.
    pub fn bool_value(&self, key: PropKey) -> bool {
        self.value(key).as_bool()
    }

    /// Refresh one key at runtime.
    ///
    /// An empty value resets the key to its default. Returns `false` without
    /// touching the cache when the key is unknown or the value is invalid;
    /// other keys are never affected.
    pub fn refresh(&mut self, key: &str, value: &str) -> bool {
        let Some(known) = PropKey::from_key(key) else {
            tracing::warn!(key, "refresh rejected: unknown property key");
            return false;
        };
        let effective = if value.is_empty() {
            known.default_value()
        } else {
            value
        };
        match known.parse(effective) {
            Ok(parsed) => {
                self.cache.insert(known, parsed);
                self.raw.insert(key.to_string(), effective.to_string());
                true
            }
            Err(message) => {
                tracing::warn!(key, value, %message, "refresh rejected: invalid property value");
                false
            }
        }
    }

    /// The raw property strings currently in effect.
    pub fn raw(&self) -> &BTreeMap<String, String> {
        &self.raw
    }
}

impl Default for ConfigProps {
    fn default() -> Self {
        // Every key's default_value parses as its own type.
        Self::new(&BTreeMap::new()).expect("default property values validate")
    }
}
