use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Whether an alias resolves to its remote path or to a locally mirrored
/// cache. Absent from the store means `Remote`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasState {
    #[default]
    Remote,
    Local,
}

impl fmt::Display for AliasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasState::Remote => write!(f, "remote"),
            AliasState::Local => write!(f, "local"),
        }
    }
}

/// A value stored under a configuration key.
///
/// The store is a closed schema: each key admits exactly one of these
/// shapes, decided by the key name rather than by inspecting the value at
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A scalar string (`active`, `subst.drive`, `cache.directory`).
    Text(String),
    /// Alias name to filesystem path (`aliases`, `aliases.locals`).
    PathMap(IndexMap<String, String>),
    /// Alias name to access state (`aliases.states`).
    StateMap(IndexMap<String, AliasState>),
}

/// The shape a key is expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    PathMap,
    StateMap,
}

impl ConfigValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            ConfigValue::PathMap(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_state_map(&self) -> Option<&IndexMap<String, AliasState>> {
        match self {
            ConfigValue::StateMap(m) => Some(m),
            _ => None,
        }
    }

    /// Render the value as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Text(s) => serde_json::Value::String(s.clone()),
            ConfigValue::PathMap(m) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in m {
                    obj.insert(k.clone(), serde_json::Value::String(v.clone()));
                }
                serde_json::Value::Object(obj)
            }
            ConfigValue::StateMap(m) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in m {
                    obj.insert(k.clone(), serde_json::Value::String(v.to_string()));
                }
                serde_json::Value::Object(obj)
            }
        }
    }
}
