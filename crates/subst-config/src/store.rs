use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use indexmap::IndexMap;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::value::{AliasState, ConfigValue, ValueKind};

/// Key holding the name of the currently active alias.
pub const KEY_ACTIVE: &str = "active";
/// Key holding the alias name to remote path map.
pub const KEY_ALIASES: &str = "aliases";
/// Key holding the alias name to local cache path map.
pub const KEY_ALIAS_LOCALS: &str = "aliases.locals";
/// Key holding the alias name to access state map.
pub const KEY_ALIAS_STATES: &str = "aliases.states";
/// Key holding the virtual drive letter. Public.
pub const KEY_DRIVE: &str = "subst.drive";
/// Key holding the base directory for local caches. Public.
pub const KEY_CACHE_DIRECTORY: &str = "cache.directory";

/// Keys the user may set directly through the `config` verb. Everything
/// else is internal state maintained by the other verbs.
pub const PUBLIC_KEYS: [&str; 2] = [KEY_DRIVE, KEY_CACHE_DIRECTORY];

/// The persisted configuration store.
///
/// Loaded wholesale at the start of a command invocation and written back
/// wholesale by [`Config::save`]. There is no locking and no atomic rename;
/// concurrent invocations race and the last writer wins.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    values: IndexMap<String, ConfigValue>,
}

fn expected_kind(key: &str) -> ValueKind {
    match key {
        KEY_ALIASES | KEY_ALIAS_LOCALS => ValueKind::PathMap,
        KEY_ALIAS_STATES => ValueKind::StateMap,
        _ => ValueKind::Text,
    }
}

fn value_from_json(key: &str, value: serde_json::Value) -> Result<ConfigValue> {
    match expected_kind(key) {
        ValueKind::Text => match value {
            serde_json::Value::String(s) => Ok(ConfigValue::Text(s)),
            other => Err(Error::Malformed(format!(
                "key '{}' must be a string, found {}",
                key, other
            ))),
        },
        ValueKind::PathMap => serde_json::from_value::<IndexMap<String, String>>(value)
            .map(ConfigValue::PathMap)
            .map_err(|e| Error::Malformed(format!("key '{}': {}", key, e))),
        ValueKind::StateMap => serde_json::from_value::<IndexMap<String, AliasState>>(value)
            .map(ConfigValue::StateMap)
            .map_err(|e| Error::Malformed(format!("key '{}': {}", key, e))),
    }
}

impl Config {
    /// Load the store from its default per-user location, creating the
    /// directory and an empty file on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(default_path()?)
    }

    /// Load the store from an explicit path with the same
    /// create-if-missing behavior as [`Config::load`].
    pub fn load_from<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::Load(e.to_string()))?;
                info!(
                    "created missing configuration directory: {}",
                    parent.display()
                );
            }
        }

        if !path.exists() {
            fs::write(&path, "{}").map_err(|e| Error::Load(e.to_string()))?;
            info!("created missing configuration file: {}", path.display());
        }

        let text = fs::read_to_string(&path).map_err(|e| Error::Load(e.to_string()))?;
        let root: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| Error::Malformed(e.to_string()))?;
        let obj = match root {
            serde_json::Value::Object(obj) => obj,
            other => {
                return Err(Error::Malformed(format!(
                    "expected a top-level object, found {}",
                    other
                )))
            }
        };

        let mut values = IndexMap::new();
        for (key, value) in obj {
            let parsed = value_from_json(&key, value)?;
            values.insert(key, parsed);
        }

        debug!("loaded configuration from: {}", path.display());

        Ok(Self { path, values })
    }

    /// Serialize the whole store back to its file, overwriting it.
    ///
    /// The write is not atomic; a failure mid-write can corrupt the file.
    pub fn save(&self) -> Result<()> {
        let mut obj = serde_json::Map::new();
        for (key, value) in &self.values {
            obj.insert(key.clone(), value.to_json());
        }

        let text = serde_json::to_string_pretty(&serde_json::Value::Object(obj))
            .map_err(|e| Error::Save(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| Error::Save(e.to_string()))?;

        debug!("saved configuration file: {}", self.path.display());
        Ok(())
    }

    /// The file this store was loaded from and will be saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in insertion order. Mostly useful for tests and
    /// diagnostics.
    pub fn entries(&self) -> &IndexMap<String, ConfigValue> {
        &self.values
    }

    pub fn is_public_key(key: &str) -> bool {
        PUBLIC_KEYS.contains(&key)
    }

    /// Compact JSON rendering of the value at `key`, if present. Used by
    /// the `config` verb to show values of any shape.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.to_json().to_string())
    }

    pub fn active(&self) -> Option<&str> {
        self.values.get(KEY_ACTIVE).and_then(ConfigValue::as_text)
    }

    pub fn set_active(&mut self, name: &str) {
        self.values
            .insert(KEY_ACTIVE.to_string(), ConfigValue::Text(name.to_string()));
    }

    pub fn drive(&self) -> Option<&str> {
        self.values.get(KEY_DRIVE).and_then(ConfigValue::as_text)
    }

    pub fn set_drive(&mut self, drive: &str) {
        self.values
            .insert(KEY_DRIVE.to_string(), ConfigValue::Text(drive.to_string()));
    }

    pub fn cache_directory(&self) -> Option<&str> {
        self.values
            .get(KEY_CACHE_DIRECTORY)
            .and_then(ConfigValue::as_text)
    }

    pub fn set_cache_directory(&mut self, dir: &str) {
        self.values.insert(
            KEY_CACHE_DIRECTORY.to_string(),
            ConfigValue::Text(dir.to_string()),
        );
    }

    /// The alias to remote path map, empty if absent. Callers mutate a copy
    /// and write the whole map back; there is no partial merge.
    pub fn aliases(&self) -> IndexMap<String, String> {
        self.values
            .get(KEY_ALIASES)
            .and_then(ConfigValue::as_path_map)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_aliases(&mut self, aliases: IndexMap<String, String>) {
        self.values
            .insert(KEY_ALIASES.to_string(), ConfigValue::PathMap(aliases));
    }

    /// The alias to local cache path map, empty if absent.
    pub fn alias_locals(&self) -> IndexMap<String, String> {
        self.values
            .get(KEY_ALIAS_LOCALS)
            .and_then(ConfigValue::as_path_map)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_alias_locals(&mut self, locals: IndexMap<String, String>) {
        self.values
            .insert(KEY_ALIAS_LOCALS.to_string(), ConfigValue::PathMap(locals));
    }

    /// The alias to state map, empty if absent. An absent entry means the
    /// alias is remote.
    pub fn alias_states(&self) -> IndexMap<String, AliasState> {
        self.values
            .get(KEY_ALIAS_STATES)
            .and_then(ConfigValue::as_state_map)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_alias_states(&mut self, states: IndexMap<String, AliasState>) {
        self.values
            .insert(KEY_ALIAS_STATES.to_string(), ConfigValue::StateMap(states));
    }
}

fn default_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "substmgr").ok_or(Error::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_decided_by_key() {
        assert_eq!(expected_kind(KEY_ALIASES), ValueKind::PathMap);
        assert_eq!(expected_kind(KEY_ALIAS_LOCALS), ValueKind::PathMap);
        assert_eq!(expected_kind(KEY_ALIAS_STATES), ValueKind::StateMap);
        assert_eq!(expected_kind(KEY_ACTIVE), ValueKind::Text);
        assert_eq!(expected_kind("anything.else"), ValueKind::Text);
    }

    #[test]
    fn state_values_parse_from_lowercase_strings() {
        let value = serde_json::json!({ "x": "local", "y": "remote" });
        let parsed = value_from_json(KEY_ALIAS_STATES, value).unwrap();
        let states = parsed.as_state_map().unwrap();
        assert_eq!(states["x"], AliasState::Local);
        assert_eq!(states["y"], AliasState::Remote);
    }

    #[test]
    fn non_string_scalar_is_malformed() {
        let err = value_from_json(KEY_DRIVE, serde_json::json!(42)).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }
}
