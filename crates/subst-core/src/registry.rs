use subst_config::{AliasState, Config};

use crate::error::{Error, Result};

/// One row of the alias listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub name: String,
    pub remote_path: String,
    pub active: bool,
}

/// Borrowing view over the alias-related keys of the store.
///
/// Mutating operations persist the store before returning. Removal is
/// lazy: it deletes only the `aliases` entry and leaves any `active`,
/// `aliases.locals`, or `aliases.states` references to that name dangling.
pub struct AliasRegistry<'a> {
    config: &'a mut Config,
}

impl<'a> AliasRegistry<'a> {
    pub fn new(config: &'a mut Config) -> Self {
        Self { config }
    }

    /// All aliases in map insertion order, with the active one marked.
    pub fn list(&self) -> Vec<AliasEntry> {
        let active = self.config.active().map(str::to_string);
        self.config
            .aliases()
            .into_iter()
            .map(|(name, remote_path)| AliasEntry {
                active: active.as_deref() == Some(name.as_str()),
                name,
                remote_path,
            })
            .collect()
    }

    /// The remote path recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<String> {
        self.config.aliases().get(name).cloned()
    }

    pub fn active(&self) -> Option<&str> {
        self.config.active()
    }

    /// Insert `name` or replace its remote path. Returns true when the
    /// alias was newly created.
    pub fn upsert(&mut self, name: &str, remote_path: &str) -> Result<bool> {
        let mut aliases = self.config.aliases();
        let created = aliases
            .insert(name.to_string(), remote_path.to_string())
            .is_none();
        self.config.set_aliases(aliases);
        self.config.save()?;
        Ok(created)
    }

    /// Delete the `aliases` entry for `name`. Dangling `active`, locals,
    /// and states references are left in place.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let mut aliases = self.config.aliases();
        if aliases.shift_remove(name).is_none() {
            return Err(Error::AliasNotFound(name.to_string()));
        }
        self.config.set_aliases(aliases);
        self.config.save()?;
        Ok(())
    }

    /// The recorded state for `name`; absent means remote.
    pub fn state_of(&self, name: &str) -> AliasState {
        self.config
            .alias_states()
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    /// The recorded local cache path for `name`, if one was ever created.
    pub fn local_path_of(&self, name: &str) -> Option<String> {
        self.config.alias_locals().get(name).cloned()
    }

    /// The physical path that should back the virtual drive right now.
    ///
    /// Requires an active alias with a matching alias entry. When the
    /// active alias is `Local` and a local cache path is recorded, that
    /// path wins; otherwise the remote path is used.
    pub fn resolve_active_path(&self) -> Result<(String, String)> {
        let name = self
            .config
            .active()
            .ok_or(Error::NoActiveAlias)?
            .to_string();
        let remote = self
            .config
            .aliases()
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::AliasNotFound(name.clone()))?;

        if self.state_of(&name) == AliasState::Local {
            if let Some(local) = self.local_path_of(&name) {
                return Ok((name, local));
            }
        }

        Ok((name, remote))
    }

    /// Record a new state for `name` and persist. Transition rules are
    /// enforced by the caller.
    pub(crate) fn record_state(&mut self, name: &str, state: AliasState) -> Result<()> {
        let mut states = self.config.alias_states();
        states.insert(name.to_string(), state);
        self.config.set_alias_states(states);
        self.config.save()?;
        Ok(())
    }
}
