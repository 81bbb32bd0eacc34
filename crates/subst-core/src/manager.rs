use std::path::Path;

use log::info;
use subst_config::{AliasState, Config, KEY_DRIVE};

use crate::cache::{CacheSynchronizer, MirrorTool, Robocopy, SyncMode};
use crate::error::{Error, Result};
use crate::mount::{DriveSubst, MountController, SubstCommand};
use crate::registry::AliasRegistry;

/// Snapshot of the active alias for the `status` verb. Every piece can be
/// missing independently; dangling references must not make this fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub active: Option<String>,
    pub state: AliasState,
    pub remote_path: Option<String>,
    pub local_path: Option<String>,
}

/// Verb-level orchestration over the store and the two external
/// collaborators.
///
/// Each command invocation loads the store once, runs one mutation chain
/// through this type, and the mutated pieces are persisted as they are
/// recorded. Whenever a mutation changes the path backing the active
/// alias, the drive is unmounted and remounted so the binding follows.
pub struct SubstManager<M: MirrorTool, S: DriveSubst> {
    config: Config,
    cache: CacheSynchronizer<M>,
    mounter: MountController<S>,
}

impl SubstManager<Robocopy, SubstCommand> {
    /// Load the store from its default location and wire up the real
    /// `robocopy`/`subst` collaborators.
    pub fn open() -> Result<Self> {
        Ok(Self::new(Config::load()?, Robocopy, SubstCommand))
    }
}

impl<M: MirrorTool, S: DriveSubst> SubstManager<M, S> {
    pub fn new(config: Config, mirror: M, subst: S) -> Self {
        Self {
            config,
            cache: CacheSynchronizer::new(mirror),
            mounter: MountController::new(subst),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn registry(&mut self) -> AliasRegistry<'_> {
        AliasRegistry::new(&mut self.config)
    }

    fn drive(&self) -> Result<String> {
        self.config
            .drive()
            .map(str::to_string)
            .ok_or(Error::MissingConfigValue(KEY_DRIVE))
    }

    /// Make `name` the active alias and rebind the drive to its resolved
    /// path.
    pub fn switch(&mut self, name: &str) -> Result<()> {
        if !self.config.aliases().contains_key(name) {
            return Err(Error::AliasNotFound(name.to_string()));
        }

        self.config.set_active(name);
        self.config.save()?;
        info!("alias '{}' is now active", name);

        self.remount_active()
    }

    /// Rebind the drive to the active alias's resolved path. A stale
    /// binding for the drive is removed first.
    pub fn mount_active(&mut self) -> Result<()> {
        self.remount_active()
    }

    /// Unbind the drive. A no-op when the drive is not substituted.
    pub fn unmount(&mut self) -> Result<bool> {
        let drive = self.drive()?;
        self.mounter.unmount(&drive)
    }

    fn remount_active(&mut self) -> Result<()> {
        let drive = self.drive()?;
        let (alias, path) = self.registry().resolve_active_path()?;
        info!(
            "mounting alias '{}' on drive '{}' as '{}'",
            alias, drive, path
        );
        self.mounter.remount(&drive, &path)
    }

    /// Transition `alias` (default: the active one) to `target`.
    ///
    /// A same-state transition is rejected with `AlreadyInState` and
    /// writes nothing. Going local first ensures the cache directory
    /// exists and fires exactly one full mirror sync; going remote only
    /// records the state. A state change to the active alias rebinds the
    /// drive so it follows the new resolution.
    pub fn set_state(&mut self, alias: Option<&str>, target: AliasState) -> Result<()> {
        let name = self.resolve_alias_arg(alias)?;
        let remote = self
            .config
            .aliases()
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::AliasNotFound(name.clone()))?;

        let current = self.registry().state_of(&name);
        if current == target {
            return Err(Error::AlreadyInState(name, target));
        }

        if target == AliasState::Local {
            let local = self.cache.ensure_local_path(&mut self.config, &name)?;
            self.cache
                .sync(Path::new(&remote), &local, SyncMode::Mirror)?;
        }

        self.registry().record_state(&name, target)?;
        info!("alias '{}' is now {}", name, target);

        if self.config.active() == Some(name.as_str()) {
            self.remount_active()?;
        }

        Ok(())
    }

    /// Full resync of the alias's local cache from its remote path.
    pub fn update(&mut self, alias: Option<&str>) -> Result<()> {
        let (name, remote, local) = self.prepare_sync(alias)?;
        info!("updating local cache for alias '{}'", name);
        self.cache
            .sync(Path::new(&remote), &local, SyncMode::Mirror)
    }

    /// Report what a full resync would change, without writing.
    pub fn fetch(&mut self, alias: Option<&str>) -> Result<()> {
        let (name, remote, local) = self.prepare_sync(alias)?;
        info!("changes pending for alias '{}':", name);
        self.cache
            .sync(Path::new(&remote), &local, SyncMode::DryRun)
    }

    /// Gather the active alias's recorded pieces for display.
    pub fn status(&mut self) -> StatusReport {
        let registry = self.registry();
        let active = registry.active().map(str::to_string);

        match active {
            Some(name) => StatusReport {
                state: registry.state_of(&name),
                remote_path: registry.get(&name),
                local_path: registry.local_path_of(&name),
                active: Some(name),
            },
            None => StatusReport {
                active: None,
                state: AliasState::Remote,
                remote_path: None,
                local_path: None,
            },
        }
    }

    fn resolve_alias_arg(&self, alias: Option<&str>) -> Result<String> {
        match alias {
            Some(name) => Ok(name.to_string()),
            None => self
                .config
                .active()
                .map(str::to_string)
                .ok_or(Error::NoActiveAlias),
        }
    }

    fn prepare_sync(&mut self, alias: Option<&str>) -> Result<(String, String, std::path::PathBuf)> {
        let name = self.resolve_alias_arg(alias)?;
        let remote = self
            .config
            .aliases()
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::AliasNotFound(name.clone()))?;
        let local = self.cache.ensure_local_path(&mut self.config, &name)?;
        Ok((name, remote, local))
    }
}
