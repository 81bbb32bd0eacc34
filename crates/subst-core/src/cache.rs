use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use subst_config::Config;

use crate::error::{Error, Result};

/// How a sync invocation treats the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Make the destination an exact mirror of the source, including
    /// deletions.
    Mirror,
    /// Report what a mirror would change without writing anything.
    DryRun,
}

/// External directory-mirroring primitive.
///
/// Implementations run the operation to completion. The process exit
/// status is deliberately not interpreted; only a failure to spawn is
/// surfaced.
pub trait MirrorTool {
    fn mirror(&self, src: &Path, dst: &Path) -> io::Result<()>;
    fn diff_only(&self, src: &Path, dst: &Path) -> io::Result<()>;
}

/// Production mirroring via the `robocopy` utility.
///
/// robocopy's exit codes encode change classes rather than plain
/// success/failure, which is why they are ignored here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Robocopy;

impl MirrorTool for Robocopy {
    fn mirror(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let status = Command::new("robocopy")
            .arg(src)
            .arg(dst)
            .arg("/MIR")
            .status()?;
        debug!("robocopy exited with {}", status);
        Ok(())
    }

    fn diff_only(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let status = Command::new("robocopy")
            .arg(src)
            .arg(dst)
            .arg("/MIR")
            .arg("/L")
            .status()?;
        debug!("robocopy exited with {}", status);
        Ok(())
    }
}

/// Creates and locates per-alias local cache directories and drives the
/// external mirroring operation.
pub struct CacheSynchronizer<M: MirrorTool> {
    tool: M,
}

impl<M: MirrorTool> CacheSynchronizer<M> {
    pub fn new(tool: M) -> Self {
        Self { tool }
    }

    /// Return the local cache path recorded for `alias`, creating and
    /// recording `cache.directory/<alias>` on first use.
    pub fn ensure_local_path(&self, config: &mut Config, alias: &str) -> Result<PathBuf> {
        let mut locals = config.alias_locals();
        if let Some(existing) = locals.get(alias) {
            return Ok(PathBuf::from(existing));
        }

        let base = config
            .cache_directory()
            .ok_or(Error::MissingCacheDirectory)?;
        let local = Path::new(base).join(alias);

        if !local.exists() {
            fs::create_dir_all(&local)?;
            info!("created local cache directory: {}", local.display());
        }

        locals.insert(alias.to_string(), local.display().to_string());
        config.set_alias_locals(locals);
        config.save()?;

        Ok(local)
    }

    /// Run one sync of `local` against `remote` in the given mode,
    /// blocking until the external process terminates.
    pub fn sync(&self, remote: &Path, local: &Path, mode: SyncMode) -> Result<()> {
        match mode {
            SyncMode::Mirror => {
                info!(
                    "mirroring '{}' into '{}'",
                    remote.display(),
                    local.display()
                );
                self.tool.mirror(remote, local)?;
            }
            SyncMode::DryRun => {
                info!(
                    "listing pending changes from '{}' against '{}'",
                    remote.display(),
                    local.display()
                );
                self.tool.diff_only(remote, local)?;
            }
        }
        Ok(())
    }
}
