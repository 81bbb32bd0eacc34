use std::io;
use std::process::Command;

use log::{debug, info};

use crate::error::Result;

/// OS-level drive substitution primitive.
pub trait DriveSubst {
    /// Bind `drive` to `path`.
    fn bind(&self, drive: &str, path: &str) -> io::Result<()>;
    /// Remove the binding for `drive`.
    fn unbind(&self, drive: &str) -> io::Result<()>;
    /// Drive letters currently substituted, normalized like
    /// [`normalize_drive`].
    fn bindings(&self) -> io::Result<Vec<String>>;
}

/// Production substitution via the `subst` utility.
///
/// The exit status of `subst` is not inspected; only spawn failures are
/// surfaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstCommand;

impl DriveSubst for SubstCommand {
    fn bind(&self, drive: &str, path: &str) -> io::Result<()> {
        let status = Command::new("subst").arg(drive).arg(path).status()?;
        debug!("subst exited with {}", status);
        Ok(())
    }

    fn unbind(&self, drive: &str) -> io::Result<()> {
        let status = Command::new("subst").arg(drive).arg("/D").status()?;
        debug!("subst exited with {}", status);
        Ok(())
    }

    fn bindings(&self) -> io::Result<Vec<String>> {
        let output = Command::new("subst").output()?;
        Ok(parse_bindings(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Normalize a drive specification for comparison: `z` and `Z:\` both
/// become `Z:`.
pub fn normalize_drive(drive: &str) -> String {
    let mut normalized = drive
        .trim()
        .trim_end_matches(|c| c == ':' || c == '\\')
        .to_ascii_uppercase();
    normalized.push(':');
    normalized
}

/// Parse the listing printed by a bare `subst` invocation. Lines look
/// like `Z:\: => C:\some\path`; anything else is skipped.
fn parse_bindings(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let (drive, _) = line.trim().split_once("=>")?;
            Some(normalize_drive(drive))
        })
        .collect()
}

/// Binds and unbinds the virtual drive.
pub struct MountController<S: DriveSubst> {
    subst: S,
}

impl<S: DriveSubst> MountController<S> {
    pub fn new(subst: S) -> Self {
        Self { subst }
    }

    /// Bind `drive` to `path`. The bind is not verified.
    pub fn mount(&self, drive: &str, path: &str) -> Result<()> {
        info!("mounting '{}' on drive '{}'", path, drive);
        self.subst.bind(drive, path)?;
        Ok(())
    }

    /// Unbind `drive` if it is currently substituted. Returns false, and
    /// does nothing, when it is not.
    pub fn unmount(&self, drive: &str) -> Result<bool> {
        let target = normalize_drive(drive);
        if !self.subst.bindings()?.contains(&target) {
            info!("drive '{}' is not mounted", drive);
            return Ok(false);
        }

        info!("unmounting drive '{}'", drive);
        self.subst.unbind(drive)?;
        Ok(true)
    }

    /// Unbind then rebind, used whenever the path backing the active
    /// alias changes.
    pub fn remount(&self, drive: &str, path: &str) -> Result<()> {
        self.unmount(drive)?;
        self.mount(drive, path)
    }
}
