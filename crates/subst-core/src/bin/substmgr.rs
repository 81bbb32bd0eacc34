//! substmgr: manage path aliases and mount one onto a virtual drive.
//!
//! Aliases associate a short name with a (possibly remote) filesystem
//! path. One alias is active at a time and gets bound to the configured
//! drive letter via the OS substitution primitive. An alias can be
//! switched to a locally mirrored cache so the drive serves from local
//! disk.
//!
//! # Usage
//!
//! ```bash
//! substmgr config subst.drive Z:
//! substmgr alias work \\server\share\work
//! substmgr switch work
//! substmgr local work
//! ```

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, warn};
use std::process;
use subst_config::{Config, PUBLIC_KEYS};
use subst_core::output::{pad_width, Printer};
use subst_core::{Error, SubstManager};

/// Manage path aliases and mount one onto a virtual drive.
#[derive(Parser, Debug)]
#[command(name = "substmgr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List aliases, show one, or create/update one
    Alias {
        /// Name of the alias
        name: Option<String>,
        /// Path for the alias
        path: Option<String>,
    },
    /// Remove an alias
    Unalias {
        /// Name of the alias
        name: String,
    },
    /// List, show, or set global configuration values
    Config {
        /// Name of the configuration key
        key: Option<String>,
        /// Value for the configuration key
        value: Option<String>,
    },
    /// Switch the active alias and mount the drive
    Switch {
        /// Alias name
        alias: String,
    },
    /// Mount the active alias
    Mount,
    /// Unmount the drive
    Unmount,
    /// Switch an alias to remote access
    Remote {
        /// Alias name (defaults to the active alias)
        alias: Option<String>,
    },
    /// Switch an alias to local cached access
    Local {
        /// Alias name (defaults to the active alias)
        alias: Option<String>,
    },
    /// Fully resync an alias's local cache
    Update {
        /// Alias name (defaults to the active alias)
        alias: Option<String>,
    },
    /// Show what an update would change
    Fetch {
        /// Alias name (defaults to the active alias)
        alias: Option<String>,
    },
    /// Show the active alias and its paths
    Status,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // A store that cannot be loaded is fatal; everything after this point
    // reports and returns.
    let mut mgr = match SubstManager::open() {
        Ok(mgr) => mgr,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let out = Printer::new();
    let result = match &cli.command {
        Command::Alias { name, path } => run_alias(&mut mgr, &out, name.as_deref(), path.as_deref()),
        Command::Unalias { name } => run_unalias(&mut mgr, &out, name),
        Command::Config { key, value } => {
            run_config(&mut mgr, &out, key.as_deref(), value.as_deref())
        }
        Command::Switch { alias } => mgr.switch(alias),
        Command::Mount => mgr.mount_active(),
        Command::Unmount => mgr.unmount().map(|_| ()),
        Command::Remote { alias } => mgr.set_state(alias.as_deref(), subst_config::AliasState::Remote),
        Command::Local { alias } => mgr.set_state(alias.as_deref(), subst_config::AliasState::Local),
        Command::Update { alias } => mgr.update(alias.as_deref()),
        Command::Fetch { alias } => mgr.fetch(alias.as_deref()),
        Command::Status => run_status(&mut mgr, &out),
    };

    if let Err(e) = result {
        report(&e);
    }
}

/// Reported errors print a message and hand control back; only store-load
/// failure terminates the process.
fn report(err: &Error) {
    match err {
        Error::AlreadyInState(..) => warn!("{}", err),
        _ => error!("{}", err),
    }
}

fn run_alias<M, S>(
    mgr: &mut SubstManager<M, S>,
    out: &Printer,
    name: Option<&str>,
    path: Option<&str>,
) -> subst_core::Result<()>
where
    M: subst_core::MirrorTool,
    S: subst_core::DriveSubst,
{
    let mut registry = mgr.registry();

    match (name, path) {
        (None, _) => {
            let entries = registry.list();
            if entries.is_empty() {
                out.line("No aliases defined");
                return Ok(());
            }

            out.line("Aliases:");
            let inner = out.indented();
            let pad = pad_width(entries.iter().map(|e| e.name.as_str()));
            for entry in entries {
                let marker = if entry.active { '*' } else { ' ' };
                inner.line(&format!(
                    "{}{:<pad$} {}",
                    marker, entry.name, entry.remote_path
                ));
            }
        }
        (Some(name), None) => match registry.get(name) {
            Some(path) => {
                out.line("Alias:");
                out.indented().line(&format!("{}\t{}", name, path));
            }
            None => out.line(&format!("Alias '{}' not found", name)),
        },
        (Some(name), Some(path)) => {
            let created = registry.upsert(name, path)?;
            if created {
                out.line(&format!("Created alias '{}' with path '{}'", name, path));
            } else {
                out.line(&format!("Updated alias '{}' with path '{}'", name, path));
            }
        }
    }

    Ok(())
}

fn run_unalias<M, S>(
    mgr: &mut SubstManager<M, S>,
    out: &Printer,
    name: &str,
) -> subst_core::Result<()>
where
    M: subst_core::MirrorTool,
    S: subst_core::DriveSubst,
{
    mgr.registry().remove(name)?;
    out.line(&format!("Removed alias '{}'", name));
    Ok(())
}

fn run_config<M, S>(
    mgr: &mut SubstManager<M, S>,
    out: &Printer,
    key: Option<&str>,
    value: Option<&str>,
) -> subst_core::Result<()>
where
    M: subst_core::MirrorTool,
    S: subst_core::DriveSubst,
{
    match (key, value) {
        (None, _) => {
            out.line("Config values:");
            let inner = out.indented();
            let pad = pad_width(PUBLIC_KEYS);

            let mut keys = PUBLIC_KEYS;
            keys.sort_unstable();
            for key in keys {
                match mgr.config().raw(key) {
                    Some(value) => inner.line(&format!("{:<pad$} {}", key, value)),
                    None => inner.line(&format!("{:<pad$} <missing>", key)),
                }
            }
        }
        (Some(key), None) => match mgr.config().raw(key) {
            Some(value) => {
                out.line("Config value:");
                out.indented().line(&format!("{} {}", key, value));
            }
            None => out.line(&format!("Config value '{}' not found", key)),
        },
        (Some(key), Some(value)) => {
            if !Config::is_public_key(key) {
                error!(
                    "cannot set config value '{}' because it is not a public value",
                    key
                );
                return Ok(());
            }

            let cfg = mgr.config_mut();
            match key {
                subst_config::KEY_DRIVE => cfg.set_drive(value),
                subst_config::KEY_CACHE_DIRECTORY => cfg.set_cache_directory(value),
                _ => unreachable!("public key set is closed"),
            }
            cfg.save()?;
            out.line(&format!("Config value '{}' set to '{}'", key, value));
        }
    }

    Ok(())
}

fn run_status<M, S>(mgr: &mut SubstManager<M, S>, out: &Printer) -> subst_core::Result<()>
where
    M: subst_core::MirrorTool,
    S: subst_core::DriveSubst,
{
    let report = mgr.status();

    out.line("status:");
    let inner = out.indented();

    let Some(active) = report.active else {
        inner.line("active alias: <missing>");
        return Ok(());
    };

    inner.line(&format!("active alias: {}", active));
    inner.line(&format!("state:        {}", report.state));
    inner.line(&format!(
        "remote path:  {}",
        report.remote_path.as_deref().unwrap_or("<missing>")
    ));
    inner.line(&format!(
        "local path:   {}",
        report.local_path.as_deref().unwrap_or("<missing>")
    ));

    Ok(())
}
