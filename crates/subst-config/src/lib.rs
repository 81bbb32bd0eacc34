//! # subst-config
//!
//! Persisted key/value configuration store for the subst manager.
//!
//! This crate provides:
//! - The on-disk JSON store, loaded wholesale and rewritten wholesale
//! - A closed tagged value type (`Text` | `PathMap` | `StateMap`) whose
//!   expected shape is decided by the key, not by runtime inspection
//! - Named, typed accessor functions for the fixed key set
//!
//! ## Example
//!
//! ```ignore
//! use subst_config::Config;
//!
//! let mut cfg = Config::load()?;
//! let mut aliases = cfg.aliases();
//! aliases.insert("work".into(), r"\\server\share".into());
//! cfg.set_aliases(aliases);
//! cfg.save()?;
//! ```

mod error;
mod store;
mod value;

pub use error::{Error, Result};
pub use store::{
    Config, KEY_ACTIVE, KEY_ALIASES, KEY_ALIAS_LOCALS, KEY_ALIAS_STATES, KEY_CACHE_DIRECTORY,
    KEY_DRIVE, PUBLIC_KEYS,
};
pub use value::{AliasState, ConfigValue, ValueKind};
