//! # subst-core
//!
//! Alias registry, cache synchronization, and virtual drive mount
//! orchestration for the subst manager.
//!
//! This crate provides:
//! - [`AliasRegistry`] — named aliases over the persisted store, with
//!   active-path resolution
//! - [`CacheSynchronizer`] — local cache creation and mirror/dry-run sync
//!   through an external mirroring tool
//! - [`MountController`] — drive binding through an external substitution
//!   primitive
//! - [`SubstManager`] — the verb-level operations composing the three
//!
//! The external collaborators sit behind the [`MirrorTool`] and
//! [`DriveSubst`] traits; production code shells out to `robocopy` and
//! `subst`, tests substitute recording fakes.

mod cache;
mod error;
mod manager;
mod mount;
pub mod output;
mod registry;

pub use cache::{CacheSynchronizer, MirrorTool, Robocopy, SyncMode};
pub use error::{Error, Result};
pub use manager::{StatusReport, SubstManager};
pub use mount::{normalize_drive, DriveSubst, MountController, SubstCommand};
pub use registry::{AliasEntry, AliasRegistry};
