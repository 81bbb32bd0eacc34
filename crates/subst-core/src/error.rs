use subst_config::AliasState;
use thiserror::Error;

/// Errors reported by alias, cache, and mount operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No `active` value is recorded in the store.
    #[error("no active alias found")]
    NoActiveAlias,

    /// The named alias has no entry in the alias map.
    #[error("cannot find alias '{0}'")]
    AliasNotFound(String),

    /// A state transition targeted the alias's current state. No-op.
    #[error("alias '{0}' is already {1}")]
    AlreadyInState(String, AliasState),

    /// A required configuration value is unset.
    #[error("missing configuration value '{0}'")]
    MissingConfigValue(&'static str),

    /// `cache.directory` must be configured before a local cache can be
    /// created.
    #[error("missing configuration value 'cache.directory'")]
    MissingCacheDirectory,

    /// Error from the configuration store.
    #[error(transparent)]
    Config(#[from] subst_config::Error),

    /// I/O error, including failure to spawn an external process.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for subst-core operations.
pub type Result<T> = std::result::Result<T, Error>;
