use thiserror::Error;

/// Errors that can occur when loading or saving the configuration store.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read or created.
    #[error("failed to load configuration file: {0}")]
    Load(String),

    /// The configuration file exists but does not parse into the expected
    /// key/value shapes.
    #[error("configuration file is malformed: {0}")]
    Malformed(String),

    /// The configuration file could not be written back.
    #[error("failed to save configuration file: {0}")]
    Save(String),

    /// No per-user configuration directory could be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,
}

/// Result type for subst-config operations.
pub type Result<T> = std::result::Result<T, Error>;
