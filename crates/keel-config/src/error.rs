use thiserror::Error;

/// Errors produced while reading settings or resolving paths.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine a home directory for default paths")]
    NoHomeDir,

    #[error(transparent)]
    Store(#[from] keel_store::StoreError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
