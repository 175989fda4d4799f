use std::io;
use thiserror::Error;

/// Errors raised while bootstrapping infrastructure
#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Settings could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// The global logging subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result alias for infrastructure operations
pub type Result<T> = std::result::Result<T, Error>;
