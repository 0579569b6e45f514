//! Error types for the engine.

use thiserror::Error;

/// Engine-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
