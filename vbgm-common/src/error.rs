//! Common error types for VBGM

use thiserror::Error;

/// Common result type for VBGM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across VBGM crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML document
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
