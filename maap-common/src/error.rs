//! Common error types for MAAP

use thiserror::Error;

/// Common result type for MAAP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the portal
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP failure talking to a remote endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote endpoint returned a body that could not be interpreted
    /// (non-JSON, or JSON of the wrong shape)
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
