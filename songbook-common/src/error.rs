//! Common error types for the songbook

use thiserror::Error;

/// Common result type for songbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the songbook library code
#[derive(Error, Debug)]
pub enum Error {
    /// Config file unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected parameter, e.g. an unknown layout name
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
