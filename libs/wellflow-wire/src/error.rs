//! Wire protocol error types

use thiserror::Error;

/// Result type for wellflow-wire operations
pub type Result<T> = std::result::Result<T, WireError>;

/// Binary protocol errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Buffer ended before the requested field
    #[error("Truncated buffer: needed {needed} bytes at offset {offset}, {remaining} left")]
    Truncated {
        needed: usize,
        offset: usize,
        remaining: usize,
    },

    /// A decoded string held invalid UTF-16
    #[error("Invalid UTF-16 string at offset {0}")]
    InvalidString(usize),
}
