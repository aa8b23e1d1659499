//! # Error Types
//!
//! Errors raised while constructing value objects from untrusted input.

use thiserror::Error;

/// Errors that can occur when parsing or building a value object.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    /// Input was not valid hexadecimal.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A bytes32 label must leave room for at least one trailing zero.
    #[error("Label too long: {len} bytes, max 31")]
    LabelTooLong { len: usize },
}
