//! # Error Types
//!
//! Errors raised while validating foundational values. Higher layers wrap
//! these in their own `thiserror` enums via `#[from]`.

use thiserror::Error;

/// Error produced when a foundational value fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The string is not a syntactically valid DID.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// The timestamp could not be parsed or is out of range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Base64 / base64url decoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}
