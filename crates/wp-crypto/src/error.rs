//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `wp-crypto`.
//! Signature verification is deliberately absent: it answers `bool`.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material has the wrong length.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength {
        /// Accepted length(s), rendered for diagnostics.
        expected: &'static str,
        /// Observed length.
        got: usize,
    },

    /// Key bytes are well-sized but structurally invalid (e.g. a 64-byte
    /// secret whose public half does not match its seed).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Argon2id rejected its inputs.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// AES-GCM tag mismatch. No plaintext is ever returned alongside it.
    #[error("AEAD authentication failed")]
    AuthenticationFailure,

    /// AES-GCM refused to encrypt (input too large).
    #[error("AEAD encryption failed")]
    Encryption,

    /// The OS entropy source is unavailable.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}
