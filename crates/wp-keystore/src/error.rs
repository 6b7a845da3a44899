//! # Keystore Error Types
//!
//! Wrong password and wrong format are different failures: the first is
//! retriable by re-prompting, the second never will be.

use thiserror::Error;
use wp_crypto::CryptoError;

/// Errors from keystore encryption, decryption, and session handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeystoreError {
    /// The blob names a KDF this engine does not implement. Fatal.
    #[error("unsupported KDF: {0}")]
    UnsupportedKdf(String),

    /// AEAD authentication failed under the derived key.
    #[error("invalid password")]
    InvalidPassword,

    /// The file or decrypted payload is structurally wrong.
    #[error("corrupt keystore: {0}")]
    CorruptKeystore(String),

    /// Decryption succeeded but the identity carries no DID.
    #[error("keystore identity has no DID")]
    MissingDid,

    /// An operation needed the private key while the session was locked.
    #[error("session is locked")]
    SessionLocked,

    /// The blocking unlock task panicked or was cancelled.
    #[error("keystore task failed: {0}")]
    TaskFailed(String),

    /// Failure in the underlying crypto provider (entropy, KDF setup).
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl KeystoreError {
    /// Whether re-prompting for the password can fix this error.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::InvalidPassword)
    }
}
