//! Errors raised while creating challenges or building presentations.
//!
//! Accepting a presentation never fails with these; rejection is a
//! [`Reason`](wp_vc::Reason) on the result.

use thiserror::Error;
use wp_crypto::CryptoError;
use wp_keystore::KeystoreError;

/// Challenge creation and presentation building failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    /// The audience is blank.
    #[error("challenge audience is empty")]
    EmptyAudience,

    /// The requested lifetime is not positive.
    #[error("challenge ttl must be positive, got {0}")]
    InvalidTtl(i64),

    /// A challenge request payload could not be read.
    #[error("malformed challenge request: {0}")]
    MalformedRequest(String),

    /// Nonce generation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The holder session could not provide a key.
    #[error(transparent)]
    Keystore(#[from] KeystoreError),
}
