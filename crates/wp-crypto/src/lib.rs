//! # wp-crypto: CryptoProvider for the WorldPass Credential Engine
//!
//! Stateless cryptographic building blocks used by the keystore, issuer,
//! verifier, and presentation layers:
//!
//! - **Ed25519** key generation, signing, and boolean verification.
//! - **Argon2id** password-based key derivation with pinned parameters.
//! - **AES-256-GCM** authenticated encryption that fails closed.
//! - **CSPRNG** access via the OS entropy source.
//!
//! All of it sits behind the [`CryptoProvider`] trait so the rest of the
//! workspace never depends on a concrete backend.
//!
//! ## Crate Policy
//!
//! - Secret material never appears in `Debug` output.
//! - No `unsafe` code.

pub mod aead;
pub mod ed25519;
pub mod error;
pub mod kdf;
pub mod provider;
pub mod random;

// Re-export primary types.
pub use aead::NONCE_LEN;
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use kdf::SALT_LEN;
pub use provider::{CryptoProvider, SoftwareCryptoProvider};
pub use zeroize::Zeroizing;
