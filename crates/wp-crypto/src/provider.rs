//! # CryptoProvider Abstraction
//!
//! One trait for every primitive the credential engine needs. Keystore,
//! issuance, and presentation code take `&dyn CryptoProvider` (or a generic
//! `P: CryptoProvider`) and never branch on the platform that backs it.
//!
//! - [`SoftwareCryptoProvider`]: in-process `ed25519-dalek`, `argon2`, and
//!   `aes-gcm`. The only backend today.
//!
//! ## Security Invariants
//!
//! - `verify` returns `bool`; malformed inputs are `false`, never an error.
//! - `aead_decrypt` returns no plaintext on tag mismatch.
//! - Derived keys and decrypted plaintext are wrapped in [`Zeroizing`].

use zeroize::Zeroizing;

use crate::aead::NONCE_LEN;
use crate::ed25519::{Ed25519KeyPair, Ed25519Signature};
use crate::error::CryptoError;
use crate::kdf::{DERIVED_KEY_LEN, SALT_LEN};

/// Trait for cryptographic backends.
///
/// Implementations must be `Send + Sync` so one provider can be shared by
/// every request handler. The trait is object-safe.
pub trait CryptoProvider: Send + Sync {
    /// Generate an Ed25519 key pair from a fresh random seed.
    fn generate_keypair(&self) -> Result<Ed25519KeyPair, CryptoError>;

    /// Sign `message` with `key`.
    fn sign(&self, key: &Ed25519KeyPair, message: &[u8]) -> Ed25519Signature;

    /// Verify an Ed25519 signature. Wrong lengths are `false`.
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool;

    /// Argon2id with the pinned keystore parameters.
    fn derive_key(
        &self,
        password: &str,
        salt: &[u8; SALT_LEN],
    ) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, CryptoError>;

    /// AES-256-GCM encryption.
    fn aead_encrypt(
        &self,
        key: &[u8; DERIVED_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// AES-256-GCM decryption; `AuthenticationFailure` on tag mismatch.
    fn aead_decrypt(
        &self,
        key: &[u8; DERIVED_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// `n` bytes from a CSPRNG.
    fn random_bytes(&self, n: usize) -> Result<Vec<u8>, CryptoError>;

    /// Human-readable name for diagnostics.
    fn provider_name(&self) -> &str;
}

// ─── SoftwareCryptoProvider ─────────────────────────────────────────────

/// In-process provider backed by RustCrypto and dalek.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareCryptoProvider;

impl SoftwareCryptoProvider {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for SoftwareCryptoProvider {
    fn generate_keypair(&self) -> Result<Ed25519KeyPair, CryptoError> {
        Ed25519KeyPair::generate()
    }

    fn sign(&self, key: &Ed25519KeyPair, message: &[u8]) -> Ed25519Signature {
        key.sign(message)
    }

    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        crate::ed25519::verify(public_key, message, signature)
    }

    fn derive_key(
        &self,
        password: &str,
        salt: &[u8; SALT_LEN],
    ) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, CryptoError> {
        crate::kdf::derive_key(password, salt)
    }

    fn aead_encrypt(
        &self,
        key: &[u8; DERIVED_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        crate::aead::aead_encrypt(key, nonce, plaintext)
    }

    fn aead_decrypt(
        &self,
        key: &[u8; DERIVED_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        crate::aead::aead_decrypt(key, nonce, ciphertext)
    }

    fn random_bytes(&self, n: usize) -> Result<Vec<u8>, CryptoError> {
        crate::random::random_bytes(n)
    }

    fn provider_name(&self) -> &str {
        "SoftwareCryptoProvider"
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────
