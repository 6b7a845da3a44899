//! # wp-keystore: Keystore Manager
//!
//! Password-based protection for the holder's (or issuer's) signing key.
//!
//! - [`KeystoreManager`] encrypts an [`Identity`] into a [`KeystoreBlob`]
//!   with Argon2id + AES-256-GCM and decrypts it back.
//! - [`KeystoreBlob`] / [`KeystoreFile`] implement the portable
//!   `.wpkeystore` JSON format, including legacy version-1 files.
//! - [`Session`] is the single owner of an unlocked identity, with
//!   explicit `unlock()` / `lock()` transitions.
//!
//! ## Security Invariant
//!
//! The decrypted private key lives only inside an [`Identity`], which
//! zeroizes on drop and redacts itself in `Debug`. Nothing in this crate
//! writes key material anywhere except into an AEAD ciphertext.
//!
//! ## Concurrency
//!
//! Every call that derives a key blocks for the Argon2id cost. Async
//! callers unlock through [`Session::unlock_blocking`], which moves the
//! derivation onto tokio's blocking pool. Synchronous callers such as the
//! CLI use [`Session::unlock`] directly.

pub mod blob;
pub mod error;
pub mod identity;
pub mod manager;
pub mod session;

pub use blob::{KeystoreBlob, KeystoreFile, KDF_ARGON2ID, KEYSTORE_EXTENSION};
pub use error::KeystoreError;
pub use identity::Identity;
pub use manager::{change_password, decrypt_keystore, encrypt_keystore, KeystoreManager};
pub use session::Session;
