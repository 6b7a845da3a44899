//! # Password-Based Key Derivation
//!
//! Argon2id with pinned parameters. The parameters are part of the
//! `.wpkeystore` format: every blob ever written was derived with exactly
//! these values, so they are constants and not per-call options.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 65_536;
/// Argon2id iteration count.
pub const ARGON2_TIME_COST: u32 = 3;
/// Argon2id lanes.
pub const ARGON2_PARALLELISM: u32 = 2;
/// Derived key length in bytes (AES-256).
pub const DERIVED_KEY_LEN: usize = 32;
/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derive a 32-byte symmetric key from a password and 16-byte salt.
///
/// This is the expensive step of unlocking a keystore (hundreds of
/// milliseconds). Async callers must run it on a blocking thread.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, CryptoError> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_TIME_COST,
        ARGON2_PARALLELISM,
        Some(DERIVED_KEY_LEN),
    )
    .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}
