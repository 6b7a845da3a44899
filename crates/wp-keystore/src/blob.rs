//! # Keystore Blob and `.wpkeystore` File
//!
//! [`KeystoreBlob`] is the decoded, length-checked form of an encrypted
//! identity. [`KeystoreFile`] is its portable JSON wire form:
//!
//! ```json
//! {"kty":"wpks","version":2,"kdf":"argon2id","salt":"…","nonce":"…","ct":"…"}
//! ```
//!
//! ## Versions
//!
//! - **2** (current): binary fields are unpadded base64url.
//! - **1** (legacy): binary fields are padded standard base64 and the KDF is
//!   implicitly Argon2id. A missing `version` means 1.
//!
//! Writing always produces version 2. The KDF tag is checked before any
//! binary field is decoded, so a foreign format is reported as
//! `UnsupportedKdf` rather than as corruption.

use serde::{Deserialize, Serialize};
use wp_core::encoding::{b64_std_decode, b64u_decode, b64u_encode};
use wp_crypto::{NONCE_LEN, SALT_LEN};

use crate::error::KeystoreError;

/// The only KDF this engine reads or writes.
pub const KDF_ARGON2ID: &str = "argon2id";
/// Value of the `kty` discriminator.
pub const KEYSTORE_KTY: &str = "wpks";
/// Version written by [`KeystoreBlob::to_file`].
pub const KEYSTORE_VERSION: u32 = 2;
/// Conventional file extension.
pub const KEYSTORE_EXTENSION: &str = "wpkeystore";

/// An encrypted identity. Immutable once written; a password change
/// produces a new blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreBlob {
    /// KDF tag. `None` only for legacy files that predate the tag.
    pub kdf: Option<String>,
    /// Argon2id salt.
    pub salt: [u8; SALT_LEN],
    /// AES-GCM nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with appended GCM tag.
    pub ciphertext: Vec<u8>,
}

/// JSON wire form of a keystore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreFile {
    /// Always `"wpks"` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    /// Format version; absent means legacy version 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// KDF tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<String>,
    /// Encoded salt.
    pub salt: String,
    /// Encoded nonce.
    pub nonce: String,
    /// Encoded ciphertext.
    pub ct: String,
}

impl KeystoreBlob {
    /// Whether the blob's KDF tag is absent or Argon2id.
    pub fn kdf_supported(&self) -> bool {
        self.kdf
            .as_deref()
            .map_or(true, |k| k.eq_ignore_ascii_case(KDF_ARGON2ID))
    }

    /// Encode as a version-2 file.
    pub fn to_file(&self) -> KeystoreFile {
        KeystoreFile {
            kty: Some(KEYSTORE_KTY.to_string()),
            version: Some(KEYSTORE_VERSION),
            kdf: Some(
                self.kdf
                    .clone()
                    .unwrap_or_else(|| KDF_ARGON2ID.to_string()),
            ),
            salt: b64u_encode(self.salt),
            nonce: b64u_encode(self.nonce),
            ct: b64u_encode(&self.ciphertext),
        }
    }

    /// Decode a file of either version.
    pub fn from_file(file: &KeystoreFile) -> Result<Self, KeystoreError> {
        if let Some(kty) = file.kty.as_deref() {
            if kty != KEYSTORE_KTY {
                return Err(KeystoreError::CorruptKeystore(format!(
                    "unexpected kty {kty:?}"
                )));
            }
        }

        let kdf = file.kdf.as_deref().map(str::to_ascii_lowercase);
        if let Some(k) = kdf.as_deref() {
            if k != KDF_ARGON2ID {
                return Err(KeystoreError::UnsupportedKdf(k.to_string()));
            }
        }

        type Decoder = fn(&str) -> Result<Vec<u8>, wp_core::CoreError>;
        let decode: Decoder = match file.version.unwrap_or(1) {
            1 => b64_std_decode,
            2 => b64u_decode,
            v => {
                return Err(KeystoreError::CorruptKeystore(format!(
                    "unsupported keystore version {v}"
                )))
            }
        };
        let corrupt = |field: &str, e: wp_core::CoreError| {
            KeystoreError::CorruptKeystore(format!("{field}: {e}"))
        };

        let salt = decode(&file.salt).map_err(|e| corrupt("salt", e))?;
        let nonce = decode(&file.nonce).map_err(|e| corrupt("nonce", e))?;
        let ciphertext = decode(&file.ct).map_err(|e| corrupt("ct", e))?;

        Ok(Self {
            kdf,
            salt: fixed(salt, "salt")?,
            nonce: fixed(nonce, "nonce")?,
            ciphertext,
        })
    }

    /// Parse a `.wpkeystore` JSON document.
    pub fn from_json(json: &str) -> Result<Self, KeystoreError> {
        let file: KeystoreFile = serde_json::from_str(json)
            .map_err(|e| KeystoreError::CorruptKeystore(format!("keystore file: {e}")))?;
        Self::from_file(&file)
    }

    /// Render as pretty-printed `.wpkeystore` JSON.
    pub fn to_json_pretty(&self) -> Result<String, KeystoreError> {
        serde_json::to_string_pretty(&self.to_file())
            .map_err(|e| KeystoreError::CorruptKeystore(format!("keystore file: {e}")))
    }
}

fn fixed<const N: usize>(bytes: Vec<u8>, field: &str) -> Result<[u8; N], KeystoreError> {
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        KeystoreError::CorruptKeystore(format!("{field} must be {N} bytes, got {len}"))
    })
}
