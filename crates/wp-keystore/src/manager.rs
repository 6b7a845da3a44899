//! # Keystore Manager
//!
//! Turns a password and an [`Identity`] into a [`KeystoreBlob`] and back.
//! The manager is stateless between calls; holding the decrypted identity
//! is the caller's job (see [`Session`](crate::Session)).
//!
//! ## Failure classes
//!
//! | Condition                        | Error                 | Retriable |
//! |----------------------------------|-----------------------|-----------|
//! | KDF tag other than `argon2id`    | `UnsupportedKdf`      | no        |
//! | AEAD tag mismatch                | `InvalidPassword`     | yes       |
//! | plaintext not an identity        | `CorruptKeystore`     | no        |
//! | identity without a DID           | `MissingDid`          | no        |

use wp_crypto::{CryptoError, CryptoProvider, SoftwareCryptoProvider, NONCE_LEN, SALT_LEN};

use crate::blob::{KeystoreBlob, KDF_ARGON2ID};
use crate::error::KeystoreError;
use crate::identity::Identity;

/// Stateless keystore encryption and decryption over a [`CryptoProvider`].
#[derive(Debug, Clone, Default)]
pub struct KeystoreManager<P = SoftwareCryptoProvider> {
    provider: P,
}

impl KeystoreManager<SoftwareCryptoProvider> {
    /// Manager backed by the in-process software provider.
    pub fn new() -> Self {
        Self::with_provider(SoftwareCryptoProvider)
    }
}

impl<P: CryptoProvider> KeystoreManager<P> {
    /// Manager backed by an arbitrary provider.
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Encrypt `identity` under `password` with a fresh salt and nonce.
    pub fn encrypt_keystore(
        &self,
        password: &str,
        identity: &Identity,
    ) -> Result<KeystoreBlob, KeystoreError> {
        let salt: [u8; SALT_LEN] = random_fixed(&self.provider)?;
        let nonce: [u8; NONCE_LEN] = random_fixed(&self.provider)?;

        let key = self.provider.derive_key(password, &salt)?;
        let plaintext = identity.to_payload()?;
        let ciphertext = self.provider.aead_encrypt(&key, &nonce, &plaintext)?;

        tracing::debug!(did = %identity.did(), "keystore encrypted");
        Ok(KeystoreBlob {
            kdf: Some(KDF_ARGON2ID.to_string()),
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt `blob` with `password` and validate the identity inside.
    pub fn decrypt_keystore(
        &self,
        password: &str,
        blob: &KeystoreBlob,
    ) -> Result<Identity, KeystoreError> {
        if !blob.kdf_supported() {
            let kdf = blob.kdf.clone().unwrap_or_default();
            tracing::warn!(%kdf, "keystore uses an unsupported KDF");
            return Err(KeystoreError::UnsupportedKdf(kdf));
        }

        let key = self.provider.derive_key(password, &blob.salt)?;
        let plaintext = self
            .provider
            .aead_decrypt(&key, &blob.nonce, &blob.ciphertext)
            .map_err(|e| match e {
                CryptoError::AuthenticationFailure => {
                    tracing::info!("keystore decryption failed: invalid password");
                    KeystoreError::InvalidPassword
                }
                other => KeystoreError::Crypto(other),
            })?;

        let identity = Identity::from_payload(&plaintext).map_err(|e| {
            tracing::warn!(error = %e, "keystore decrypted to an invalid identity");
            e
        })?;
        tracing::debug!(did = %identity.did(), "keystore decrypted");
        Ok(identity)
    }

    /// Re-encrypt under a new password. The old blob is left untouched; the
    /// returned blob has a fresh salt and nonce.
    pub fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        blob: &KeystoreBlob,
    ) -> Result<KeystoreBlob, KeystoreError> {
        let identity = self.decrypt_keystore(old_password, blob)?;
        self.encrypt_keystore(new_password, &identity)
    }
}

fn random_fixed<const N: usize, P: CryptoProvider>(provider: &P) -> Result<[u8; N], KeystoreError> {
    let bytes = provider.random_bytes(N)?;
    let got = bytes.len();
    bytes.try_into().map_err(|_| {
        KeystoreError::Crypto(CryptoError::InvalidKeyLength {
            expected: "requested length",
            got,
        })
    })
}

/// [`KeystoreManager::encrypt_keystore`] with the software provider.
pub fn encrypt_keystore(password: &str, identity: &Identity) -> Result<KeystoreBlob, KeystoreError> {
    KeystoreManager::new().encrypt_keystore(password, identity)
}

/// [`KeystoreManager::decrypt_keystore`] with the software provider.
pub fn decrypt_keystore(password: &str, blob: &KeystoreBlob) -> Result<Identity, KeystoreError> {
    KeystoreManager::new().decrypt_keystore(password, blob)
}

/// [`KeystoreManager::change_password`] with the software provider.
pub fn change_password(
    old_password: &str,
    new_password: &str,
    blob: &KeystoreBlob,
) -> Result<KeystoreBlob, KeystoreError> {
    KeystoreManager::new().change_password(old_password, new_password, blob)
}
