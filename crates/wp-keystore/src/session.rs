//! # Session
//!
//! The explicit owner of an unlocked [`Identity`]. Code that needs the
//! private key borrows it through [`Session::with_identity`] for the
//! duration of one call; nothing else keeps a copy. Locking drops the
//! identity, which zeroizes the key.

use wp_core::Did;
use wp_crypto::CryptoProvider;
use zeroize::Zeroizing;

use crate::blob::KeystoreBlob;
use crate::error::KeystoreError;
use crate::identity::Identity;
use crate::manager::KeystoreManager;

/// Lock state for one holder or issuer.
#[derive(Debug, Default)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    /// A session with no identity loaded.
    pub fn locked() -> Self {
        Self { identity: None }
    }

    /// A session around an identity that is already in memory (freshly
    /// generated, for instance).
    pub fn unlocked(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Decrypt `blob` and hold the identity.
    ///
    /// On failure the session keeps whatever state it had before. This
    /// blocks for the full Argon2id derivation.
    pub fn unlock<P: CryptoProvider>(
        &mut self,
        manager: &KeystoreManager<P>,
        password: &str,
        blob: &KeystoreBlob,
    ) -> Result<&Did, KeystoreError> {
        let identity = manager.decrypt_keystore(password, blob)?;
        tracing::info!(did = %identity.did(), "session unlocked");
        Ok(self.identity.insert(identity).did())
    }

    /// [`Session::unlock`] for async callers.
    ///
    /// The Argon2id derivation runs on tokio's blocking pool so it does not
    /// stall the runtime. Must be called from within a tokio runtime.
    pub async fn unlock_blocking<P>(
        &mut self,
        manager: &KeystoreManager<P>,
        password: Zeroizing<String>,
        blob: KeystoreBlob,
    ) -> Result<&Did, KeystoreError>
    where
        P: CryptoProvider + Clone + 'static,
    {
        let manager = manager.clone();
        let identity =
            tokio::task::spawn_blocking(move || manager.decrypt_keystore(&password, &blob))
                .await
                .map_err(|e| KeystoreError::TaskFailed(e.to_string()))??;
        tracing::info!(did = %identity.did(), "session unlocked");
        Ok(self.identity.insert(identity).did())
    }

    /// Drop the identity. Idempotent.
    pub fn lock(&mut self) {
        if let Some(identity) = self.identity.take() {
            tracing::info!(did = %identity.did(), "session locked");
        }
    }

    /// Whether an identity is loaded.
    pub fn is_unlocked(&self) -> bool {
        self.identity.is_some()
    }

    /// DID of the loaded identity.
    pub fn did(&self) -> Option<&Did> {
        self.identity.as_ref().map(Identity::did)
    }

    /// Run `f` with the unlocked identity.
    pub fn with_identity<R>(&self, f: impl FnOnce(&Identity) -> R) -> Result<R, KeystoreError> {
        self.identity
            .as_ref()
            .map(f)
            .ok_or(KeystoreError::SessionLocked)
    }

    /// Encrypt the loaded identity for persistence.
    pub fn export<P: CryptoProvider>(
        &self,
        manager: &KeystoreManager<P>,
        password: &str,
    ) -> Result<KeystoreBlob, KeystoreError> {
        self.with_identity(|id| manager.encrypt_keystore(password, id))?
    }
}
