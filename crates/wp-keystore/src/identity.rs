//! # Holder / Issuer Identity
//!
//! An [`Identity`] is a DID plus the Ed25519 key pair behind it. It exists
//! in cleartext only inside a [`Session`](crate::Session) or for the
//! duration of one keystore call; the secret half is zeroized on drop.
//!
//! The encrypted payload is the compact JSON
//! `{"did":…,"sk_b64u":…,"pk_b64u":…}`. `sk_b64u` is written in the 64-byte
//! `seed‖pk` layout; a bare 32-byte seed is also accepted on read.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use wp_core::encoding::{b64u_decode, b64u_encode};
use wp_core::Did;
use wp_crypto::{CryptoProvider, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, Zeroizing};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::KeystoreError;

/// A DID with its signing key pair.
#[derive(Clone)]
pub struct Identity {
    did: Did,
    keypair: Ed25519KeyPair,
}

/// Wire form of the encrypted identity. Every field is optional on read so
/// structural problems surface as typed errors instead of serde failures.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct IdentityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    did: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sk_b64u: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pk_b64u: Option<String>,
}

impl Identity {
    /// Generate a fresh identity with a `did:key` derived from its key.
    pub fn generate(provider: &dyn CryptoProvider) -> Result<Self, KeystoreError> {
        Ok(Self::from_keypair(provider.generate_keypair()?))
    }

    /// Wrap an existing key pair, deriving its `did:key`.
    pub fn from_keypair(keypair: Ed25519KeyPair) -> Self {
        Self {
            did: keypair.public_key().to_did(),
            keypair,
        }
    }

    /// Wrap a key pair under an externally assigned DID (e.g. `did:web`).
    pub fn with_did(did: Did, keypair: Ed25519KeyPair) -> Self {
        Self { did, keypair }
    }

    /// The identity's DID.
    pub fn did(&self) -> &Did {
        &self.did
    }

    /// The Ed25519 public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Borrow the key pair for a signing call.
    pub fn keypair(&self) -> &Ed25519KeyPair {
        &self.keypair
    }

    /// Sign `message` with this identity's key.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        self.keypair.sign(message)
    }

    /// Serialize to the compact payload JSON.
    pub(crate) fn to_payload(&self) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        let payload = IdentityPayload {
            did: Some(self.did.to_string()),
            sk_b64u: Some(b64u_encode(&self.keypair.keypair_bytes()[..])),
            pk_b64u: Some(self.public_key().to_b64u()),
        };
        serde_json::to_vec(&payload)
            .map(Zeroizing::new)
            .map_err(|e| KeystoreError::CorruptKeystore(format!("serialize identity: {e}")))
    }

    /// Parse and validate a decrypted payload.
    pub(crate) fn from_payload(bytes: &[u8]) -> Result<Self, KeystoreError> {
        let payload: IdentityPayload = serde_json::from_slice(bytes)
            .map_err(|e| KeystoreError::CorruptKeystore(format!("identity payload: {e}")))?;

        let did = match payload.did.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => {
                Did::parse(d).map_err(|e| KeystoreError::CorruptKeystore(e.to_string()))?
            }
            _ => return Err(KeystoreError::MissingDid),
        };

        let sk_b64u = payload
            .sk_b64u
            .as_deref()
            .ok_or_else(|| KeystoreError::CorruptKeystore("missing sk_b64u".to_string()))?;
        let secret = Zeroizing::new(
            b64u_decode(sk_b64u).map_err(|e| KeystoreError::CorruptKeystore(e.to_string()))?,
        );
        let keypair = Ed25519KeyPair::from_secret_bytes(&secret)
            .map_err(|e| KeystoreError::CorruptKeystore(e.to_string()))?;

        if let Some(pk) = payload.pk_b64u.as_deref() {
            let stated = Ed25519PublicKey::from_b64u(pk)
                .map_err(|e| KeystoreError::CorruptKeystore(e.to_string()))?;
            if stated != keypair.public_key() {
                return Err(KeystoreError::CorruptKeystore(
                    "pk_b64u does not match the secret key".to_string(),
                ));
            }
        }

        Ok(Self { did, keypair })
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        let secrets_eq: bool = self.keypair.seed()[..]
            .ct_eq(&other.keypair.seed()[..])
            .into();
        self.did == other.did && secrets_eq
    }
}

impl Eq for Identity {}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("did", &self.did)
            .field("keypair", &"<private>")
            .finish()
    }
}
