//! # Ed25519 Signing and Verification
//!
//! Key generation, signing, and verification for credential proofs and
//! holder-bound presentations.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize`; raw secret bytes are only handed out wrapped in
//!   [`Zeroizing`] for the keystore to encrypt.
//! - [`verify`] returns `bool` and never fails. Malformed keys and
//!   signatures of the wrong length are simply `false`.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as unpadded base64url strings.

use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use wp_core::encoding::{b64u_decode_array, b64u_encode};
use wp_core::Did;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Length of an Ed25519 seed / public key.
pub const KEY_LEN: usize = 32;

/// Length of an Ed25519 signature, and of the NaCl `seed‖pk` secret layout.
pub const SIGNATURE_LEN: usize = 64;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; KEY_LEN]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; SIGNATURE_LEN]);

/// An Ed25519 key pair. The secret half is zeroized on drop.
#[derive(Clone)]
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Render as unpadded base64url.
    pub fn to_b64u(&self) -> String {
        b64u_encode(self.0)
    }

    /// Parse from base64url.
    pub fn from_b64u(s: &str) -> Result<Self, CryptoError> {
        b64u_decode_array::<KEY_LEN>(s)
            .map(Self)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// The `did:key:z…` identifier derived from this key.
    pub fn to_did(&self) -> Did {
        Did::from_public_key(&self.0)
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_b64u())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_b64u(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.to_b64u();
        write!(f, "Ed25519PublicKey({}...)", &s[..8])
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_b64u())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Render as unpadded base64url.
    pub fn to_b64u(&self) -> String {
        b64u_encode(self.0)
    }

    /// Parse from base64url.
    pub fn from_b64u(s: &str) -> Result<Self, CryptoError> {
        b64u_decode_array::<SIGNATURE_LEN>(s)
            .map(Self)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_b64u())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_b64u(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.to_b64u();
        write!(f, "Ed25519Signature({}...)", &s[..8])
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new key pair from a fresh OS-random seed.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut seed = Zeroizing::new([0u8; KEY_LEN]);
        OsRng
            .try_fill_bytes(&mut seed[..])
            .map_err(|e| CryptoError::Entropy(e.to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; KEY_LEN]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Accept either a 32-byte seed or the 64-byte `seed‖pk` layout.
    ///
    /// The 64-byte form is rejected when its public half does not match the
    /// key derived from its seed.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, CryptoError> {
        match secret.len() {
            KEY_LEN => {
                let mut seed = Zeroizing::new([0u8; KEY_LEN]);
                seed.copy_from_slice(secret);
                Ok(Self::from_seed(&seed))
            }
            SIGNATURE_LEN => {
                let mut pair = Zeroizing::new([0u8; SIGNATURE_LEN]);
                pair.copy_from_slice(secret);
                ed25519_dalek::SigningKey::from_keypair_bytes(&pair)
                    .map(|signing_key| Self { signing_key })
                    .map_err(|_| {
                        CryptoError::InvalidKey(
                            "public half does not match the seed".to_string(),
                        )
                    })
            }
            got => Err(CryptoError::InvalidKeyLength {
                expected: "32 or 64",
                got,
            }),
        }
    }

    /// The public key of this pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The 32-byte seed.
    pub fn seed(&self) -> Zeroizing<[u8; KEY_LEN]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// The 64-byte `seed‖pk` form.
    pub fn keypair_bytes(&self) -> Zeroizing<[u8; SIGNATURE_LEN]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over raw bytes.
///
/// Any malformed input (wrong key length, wrong signature length, a key
/// that is not a valid curve point) yields `false`.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(pk) = <[u8; KEY_LEN]>::try_from(public_key) else {
        return false;
    };
    let Ok(sig) = <[u8; SIGNATURE_LEN]>::try_from(signature) else {
        return false;
    };
    let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(&pk) else {
        return false;
    };
    vk.verify(message, &ed25519_dalek::Signature::from_bytes(&sig))
        .is_ok()
}

/// Typed convenience wrapper around [`verify`].
pub fn verify_with_public_key(
    public_key: &Ed25519PublicKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> bool {
    verify(&public_key.0, message, &signature.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let kp = Ed25519KeyPair::generate().unwrap();
        assert_eq!(kp.public_key().as_bytes().len(), 32);
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate().unwrap();
        let sig = kp.sign(b"hello");
        assert!(verify(kp.public_key().as_bytes(), b"hello", sig.as_bytes()));
        assert!(verify_with_public_key(&kp.public_key(), b"hello", &sig));
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate().unwrap();
        let kp2 = Ed25519KeyPair::generate().unwrap();
        let sig = kp1.sign(b"msg");
        assert!(!verify(kp2.public_key().as_bytes(), b"msg", sig.as_bytes()));
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = Ed25519KeyPair::generate().unwrap();
        let sig = kp.sign(b"original");
        assert!(!verify(kp.public_key().as_bytes(), b"tampered", sig.as_bytes()));
    }

    #[test]
    fn test_verify_malformed_lengths_is_false() {
        let kp = Ed25519KeyPair::generate().unwrap();
        let sig = kp.sign(b"m");
        assert!(!verify(&[0u8; 31], b"m", sig.as_bytes()));
        assert!(!verify(kp.public_key().as_bytes(), b"m", &sig.as_bytes()[..63]));
        assert!(!verify(&[], b"m", &[]));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let kp1 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        let kp2 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(b"x"), kp2.sign(b"x"));
    }

    #[test]
    fn test_secret_bytes_accepts_both_layouts() {
        let kp = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let from_seed = Ed25519KeyPair::from_secret_bytes(&kp.seed()[..]).unwrap();
        let from_pair = Ed25519KeyPair::from_secret_bytes(&kp.keypair_bytes()[..]).unwrap();
        assert_eq!(from_seed.public_key(), kp.public_key());
        assert_eq!(from_pair.public_key(), kp.public_key());
    }

    #[test]
    fn test_secret_bytes_rejects_mismatched_pair() {
        let kp = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let other = Ed25519KeyPair::from_seed(&[8u8; 32]);
        let mut bytes = kp.keypair_bytes().to_vec();
        bytes[32..].copy_from_slice(other.public_key().as_bytes());
        assert!(matches!(
            Ed25519KeyPair::from_secret_bytes(&bytes),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(matches!(
            Ed25519KeyPair::from_secret_bytes(&[0u8; 16]),
            Err(CryptoError::InvalidKeyLength { got: 16, .. })
        ));
    }

    #[test]
    fn test_public_key_b64u_and_did() {
        let kp = Ed25519KeyPair::generate().unwrap();
        let pk = kp.public_key();
        let s = pk.to_b64u();
        assert_eq!(s.len(), 43);
        assert_eq!(Ed25519PublicKey::from_b64u(&s).unwrap(), pk);
        assert_eq!(pk.to_did().as_str(), format!("did:key:z{s}"));
        assert_eq!(pk.to_did().public_key_bytes(), Some(pk.0));
    }

    #[test]
    fn test_signature_serde_json() {
        let kp = Ed25519KeyPair::generate().unwrap();
        let sig = kp.sign(b"y");
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json.len(), 86 + 2);
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate().unwrap();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
        let pk_dbg = format!("{:?}", kp.public_key());
        assert!(pk_dbg.starts_with("Ed25519PublicKey("));
        assert!(pk_dbg.ends_with("...)"));
    }
}
