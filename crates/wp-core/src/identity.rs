//! # Decentralized Identifiers
//!
//! [`Did`] is the validated newtype for every DID in the system: issuer,
//! subject, and holder. Holder and issuer DIDs minted here use the simple
//! `did:key:z<base64url(publicKey)>` form, which makes the public key
//! recoverable from the identifier without a resolver.
//!
//! This is deliberately not the multibase/multicodec `did:key` method; it is
//! the self-certifying form the wallet and issuer console have always
//! exchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoding::{b64u_decode, b64u_encode};
use crate::error::CoreError;

/// Prefix of the simple key-derived DID form.
pub const DID_KEY_PREFIX: &str = "did:key:z";

/// A syntactically valid DID (`did:<method>:<method-specific-id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Did(String);

impl Did {
    /// Parse and validate a DID string.
    ///
    /// The method must be non-empty lowercase alphanumeric and the
    /// method-specific identifier must be non-empty.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        let mut parts = s.splitn(3, ':');
        let scheme = parts.next().unwrap_or_default();
        let method = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();

        if scheme != "did" {
            return Err(CoreError::InvalidDid(format!("{s:?} does not start with \"did:\"")));
        }
        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(CoreError::InvalidDid(format!("{s:?} has an invalid method")));
        }
        if id.is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "{s:?} has an empty method-specific identifier"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Derive the DID for an Ed25519 public key.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        Self(format!("{DID_KEY_PREFIX}{}", b64u_encode(public_key)))
    }

    /// Recover the public key from a simple `did:key:z…` DID.
    ///
    /// Returns `None` for any other DID method or when the suffix does not
    /// decode to exactly 32 bytes.
    pub fn public_key_bytes(&self) -> Option<[u8; 32]> {
        let suffix = self.0.strip_prefix(DID_KEY_PREFIX)?;
        b64u_decode(suffix).ok()?.try_into().ok()
    }

    /// The DID method (`key`, `web`, ...).
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// Verification method URL for the first key of this DID.
    pub fn key_id(&self) -> String {
        format!("{}#key-1", self.0)
    }

    /// Borrow the DID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
