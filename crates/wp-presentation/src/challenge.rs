//! # Challenges and the Challenge Registry
//!
//! A [`Challenge`] is a random nonce bound to an audience and an expiry.
//! The verifier encodes it as a [`ChallengeRequest`]
//! (`{"type":"present","challenge","aud","exp"}`) for the holder to scan.
//!
//! ## Lifecycle
//!
//! ```text
//! Issued ──consume()──▶ gone
//!    └────purge_expired()──▶ gone
//! ```
//!
//! [`ChallengeRegistry::consume`] removes the nonce and checks expiry under
//! one lock, so of two concurrent presentations against the same nonce
//! exactly one reaches the credential checks. A consumed nonce is
//! indistinguishable from one never issued.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wp_core::{b64u_encode, Timestamp};
use wp_crypto::{CryptoProvider, SoftwareCryptoProvider};
use wp_vc::Reason;

use crate::error::PresentationError;

/// Lifetime used when the caller has no preference.
pub const DEFAULT_CHALLENGE_TTL_SECS: i64 = 120;

/// Nonce entropy in bytes.
pub const NONCE_BYTES: usize = 16;

/// `type` of a challenge request payload.
pub const PRESENT_TYPE: &str = "present";

/// A live challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Opaque base64url nonce.
    pub nonce: String,
    /// Who asked.
    pub audience: String,
    /// Expiry, Unix seconds.
    pub expires_at: i64,
}

impl Challenge {
    /// Whether the challenge has expired at `now`. The expiry second itself
    /// is still valid.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now.epoch_secs() > self.expires_at
    }

    /// The QR / transport payload for this challenge.
    pub fn to_request(&self) -> ChallengeRequest {
        ChallengeRequest {
            request_type: PRESENT_TYPE.to_string(),
            challenge: self.nonce.clone(),
            aud: Some(self.audience.clone()),
            exp: Some(self.expires_at),
        }
    }
}

/// `{"type":"present","challenge":…,"aud":…,"exp":…}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRequest {
    /// Always `present` when written.
    #[serde(rename = "type")]
    pub request_type: String,
    /// The nonce.
    pub challenge: String,
    /// Audience, if the verifier named one.
    #[serde(default)]
    pub aud: Option<String>,
    /// Expiry, Unix seconds.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl ChallengeRequest {
    /// Read a scanned request. `type` must be `present` and `challenge` a
    /// non-empty string.
    pub fn from_value(value: &Value) -> Result<Self, PresentationError> {
        let request: Self = serde_json::from_value(value.clone())
            .map_err(|e| PresentationError::MalformedRequest(e.to_string()))?;
        if request.request_type != PRESENT_TYPE {
            return Err(PresentationError::MalformedRequest(format!(
                "unexpected type {:?}",
                request.request_type
            )));
        }
        if request.challenge.trim().is_empty() {
            return Err(PresentationError::MalformedRequest(
                "empty challenge".to_string(),
            ));
        }
        Ok(request)
    }

    /// Parse from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PresentationError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| PresentationError::MalformedRequest(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Whether the request has expired at `now`, as far as the holder can
    /// tell. The verifier's registry is authoritative.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.exp.is_some_and(|exp| now.epoch_secs() > exp)
    }
}

/// Verifier-side store of live challenges.
#[derive(Debug, Default)]
pub struct ChallengeRegistry<P = SoftwareCryptoProvider> {
    provider: P,
    live: Mutex<HashMap<String, Challenge>>,
}

impl ChallengeRegistry<SoftwareCryptoProvider> {
    /// Empty registry drawing nonces from the software provider.
    pub fn new() -> Self {
        Self::with_provider(SoftwareCryptoProvider)
    }
}

impl<P: CryptoProvider> ChallengeRegistry<P> {
    /// Empty registry drawing nonces from `provider`.
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a challenge for `audience` valid for `ttl_secs` from now.
    pub fn new_challenge(
        &self,
        audience: &str,
        ttl_secs: i64,
    ) -> Result<Challenge, PresentationError> {
        self.new_challenge_at(audience, ttl_secs, Timestamp::now())
    }

    /// Issue a challenge with an explicit clock.
    pub fn new_challenge_at(
        &self,
        audience: &str,
        ttl_secs: i64,
        now: Timestamp,
    ) -> Result<Challenge, PresentationError> {
        let audience = audience.trim();
        if audience.is_empty() {
            return Err(PresentationError::EmptyAudience);
        }
        if ttl_secs <= 0 {
            return Err(PresentationError::InvalidTtl(ttl_secs));
        }

        let challenge = Challenge {
            nonce: b64u_encode(self.provider.random_bytes(NONCE_BYTES)?),
            audience: audience.to_string(),
            expires_at: now.epoch_secs().saturating_add(ttl_secs),
        };
        self.live
            .lock()
            .insert(challenge.nonce.clone(), challenge.clone());
        tracing::info!(%audience, expires_at = challenge.expires_at, "challenge issued");
        Ok(challenge)
    }

    /// Re-admit a challenge issued earlier, for example one reloaded from
    /// disk by a verifier that restarted. Returns `false` if the nonce is
    /// already held.
    pub fn restore(&self, challenge: Challenge) -> bool {
        let mut live = self.live.lock();
        if live.contains_key(&challenge.nonce) {
            return false;
        }
        live.insert(challenge.nonce.clone(), challenge);
        true
    }

    /// Consume `nonce`: remove it and return the challenge if it was live.
    ///
    /// An expired nonce is removed too. The caller gets
    /// [`Reason::UnknownOrUsedChallenge`] or [`Reason::Expired`].
    pub fn consume(&self, nonce: &str, now: Timestamp) -> Result<Challenge, Reason> {
        let taken = self.live.lock().remove(nonce);
        match taken {
            None => {
                tracing::warn!("challenge unknown or already used");
                Err(Reason::UnknownOrUsedChallenge)
            }
            Some(c) if c.is_expired_at(now) => {
                tracing::warn!(audience = %c.audience, "challenge expired");
                Err(Reason::Expired)
            }
            Some(c) => {
                tracing::debug!(audience = %c.audience, "challenge consumed");
                Ok(c)
            }
        }
    }

    /// Drop every expired challenge. Returns how many were removed.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let mut live = self.live.lock();
        let before = live.len();
        live.retain(|_, c| !c.is_expired_at(now));
        let purged = before - live.len();
        if purged > 0 {
            tracing::debug!(purged, "expired challenges purged");
        }
        purged
    }

    /// Whether `nonce` is live (issued, unconsumed, unexpired) at `now`.
    pub fn is_live(&self, nonce: &str, now: Timestamp) -> bool {
        self.live
            .lock()
            .get(nonce)
            .is_some_and(|c| !c.is_expired_at(now))
    }

    /// Number of stored challenges, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.live.lock().len()
    }

    /// Whether no challenges are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn t(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    #[test]
    fn nonce_is_128_bit_b64u() {
        let r = ChallengeRegistry::new();
        let c = r.new_challenge("kampus-kapi", 120).unwrap();
        assert_eq!(c.nonce.len(), 22);
        assert!(!c.nonce.contains('='));
        assert_ne!(c.nonce, r.new_challenge("kampus-kapi", 120).unwrap().nonce);
    }

    #[test]
    fn expiry_is_now_plus_ttl() {
        let r = ChallengeRegistry::new();
        let c = r.new_challenge_at("door", 120, t(1_000)).unwrap();
        assert_eq!(c.expires_at, 1_120);
        assert!(!c.is_expired_at(t(1_120)));
        assert!(c.is_expired_at(t(1_121)));
    }

    #[test]
    fn rejects_blank_audience_and_bad_ttl() {
        let r = ChallengeRegistry::new();
        assert_eq!(
            r.new_challenge(" ", 60).unwrap_err(),
            PresentationError::EmptyAudience
        );
        assert_eq!(
            r.new_challenge("door", 0).unwrap_err(),
            PresentationError::InvalidTtl(0)
        );
        assert!(r.is_empty());
    }

    #[test]
    fn consume_is_single_use() {
        let r = ChallengeRegistry::new();
        let c = r.new_challenge_at("door", 120, t(0)).unwrap();
        assert!(r.is_live(&c.nonce, t(1)));
        assert_eq!(r.consume(&c.nonce, t(1)).unwrap(), c);
        assert_eq!(
            r.consume(&c.nonce, t(2)).unwrap_err(),
            Reason::UnknownOrUsedChallenge
        );
        assert!(!r.is_live(&c.nonce, t(2)));
    }

    #[test]
    fn expired_consume_still_removes() {
        let r = ChallengeRegistry::new();
        let c = r.new_challenge_at("door", 1, t(0)).unwrap();
        assert_eq!(r.consume(&c.nonce, t(2)).unwrap_err(), Reason::Expired);
        assert_eq!(
            r.consume(&c.nonce, t(2)).unwrap_err(),
            Reason::UnknownOrUsedChallenge
        );
    }

    #[test]
    fn restore_readmits_once() {
        let issuing = ChallengeRegistry::new();
        let c = issuing.new_challenge_at("door", 60, t(0)).unwrap();

        let restarted = ChallengeRegistry::new();
        assert!(restarted.restore(c.clone()));
        assert!(!restarted.restore(c.clone()));
        assert_eq!(restarted.consume(&c.nonce, t(1)).unwrap(), c);
        assert_eq!(
            restarted.consume(&c.nonce, t(1)).unwrap_err(),
            Reason::UnknownOrUsedChallenge
        );
    }

    #[test]
    fn purge_drops_only_expired() {
        let r = ChallengeRegistry::new();
        r.new_challenge_at("a", 10, t(0)).unwrap();
        let keep = r.new_challenge_at("b", 100, t(0)).unwrap();
        assert_eq!(r.purge_expired(t(50)), 1);
        assert_eq!(r.len(), 1);
        assert!(r.is_live(&keep.nonce, t(50)));
    }

    #[test]
    fn request_payload_shape() {
        let c = Challenge {
            nonce: "n1".into(),
            audience: "kampus-kapi".into(),
            expires_at: 1_731_000_000,
        };
        assert_eq!(
            serde_json::to_value(c.to_request()).unwrap(),
            json!({"type": "present", "challenge": "n1", "aud": "kampus-kapi", "exp": 1_731_000_000})
        );
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({"nonce": "n1", "audience": "kampus-kapi", "expiresAt": 1_731_000_000})
        );
    }

    #[test]
    fn request_parsing() {
        let ok = ChallengeRequest::from_json(r#"{"type":"present","challenge":"abc"}"#).unwrap();
        assert_eq!(ok.aud, None);
        assert!(!ok.is_expired_at(t(i64::from(u32::MAX))));

        for bad in [
            r#"{"type":"other","challenge":"abc"}"#,
            r#"{"type":"present","challenge":""}"#,
            r#"{"type":"present"}"#,
            r#"{"type":"present","challenge":"abc","exp":"soon"}"#,
            "not json",
        ] {
            assert!(matches!(
                ChallengeRequest::from_json(bad).unwrap_err(),
                PresentationError::MalformedRequest(_)
            ));
        }
    }
}
