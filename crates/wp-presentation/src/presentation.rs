//! # Holder Presentations
//!
//! A [`Presentation`] echoes the scanned challenge and optionally carries a
//! credential and a [`HolderBinding`]. The binding is an Ed25519 signature
//! by the holder over
//!
//! ```text
//! <challenge> "|" <aud or ""> "|" <exp or "">
//! ```
//!
//! which proves possession of the subject key for this one session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wp_core::encoding::{b64u_decode, b64u_decode_array};
use wp_core::Did;
use wp_keystore::{Identity, Session};
use wp_vc::Reason;

use crate::challenge::{ChallengeRequest, PRESENT_TYPE};
use crate::error::PresentationError;

/// Signature algorithm named in holder bindings.
pub const HOLDER_ALG: &str = "Ed25519";

fn default_alg() -> String {
    HOLDER_ALG.to_string()
}

/// The bytes a holder signs for a challenge.
pub fn binding_message(challenge: &str, aud: Option<&str>, exp: Option<i64>) -> String {
    format!(
        "{}|{}|{}",
        challenge,
        aud.unwrap_or_default(),
        exp.map(|e| e.to_string()).unwrap_or_default()
    )
}

/// Proof that the presenter holds the subject key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderBinding {
    /// Holder DID; must be `did:key:z<pk_b64u>`.
    pub did: String,
    /// Holder public key, base64url.
    pub pk_b64u: String,
    /// Signature over the binding message, base64url.
    pub sig_b64u: String,
    /// Always `Ed25519`.
    #[serde(default = "default_alg")]
    pub alg: String,
}

impl HolderBinding {
    /// Sign the binding message for `request` with `holder`.
    pub fn sign(holder: &Identity, request: &ChallengeRequest) -> Self {
        let message = binding_message(&request.challenge, request.aud.as_deref(), request.exp);
        Self {
            did: holder.did().to_string(),
            pk_b64u: holder.public_key().to_b64u(),
            sig_b64u: holder.sign(message.as_bytes()).to_b64u(),
            alg: HOLDER_ALG.to_string(),
        }
    }

    /// Check the DID/key relation and the signature over `message`.
    pub fn verify(&self, message: &str) -> Result<(), Reason> {
        let derived = b64u_decode_array::<32>(&self.pk_b64u)
            .map(|pk| Did::from_public_key(&pk));
        match derived {
            Ok(did) if did.as_str() == self.did.trim() => {}
            _ => return Err(Reason::DidPkMismatch),
        }

        let pk = b64u_decode(&self.pk_b64u).map_err(|_| Reason::DidPkMismatch)?;
        let sig = b64u_decode(&self.sig_b64u).map_err(|_| Reason::BadHolderSignature)?;
        if !self.alg.eq_ignore_ascii_case(HOLDER_ALG)
            || !wp_crypto::ed25519::verify(&pk, message.as_bytes(), &sig)
        {
            return Err(Reason::BadHolderSignature);
        }
        Ok(())
    }
}

/// A holder's answer to a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// `present` (holders may also send `presentation`).
    #[serde(rename = "type")]
    pub presentation_type: String,
    /// The nonce being answered.
    pub challenge: String,
    /// Echoed audience.
    #[serde(default)]
    pub aud: Option<String>,
    /// Echoed expiry.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Holder binding, when the holder signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<HolderBinding>,
    /// The presented credential, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vc: Option<Value>,
}

impl Presentation {
    /// Message the holder binding must cover.
    pub fn binding_message(&self) -> String {
        binding_message(&self.challenge, self.aud.as_deref(), self.exp)
    }

    /// JSON value for transport.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Echo `request`, signing a holder binding when `holder` is given and
/// attaching `vc` verbatim.
pub fn build_presentation(
    request: &ChallengeRequest,
    holder: Option<&Identity>,
    vc: Option<Value>,
) -> Presentation {
    Presentation {
        presentation_type: PRESENT_TYPE.to_string(),
        challenge: request.challenge.clone(),
        aud: request.aud.clone(),
        exp: request.exp,
        holder: holder.map(|h| HolderBinding::sign(h, request)),
        vc,
    }
}

/// [`build_presentation`] with the identity held by an unlocked session.
pub fn build_presentation_in_session(
    request: &ChallengeRequest,
    session: &Session,
    vc: Option<Value>,
) -> Result<Presentation, PresentationError> {
    Ok(session.with_identity(|id| build_presentation(request, Some(id), vc))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wp_crypto::Ed25519KeyPair;

    fn holder() -> Identity {
        Identity::from_keypair(Ed25519KeyPair::from_seed(&[0x42; 32]))
    }

    fn request() -> ChallengeRequest {
        ChallengeRequest {
            request_type: PRESENT_TYPE.into(),
            challenge: "nonce-1".into(),
            aud: Some("kampus-kapi".into()),
            exp: Some(1_731_000_000),
        }
    }

    #[test]
    fn message_format() {
        assert_eq!(
            binding_message("n", Some("door"), Some(17)),
            "n|door|17"
        );
        assert_eq!(binding_message("n", None, None), "n||");
    }

    #[test]
    fn signed_binding_verifies() {
        let p = build_presentation(&request(), Some(&holder()), None);
        let binding = p.holder.clone().unwrap();
        assert_eq!(binding.did, holder().did().to_string());
        assert_eq!(binding.alg, "Ed25519");
        assert!(binding.verify(&p.binding_message()).is_ok());
        assert_eq!(
            binding.verify("nonce-1|other|1731000000").unwrap_err(),
            Reason::BadHolderSignature
        );
    }

    #[test]
    fn foreign_did_is_a_pk_mismatch() {
        let mut binding = HolderBinding::sign(&holder(), &request());
        binding.did = "did:key:zSomeoneElse".into();
        assert_eq!(
            binding.verify("nonce-1|kampus-kapi|1731000000").unwrap_err(),
            Reason::DidPkMismatch
        );
    }

    #[test]
    fn unsigned_presentation_omits_holder() {
        let p = build_presentation(&request(), None, None);
        let v = p.to_value().unwrap();
        assert!(v.get("holder").is_none());
        assert_eq!(v["type"], "present");
        assert_eq!(v["challenge"], "nonce-1");
    }

    #[test]
    fn locked_session_cannot_sign() {
        let err =
            build_presentation_in_session(&request(), &Session::locked(), None).unwrap_err();
        assert_eq!(
            err,
            PresentationError::Keystore(wp_keystore::KeystoreError::SessionLocked)
        );
    }
}
