//! # Credential Verifier
//!
//! Structural check, signature, expiry, revocation, in that order. An
//! invalid credential is a normal outcome, so every path returns a
//! [`VerificationResult`] and nothing here returns `Err`.
//!
//! `valid` and `revoked` are independent flags. A correctly signed,
//! unexpired credential whose `jti` was revoked reports
//! `valid: true, revoked: true`; callers must check both.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wp_core::{b64u_decode, Timestamp};

use crate::credential::{signing_message_for, Credential};
use crate::revocation::RevocationLookup;

/// Why a credential or presentation was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Everything checked out.
    Ok,
    /// Required fields missing or of the wrong shape.
    Malformed,
    /// Signature does not verify under the embedded public key.
    BadSignature,
    /// Credential `expirationDate` or challenge `exp` has passed.
    Expired,
    /// Challenge nonce never issued or already consumed.
    UnknownOrUsedChallenge,
    /// Credential subject is not the presenting holder.
    SubjectHolderMismatch,
    /// Holder DID is not derived from the presented public key.
    DidPkMismatch,
    /// Holder signature over the challenge does not verify.
    BadHolderSignature,
    /// Presentation audience differs from the challenge audience.
    AudienceMismatch,
}

impl Reason {
    /// The snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::UnknownOrUsedChallenge => "unknown_or_used_challenge",
            Self::SubjectHolderMismatch => "subject_holder_mismatch",
            Self::DidPkMismatch => "did_pk_mismatch",
            Self::BadHolderSignature => "bad_holder_signature",
            Self::AudienceMismatch => "audience_mismatch",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying a credential or accepting a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Structurally sound, correctly signed, and unexpired.
    pub valid: bool,
    /// The credential id is revoked. Reported regardless of `valid`.
    pub revoked: bool,
    /// Primary reason.
    pub reason: Reason,
    /// Issuer DID, when it could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Subject DID, when it could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl VerificationResult {
    /// A rejection that carries no credential details.
    pub fn rejected(reason: Reason) -> Self {
        Self {
            valid: false,
            revoked: false,
            reason,
            issuer: None,
            subject: None,
        }
    }

    /// Whether the credential is both valid and not revoked.
    pub fn is_trusted(&self) -> bool {
        self.valid && !self.revoked
    }
}

/// Fields the verifier needs, borrowed from the raw credential JSON.
struct Envelope<'a> {
    issuer: &'a str,
    subject: &'a str,
    jti: &'a str,
    signature: &'a str,
    public_key: &'a str,
    expiration: Option<&'a Value>,
}

fn non_empty_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn envelope(vc: &Value) -> Option<Envelope<'_>> {
    let obj = vc.as_object()?;
    let issuer = match obj.get("issuer")? {
        Value::Object(o) => non_empty_str(o.get("id")),
        other => non_empty_str(Some(other)),
    }?;
    let subject = non_empty_str(obj.get("credentialSubject")?.get("id"))?;
    let jti = non_empty_str(obj.get("jti"))?;
    let proof = obj.get("proof")?;
    let signature = non_empty_str(proof.get("signature").or_else(|| proof.get("jws")))?;
    let public_key = non_empty_str(
        proof
            .get("issuerPublicKey")
            .or_else(|| proof.get("issuer_pk_b64u")),
    )?;
    Some(Envelope {
        issuer,
        subject,
        jti,
        signature,
        public_key,
        expiration: obj.get("expirationDate").filter(|v| !v.is_null()),
    })
}

/// Verify a credential as received, at the current time.
pub fn verify_value<L>(vc: &Value, revocation: &L) -> VerificationResult
where
    L: RevocationLookup + ?Sized,
{
    verify_value_at(vc, revocation, Timestamp::now())
}

/// Verify a credential as received, at time `now`.
pub fn verify_value_at<L>(vc: &Value, revocation: &L, now: Timestamp) -> VerificationResult
where
    L: RevocationLookup + ?Sized,
{
    let Some(env) = envelope(vc) else {
        tracing::debug!(reason = %Reason::Malformed, "credential rejected");
        return VerificationResult::rejected(Reason::Malformed);
    };

    let result = |valid: bool, reason: Reason| {
        let revoked = revocation.is_revoked(env.issuer, env.jti);
        tracing::debug!(issuer = %env.issuer, jti = %env.jti, valid, revoked, %reason, "credential verified");
        VerificationResult {
            valid,
            revoked,
            reason,
            issuer: Some(env.issuer.to_string()),
            subject: Some(env.subject.to_string()),
        }
    };

    let signature_ok = match (
        signing_message_for(vc),
        b64u_decode(env.public_key),
        b64u_decode(env.signature),
    ) {
        (Some(msg), Ok(pk), Ok(sig)) => wp_crypto::ed25519::verify(&pk, msg.as_bytes(), &sig),
        _ => false,
    };
    if !signature_ok {
        return result(false, Reason::BadSignature);
    }

    if let Some(exp) = env.expiration {
        let Some(expires) = exp.as_str().and_then(|s| Timestamp::parse_lenient(s).ok()) else {
            return result(false, Reason::Malformed);
        };
        if now > expires {
            return result(false, Reason::Expired);
        }
    }

    result(true, Reason::Ok)
}

/// Verify a typed credential at the current time.
pub fn verify<L>(credential: &Credential, revocation: &L) -> VerificationResult
where
    L: RevocationLookup + ?Sized,
{
    verify_at(credential, revocation, Timestamp::now())
}

/// Verify a typed credential at time `now`.
pub fn verify_at<L>(credential: &Credential, revocation: &L, now: Timestamp) -> VerificationResult
where
    L: RevocationLookup + ?Sized,
{
    match credential.to_value() {
        Ok(v) => verify_value_at(&v, revocation, now),
        Err(_) => VerificationResult::rejected(Reason::Malformed),
    }
}
