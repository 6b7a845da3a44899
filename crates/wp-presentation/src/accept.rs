//! # Presentation Acceptance
//!
//! Verifier-side handling of a holder's response. Checks run in a fixed
//! order and the first failure is the reported reason:
//!
//! 1. `challenge` present (`malformed`)
//! 2. nonce consumed from the registry (`unknown_or_used_challenge`,
//!    `expired`)
//! 3. echoed `aud` matches (`audience_mismatch`) and echoed `exp`, when
//!    present, equals the issued expiry (`malformed`)
//! 4. embedded credential verifies (credential reasons)
//! 5. holder binding, when present: subject is the holder
//!    (`subject_holder_mismatch`), DID derives from the key
//!    (`did_pk_mismatch`), signature verifies (`bad_holder_signature`)
//!
//! The nonce is consumed at step 2 whatever happens afterwards, so a
//! rejected presentation cannot be retried against the same challenge.

use serde_json::Value;
use wp_core::Timestamp;
use wp_crypto::CryptoProvider;
use wp_vc::{verify_value_at, Reason, RevocationLookup, VerificationResult};

use crate::challenge::ChallengeRegistry;
use crate::presentation::{binding_message, HolderBinding};

/// Accept a presentation (or a `{vc, challenge}` envelope) at the current
/// time.
pub fn accept_presentation<P, L>(
    registry: &ChallengeRegistry<P>,
    payload: &Value,
    revocation: &L,
) -> VerificationResult
where
    P: CryptoProvider,
    L: RevocationLookup + ?Sized,
{
    accept_presentation_at(registry, payload, revocation, Timestamp::now())
}

/// Accept a presentation at time `now`.
pub fn accept_presentation_at<P, L>(
    registry: &ChallengeRegistry<P>,
    payload: &Value,
    revocation: &L,
    now: Timestamp,
) -> VerificationResult
where
    P: CryptoProvider,
    L: RevocationLookup + ?Sized,
{
    let result = evaluate(registry, payload, revocation, now);
    tracing::info!(
        valid = result.valid,
        revoked = result.revoked,
        reason = %result.reason,
        "presentation evaluated"
    );
    result
}

fn evaluate<P, L>(
    registry: &ChallengeRegistry<P>,
    payload: &Value,
    revocation: &L,
    now: Timestamp,
) -> VerificationResult
where
    P: CryptoProvider,
    L: RevocationLookup + ?Sized,
{
    let Some(nonce) = payload
        .get("challenge")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
    else {
        return VerificationResult::rejected(Reason::Malformed);
    };

    let challenge = match registry.consume(nonce, now) {
        Ok(c) => c,
        Err(reason) => return VerificationResult::rejected(reason),
    };

    let aud = match payload.get("aud") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => return VerificationResult::rejected(Reason::Malformed),
    };
    if aud.is_some_and(|a| a != challenge.audience) {
        return VerificationResult::rejected(Reason::AudienceMismatch);
    }
    let exp = match payload.get("exp") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_i64() {
            Some(e) => Some(e),
            None => return VerificationResult::rejected(Reason::Malformed),
        },
    };
    // The binding signs the echoed expiry, so it must be the one we issued.
    if exp.is_some_and(|e| e != challenge.expires_at) {
        return VerificationResult::rejected(Reason::Malformed);
    }

    let credential = payload.get("vc").filter(|v| !v.is_null());
    let mut result = match credential {
        Some(vc) => {
            let r = verify_value_at(vc, revocation, now);
            if !r.valid {
                return r;
            }
            r
        }
        None => VerificationResult {
            valid: true,
            revoked: false,
            reason: Reason::Ok,
            issuer: None,
            subject: None,
        },
    };

    let holder = match payload.get("holder").filter(|v| !v.is_null()) {
        None => return result,
        Some(h) => match serde_json::from_value::<HolderBinding>(h.clone()) {
            Ok(b) => b,
            Err(_) => return fail(result, Reason::Malformed),
        },
    };

    if credential.is_some() && result.subject.as_deref() != Some(holder.did.as_str()) {
        return fail(result, Reason::SubjectHolderMismatch);
    }
    if let Err(reason) = holder.verify(&binding_message(nonce, aud, exp)) {
        return fail(result, reason);
    }

    if result.subject.is_none() {
        result.subject = Some(holder.did);
    }
    result
}

fn fail(mut result: VerificationResult, reason: Reason) -> VerificationResult {
    result.valid = false;
    result.reason = reason;
    result
}
