//! # Credential Structure and Signing Message
//!
//! Defines [`Credential`] and its [`Proof`], plus the signing-message
//! construction shared by issuer and verifier.
//!
//! ## Signing message
//!
//! ```text
//! base64url({"alg":"EdDSA","typ":"JWT"}) + "." + base64url(compact JSON payload)
//! ```
//!
//! The payload is the credential object with `proof` removed, serialized
//! compactly with keys in document order. It resembles a compact JWS but is
//! not one: no JOSE library will validate it, and the exact byte sequence is
//! the wire contract. Changing field order or whitespace breaks every
//! credential already issued.
//!
//! ## Security Invariant
//!
//! Verification recomputes the message from the credential JSON *as
//! received* ([`signing_message_for`]), never from a re-serialized typed
//! struct, so fields this crate does not model are still covered by the
//! signature.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wp_core::{b64u_encode, Did, Timestamp};
use wp_crypto::{Ed25519PublicKey, Ed25519Signature};

/// W3C VC v1 JSON-LD context.
pub const VC_CONTEXT_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// Base type every credential carries first.
pub const VC_BASE_TYPE: &str = "VerifiableCredential";

/// Compact JSON of the fixed signing header.
pub const SIGNING_HEADER_JSON: &str = r#"{"alg":"EdDSA","typ":"JWT"}"#;

/// Conventional credential file extension.
pub const CREDENTIAL_EXTENSION: &str = "wpvc";

/// A signed Verifiable Credential.
///
/// Field declaration order is the serialization order and therefore part of
/// the signed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// `["VerifiableCredential", <template type>]`.
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,

    /// Issuer DID.
    pub issuer: Did,

    /// Issuance time, second precision.
    #[serde(rename = "issuanceDate")]
    pub issuance_date: Timestamp,

    /// Optional expiry.
    #[serde(
        rename = "expirationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<Timestamp>,

    /// Subject DID and claims.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: CredentialSubject,

    /// Credential identifier and revocation key.
    pub jti: String,

    /// Issuer proof. Absent only on an unsigned draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// `{ "id": <subject DID>, ...claims }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSubject {
    /// Subject DID.
    pub id: Did,
    /// Claims, in insertion order.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// Proof scheme. Only Ed25519 is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofType {
    /// Ed25519 detached signature over the signing message.
    Ed25519Signature2020,
}

impl std::fmt::Display for ProofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofType::Ed25519Signature2020 => write!(f, "Ed25519Signature2020"),
        }
    }
}

/// The purpose of a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the claims.
    AssertionMethod,
}

/// Issuer signature envelope.
///
/// `jws` and `issuer_pk_b64u` are accepted on read for credentials written
/// by older issuers; output always uses `signature` / `issuerPublicKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// Proof scheme.
    #[serde(rename = "type")]
    pub proof_type: ProofType,

    /// Signing time.
    pub created: Timestamp,

    /// Always `assertionMethod` for issued credentials.
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,

    /// `<issuer DID>#key-1`.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    /// base64url Ed25519 signature over the signing message.
    #[serde(alias = "jws")]
    pub signature: Ed25519Signature,

    /// base64url issuer public key, embedded for self-contained verification.
    #[serde(rename = "issuerPublicKey", alias = "issuer_pk_b64u")]
    pub issuer_public_key: Ed25519PublicKey,
}

impl Credential {
    /// Template type (the first non-base entry of `type`).
    pub fn template_type(&self) -> Option<&str> {
        self.credential_type
            .iter()
            .map(String::as_str)
            .find(|t| *t != VC_BASE_TYPE)
    }

    /// Subject DID.
    pub fn subject(&self) -> &Did {
        &self.credential_subject.id
    }

    /// JSON value of the whole credential, proof included.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Pretty JSON suitable for a `.wpvc` file.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Signing message for this credential's payload.
    pub fn signing_message(&self) -> Result<String, serde_json::Error> {
        Ok(signing_message_for(&self.to_value()?).unwrap_or_default())
    }
}

/// The credential object with `proof` removed, order preserved.
pub fn unsigned_payload(credential: &Value) -> Option<Map<String, Value>> {
    let obj = credential.as_object()?;
    Some(
        obj.iter()
            .filter(|(k, _)| k.as_str() != "proof")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

/// Compute the signing message for a payload map.
pub fn signing_message(payload: &Map<String, Value>) -> String {
    // Serializing a Map<String, Value> cannot fail.
    let body = serde_json::to_vec(payload).unwrap_or_default();
    format!("{}.{}", b64u_encode(SIGNING_HEADER_JSON), b64u_encode(body))
}

/// Signing message for a received credential (its `proof` is ignored).
/// `None` when the credential is not a JSON object.
pub fn signing_message_for(credential: &Value) -> Option<String> {
    unsigned_payload(credential).map(|p| signing_message(&p))
}
