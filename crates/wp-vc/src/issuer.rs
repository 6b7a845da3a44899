//! # Credential Issuer
//!
//! Builds the unsigned payload, signs its signing message with the issuer's
//! Ed25519 key, and attaches the [`Proof`]. Every structural check happens
//! before the key is touched; a payload that fails validation is never
//! signed.

use serde_json::{Map, Value};
use thiserror::Error;
use wp_core::{Did, Timestamp};
use wp_keystore::{Identity, KeystoreError, Session};

use crate::credential::{
    Credential, CredentialSubject, Proof, ProofPurpose, ProofType, VC_BASE_TYPE, VC_CONTEXT_V1,
};
use crate::template::{CredentialTemplate, TemplateError};

/// Issuance failures. All are caller errors raised before signing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    /// No unlocked issuer key is available.
    #[error("issuer private key is not available")]
    MissingPrivateKey,

    /// The subject DID is blank.
    #[error("subject DID is empty")]
    EmptySubject,

    /// The subject DID does not parse.
    #[error("invalid subject DID: {0}")]
    InvalidSubjectDid(String),

    /// The credential type is blank.
    #[error("credential type is empty")]
    EmptyType,

    /// A claim collides with a reserved subject key.
    #[error("claim {0:?} is reserved")]
    ReservedClaim(String),

    /// Claims do not satisfy the template.
    #[error("template validation failed: {0}")]
    Template(#[from] TemplateError),

    /// The payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<KeystoreError> for IssueError {
    fn from(_: KeystoreError) -> Self {
        Self::MissingPrivateKey
    }
}

/// Inputs for one issuance.
#[derive(Debug, Clone)]
pub struct IssueParams<'a> {
    /// Subject DID.
    pub subject_did: &'a str,
    /// Claims placed after `id` in `credentialSubject`, in order.
    pub claims: Map<String, Value>,
    /// Template type, e.g. `StudentCard`.
    pub credential_type: &'a str,
    /// Optional `expirationDate`.
    pub expiration_date: Option<Timestamp>,
}

impl<'a> IssueParams<'a> {
    /// Params with no expiry.
    pub fn new(subject_did: &'a str, credential_type: &'a str, claims: Map<String, Value>) -> Self {
        Self {
            subject_did,
            claims,
            credential_type,
            expiration_date: None,
        }
    }

    /// Set `expirationDate`.
    pub fn expires(mut self, at: Timestamp) -> Self {
        self.expiration_date = Some(at);
        self
    }
}

/// `vc-<unix seconds>-<5 random alphanumerics>`.
pub fn generate_jti(now: Timestamp) -> String {
    format!(
        "vc-{}-{}",
        now.epoch_secs(),
        wp_crypto::random::random_alphanumeric(5)
    )
}

/// Issue a credential signed by `issuer`.
pub fn issue(issuer: &Identity, params: IssueParams<'_>) -> Result<Credential, IssueError> {
    issue_at(issuer, params, Timestamp::now())
}

/// Issue with an explicit clock.
pub fn issue_at(
    issuer: &Identity,
    params: IssueParams<'_>,
    now: Timestamp,
) -> Result<Credential, IssueError> {
    let subject_did = params.subject_did.trim();
    if subject_did.is_empty() {
        return Err(IssueError::EmptySubject);
    }
    let subject = Did::parse(subject_did).map_err(|e| IssueError::InvalidSubjectDid(e.to_string()))?;
    let vc_type = params.credential_type.trim();
    if vc_type.is_empty() {
        return Err(IssueError::EmptyType);
    }
    if params.claims.contains_key("id") {
        return Err(IssueError::ReservedClaim("id".to_string()));
    }

    let mut credential = Credential {
        context: vec![VC_CONTEXT_V1.to_string()],
        credential_type: vec![VC_BASE_TYPE.to_string(), vc_type.to_string()],
        issuer: issuer.did().clone(),
        issuance_date: now,
        expiration_date: params.expiration_date,
        credential_subject: CredentialSubject {
            id: subject,
            claims: params.claims,
        },
        jti: generate_jti(now),
        proof: None,
    };

    let message = credential
        .signing_message()
        .map_err(|e| IssueError::Serialization(e.to_string()))?;
    let signature = issuer.sign(message.as_bytes());

    credential.proof = Some(Proof {
        proof_type: ProofType::Ed25519Signature2020,
        created: now,
        proof_purpose: ProofPurpose::AssertionMethod,
        verification_method: issuer.did().key_id(),
        signature,
        issuer_public_key: issuer.public_key(),
    });

    tracing::info!(
        issuer = %credential.issuer,
        jti = %credential.jti,
        vc_type,
        "credential issued"
    );
    Ok(credential)
}

/// Validate `claims` against `template`, then issue under its type.
pub fn issue_with_template(
    issuer: &Identity,
    template: &CredentialTemplate,
    subject_did: &str,
    claims: Map<String, Value>,
    expiration_date: Option<Timestamp>,
) -> Result<Credential, IssueError> {
    template.validate(&claims)?;
    issue(
        issuer,
        IssueParams {
            subject_did,
            claims,
            credential_type: &template.vc_type,
            expiration_date,
        },
    )
}

/// Issue with the identity held by an unlocked session.
pub fn issue_in_session(session: &Session, params: IssueParams<'_>) -> Result<Credential, IssueError> {
    session.with_identity(|id| issue(id, params))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wp_crypto::Ed25519KeyPair;

    fn issuer() -> Identity {
        Identity::from_keypair(Ed25519KeyPair::from_seed(&[0x11; 32]))
    }

    fn claims(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn jti_shape() {
        let now = Timestamp::from_epoch_secs(1_700_000_000).unwrap();
        let jti = generate_jti(now);
        let suffix = jti.strip_prefix("vc-1700000000-").unwrap();
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn payload_field_order() {
        let now = Timestamp::parse("2026-03-01T10:00:00Z").unwrap();
        let vc = issue_at(
            &issuer(),
            IssueParams::new("did:key:zXYZ", "StudentCard", claims(json!({"name": "Ada"})))
                .expires(now.plus_secs(3600)),
            now,
        )
        .unwrap();
        let v = vc.to_value().unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "@context",
                "type",
                "issuer",
                "issuanceDate",
                "expirationDate",
                "credentialSubject",
                "jti",
                "proof"
            ]
        );
        let proof = v["proof"].as_object().unwrap();
        assert_eq!(proof["type"], "Ed25519Signature2020");
        assert_eq!(proof["proofPurpose"], "assertionMethod");
        assert_eq!(proof["created"], "2026-03-01T10:00:00Z");
        assert_eq!(
            proof["verificationMethod"],
            format!("{}#key-1", issuer().did())
        );
    }

    #[test]
    fn rejects_bad_inputs_before_signing() {
        let id = issuer();
        let empty = Map::new();
        assert_eq!(
            issue(&id, IssueParams::new("  ", "T", empty.clone())).unwrap_err(),
            IssueError::EmptySubject
        );
        assert!(matches!(
            issue(&id, IssueParams::new("alice", "T", empty.clone())).unwrap_err(),
            IssueError::InvalidSubjectDid(_)
        ));
        assert_eq!(
            issue(&id, IssueParams::new("did:key:zS", "", empty)).unwrap_err(),
            IssueError::EmptyType
        );
        assert_eq!(
            issue(
                &id,
                IssueParams::new("did:key:zS", "T", claims(json!({"id": "did:key:zOther"})))
            )
            .unwrap_err(),
            IssueError::ReservedClaim("id".into())
        );
    }

    #[test]
    fn template_errors_surface() {
        let t = CredentialTemplate::preset("studentCard").unwrap();
        let err = issue_with_template(&issuer(), &t, "did:key:zS", Map::new(), None).unwrap_err();
        assert_eq!(
            err,
            IssueError::Template(TemplateError::MissingRequired("name".into()))
        );
    }

    #[test]
    fn locked_session_has_no_key() {
        let s = Session::locked();
        let err = issue_in_session(&s, IssueParams::new("did:key:zS", "T", Map::new())).unwrap_err();
        assert_eq!(err, IssueError::MissingPrivateKey);

        let s = Session::unlocked(issuer());
        assert!(issue_in_session(&s, IssueParams::new("did:key:zS", "T", Map::new())).is_ok());
    }
}
