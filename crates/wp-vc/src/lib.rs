//! # wp-vc: Verifiable Credentials
//!
//! Issuance and verification of W3C-shaped Verifiable Credentials signed
//! with Ed25519, plus the revocation registry contract the verifier reads.
//!
//! - [`credential`]: the [`Credential`] / [`Proof`] model and the signing
//!   message `b64u(header) "." b64u(payload)`.
//! - [`issuer`]: [`issue`] and [`issue_with_template`].
//! - [`verifier`]: [`verify_value`], returning a [`VerificationResult`]
//!   whose `valid` and `revoked` flags are independent.
//! - [`template`]: claim schemas and the built-in presets.
//! - [`revocation`]: [`RevocationRegistry`] and its in-memory
//!   implementation.
//!
//! ## Security Invariant
//!
//! The signed bytes are the credential JSON without `proof`, serialized
//! compactly in document order. Verification recomputes them from the JSON
//! as received, so a credential round-tripped through any tool that
//! preserves key order still verifies, and any edit to a signed field
//! does not.
//!
//! ## Crate Policy
//!
//! Verification never returns `Err`. "Invalid" is an outcome, carried in
//! [`Reason`].

pub mod credential;
pub mod issuer;
pub mod revocation;
pub mod template;
pub mod verifier;

pub use credential::{
    signing_message_for, Credential, CredentialSubject, Proof, ProofPurpose, ProofType,
    CREDENTIAL_EXTENSION, VC_BASE_TYPE, VC_CONTEXT_V1,
};
pub use issuer::{
    generate_jti, issue, issue_at, issue_in_session, issue_with_template, IssueError, IssueParams,
};
pub use revocation::{
    CredentialRecord, CredentialStatus, InMemoryRevocationRegistry, RevocationError,
    RevocationLookup, RevocationRegistry,
};
pub use template::{CredentialTemplate, FieldType, TemplateError, TemplateField};
pub use verifier::{verify, verify_at, verify_value, verify_value_at, Reason, VerificationResult};
