//! # Revocation Registry
//!
//! The contract the verifier needs from whoever owns the credential ledger:
//! a synchronous `(issuer, jti) -> revoked` lookup and a one-way `revoke`.
//! Issued credentials are also `register`ed so the ledger can list them and
//! reject a reused `jti`.
//!
//! [`InMemoryRevocationRegistry`] is the single authoritative
//! implementation, guarded by a `parking_lot::RwLock`.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use wp_core::Timestamp;

/// Registry failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevocationError {
    /// The `jti` is already registered for this issuer with a different
    /// subject.
    #[error("credential {jti} already registered for issuer {issuer}")]
    DuplicateJti {
        /// Issuer DID.
        issuer: String,
        /// Credential id.
        jti: String,
    },

    /// No registered credential has this id.
    #[error("unknown credential: {0}")]
    UnknownCredential(String),
}

/// Revocation status of a credential id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Registered and not revoked.
    Valid,
    /// Revoked.
    Revoked,
    /// Never registered nor revoked.
    Unknown,
}

/// A registered credential as listed to its issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialRecord {
    /// Issuer DID.
    pub issuer: String,
    /// Credential id.
    pub jti: String,
    /// Subject DID.
    pub subject: String,
    /// Registration time.
    pub registered_at: Timestamp,
    /// Whether the credential has been revoked.
    pub revoked: bool,
}

/// Read side of the registry; all the verifier needs.
pub trait RevocationLookup {
    /// Whether `(issuer, jti)` has been revoked.
    fn is_revoked(&self, issuer: &str, jti: &str) -> bool;
}

impl<F> RevocationLookup for F
where
    F: Fn(&str, &str) -> bool,
{
    fn is_revoked(&self, issuer: &str, jti: &str) -> bool {
        self(issuer, jti)
    }
}

/// Full registry contract. Object-safe and shareable across handlers.
pub trait RevocationRegistry: RevocationLookup + Send + Sync {
    /// Mark `(issuer, jti)` revoked. One-way and idempotent; revoking an
    /// unregistered id still records the flag.
    fn revoke(&self, issuer: &str, jti: &str);

    /// Record an issued credential. Re-registering the same
    /// `(issuer, jti, subject)` is a no-op.
    fn register(&self, issuer: &str, jti: &str, subject: &str) -> Result<(), RevocationError>;

    /// Status of a credential id. A registered id is judged by its own
    /// records; an unregistered one by any recorded revocation.
    fn status(&self, jti: &str) -> CredentialStatus;

    /// Issuer of a registered credential id.
    fn issuer_of(&self, jti: &str) -> Option<String>;

    /// Registered credentials, optionally for one issuer, oldest first.
    fn list(&self, issuer: Option<&str>) -> Vec<CredentialRecord>;

    /// Revoke by id alone, resolving the issuer from the registered record.
    fn revoke_by_id(&self, jti: &str) -> Result<String, RevocationError> {
        let issuer = self
            .issuer_of(jti)
            .ok_or_else(|| RevocationError::UnknownCredential(jti.to_string()))?;
        self.revoke(&issuer, jti);
        Ok(issuer)
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    records: HashMap<(String, String), CredentialRecord>,
    revoked: HashSet<(String, String)>,
}

/// In-process registry.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryRevocationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(issuer: &str, jti: &str) -> (String, String) {
    (issuer.to_string(), jti.to_string())
}

impl RevocationLookup for InMemoryRevocationRegistry {
    fn is_revoked(&self, issuer: &str, jti: &str) -> bool {
        self.state.read().revoked.contains(&key(issuer, jti))
    }
}

impl RevocationRegistry for InMemoryRevocationRegistry {
    fn revoke(&self, issuer: &str, jti: &str) {
        let mut state = self.state.write();
        let k = key(issuer, jti);
        if let Some(record) = state.records.get_mut(&k) {
            record.revoked = true;
        }
        if state.revoked.insert(k) {
            tracing::info!(%issuer, %jti, "credential revoked");
        }
    }

    fn register(&self, issuer: &str, jti: &str, subject: &str) -> Result<(), RevocationError> {
        let mut state = self.state.write();
        let k = key(issuer, jti);
        if let Some(existing) = state.records.get(&k) {
            if existing.subject == subject {
                return Ok(());
            }
            return Err(RevocationError::DuplicateJti {
                issuer: issuer.to_string(),
                jti: jti.to_string(),
            });
        }
        let revoked = state.revoked.contains(&k);
        state.records.insert(
            k,
            CredentialRecord {
                issuer: issuer.to_string(),
                jti: jti.to_string(),
                subject: subject.to_string(),
                registered_at: Timestamp::now(),
                revoked,
            },
        );
        tracing::debug!(%issuer, %jti, "credential registered");
        Ok(())
    }

    fn status(&self, jti: &str) -> CredentialStatus {
        let state = self.state.read();
        let mut records = state.records.values().filter(|r| r.jti == jti).peekable();
        if records.peek().is_some() {
            // Registered: only a revocation by the registering issuer counts.
            if records.any(|r| r.revoked) {
                CredentialStatus::Revoked
            } else {
                CredentialStatus::Valid
            }
        } else if state.revoked.iter().any(|(_, j)| j == jti) {
            CredentialStatus::Revoked
        } else {
            CredentialStatus::Unknown
        }
    }

    fn issuer_of(&self, jti: &str) -> Option<String> {
        self.state
            .read()
            .records
            .keys()
            .find(|(_, j)| j == jti)
            .map(|(issuer, _)| issuer.clone())
    }

    fn list(&self, issuer: Option<&str>) -> Vec<CredentialRecord> {
        let state = self.state.read();
        let mut out: Vec<CredentialRecord> = state
            .records
            .values()
            .filter(|r| issuer.map_or(true, |i| r.issuer == i))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.jti.cmp(&b.jti))
        });
        out
    }
}
