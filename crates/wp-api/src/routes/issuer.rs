//! # Issuer Ledger
//!
//! Routes (bearer token required):
//! - POST /api/issuer/issue: Register a credential the issuer has signed
//! - POST /api/issuer/revoke: Revoke a registered credential
//! - GET  /api/issuer/credentials: List registered credentials
//!
//! Signing happens on the issuer's device; the service only sees finished
//! credentials and never holds a private key.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wp_vc::{verify_value, CredentialRecord};

use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    /// Signed credential as produced by the issuer.
    pub vc: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssueResponse {
    pub ok: bool,
    pub vc_id: String,
}

/// Revocation request.
#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub vc_id: String,
    /// Issuer DID. Resolved from the ledger when omitted.
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Validate for RevokeRequest {
    fn validate(&self) -> Result<(), String> {
        if self.vc_id.trim().is_empty() {
            return Err("vc_id must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevokeResponse {
    pub status: String,
    pub vc_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Build the issuer router. Authentication is applied by the caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/issuer/issue", post(register_credential))
        .route("/api/issuer/revoke", post(revoke_credential))
        .route("/api/issuer/credentials", get(list_credentials))
}

/// POST /api/issuer/issue
async fn register_credential(
    State(state): State<AppState>,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>, AppError> {
    let req = extract_json(body)?;
    let result = verify_value(&req.vc, state.revocations.as_ref());
    if !result.valid {
        return Err(AppError::Validation(format!(
            "credential rejected: {}",
            result.reason
        )));
    }
    // A valid result always carries both DIDs and the jti is a string.
    let (Some(issuer), Some(subject), Some(jti)) = (
        result.issuer,
        result.subject,
        req.vc.get("jti").and_then(Value::as_str),
    ) else {
        return Err(AppError::Internal(
            "verified credential is missing identifiers".to_string(),
        ));
    };

    state.revocations.register(&issuer, jti, &subject)?;
    tracing::info!(%issuer, %jti, "credential registered");
    Ok(Json(IssueResponse {
        ok: true,
        vc_id: jti.to_string(),
    }))
}

/// POST /api/issuer/revoke
async fn revoke_credential(
    State(state): State<AppState>,
    body: Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<Json<RevokeResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let vc_id = req.vc_id.trim();
    let issuer = match req.issuer.filter(|i| !i.trim().is_empty()) {
        Some(issuer) => {
            state.revocations.revoke(&issuer, vc_id);
            issuer
        }
        None => state.revocations.revoke_by_id(vc_id)?,
    };
    tracing::info!(%issuer, jti = %vc_id, "credential revoked");
    Ok(Json(RevokeResponse {
        status: "revoked".to_string(),
        vc_id: vc_id.to_string(),
    }))
}

/// GET /api/issuer/credentials?issuer=
async fn list_credentials(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<CredentialRecord>> {
    Json(state.revocations.list(query.issuer.as_deref()))
}
