//! # Credential Status
//!
//! Routes:
//! - GET /api/status/{jti}: Public revocation status lookup

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use wp_vc::CredentialStatus;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub vc_id: String,
    pub status: CredentialStatus,
}

/// Build the status router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/status/{jti}", get(get_status))
}

/// GET /api/status/{jti}. Unregistered ids answer `unknown`, not 404.
async fn get_status(State(state): State<AppState>, Path(jti): Path<String>) -> Json<StatusResponse> {
    let status = state.revocations.status(&jti);
    Json(StatusResponse { vc_id: jti, status })
}
