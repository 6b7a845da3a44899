//! # Presentation Verification
//!
//! Routes:
//! - POST /api/present/verify: Accept a holder presentation
//! - POST /api/vc/verify: Accept a bare `{vc, challenge}` envelope
//!
//! Both burn the referenced challenge and answer with a
//! `VerificationResult`. A rejected presentation is still a 200; the
//! verdict is in the body.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use wp_presentation::accept_presentation;
use wp_vc::VerificationResult;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the verification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/present/verify", post(verify_payload))
        .route("/api/vc/verify", post(verify_payload))
}

/// Any JSON value is accepted; structure is judged by the verifier so that
/// a well-formed body with missing fields reports `malformed` rather than
/// a transport error.
async fn verify_payload(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerificationResult>, AppError> {
    let payload = extract_json(body)?;
    Ok(Json(accept_presentation(
        state.challenges.as_ref(),
        &payload,
        state.revocations.as_ref(),
    )))
}
