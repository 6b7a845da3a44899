//! # Challenge Issuance
//!
//! Routes:
//! - POST /api/challenge/new: Mint a single-use presentation challenge

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use wp_presentation::ChallengeRequest;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Accepted range for a caller-supplied lifetime, before config clamping.
const EXP_SECS_RANGE: std::ops::RangeInclusive<i64> = 30..=600;

/// Challenge request.
#[derive(Debug, Deserialize)]
pub struct NewChallengeRequest {
    /// Verifier audience the challenge is bound to.
    pub audience: String,
    /// Requested lifetime in seconds.
    #[serde(default)]
    pub exp_secs: Option<i64>,
}

impl Validate for NewChallengeRequest {
    fn validate(&self) -> Result<(), String> {
        if self.audience.trim().is_empty() {
            return Err("audience must not be empty".to_string());
        }
        if let Some(secs) = self.exp_secs {
            if !EXP_SECS_RANGE.contains(&secs) {
                return Err(format!(
                    "exp_secs must be between {} and {}",
                    EXP_SECS_RANGE.start(),
                    EXP_SECS_RANGE.end()
                ));
            }
        }
        Ok(())
    }
}

/// Challenge response. `challenge` and `nonce` carry the same value.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewChallengeResponse {
    pub challenge: String,
    pub nonce: String,
    pub expires_at: i64,
    /// Payload for the holder, suitable for a QR code.
    pub request: ChallengeRequest,
}

/// Build the challenge router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/challenge/new", post(new_challenge))
}

/// POST /api/challenge/new
async fn new_challenge(
    State(state): State<AppState>,
    body: Result<Json<NewChallengeRequest>, JsonRejection>,
) -> Result<Json<NewChallengeResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let ttl = state.config.challenge_ttl(req.exp_secs);
    let challenge = state.challenges.new_challenge(req.audience.trim(), ttl)?;

    Ok(Json(NewChallengeResponse {
        request: challenge.to_request(),
        challenge: challenge.nonce.clone(),
        nonce: challenge.nonce,
        expires_at: challenge.expires_at,
    }))
}
