//! # Request Bodies
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_json`] so every body failure comes back in the
//! `{"error": {"code", "message"}}` shape instead of axum's plain text.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business-rule checks beyond what serde enforces.
pub trait Validate {
    /// Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body.
///
/// Every rejection is `BAD_REQUEST`; only [`Validate`] failures are
/// `VALIDATION_ERROR`.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result.map(|Json(v)| v).map_err(|rejection| {
        tracing::debug!(%rejection, "request body rejected");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("expected Content-Type: application/json".to_string())
            }
            JsonRejection::JsonSyntaxError(e) => {
                AppError::BadRequest(format!("malformed JSON body: {}", e.body_text()))
            }
            JsonRejection::JsonDataError(e) => {
                AppError::BadRequest(format!("invalid request body: {}", e.body_text()))
            }
            other => AppError::BadRequest(other.body_text()),
        }
    })
}

/// [`extract_json`] followed by [`Validate::validate`].
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
