//! # wp-api: Verifier and Issuer HTTP Service
//!
//! Axum service exposing the WorldPass verifier side (challenges and
//! presentation acceptance) and a minimal issuer ledger (registration,
//! revocation, status).
//!
//! ## Routes
//!
//! - `GET  /api/health` (unauthenticated)
//! - `POST /api/challenge/new`
//! - `POST /api/present/verify`, `POST /api/vc/verify`
//! - `GET  /api/status/{jti}`
//! - `/api/issuer/*` (bearer token when `AUTH_TOKEN` is set)
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; they delegate to `wp-vc` and
//!   `wp-presentation`.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::{AppConfig, AppState};

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

/// Request bodies larger than this are rejected before parsing.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let issuer = routes::issuer::router()
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    Router::new()
        .route("/api/health", get(health))
        .merge(routes::challenge::router())
        .merge(routes::verify::router())
        .merge(routes::status::router())
        .merge(issuer)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
