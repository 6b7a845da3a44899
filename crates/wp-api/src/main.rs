//! # wp-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment
//! (`PORT`, `AUTH_TOKEN`, `CHALLENGE_TTL_SECS`, `CHALLENGE_TTL_MAX_SECS`);
//! `LOG_FORMAT=json` switches to JSON log lines.

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use wp_api::{AppConfig, AppState};
use wp_core::Timestamp;

/// How often unconsumed expired challenges are swept.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env();
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; issuer routes are unauthenticated");
    }
    tracing::info!(?config, "configuration loaded");

    let port = config.port;
    let state = AppState::with_config(config);

    let challenges = state.challenges.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            challenges.purge_expired(Timestamp::now());
        }
    });

    let app = wp_api::app(state);
    let addr = format!("0.0.0.0:{port}");
    tracing::info!("WorldPass API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
