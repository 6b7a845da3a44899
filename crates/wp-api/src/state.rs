//! # Application State
//!
//! Configuration read from the environment, plus the two pieces of shared
//! state every handler works against: the challenge registry and the
//! revocation registry. Both use `parking_lot` locks that are never held
//! across an `.await`.

use std::sync::Arc;

use wp_presentation::{ChallengeRegistry, DEFAULT_CHALLENGE_TTL_SECS};
use wp_vc::{InMemoryRevocationRegistry, RevocationRegistry};

/// Default upper bound on a requested challenge lifetime.
pub const DEFAULT_CHALLENGE_TTL_MAX_SECS: i64 = 180;

/// Runtime configuration.
///
/// Custom `Debug` redacts the auth token.
#[derive(Clone)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Bearer token guarding `/api/issuer/*`. `None` disables auth.
    pub auth_token: Option<String>,
    /// Lifetime used when a challenge request names none.
    pub challenge_ttl_secs: i64,
    /// Requested lifetimes are clamped to `[1, challenge_ttl_max_secs]`; a
    /// ceiling below one second is treated as one.
    pub challenge_ttl_max_secs: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("challenge_ttl_secs", &self.challenge_ttl_secs)
            .field("challenge_ttl_max_secs", &self.challenge_ttl_max_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            challenge_ttl_secs: DEFAULT_CHALLENGE_TTL_SECS,
            challenge_ttl_max_secs: DEFAULT_CHALLENGE_TTL_MAX_SECS,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN`, `CHALLENGE_TTL_SECS`, and
    /// `CHALLENGE_TTL_MAX_SECS`. Unparseable values fall back to defaults
    /// with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let auth_token = lookup("AUTH_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let max = parse_or(&lookup, "CHALLENGE_TTL_MAX_SECS", defaults.challenge_ttl_max_secs)
            .max(1);
        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            auth_token,
            challenge_ttl_secs: parse_or(&lookup, "CHALLENGE_TTL_SECS", defaults.challenge_ttl_secs)
                .clamp(1, max),
            challenge_ttl_max_secs: max,
        }
    }

    /// Lifetime for a challenge given the caller's request.
    pub fn challenge_ttl(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.challenge_ttl_secs)
            .min(self.challenge_ttl_max_secs)
            .max(1)
    }
}

fn parse_or<T: std::str::FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "unparseable setting, using default");
            default
        }),
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub challenges: Arc<ChallengeRegistry>,
    pub revocations: Arc<dyn RevocationRegistry>,
}

impl AppState {
    /// State with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// State with the given configuration and empty registries.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            challenges: Arc::new(ChallengeRegistry::new()),
            revocations: Arc::new(InMemoryRevocationRegistry::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let c = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(c.port, 8080);
        assert!(c.auth_token.is_none());
        assert_eq!(c.challenge_ttl_secs, 120);
        assert_eq!(c.challenge_ttl_max_secs, 180);
    }

    #[test]
    fn overrides_and_bad_values() {
        let c = AppConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("AUTH_TOKEN", " s3cret "),
            ("CHALLENGE_TTL_SECS", "abc"),
            ("CHALLENGE_TTL_MAX_SECS", "60"),
        ]));
        assert_eq!(c.port, 9000);
        assert_eq!(c.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(c.challenge_ttl_secs, 60);
        assert_eq!(c.challenge_ttl_max_secs, 60);
    }

    #[test]
    fn ttl_is_clamped() {
        let c = AppConfig::default();
        assert_eq!(c.challenge_ttl(None), 120);
        assert_eq!(c.challenge_ttl(Some(600)), 180);
        assert_eq!(c.challenge_ttl(Some(30)), 30);
    }

    #[test]
    fn ttl_with_non_positive_ceiling_is_one_second() {
        let c = AppConfig {
            challenge_ttl_max_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(c.challenge_ttl(None), 1);
        assert_eq!(c.challenge_ttl(Some(60)), 1);
        assert_eq!(c.challenge_ttl(Some(-5)), 1);
    }

    #[test]
    fn debug_redacts_token() {
        let c = AppConfig {
            auth_token: Some("s3cret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("REDACTED"));
    }
}
