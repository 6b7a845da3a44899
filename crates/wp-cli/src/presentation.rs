//! # Challenge and Presentation Subcommands
//!
//! `wp challenge` mints a challenge request file, `wp present` answers it
//! as a holder, and `wp accept` plays the verifier. The verifier's
//! challenge registry lives only for one `wp accept` run, so single use is
//! enforced per process; the HTTP service keeps it for its lifetime.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use wp_core::Timestamp;
use wp_keystore::Identity;
use wp_presentation::{
    accept_presentation, build_presentation, Challenge, ChallengeRegistry, ChallengeRequest,
    DEFAULT_CHALLENGE_TTL_SECS,
};
use wp_vc::VerificationResult;

use crate::credential::report;
use crate::{open_session, read_json, write_json, PasswordArgs};

/// Arguments for `wp challenge`.
#[derive(Args, Debug)]
pub struct ChallengeArgs {
    /// Verifier audience.
    #[arg(long)]
    pub audience: String,
    /// Lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_CHALLENGE_TTL_SECS)]
    pub ttl: i64,
    /// Output file. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Arguments for `wp present`.
#[derive(Args, Debug)]
pub struct PresentArgs {
    /// Challenge request file produced by `wp challenge`.
    #[arg(long)]
    pub request: PathBuf,
    /// Credential to present.
    #[arg(long)]
    pub vc: Option<PathBuf>,
    /// Holder keystore. Without it the presentation carries no holder
    /// binding.
    #[arg(long, short)]
    pub keystore: Option<PathBuf>,
    #[command(flatten)]
    pub password: PasswordArgs,
    /// Output file. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Arguments for `wp accept`.
#[derive(Args, Debug)]
pub struct AcceptArgs {
    /// Challenge request file the presentation answers.
    #[arg(long)]
    pub challenge: PathBuf,
    /// Presentation file.
    #[arg(value_name = "FILE")]
    pub presentation: PathBuf,
    /// Credential ids to treat as revoked. Repeatable.
    #[arg(long, value_name = "JTI")]
    pub revoked: Vec<String>,
}

/// Execute `wp challenge`.
pub fn run_challenge(args: &ChallengeArgs) -> Result<u8> {
    let request = new_challenge_request(&args.audience, args.ttl)?;
    write_json(args.out.as_deref(), &serde_json::to_value(&request)?)?;
    if let Some(out) = &args.out {
        eprintln!("OK: challenge written to {}", out.display());
    }
    Ok(0)
}

/// Mint a challenge and return its holder-facing request.
pub fn new_challenge_request(audience: &str, ttl: i64) -> Result<ChallengeRequest> {
    let challenge = ChallengeRegistry::new().new_challenge(audience, ttl)?;
    Ok(challenge.to_request())
}

/// Execute `wp present`.
pub fn run_present(args: &PresentArgs) -> Result<u8> {
    let vc = args.vc.as_deref().map(read_json).transpose()?;
    let presentation = match &args.keystore {
        Some(path) => {
            let password = args.password.read("Keystore password")?;
            let session = open_session(path, &password)?;
            session.with_identity(|holder| present(&args.request, Some(holder), vc))??
        }
        None => present(&args.request, None, vc)?,
    };
    write_json(args.out.as_deref(), &presentation)?;
    Ok(0)
}

/// Answer the request in `request_path`.
pub fn present(request_path: &Path, holder: Option<&Identity>, vc: Option<Value>) -> Result<Value> {
    let request = ChallengeRequest::from_value(&read_json(request_path)?)
        .with_context(|| format!("invalid challenge request: {}", request_path.display()))?;
    if request.is_expired_at(Timestamp::now()) {
        bail!("challenge request has expired");
    }
    if holder.is_none() && vc.is_none() {
        bail!("nothing to present: pass --vc, --keystore, or both");
    }
    Ok(build_presentation(&request, holder, vc).to_value()?)
}

/// Execute `wp accept`.
pub fn run_accept(args: &AcceptArgs) -> Result<u8> {
    let result = accept(&args.challenge, &args.presentation, &args.revoked)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(report(&result))
}

/// Accept the presentation in `presentation_path` against the challenge
/// in `challenge_path`.
pub fn accept(
    challenge_path: &Path,
    presentation_path: &Path,
    revoked: &[String],
) -> Result<VerificationResult> {
    let request = ChallengeRequest::from_value(&read_json(challenge_path)?)
        .with_context(|| format!("invalid challenge file: {}", challenge_path.display()))?;
    let (Some(audience), Some(expires_at)) = (request.aud, request.exp) else {
        bail!("challenge file must carry aud and exp");
    };

    let registry = ChallengeRegistry::new();
    registry.restore(Challenge {
        nonce: request.challenge,
        audience,
        expires_at,
    });

    let payload = read_json(presentation_path)?;
    let lookup = |_: &str, jti: &str| revoked.iter().any(|r| r == jti);
    Ok(accept_presentation(&registry, &payload, &lookup))
}
