//! # Credential Subcommands
//!
//! `wp issue` signs a credential with an unlocked keystore; `wp verify`
//! checks one offline. There is no shared revocation ledger on the command
//! line, so revoked ids are supplied with `--revoked`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use wp_core::Timestamp;
use wp_keystore::Identity;
use wp_vc::{issue, issue_with_template, verify_value, CredentialTemplate, IssueParams, VerificationResult};

use crate::{open_session, read_json, write_json, PasswordArgs};

/// Arguments for `wp issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Issuer keystore.
    #[arg(long, short, default_value = "identity.wpkeystore")]
    pub keystore: PathBuf,
    #[command(flatten)]
    pub password: PasswordArgs,
    /// Subject DID.
    #[arg(long)]
    pub subject: String,
    /// Preset template key (`studentCard`, `employmentAttestation`,
    /// `kycBasic`). Claims are validated against it.
    #[arg(long, conflicts_with = "vc_type")]
    pub template: Option<String>,
    /// Credential type for template-less issuance.
    #[arg(long = "type", value_name = "TYPE")]
    pub vc_type: Option<String>,
    /// Claim as `key=value` (string) or `key:=json`. Repeatable.
    #[arg(long = "claim", value_name = "CLAIM")]
    pub claims: Vec<String>,
    /// JSON object of claims, applied before `--claim`.
    #[arg(long)]
    pub claims_file: Option<PathBuf>,
    /// Expiration as RFC 3339.
    #[arg(long)]
    pub expires: Option<String>,
    /// Output file. Defaults to stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Arguments for `wp verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential file (`.wpvc` or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Credential ids to treat as revoked. Repeatable.
    #[arg(long, value_name = "JTI")]
    pub revoked: Vec<String>,
}

/// Execute `wp issue`.
pub fn run_issue(args: &IssueArgs) -> Result<u8> {
    let mut claims = match &args.claims_file {
        Some(path) => match read_json(path)? {
            Value::Object(map) => map,
            _ => bail!("claims file must hold a JSON object: {}", path.display()),
        },
        None => Map::new(),
    };
    for raw in &args.claims {
        let (key, value) = parse_claim(raw)?;
        claims.insert(key, value);
    }
    let expires = args
        .expires
        .as_deref()
        .map(Timestamp::parse_lenient)
        .transpose()
        .context("invalid --expires")?;

    let password = args.password.read("Keystore password")?;
    let session = open_session(&args.keystore, &password)?;
    let vc = session.with_identity(|issuer| {
        issue_credential(
            issuer,
            &args.subject,
            args.template.as_deref(),
            args.vc_type.as_deref(),
            claims,
            expires,
        )
    })??;
    write_json(args.out.as_deref(), &vc)?;
    if let Some(out) = &args.out {
        eprintln!("OK: issued {} to {}", vc["jti"], out.display());
    }
    Ok(0)
}

/// Issue and render as JSON.
pub fn issue_credential(
    issuer: &Identity,
    subject: &str,
    template: Option<&str>,
    vc_type: Option<&str>,
    claims: Map<String, Value>,
    expires: Option<Timestamp>,
) -> Result<Value> {
    let credential = match (template, vc_type) {
        (Some(key), _) => {
            let template = CredentialTemplate::preset(key)
                .with_context(|| format!("unknown template: {key}"))?;
            issue_with_template(issuer, &template, subject, claims, expires)?
        }
        (None, Some(vc_type)) => {
            let mut params = IssueParams::new(subject, vc_type, claims);
            if let Some(at) = expires {
                params = params.expires(at);
            }
            issue(issuer, params)?
        }
        (None, None) => bail!("either --template or --type is required"),
    };
    Ok(credential.to_value()?)
}

/// `key=value` is a string claim; `key:=value` parses `value` as JSON.
pub fn parse_claim(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("claim must be key=value or key:=json: {raw}");
    };
    let (key, value) = match key.strip_suffix(':') {
        Some(key) => (
            key,
            serde_json::from_str(value).with_context(|| format!("invalid JSON for claim {key}"))?,
        ),
        None => (key, Value::String(value.to_string())),
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("claim name must not be empty: {raw}");
    }
    Ok((key.to_string(), value))
}

/// Execute `wp verify`.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let result = verify_file(&args.file, &args.revoked)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(report(&result))
}

/// Verify a credential file against a fixed set of revoked ids.
pub fn verify_file(path: &Path, revoked: &[String]) -> Result<VerificationResult> {
    let vc = read_json(path)?;
    let lookup = |_: &str, jti: &str| revoked.iter().any(|r| r == jti);
    Ok(verify_value(&vc, &lookup))
}

/// Print the verdict line and map it to an exit code.
pub(crate) fn report(result: &VerificationResult) -> u8 {
    if result.is_trusted() {
        println!("OK: {}", result.reason);
        0
    } else if result.valid {
        println!("FAIL: credential is revoked");
        1
    } else {
        println!("FAIL: {}", result.reason);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wp_crypto::Ed25519KeyPair;
    use wp_vc::Reason;

    fn issuer() -> Identity {
        Identity::from_keypair(Ed25519KeyPair::from_seed(&[0x21; 32]))
    }

    #[test]
    fn claim_parsing() {
        assert_eq!(parse_claim("name=Ada").unwrap(), ("name".into(), json!("Ada")));
        assert_eq!(parse_claim("no=00123").unwrap(), ("no".into(), json!("00123")));
        assert_eq!(parse_claim("age:=42").unwrap(), ("age".into(), json!(42)));
        assert_eq!(parse_claim("note=a=b").unwrap(), ("note".into(), json!("a=b")));
        assert!(parse_claim("novalue").is_err());
        assert!(parse_claim("=x").is_err());
        assert!(parse_claim("bad:={").is_err());
    }

    #[test]
    fn template_issuance_validates_claims() {
        let subject = "did:key:z6MkSubject";
        let mut claims = Map::new();
        claims.insert("dept".into(), json!("CS"));
        let err = issue_credential(&issuer(), subject, Some("studentCard"), None, claims.clone(), None)
            .unwrap_err();
        assert!(err.to_string().contains("name"));

        claims.insert("name".into(), json!("Ada"));
        let vc = issue_credential(&issuer(), subject, Some("studentCard"), None, claims, None).unwrap();
        assert_eq!(vc["type"], json!(["VerifiableCredential", "StudentCard"]));

        assert!(issue_credential(&issuer(), subject, Some("nope"), None, Map::new(), None).is_err());
        assert!(issue_credential(&issuer(), subject, None, None, Map::new(), None).is_err());
    }

    #[test]
    fn verify_file_with_revocation_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ada.wpvc");
        let mut claims = Map::new();
        claims.insert("name".into(), json!("Ada"));
        let vc = issue_credential(&issuer(), "did:key:z6MkSubject", None, Some("Badge"), claims, None)
            .unwrap();
        write_json(Some(&path), &vc).unwrap();

        let r = verify_file(&path, &[]).unwrap();
        assert!(r.is_trusted());
        assert_eq!(report(&r), 0);

        let jti = vc["jti"].as_str().unwrap().to_string();
        let r = verify_file(&path, &[jti]).unwrap();
        assert!(r.valid && r.revoked);
        assert_eq!(report(&r), 1);

        let mut tampered = vc.clone();
        tampered["credentialSubject"]["name"] = json!("Eve");
        write_json(Some(&path), &tampered).unwrap();
        let r = verify_file(&path, &[]).unwrap();
        assert_eq!(r.reason, Reason::BadSignature);
    }
}
