//! # wp-cli: WorldPass Command-Line Tool
//!
//! Provides the `wp` command-line interface over the credential engine.
//!
//! ## Subcommands
//!
//! - `wp keygen` / `wp whoami` / `wp passwd`: Encrypted keystore lifecycle.
//! - `wp issue` / `wp verify`: Credential issuance and verification.
//! - `wp challenge` / `wp present` / `wp accept`: The challenge and
//!   presentation exchange, run against local files.
//!
//! Handlers return `anyhow::Result<u8>` where the `u8` is the process exit
//! code: `0` for success, `1` for a negative verdict. Errors exit with `2`.
//!
//! ```bash
//! wp keygen --out me.wpkeystore --password-env WP_PASSWORD
//! wp issue --keystore me.wpkeystore --subject did:key:z6Mk... \
//!     --template studentCard --claim name=Ada --out ada.wpvc
//! wp verify ada.wpvc
//! ```

pub mod credential;
pub mod keystore;
pub mod presentation;

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use wp_crypto::Zeroizing;
use wp_keystore::{KeystoreBlob, KeystoreManager, Session};

/// Where to read a keystore password from.
#[derive(Args, Debug, Clone, Default)]
pub struct PasswordArgs {
    /// Read the password from this environment variable instead of
    /// prompting.
    #[arg(long, value_name = "VAR")]
    pub password_env: Option<String>,
}

impl PasswordArgs {
    /// Resolve the password, prompting on stdin if no variable was named.
    pub fn read(&self, prompt: &str) -> Result<Zeroizing<String>> {
        read_password(self.password_env.as_deref(), prompt)
    }
}

/// Read a password from `env_var`, or prompt for one line on stdin.
pub fn read_password(env_var: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    let password = match env_var {
        Some(var) => Zeroizing::new(
            std::env::var(var).with_context(|| format!("environment variable {var} is not set"))?,
        ),
        None => {
            eprint!("{prompt}: ");
            std::io::stderr().flush().ok();
            let mut line = Zeroizing::new(String::new());
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read password from stdin")?;
            Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string())
        }
    };
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

/// Read a `.wpkeystore` file and unlock it into a session.
pub fn open_session(path: &Path, password: &str) -> Result<Session> {
    let blob = read_keystore(path)?;
    let mut session = Session::locked();
    session
        .unlock(&KeystoreManager::new(), password, &blob)
        .with_context(|| format!("failed to unlock keystore: {}", path.display()))?;
    Ok(session)
}

/// Read a `.wpkeystore` file without decrypting it.
pub fn read_keystore(path: &Path) -> Result<KeystoreBlob> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read keystore: {}", path.display()))?;
    KeystoreBlob::from_json(&text)
        .with_context(|| format!("invalid keystore file: {}", path.display()))
}

/// Write a keystore, refusing to clobber an existing file unless `force`.
pub fn write_keystore(path: &Path, blob: &KeystoreBlob, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("refusing to overwrite existing file: {}", path.display());
    }
    let json = blob.to_json_pretty()?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write keystore: {}", path.display()))
}

/// Read a JSON document.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Write a JSON document, pretty-printed, to `path` or stdout.
pub fn write_json(path: Option<&Path>, value: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write file: {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
