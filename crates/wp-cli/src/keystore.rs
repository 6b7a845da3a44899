//! # Keystore Subcommands
//!
//! `wp keygen`, `wp whoami`, and `wp passwd`: create, inspect, and re-key
//! an encrypted `.wpkeystore` identity file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use wp_crypto::SoftwareCryptoProvider;
use wp_keystore::{change_password, encrypt_keystore, Identity};

use crate::{open_session, read_keystore, read_password, write_keystore, PasswordArgs};

/// Arguments for `wp keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the keystore.
    #[arg(long, short, default_value = "identity.wpkeystore")]
    pub out: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
    #[command(flatten)]
    pub password: PasswordArgs,
}

/// Arguments for `wp whoami`.
#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Keystore to unlock.
    #[arg(long, short, default_value = "identity.wpkeystore")]
    pub keystore: PathBuf,
    #[command(flatten)]
    pub password: PasswordArgs,
}

/// Arguments for `wp passwd`.
#[derive(Args, Debug)]
pub struct PasswdArgs {
    /// Keystore to re-encrypt in place.
    #[arg(long, short, default_value = "identity.wpkeystore")]
    pub keystore: PathBuf,
    #[command(flatten)]
    pub password: PasswordArgs,
    /// Read the new password from this environment variable.
    #[arg(long, value_name = "VAR")]
    pub new_password_env: Option<String>,
}

/// Execute `wp keygen`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let password = args.password.read("New keystore password")?;
    let identity = keygen(&args.out, &password, args.force)?;
    println!("OK: generated identity");
    println!("  DID:      {}", identity.did());
    println!("  Keystore: {}", args.out.display());
    Ok(0)
}

/// Generate a fresh identity and write it encrypted to `out`.
pub fn keygen(out: &Path, password: &str, force: bool) -> Result<Identity> {
    let identity = Identity::generate(&SoftwareCryptoProvider)?;
    let blob = encrypt_keystore(password, &identity)?;
    write_keystore(out, &blob, force)?;
    tracing::info!(did = %identity.did(), path = %out.display(), "keystore written");
    Ok(identity)
}

/// Execute `wp whoami`.
pub fn run_whoami(args: &WhoamiArgs) -> Result<u8> {
    let password = args.password.read("Keystore password")?;
    let session = open_session(&args.keystore, &password)?;
    session.with_identity(|identity| {
        println!("{}", identity.did());
        println!("  Public key: {}", identity.public_key().to_b64u());
    })?;
    Ok(0)
}

/// Execute `wp passwd`.
pub fn run_passwd(args: &PasswdArgs) -> Result<u8> {
    let old = args.password.read("Current password")?;
    let new = read_password(args.new_password_env.as_deref(), "New password")?;
    passwd(&args.keystore, &old, &new)?;
    println!("OK: password changed for {}", args.keystore.display());
    Ok(0)
}

/// Re-encrypt the keystore at `path` under `new`. The file is only replaced
/// once the old password has been verified.
pub fn passwd(path: &Path, old: &str, new: &str) -> Result<()> {
    let blob = read_keystore(path)?;
    let rekeyed = change_password(old, new, &blob)?;
    write_keystore(path, &rekeyed, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_then_passwd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.wpkeystore");

        let id = keygen(&path, "first", false).unwrap();
        assert!(id.did().as_str().starts_with("did:key:z"));
        assert!(keygen(&path, "first", false).is_err());

        assert!(passwd(&path, "wrong", "second").is_err());
        passwd(&path, "first", "second").unwrap();

        assert!(open_session(&path, "first").is_err());
        let back = open_session(&path, "second").unwrap();
        assert_eq!(back.did(), Some(id.did()));
    }
}
