//! # wp CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wp_cli::credential::{run_issue, run_verify, IssueArgs, VerifyArgs};
use wp_cli::keystore::{run_keygen, run_passwd, run_whoami, KeygenArgs, PasswdArgs, WhoamiArgs};
use wp_cli::presentation::{
    run_accept, run_challenge, run_present, AcceptArgs, ChallengeArgs, PresentArgs,
};

/// WorldPass credential tool
///
/// Manages an encrypted identity keystore, issues and verifies
/// credentials, and runs the challenge/presentation exchange from files.
#[derive(Parser, Debug)]
#[command(name = "wp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new identity into an encrypted keystore.
    Keygen(KeygenArgs),

    /// Unlock a keystore and print its DID.
    Whoami(WhoamiArgs),

    /// Change a keystore password.
    Passwd(PasswdArgs),

    /// Issue a signed credential.
    Issue(IssueArgs),

    /// Verify a credential file.
    Verify(VerifyArgs),

    /// Create a presentation challenge request.
    Challenge(ChallengeArgs),

    /// Answer a challenge request as a holder.
    Present(PresentArgs),

    /// Accept a presentation against a challenge file.
    Accept(AcceptArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args),
        Commands::Whoami(args) => run_whoami(args),
        Commands::Passwd(args) => run_passwd(args),
        Commands::Issue(args) => run_issue(args),
        Commands::Verify(args) => run_verify(args),
        Commands::Challenge(args) => run_challenge(args),
        Commands::Present(args) => run_present(args),
        Commands::Accept(args) => run_accept(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
