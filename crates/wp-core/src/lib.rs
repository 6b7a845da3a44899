//! # wp-core: Foundational Types for the WorldPass Credential Engine
//!
//! The leaf of the workspace DAG. Every other `wp-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A [`Did`] is validated once at
//!    construction; downstream code never re-parses bare strings.
//!
//! 2. **UTC-only, second-precision timestamps.** [`Timestamp`] renders as
//!    `YYYY-MM-DDTHH:MM:SSZ`, the exact form embedded in signed payloads.
//!
//! 3. **One base64url codec.** Keys, signatures, salts, and nonces cross
//!    the wire as unpadded base64url via [`encoding`]. Decoding tolerates
//!    trailing padding because older clients emitted it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod encoding;
pub mod error;
pub mod identity;
pub mod temporal;

pub use encoding::{b64u_decode, b64u_encode};
pub use error::CoreError;
pub use identity::Did;
pub use temporal::Timestamp;
