//! # wp-presentation: Challenge/Presentation Protocol
//!
//! Live proof of possession between a verifier and a holder:
//!
//! 1. The verifier issues a [`Challenge`] from its [`ChallengeRegistry`]
//!    and shows the [`ChallengeRequest`] as a QR payload.
//! 2. The holder answers with [`build_presentation`], optionally signing a
//!    [`HolderBinding`] and attaching a credential.
//! 3. The verifier calls [`accept_presentation`], which consumes the nonce
//!    and delegates credential checks to [`wp_vc::verify_value`].
//!
//! ## Security Invariant
//!
//! A nonce is consumed at most once. The check-expiry-and-remove step runs
//! under a single lock; the first presentation to reach it wins and every
//! later one sees `unknown_or_used_challenge`.

pub mod accept;
pub mod challenge;
pub mod error;
pub mod presentation;

pub use accept::{accept_presentation, accept_presentation_at};
pub use challenge::{
    Challenge, ChallengeRegistry, ChallengeRequest, DEFAULT_CHALLENGE_TTL_SECS, NONCE_BYTES,
    PRESENT_TYPE,
};
pub use error::PresentationError;
pub use presentation::{
    binding_message, build_presentation, build_presentation_in_session, HolderBinding,
    Presentation, HOLDER_ALG,
};
