//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area.
//! Routers are assembled into the application in `lib.rs`.

pub mod challenge;
pub mod issuer;
pub mod status;
pub mod verify;
