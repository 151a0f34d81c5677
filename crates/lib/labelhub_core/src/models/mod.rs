//! Domain models shared across crates.
//!
//! These are internal domain models, distinct from the API's request and
//! response bodies.

pub mod auth;
pub mod dataset;
pub mod sample;
