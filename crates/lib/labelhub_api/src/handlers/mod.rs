//! Request handlers.

pub mod admin;
pub mod auth;
pub mod datasets;
pub mod samples;
pub mod user;
