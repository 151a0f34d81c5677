//! Services sitting between handlers and `labelhub_core`.

pub mod auth;
pub mod cookies;
