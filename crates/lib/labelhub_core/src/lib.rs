//! # labelhub_core
//!
//! Core domain logic for Labelhub: session tokens, the sample allocator,
//! dataset permissions, and the SQLite persistence they share.

pub mod auth;
pub mod datasets;
pub mod db;
pub mod migrate;
pub mod models;
pub mod samples;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
