//! Authentication domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account role. Admins bypass dataset permissions entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Annotator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Annotator => "annotator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known role.
#[derive(Debug, Error)]
#[error("invalid role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "annotator" => Ok(Role::Annotator),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Domain user. The password hash never leaves `UserWithPassword`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// User together with the datasets they were granted (admin listing).
#[derive(Debug, Clone, Serialize)]
pub struct UserWithDatasets {
    #[serde(flatten)]
    pub user: User,
    pub dataset_ids: Vec<i64>,
}

/// A freshly minted access/refresh token pair.
///
/// The two values are the credentials themselves; they are handed to the
/// transport layer once and only their digests are stored.
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_token", &"<redacted>")
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("annotator".parse::<Role>().unwrap(), Role::Annotator);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn token_pair_debug_hides_values() {
        let pair = TokenPair {
            access_token: "secret-access".into(),
            access_expires_at: Utc::now(),
            refresh_token: "secret-refresh".into(),
            refresh_expires_at: Utc::now(),
        };
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("<redacted>"));
    }
}
