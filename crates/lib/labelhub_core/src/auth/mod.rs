//! Authentication logic.
//!
//! Provides password hashing, user queries, and the session-token
//! authenticator shared by the API and the CLI.

pub mod password;
pub mod queries;
pub mod tokens;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::models::auth::{Role, User};

pub use tokens::{TokenAuthenticator, TokenLifetimes};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Authentication errors.
///
/// `InvalidToken` and `TokenExpired` are kept apart for logging but both mean
/// "unauthorized" to a client. Messages never carry token values.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Record not found")]
    RecordNotFound,

    #[error("Invalid credentials")]
    CredentialError,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Check an email + password pair, returning the matching user.
///
/// Unknown emails and wrong passwords produce the same `CredentialError`.
pub async fn login(pool: &SqlitePool, email: &str, password: &str) -> Result<User, AuthError> {
    let Some(record) = queries::find_user_by_email(pool, email).await? else {
        return Err(AuthError::CredentialError);
    };

    if !password::verify_password(password, &record.password_hash)? {
        return Err(AuthError::CredentialError);
    }

    Ok(record.user)
}

/// Create an annotator account.
pub async fn register(pool: &SqlitePool, email: &str, password: &str) -> Result<User, AuthError> {
    create_account(pool, email, password, Role::Annotator).await
}

/// Create an account with the given role after validating its credentials.
pub async fn create_account(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    role: Role,
) -> Result<User, AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::ValidationError("A valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    // Fast path; `create_user` still maps a lost insert race to the same error.
    if queries::email_exists(pool, email).await? {
        return Err(AuthError::ValidationError(queries::EMAIL_TAKEN.into()));
    }

    let hash = password::hash_password(password)?;
    let user = queries::create_user(pool, email, &hash, role).await?;
    info!(user_id = user.id, role = %role, "account created");
    Ok(user)
}
