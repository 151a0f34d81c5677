//! Session tokens: issuance, validation, rotation, and revocation.
//!
//! Tokens are opaque: 32 random bytes rendered as URL-safe base64. The value
//! itself is the credential (no signature), so the database stores only its
//! SHA-256 digest and every lookup is an exact match on that digest.
//!
//! Each access token owns exactly one refresh token. Deleting the access row
//! cascades to its refresh row, so a pair always dies together.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::AuthError;
use super::queries::{UserRow, parse_user_row};
use crate::models::auth::{TokenPair, User};

/// Access token lifetime: 60 minutes.
pub const ACCESS_TOKEN_LIFETIME_MINS: i64 = 60;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 7;

/// Random bytes per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Absolute lifetimes applied to newly issued pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(ACCESS_TOKEN_LIFETIME_MINS),
            refresh: Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
        }
    }
}

/// Issues and checks session token pairs against the token tables.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    pool: SqlitePool,
    lifetimes: TokenLifetimes,
}

impl TokenAuthenticator {
    /// Authenticator with the default 60 minute / 7 day lifetimes.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_lifetimes(pool, TokenLifetimes::default())
    }

    pub fn with_lifetimes(pool: SqlitePool, lifetimes: TokenLifetimes) -> Self {
        Self { pool, lifetimes }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Mint a new pair for `user`. Existing sessions of the user are kept.
    pub async fn issue_token_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let mut tx = self.pool.begin().await?;
        let pair = insert_token_pair(&mut tx, user.id, self.lifetimes, Utc::now()).await?;
        tx.commit().await?;

        debug!(user_id = user.id, "issued token pair");
        Ok(pair)
    }

    /// Resolve an access token to its owner.
    ///
    /// No sliding renewal: a valid token is returned without side effects.
    pub async fn validate_access_token(&self, access_token: &str) -> Result<User, AuthError> {
        let row = sqlx::query_as::<_, (i64, i64, String, String, DateTime<Utc>)>(
            "SELECT at.expires_at, u.id, u.email, u.role, u.created_at \
             FROM access_tokens at \
             JOIN users u ON u.id = at.user_id \
             WHERE at.token_hash = ?",
        )
        .bind(hash_token(access_token))
        .fetch_optional(&self.pool)
        .await?;

        let Some((expires_at, id, email, role, created_at)) = row else {
            return Err(AuthError::InvalidToken);
        };

        if is_expired(expires_at, Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        let user: UserRow = (id, email, role, created_at);
        Ok(parse_user_row(user)?)
    }

    /// Exchange a refresh token for a brand-new pair, deleting the old pair.
    ///
    /// The old pair is deleted and the new one inserted in one transaction.
    /// The refresh row delete is checked, so presenting the same token twice
    /// (even concurrently) succeeds at most once; later attempts get
    /// `RecordNotFound`. An expired refresh token changes nothing.
    pub async fn rotate_refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            "SELECT rt.id, rt.expires_at, at.id, at.user_id \
             FROM refresh_tokens rt \
             JOIN access_tokens at ON at.id = rt.access_token_id \
             WHERE rt.token_hash = ?",
        )
        .bind(hash_token(refresh_token))
        .fetch_optional(&self.pool)
        .await?;

        let Some((refresh_id, expires_at, access_id, user_id)) = row else {
            return Err(AuthError::RecordNotFound);
        };

        let now = Utc::now();
        if is_expired(expires_at, now) {
            debug!(user_id, "refresh token expired");
            return Err(AuthError::TokenExpired);
        }

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE id = ?")
            .bind(refresh_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            // Another rotation consumed it first; dropping `tx` rolls back.
            return Err(AuthError::RecordNotFound);
        }

        sqlx::query("DELETE FROM access_tokens WHERE id = ?")
            .bind(access_id)
            .execute(&mut *tx)
            .await?;

        let pair = insert_token_pair(&mut tx, user_id, self.lifetimes, now).await?;
        tx.commit().await?;

        info!(user_id, "rotated token pair");
        Ok(pair)
    }

    /// Delete the server-side pair identified by either of its values.
    ///
    /// Unknown values are ignored. Returns the number of pairs removed.
    pub async fn revoke(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<u64, AuthError> {
        let mut removed = 0;

        if let Some(token) = access_token {
            removed += sqlx::query("DELETE FROM access_tokens WHERE token_hash = ?")
                .bind(hash_token(token))
                .execute(&self.pool)
                .await?
                .rows_affected();
        }

        if let Some(token) = refresh_token {
            removed += sqlx::query(
                "DELETE FROM access_tokens WHERE id IN \
                 (SELECT access_token_id FROM refresh_tokens WHERE token_hash = ?)",
            )
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?
            .rows_affected();
        }

        if removed > 0 {
            debug!(removed, "revoked token pair");
        }
        Ok(removed)
    }

    /// Delete every pair whose refresh token has expired.
    ///
    /// Such pairs can no longer be used for anything; rotation deliberately
    /// leaves them in place.
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let removed = sqlx::query(
            "DELETE FROM access_tokens WHERE id IN \
             (SELECT access_token_id FROM refresh_tokens WHERE expires_at <= ?)",
        )
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?
        .rows_affected();

        info!(removed, "purged expired token pairs");
        Ok(removed)
    }
}

/// Insert a fresh access/refresh pair for `user_id` on the given connection.
async fn insert_token_pair(
    conn: &mut SqliteConnection,
    user_id: i64,
    lifetimes: TokenLifetimes,
    now: DateTime<Utc>,
) -> Result<TokenPair, AuthError> {
    let access_token = generate_token();
    let refresh_token = generate_token();
    let access_expires_at = now + lifetimes.access;
    let refresh_expires_at = now + lifetimes.refresh;

    let access_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO access_tokens (token_hash, user_id, expires_at, created_at) \
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(hash_token(&access_token))
    .bind(user_id)
    .bind(access_expires_at.timestamp_millis())
    .bind(now.timestamp_millis())
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO refresh_tokens (token_hash, access_token_id, expires_at, created_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(hash_token(&refresh_token))
    .bind(access_id)
    .bind(refresh_expires_at.timestamp_millis())
    .bind(now.timestamp_millis())
    .execute(&mut *conn)
    .await?;

    Ok(TokenPair {
        access_token,
        access_expires_at,
        refresh_token,
        refresh_expires_at,
    })
}

/// Generate a 256-bit random token, URL-safe base64 encoded.
fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rng().random();
    URL_SAFE.encode(bytes)
}

/// SHA-256 hash a token for storage.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A token is expired from its expiry instant onwards.
fn is_expired(expires_at_ms: i64, now: DateTime<Utc>) -> bool {
    now.timestamp_millis() >= expires_at_ms
}
