//! User-related database queries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::AuthError;
use crate::models::auth::{Role, User, UserWithDatasets, UserWithPassword};

/// Message for a registration whose email is already in use.
pub(crate) const EMAIL_TAKEN: &str = "Email already registered";

/// Raw `users` row: (id, email, role, created_at).
pub(crate) type UserRow = (i64, String, String, DateTime<Utc>);

/// Build a `User` from a raw row. An unknown role is a decode failure.
pub(crate) fn parse_user_row((id, email, role, created_at): UserRow) -> Result<User, sqlx::Error> {
    let role = role
        .parse::<Role>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(User {
        id,
        email,
        role,
        created_at,
    })
}

/// Fetch a user and their password hash by email.
pub async fn find_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserWithPassword>, AuthError> {
    let row = sqlx::query_as::<_, (i64, String, String, DateTime<Utc>, String)>(
        "SELECT id, email, role, created_at, password_hash FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let record = row
        .map(|(id, email, role, created_at, password_hash)| {
            Ok::<_, sqlx::Error>(UserWithPassword {
                user: parse_user_row((id, email, role, created_at))?,
                password_hash,
            })
        })
        .transpose()?;
    Ok(record)
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, role, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(parse_user_row).transpose()?)
}

/// Create a new user, returning it.
///
/// A taken email is a `ValidationError`, including when a concurrent insert
/// wins the race past an earlier `email_exists` check.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (email, password_hash, role, created_at) VALUES (?, ?, ?, ?) \
         RETURNING id, email, role, created_at",
    )
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AuthError::ValidationError(EMAIL_TAKEN.into())
        }
        other => AuthError::DbError(other),
    })?;
    Ok(parse_user_row(row)?)
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, AuthError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// List all users ordered by ID.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, AuthError> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, role, created_at FROM users ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(parse_user_row)
        .collect::<Result<Vec<_>, _>>()?)
}

/// List all users with the IDs of the datasets they were granted.
pub async fn list_users_with_datasets(
    pool: &SqlitePool,
) -> Result<Vec<UserWithDatasets>, AuthError> {
    let users = list_users(pool).await?;

    let grants = sqlx::query_as::<_, (i64, i64)>(
        "SELECT user_id, dataset_id FROM user_datasets ORDER BY user_id, dataset_id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_user: HashMap<i64, Vec<i64>> = HashMap::new();
    for (user_id, dataset_id) in grants {
        by_user.entry(user_id).or_default().push(dataset_id);
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let dataset_ids = by_user.remove(&user.id).unwrap_or_default();
            UserWithDatasets { user, dataset_ids }
        })
        .collect())
}

/// Change a user's role, returning the updated user.
pub async fn set_user_role(pool: &SqlitePool, user_id: i64, role: Role) -> Result<User, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET role = ? WHERE id = ? RETURNING id, email, role, created_at",
    )
    .bind(role.as_str())
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(parse_user_row(row)?),
        None => Err(AuthError::RecordNotFound),
    }
}
