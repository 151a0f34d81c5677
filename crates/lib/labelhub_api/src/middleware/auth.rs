//! Authentication middleware: session token lookup and access checks.
//!
//! Each layer inserts a typed extension for the next one (and the handlers)
//! to extract, so a handler mounted behind a layer can rely on its value.

use std::collections::HashMap;

use axum::Extension;
use axum::extract::{Path, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use labelhub_core::datasets::permissions::user_has_dataset_access;
use labelhub_core::models::auth::User;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::ACCESS_COOKIE;

/// The user whose access token accompanied the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// A user cleared to work on one dataset.
#[derive(Debug, Clone)]
pub struct DatasetScope {
    pub user: User,
    pub dataset_id: i64,
}

/// Access token from the `auth_token` cookie, or an `Authorization: Bearer`
/// header for non-browser clients.
fn access_token(jar: &CookieJar, request: &Request) -> Option<String> {
    if let Some(cookie) = jar.get(ACCESS_COOKIE) {
        return Some(cookie.value().to_string());
    }
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Axum middleware: validates the access token and injects
/// `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = access_token(&jar, &request).ok_or(AppError::Unauthorized)?;

    let user = state
        .tokens
        .validate_access_token(&token)
        .await
        .inspect_err(|e| debug!(error = %e, "access token rejected"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Axum middleware: only admins pass. Must run behind `require_auth`.
pub async fn require_admin(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin() {
        debug!(user_id = user.id, "admin route refused");
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    Ok(next.run(request).await)
}

/// Axum middleware: checks the `{dataset_id}` path segment against the
/// caller's grants and injects `DatasetScope`. Must run behind `require_auth`.
pub async fn require_dataset_access(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let dataset_id = params
        .get("dataset_id")
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| AppError::Validation("Invalid dataset id".into()))?;

    if !user_has_dataset_access(&state.pool, &user, dataset_id).await? {
        debug!(user_id = user.id, dataset_id, "dataset access refused");
        return Err(AppError::Forbidden("No access to this dataset".into()));
    }

    request
        .extensions_mut()
        .insert(DatasetScope { user, dataset_id });
    Ok(next.run(request).await)
}
