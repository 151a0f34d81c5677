//! Authentication service: session flows delegating to `labelhub_core::auth`.

use labelhub_core::auth::{self as core_auth, AuthError};
use labelhub_core::models::auth::{TokenPair, User};
use tracing::{debug, info};

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Check credentials and open a session.
pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
    let user = core_auth::login(&state.pool, email, password)
        .await
        .inspect_err(|e| debug!(error = %e, "login rejected"))?;
    let pair = state.tokens.issue_token_pair(&user).await?;
    info!(user_id = user.id, "user logged in");
    Ok((user, pair))
}

/// Create an annotator account and open its first session.
pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
) -> AppResult<(User, TokenPair)> {
    let user = core_auth::register(&state.pool, email, password).await?;
    let pair = state.tokens.issue_token_pair(&user).await?;
    Ok((user, pair))
}

/// Rotate a session. A missing, unknown, consumed, or expired refresh token
/// is an authentication failure here, not a missing record.
pub async fn refresh(state: &AppState, refresh_token: Option<&str>) -> AppResult<TokenPair> {
    let token = refresh_token.ok_or(AppError::Unauthorized)?;
    state
        .tokens
        .rotate_refresh_token(token)
        .await
        .map_err(|e| match e {
            AuthError::RecordNotFound | AuthError::TokenExpired => {
                debug!(error = %e, "refresh rejected");
                AppError::Unauthorized
            }
            other => AppError::from(other),
        })
}

/// End a session by deleting its server-side pair.
///
/// Either cookie is enough; a session that is already gone is not an error.
pub async fn logout(
    state: &AppState,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
) -> AppResult<()> {
    let removed = state.tokens.revoke(access_token, refresh_token).await?;
    debug!(removed, "session closed");
    Ok(())
}
