//! Authentication request handlers.
//!
//! Tokens travel only in httpOnly cookies; bodies carry the user or expiry
//! instants, never token values.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use labelhub_core::models::auth::User;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{Credentials, RefreshResponse};
use crate::services::auth;
use crate::services::cookies::{
    ACCESS_COOKIE, REFRESH_COOKIE, clear_auth_cookies, set_auth_cookies,
};

/// `POST /auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> AppResult<(CookieJar, Json<User>)> {
    let (user, pair) = auth::login(&state, &body.email, &body.password).await?;
    let jar = set_auth_cookies(jar, &pair, state.config.secure_cookies);
    Ok((jar, Json(user)))
}

/// `POST /auth/register` — create an annotator account and sign it in.
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> AppResult<(StatusCode, CookieJar, Json<User>)> {
    let (user, pair) = auth::register(&state, &body.email, &body.password).await?;
    let jar = set_auth_cookies(jar, &pair, state.config.secure_cookies);
    Ok((StatusCode::CREATED, jar, Json(user)))
}

/// `POST /auth/refresh-token` — exchange the refresh cookie for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<RefreshResponse>)> {
    let presented = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    let pair = auth::refresh(&state, presented.as_deref()).await?;
    let body = RefreshResponse {
        access_expires_at: pair.access_expires_at,
        refresh_expires_at: pair.refresh_expires_at,
    };
    let jar = set_auth_cookies(jar, &pair, state.config.secure_cookies);
    Ok((jar, Json(body)))
}

/// `POST /auth/logout` — delete the session server-side and clear cookies.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    let access = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string());
    let refresh = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    auth::logout(&state, access.as_deref(), refresh.as_deref()).await?;
    let jar = clear_auth_cookies(jar, state.config.secure_cookies);
    Ok((jar, StatusCode::NO_CONTENT))
}
