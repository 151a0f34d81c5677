//! Cookie service: set and clear the httpOnly session cookies.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use labelhub_core::models::auth::TokenPair;
use time::Duration;

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "auth_token";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Build an httpOnly cookie that lives as long as the token it carries.
fn token_cookie(name: &str, token: &str, expires_at: DateTime<Utc>, secure: bool) -> Cookie<'static> {
    let remaining = (expires_at - Utc::now()).num_seconds().max(0);
    Cookie::build((name.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(remaining))
        .build()
}

/// Build an expired cookie that makes the client drop `name`.
fn expired_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Add both cookies of a freshly issued pair.
pub fn set_auth_cookies(jar: CookieJar, pair: &TokenPair, secure: bool) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_COOKIE,
        &pair.access_token,
        pair.access_expires_at,
        secure,
    ))
    .add(token_cookie(
        REFRESH_COOKIE,
        &pair.refresh_token,
        pair.refresh_expires_at,
        secure,
    ))
}

/// Overwrite both cookies with expired blanks.
pub fn clear_auth_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE, secure))
        .add(expired_cookie(REFRESH_COOKIE, secure))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access-value".into(),
            access_expires_at: Utc::now() + chrono::Duration::minutes(60),
            refresh_token: "refresh-value".into(),
            refresh_expires_at: Utc::now() + chrono::Duration::days(7),
        }
    }

    #[test]
    fn auth_cookies_carry_remaining_lifetime() {
        let jar = set_auth_cookies(CookieJar::new(), &pair(), true);

        let access = jar.get(ACCESS_COOKIE).expect("access cookie");
        assert_eq!(access.value(), "access-value");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        let max_age = access.max_age().expect("max age").whole_seconds();
        assert!((3590..=3600).contains(&max_age), "max_age = {max_age}");

        let refresh = jar.get(REFRESH_COOKIE).expect("refresh cookie");
        assert_eq!(refresh.value(), "refresh-value");
        assert!(refresh.max_age().expect("max age") > Duration::days(6));
    }

    #[test]
    fn past_expiry_yields_zero_max_age() {
        let mut stale = pair();
        stale.access_expires_at = Utc::now() - chrono::Duration::minutes(5);
        let jar = set_auth_cookies(CookieJar::new(), &stale, false);
        assert_eq!(
            jar.get(ACCESS_COOKIE).and_then(|c| c.max_age()),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn cleared_cookies_are_blank_and_expired() {
        let jar = clear_auth_cookies(set_auth_cookies(CookieJar::new(), &pair(), false), false);
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).expect("cookie");
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
