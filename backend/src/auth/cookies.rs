//! Session cookie policy
//!
//! Token transport is a boundary-layer decision: the session issuer returns a
//! raw token string and the route layer turns it into a cookie here.
//!
//! Production runs over HTTPS with a cross-site frontend, so cookies are
//! Secure with SameSite=None; local development relaxes both.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Build the session cookie set on login
pub fn session_cookie(token: String, max_age_secs: i64, production: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .build()
}

/// Build the expired cookie set on logout.
/// Attributes must match [`session_cookie`] or browsers keep the old cookie.
pub fn expired_session_cookie(production: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(Duration::ZERO)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .build()
}
