//! Refresh cookie handling. The refresh secret travels in an `HttpOnly`
//! cookie scoped to the auth route prefix; only the short-lived access token
//! is exposed to client-side code.

use crate::config::Config;
use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};
use time::OffsetDateTime;

/// Path prefix the auth routes are nested under; the refresh cookie is
/// restricted to it.
pub const AUTH_PATH: &str = "/api/v1/auth";

/// Build the `Set-Cookie` value carrying a refresh secret. The secret is
/// hex; only a misconfigured cookie name can make this fail.
pub fn refresh_cookie(
    config: &Config,
    secret: &str,
    expires_at: OffsetDateTime,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let name = &config.refresh_cookie_name;
    let max_age = (expires_at - OffsetDateTime::now_utc())
        .whole_seconds()
        .max(0);
    let mut cookie =
        format!("{name}={secret}; Path={AUTH_PATH}; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if config.is_production() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the `Set-Cookie` value that clears the refresh cookie.
pub fn clear_refresh_cookie(config: &Config) -> Result<HeaderValue, InvalidHeaderValue> {
    let name = &config.refresh_cookie_name;
    let mut cookie = format!("{name}=; Path={AUTH_PATH}; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.is_production() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the refresh secret from the request's `Cookie` header, if present.
pub fn extract_refresh_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == cookie_name && !value.is_empty()).then(|| value.to_string())
    })
}
