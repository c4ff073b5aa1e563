//! Caller identity through the `userSessionId` cookie.
//!
//! A caller's identity is issued on their first request and kept in a long
//! lived cookie after that. The service never sees the cookie, only the
//! [`CallerId`] taken from it.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use kiku::id::CallerId;
use kiku::log;

pub const IDENTITY_COOKIE: &str = "userSessionId";

const IDENTITY_MAX_AGE: time::Duration = time::Duration::days(30);

/// Returns the caller's identity, issuing a new one (and the cookie that
/// carries it) when the request has none or a malformed one.
pub fn identify(jar: CookieJar, secure: bool) -> (CookieJar, CallerId) {
    if let Some(cookie) = jar.get(IDENTITY_COOKIE) {
        let caller = CallerId::from(cookie.value());
        if caller.is_storage_safe() {
            return (jar, caller);
        }
        log::debug!("Replacing malformed identity cookie");
    }

    let caller = CallerId::new();
    let cookie = Cookie::build((IDENTITY_COOKIE, caller.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(IDENTITY_MAX_AGE)
        .secure(secure);
    log::debug!("Issued new caller identity");
    (jar.add(cookie), caller)
}
