//! Preference cookie middleware.
//!
//! Every request gets a validated [`UserPreferences`] extension, resolved
//! from the preference cookie or defaults. Handlers that change preferences
//! answer with a fresh `Set-Cookie` header.

use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use stampkeeper_core::preferences::{
    UserPreferences, PREFERENCES_COOKIE, PREFERENCES_COOKIE_MAX_AGE_SECS,
};

/// Resolve preferences from the request's cookie headers. A missing or
/// corrupted cookie yields defaults.
pub fn preferences_from_headers(headers: &HeaderMap) -> UserPreferences {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == PREFERENCES_COOKIE)
        .and_then(|(_, value)| UserPreferences::from_cookie_value(value))
        .unwrap_or_default()
}

/// Middleware injecting [`UserPreferences`] as a request extension.
pub async fn preferences_middleware(mut request: Request, next: Next) -> Response {
    let prefs = preferences_from_headers(request.headers());
    request.extensions_mut().insert(prefs);
    next.run(request).await
}

/// Build the `Set-Cookie` value persisting `prefs` for 30 days.
pub fn preferences_set_cookie(prefs: &UserPreferences) -> String {
    format!(
        "{PREFERENCES_COOKIE}={}; Path=/; Max-Age={PREFERENCES_COOKIE_MAX_AGE_SECS}; SameSite=Strict",
        prefs.to_cookie_value()
    )
}
