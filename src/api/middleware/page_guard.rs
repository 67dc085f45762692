//! Frontend page guard.
//!
//! Account pages need a session; visitors without one are sent to the
//! login page with a callback back to where they were going.

use axum::{
    extract::{Request, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::auth::authenticate;
use crate::api::AppState;
use crate::config::{CALLBACK_URL_PARAM, LOGIN_PAGE_PATH, PROTECTED_PAGE_PREFIXES};

/// Whether `path` is a protected page or lives below one.
pub fn is_protected_page(path: &str) -> bool {
    PROTECTED_PAGE_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Login URL that returns to `target` after signing in.
pub fn login_redirect_location(target: &str) -> String {
    format!(
        "{}?{}={}",
        LOGIN_PAGE_PATH,
        CALLBACK_URL_PARAM,
        urlencoding::encode(target)
    )
}

pub async fn page_guard_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !is_protected_page(&path) {
        return next.run(request).await;
    }

    if authenticate(state.auth_service.as_ref(), request.headers()).is_ok() {
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(&path);
    tracing::debug!(path = %target, "Redirecting anonymous visitor to login");

    match HeaderValue::from_str(&login_redirect_location(target)) {
        Ok(location) => (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_protected_page() {
        assert!(is_protected_page("/account"));
        assert!(is_protected_page("/account/settings"));
        assert!(is_protected_page("/orders"));
        assert!(is_protected_page("/orders/3f2a"));
        assert!(!is_protected_page("/accounting"));
        assert!(!is_protected_page("/"));
        assert!(!is_protected_page("/games/mobile-legends"));
    }

    #[test]
    fn test_login_redirect_location() {
        assert_eq!(login_redirect_location("/account"), "/login?callbackUrl=%2Faccount");
        assert_eq!(
            login_redirect_location("/orders?page=2"),
            "/login?callbackUrl=%2Forders%3Fpage%3D2"
        );
    }
}
