//! JWT authentication middleware.
//!
//! A session is a JWT carried either as `Authorization: Bearer <token>` or
//! in the `session_token` cookie. The header wins when both are present.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{ROLE_ADMIN, SESSION_COOKIE_NAME};
use crate::errors::AppError;
use crate::services::AuthService;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Raw session token from the request, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolve the caller's identity, failing with the reason.
pub fn authenticate(auth: &dyn AuthService, headers: &HeaderMap) -> Result<CurrentUser, AppError> {
    let token = session_token(headers).ok_or(AppError::Unauthorized)?;
    let claims = auth.verify_token(&token)?;

    Ok(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

/// JWT authentication middleware.
///
/// Validates the session token and injects the CurrentUser into the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = authenticate(state.auth_service.as_ref(), request.headers())?;
    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Authentication plus an admin role check: 401 without a session, 403 for
/// non-admins.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = authenticate(state.auth_service.as_ref(), request.headers())?;
    require_admin(&current_user)?;
    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
