//! API middleware.

mod auth;
mod page_guard;

pub use auth::{admin_middleware, auth_middleware, authenticate, require_admin, session_token, CurrentUser};
pub use page_guard::{is_protected_page, login_redirect_location, page_guard_middleware};
