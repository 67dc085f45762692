//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod catalog_handler;
pub mod order_handler;
pub mod payment_handler;
pub mod profile_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use catalog_handler::catalog_routes;
pub use order_handler::order_routes;
pub use payment_handler::payment_routes;
pub use profile_handler::profile_routes;

use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Parse a path id, answering 400 instead of the router's plain-text rejection.
pub(crate) fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("'{}' is not a valid id", raw)))
}
