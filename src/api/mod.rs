//! API layer - HTTP handlers and middleware
//!
//! JSON endpoints live under `/api`; everything else is the frontend
//! bundle, with account pages behind the page guard.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
