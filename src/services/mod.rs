//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services reach persistence through the Unit of Work.

mod auth_service;
mod catalog_service;
pub mod container;
mod order_service;
mod stats_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenResponse};
pub use catalog_service::{CatalogManager, CatalogService};
pub use order_service::{Checkout, OrderProcessor, OrderService};
pub use stats_service::{Dashboard, DashboardStats, StatsService};
pub use user_service::{UserManager, UserService};
