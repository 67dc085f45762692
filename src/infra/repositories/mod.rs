//! Repository layer - Data access abstraction
//!
//! Each aggregate gets a trait (mocked in unit tests) and a sea-orm store.

mod catalog_repository;
pub(crate) mod entities;
mod order_repository;
mod user_repository;

pub use catalog_repository::{CatalogRepository, CatalogStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
