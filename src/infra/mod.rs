//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Unit of Work aggregating the repositories
//! - Payment gateway client

pub mod db;
pub mod payment;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use payment::{HttpPaymentGateway, PaymentGateway};
pub use repositories::{CatalogRepository, OrderRepository, UserRepository};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(test)]
pub use payment::MockPaymentGateway;
#[cfg(test)]
pub use repositories::{MockCatalogRepository, MockOrderRepository, MockUserRepository};
#[cfg(test)]
pub use unit_of_work::MockUnitOfWork;
