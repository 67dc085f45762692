//! Unit of Work: single access point to every repository.
//!
//! Services depend on this trait instead of individual stores so one
//! mock can stand in for the whole persistence layer in tests.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    CatalogRepository, CatalogStore, OrderRepository, OrderStore, UserRepository, UserStore,
};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn catalog(&self) -> Arc<dyn CatalogRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;
}

/// sea-orm backed UnitOfWork sharing one connection pool
pub struct Persistence {
    user_repo: Arc<UserStore>,
    catalog_repo: Arc<CatalogStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            catalog_repo: Arc::new(CatalogStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }
}
