//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through `ServiceContainer`, so tests can
//! swap in fakes for the whole service layer at once.

use std::sync::Arc;

use super::{AuthService, CatalogService, OrderService, StatsService, UserService};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{HttpPaymentGateway, PaymentGateway, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn stats(&self) -> Arc<dyn StatsService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    catalog_service: Arc<dyn CatalogService>,
    order_service: Arc<dyn OrderService>,
    stats_service: Arc<dyn StatsService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        catalog_service: Arc<dyn CatalogService>,
        order_service: Arc<dyn OrderService>,
        stats_service: Arc<dyn StatsService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            catalog_service,
            order_service,
            stats_service,
        }
    }

    /// Wire every service against the database and the HTTP payment gateway.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> AppResult<Self> {
        use super::{Authenticator, CatalogManager, Dashboard, OrderProcessor, UserManager};

        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(HttpPaymentGateway::new(config.payment.clone())?);
        let uow = Arc::new(Persistence::new(db));

        Ok(Self::new(
            Arc::new(Authenticator::new(uow.clone(), config)),
            Arc::new(UserManager::new(uow.clone())),
            Arc::new(CatalogManager::new(uow.clone())),
            Arc::new(OrderProcessor::new(uow.clone(), gateway)),
            Arc::new(Dashboard::new(uow)),
        ))
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn stats(&self) -> Arc<dyn StatsService> {
        self.stats_service.clone()
    }
}
