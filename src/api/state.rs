//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{
    AuthService, CatalogService, OrderService, ServiceContainer, Services, StatsService,
    UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub order_service: Arc<dyn OrderService>,
    pub stats_service: Arc<dyn StatsService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Pre-built frontend bundle served for non-API paths
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create application state from the database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> AppResult<Self> {
        let static_dir = PathBuf::from(&config.static_dir);
        let container = Services::from_connection(database.get_connection(), config)?;
        Ok(Self::new(&container, database, static_dir))
    }

    /// Create application state from any service container.
    pub fn new(
        services: &dyn ServiceContainer,
        database: Arc<Database>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            catalog_service: services.catalog(),
            order_service: services.orders(),
            stats_service: services.stats(),
            database,
            static_dir: static_dir.into(),
        }
    }
}
