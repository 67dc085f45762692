//! Admin dashboard figures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::OrderStatus;
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Store-wide counters for the admin dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub users: u64,
    pub games: u64,
    pub products: u64,
    pub orders: u64,
    /// Order count keyed by status; every status is present
    #[schema(example = json!({"pending": 3, "paid": 10, "completed": 7, "cancelled": 1, "failed": 0}))]
    pub orders_by_status: BTreeMap<String, u64>,
    /// Sum of paid and completed order totals, minor units
    #[schema(example = 1250000)]
    pub revenue: i64,
}

#[async_trait]
pub trait StatsService: Send + Sync {
    async fn dashboard(&self) -> AppResult<DashboardStats>;
}

pub struct Dashboard<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Dashboard<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> StatsService for Dashboard<U> {
    async fn dashboard(&self) -> AppResult<DashboardStats> {
        let users = self.uow.users();
        let catalog = self.uow.catalog();
        let orders = self.uow.orders();

        let (user_count, game_count, product_count, by_status, revenue) = tokio::try_join!(
            users.count(),
            catalog.count_games(),
            catalog.count_products(),
            orders.count_by_status(),
            orders.revenue(),
        )?;

        let mut orders_by_status: BTreeMap<String, u64> = OrderStatus::ALL
            .iter()
            .map(|status| (status.to_string(), 0))
            .collect();
        for (status, count) in by_status {
            orders_by_status.insert(status.to_string(), count);
        }

        Ok(DashboardStats {
            users: user_count,
            games: game_count,
            products: product_count,
            orders: orders_by_status.values().sum(),
            orders_by_status,
            revenue,
        })
    }
}
