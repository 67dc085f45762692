//! Order service - checkout, order history and payment notifications.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::order::price_order_lines;
use crate::domain::{
    NewOrder, Order, OrderDetail, OrderLineRequest, OrderStatus, PaymentNotification,
    PaymentRequest,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{PaymentGateway, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// Checkout input from an authenticated customer
#[derive(Debug, Clone)]
pub struct Checkout {
    pub game_id: Uuid,
    pub game_account_id: String,
    pub game_server: Option<String>,
    pub items: Vec<OrderLineRequest>,
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Price, persist and open a payment session for a new order.
    async fn create_order(&self, user_id: Uuid, checkout: Checkout) -> AppResult<OrderDetail>;

    async fn list_orders(&self, user_id: Uuid, params: PaginationParams) -> AppResult<Paginated<Order>>;

    /// Owners and admins may read an order; everyone else gets `Forbidden`.
    async fn get_order(&self, actor_id: Uuid, is_admin: bool, id: Uuid) -> AppResult<OrderDetail>;

    /// Apply a signed gateway notification. Returns the order as it stands afterwards.
    async fn handle_notification(&self, notification: PaymentNotification) -> AppResult<Order>;

    async fn list_all_orders(
        &self,
        status: Option<OrderStatus>,
        params: PaginationParams,
    ) -> AppResult<Paginated<Order>>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order>;
}

pub struct OrderProcessor<U: UnitOfWork> {
    uow: Arc<U>,
    gateway: Arc<dyn PaymentGateway>,
}

impl<U: UnitOfWork> OrderProcessor<U> {
    pub fn new(uow: Arc<U>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { uow, gateway }
    }

    async fn apply_transition(&self, order: &Order, to: OrderStatus) -> AppResult<Order> {
        let paid_at = (to == OrderStatus::Paid).then(Utc::now);
        self.uow
            .orders()
            .transition(order.id, order.status, to, paid_at)
            .await?
            .ok_or_else(|| {
                AppError::bad_request(format!("Order {} changed state concurrently", order.id))
            })
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderProcessor<U> {
    async fn create_order(&self, user_id: Uuid, checkout: Checkout) -> AppResult<OrderDetail> {
        let game_account_id = checkout.game_account_id.trim().to_string();
        if game_account_id.is_empty() {
            return Err(AppError::validation("Game account id is required"));
        }

        let customer = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let catalog = self.uow.catalog();
        catalog
            .find_game(checkout.game_id)
            .await?
            .filter(|g| g.is_active)
            .ok_or_else(|| AppError::bad_request("Game is not available"))?;

        let ids = checkout.items.iter().map(|line| line.product_id).collect();
        let products = catalog.find_products(ids).await?;
        let (items, total_amount) = price_order_lines(checkout.game_id, &checkout.items, &products)?;

        let mut detail = self
            .uow
            .orders()
            .create(NewOrder {
                user_id,
                game_account_id,
                game_server: checkout
                    .game_server
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                total_amount,
                items,
            })
            .await?;
        tracing::info!(order_id = %detail.order.id, total = total_amount, "Order created");

        let session = match self
            .gateway
            .create_transaction(PaymentRequest::for_order(&detail, &customer))
            .await
        {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(order_id = %detail.order.id, error = %e, "Payment session failed");
                if let Err(mark_err) = self
                    .uow
                    .orders()
                    .transition(detail.order.id, OrderStatus::Pending, OrderStatus::Failed, None)
                    .await
                {
                    tracing::error!(
                        order_id = %detail.order.id,
                        error = %mark_err,
                        "Could not mark order failed"
                    );
                }
                return Err(e);
            }
        };

        detail.order = self
            .uow
            .orders()
            .set_payment(detail.order.id, session.token, session.redirect_url)
            .await?;
        Ok(detail)
    }

    async fn list_orders(&self, user_id: Uuid, params: PaginationParams) -> AppResult<Paginated<Order>> {
        let (orders, total) = self.uow.orders().list_for_user(user_id, &params).await?;
        Ok(Paginated::new(orders, &params, total))
    }

    async fn get_order(&self, actor_id: Uuid, is_admin: bool, id: Uuid) -> AppResult<OrderDetail> {
        let detail = self
            .uow
            .orders()
            .find_detail(id)
            .await?
            .ok_or_not_found()?;

        if detail.order.user_id != actor_id && !is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(detail)
    }

    async fn handle_notification(&self, notification: PaymentNotification) -> AppResult<Order> {
        self.gateway.verify_notification(&notification)?;

        let id = Uuid::parse_str(&notification.order_id).map_err(|_| AppError::NotFound)?;
        let order = self
            .uow
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;

        let Some(target) = notification.target_status() else {
            tracing::debug!(order_id = %id, status = %notification.transaction_status, "Notification without state change");
            return Ok(order);
        };

        if order.status.is_settled() || !order.status.can_transition_to(target) {
            tracing::info!(order_id = %id, current = %order.status, target = %target, "Ignoring notification");
            return Ok(order);
        }

        let paid_at = (target == OrderStatus::Paid).then(Utc::now);
        match self
            .uow
            .orders()
            .transition(id, order.status, target, paid_at)
            .await?
        {
            Some(updated) => {
                tracing::info!(order_id = %id, status = %updated.status, "Order updated from payment notification");
                Ok(updated)
            }
            None => {
                // Lost a race with another notification; report what is stored now.
                self.uow
                    .orders()
                    .find_by_id(id)
                    .await?
                    .ok_or_not_found()
            }
        }
    }

    async fn list_all_orders(
        &self,
        status: Option<OrderStatus>,
        params: PaginationParams,
    ) -> AppResult<Paginated<Order>> {
        let (orders, total) = self.uow.orders().list(status, &params).await?;
        Ok(Paginated::new(orders, &params, total))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let order = self
            .uow
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;

        if !order.status.can_transition_to(status) {
            return Err(AppError::bad_request(format!(
                "Cannot change order status from {} to {}",
                order.status, status
            )));
        }

        let updated = self.apply_transition(&order, status).await?;
        tracing::info!(order_id = %id, from = %order.status, to = %status, "Order status changed");
        Ok(updated)
    }
}
