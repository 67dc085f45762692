//! Order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{
    order::{self, Entity as OrderEntity},
    order_item::{self, Entity as OrderItemEntity},
};
use crate::domain::{NewOrder, Order, OrderDetail, OrderItem, OrderStatus};
use crate::errors::{AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a pending order and its lines atomically.
    async fn create(&self, order: NewOrder) -> AppResult<OrderDetail>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    async fn find_detail(&self, id: Uuid) -> AppResult<Option<OrderDetail>>;

    /// A user's orders, newest first.
    async fn list_for_user(&self, user_id: Uuid, params: &PaginationParams) -> AppResult<(Vec<Order>, u64)>;

    /// All orders, newest first, optionally filtered by status.
    async fn list(&self, status: Option<OrderStatus>, params: &PaginationParams) -> AppResult<(Vec<Order>, u64)>;

    async fn set_payment(&self, id: Uuid, token: String, url: String) -> AppResult<Order>;

    /// Move an order from `from` to `to` only if it is still in `from`.
    ///
    /// Returns `None` when the order changed state concurrently.
    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<Order>>;

    async fn count_by_status(&self) -> AppResult<Vec<(OrderStatus, u64)>>;

    /// Sum of totals of paid and completed orders.
    async fn revenue(&self) -> AppResult<i64>;
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert_order(txn: &DatabaseTransaction, new: NewOrder) -> AppResult<OrderDetail> {
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(new.user_id),
            status: Set(OrderStatus::Pending.to_string()),
            total_amount: Set(new.total_amount),
            game_account_id: Set(new.game_account_id),
            game_server: Set(new.game_server),
            payment_token: Set(None),
            payment_url: Set(None),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for line in new.items {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                product_name: Set(line.product_name),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                subtotal: Set(line.subtotal),
            }
            .insert(txn)
            .await?;
            items.push(OrderItem::from(item));
        }

        Ok(OrderDetail {
            order: Order::from(order),
            items,
        })
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn create(&self, new: NewOrder) -> AppResult<OrderDetail> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await?;

        match Self::insert_order(&txn, new).await {
            Ok(detail) => {
                txn.commit().await?;
                Ok(detail)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(OrderEntity::find_by_id(id).one(&self.db).await?.map(Order::from))
    }

    async fn find_detail(&self, id: Uuid) -> AppResult<Option<OrderDetail>> {
        let Some(order) = OrderEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(OrderItem::from)
            .collect();

        Ok(Some(OrderDetail {
            order: Order::from(order),
            items,
        }))
    }

    async fn list_for_user(&self, user_id: Uuid, params: &PaginationParams) -> AppResult<(Vec<Order>, u64)> {
        let paginator = OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let orders = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Order::from)
            .collect();
        Ok((orders, total))
    }

    async fn list(&self, status: Option<OrderStatus>, params: &PaginationParams) -> AppResult<(Vec<Order>, u64)> {
        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.as_str()));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let orders = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Order::from)
            .collect();
        Ok((orders, total))
    }

    async fn set_payment(&self, id: Uuid, token: String, url: String) -> AppResult<Order> {
        let mut active: order::ActiveModel = OrderEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?
            .into();

        active.payment_token = Set(Some(token));
        active.payment_url = Set(Some(url));
        active.updated_at = Set(Utc::now());

        Ok(Order::from(active.update(&self.db).await?))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<Order>> {
        let mut update = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(to.as_str()))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::Status.eq(from.as_str()));
        if let Some(paid_at) = paid_at {
            update = update.col_expr(order::Column::PaidAt, Expr::value(paid_at));
        }

        let result = update.exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn count_by_status(&self) -> AppResult<Vec<(OrderStatus, u64)>> {
        let rows: Vec<(String, i64)> = OrderEntity::find()
            .select_only()
            .column(order::Column::Status)
            .column_as(Expr::col(order::Column::Id).count(), "count")
            .group_by(order::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(status, count)| {
                OrderStatus::parse(&status).map(|s| (s, u64::try_from(count).unwrap_or(0)))
            })
            .collect())
    }

    async fn revenue(&self) -> AppResult<i64> {
        let settled = [OrderStatus::Paid.as_str(), OrderStatus::Completed.as_str()];
        let total: Option<i64> = OrderEntity::find()
            .select_only()
            .column_as(
                Expr::cust("CAST(COALESCE(SUM(total_amount), 0) AS BIGINT)"),
                "revenue",
            )
            .filter(order::Column::Status.is_in(settled))
            .into_tuple()
            .one(&self.db)
            .await?;

        Ok(total.unwrap_or(0))
    }
}
