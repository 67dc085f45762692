//! Orders and order lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::Product;
use crate::config::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};
use crate::errors::{AppError, AppResult};

/// Order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Completed,
    Cancelled,
    Failed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Whether the order has been paid for (revenue-bearing).
    pub fn is_settled(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Completed)
    }

    /// Transitions allowed from this state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Pending, Failed) | (Paid, Completed) | (Paid, Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    #[schema(example = 40000)]
    pub total_amount: i64,
    /// Player account the top-up is credited to
    #[schema(example = "123456789")]
    pub game_account_id: String,
    #[schema(example = "2001")]
    pub game_server: Option<String>,
    pub payment_token: Option<String>,
    pub payment_url: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    /// Product name at the time of purchase
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// An order together with its lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// A line requested by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    #[schema(example = 2, minimum = 1, maximum = 100)]
    pub quantity: i32,
}

/// A priced line ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// Everything needed to insert a pending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub game_account_id: String,
    pub game_server: Option<String>,
    pub total_amount: i64,
    pub items: Vec<NewOrderItem>,
}

/// Price requested lines against stored products.
///
/// Every product must exist in `products`, be active and belong to
/// `game_id`. Returns the priced lines and the order total.
pub fn price_order_lines(
    game_id: Uuid,
    lines: &[OrderLineRequest],
    products: &[Product],
) -> AppResult<(Vec<NewOrderItem>, i64)> {
    if lines.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }
    if lines.len() > MAX_ORDER_ITEMS {
        return Err(AppError::validation(format!(
            "Order may contain at most {} items",
            MAX_ORDER_ITEMS
        )));
    }

    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut items = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;

    for line in lines {
        if !(1..=MAX_ITEM_QUANTITY).contains(&line.quantity) {
            return Err(AppError::validation(format!(
                "Quantity must be between 1 and {}",
                MAX_ITEM_QUANTITY
            )));
        }

        let product = by_id
            .get(&line.product_id)
            .filter(|p| p.is_active && p.game_id == game_id)
            .ok_or_else(|| {
                AppError::bad_request(format!("Product {} is not available", line.product_id))
            })?;

        let subtotal = product
            .price
            .checked_mul(i64::from(line.quantity))
            .ok_or_else(|| AppError::bad_request("Order total is too large"))?;
        total = total
            .checked_add(subtotal)
            .ok_or_else(|| AppError::bad_request("Order total is too large"))?;

        items.push(NewOrderItem {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: line.quantity,
            unit_price: product.price,
            subtotal,
        });
    }

    Ok((items, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(game_id: Uuid, price: i64, active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            game_id,
            name: format!("{} Diamonds", price / 100),
            description: None,
            price,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_parse_and_display() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
        assert_eq!(OrderStatus::Paid.to_string(), "paid");
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_price_order_lines_uses_stored_prices() {
        let game_id = Uuid::new_v4();
        let small = product(game_id, 15_000, true);
        let large = product(game_id, 120_000, true);
        let lines = [
            OrderLineRequest { product_id: small.id, quantity: 3 },
            OrderLineRequest { product_id: large.id, quantity: 1 },
        ];

        let (items, total) = price_order_lines(game_id, &lines, &[small.clone(), large]).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].subtotal, 45_000);
        assert_eq!(items[0].product_name, small.name);
        assert_eq!(total, 165_000);
    }

    #[test]
    fn test_price_order_lines_rejects_foreign_or_inactive_products() {
        let game_id = Uuid::new_v4();
        let foreign = product(Uuid::new_v4(), 10_000, true);
        let inactive = product(game_id, 10_000, false);

        for p in [foreign, inactive] {
            let lines = [OrderLineRequest { product_id: p.id, quantity: 1 }];
            let err = price_order_lines(game_id, &lines, &[p]).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[test]
    fn test_price_order_lines_rejects_bad_quantities() {
        let game_id = Uuid::new_v4();
        let p = product(game_id, 10_000, true);
        for quantity in [0, -1, MAX_ITEM_QUANTITY + 1] {
            let lines = [OrderLineRequest { product_id: p.id, quantity }];
            assert!(price_order_lines(game_id, &lines, &[p.clone()]).is_err());
        }
        assert!(price_order_lines(game_id, &[], &[p]).is_err());
    }

    #[test]
    fn test_price_order_lines_overflow() {
        let game_id = Uuid::new_v4();
        let p = product(game_id, i64::MAX / 2, true);
        let lines = [OrderLineRequest { product_id: p.id, quantity: 3 }];
        assert!(matches!(
            price_order_lines(game_id, &lines, &[p]),
            Err(AppError::BadRequest(_))
        ));
    }
}
