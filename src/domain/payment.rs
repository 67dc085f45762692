//! Payment gateway request/notification types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::order::{OrderDetail, OrderStatus};
use super::user::User;

/// Data sent to the gateway to open a checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub order_id: Uuid,
    pub gross_amount: i64,
    pub items: Vec<PaymentItem>,
    pub customer: PaymentCustomer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl PaymentRequest {
    pub fn for_order(detail: &OrderDetail, customer: &User) -> Self {
        Self {
            order_id: detail.order.id,
            gross_amount: detail.order.total_amount,
            items: detail
                .items
                .iter()
                .map(|item| PaymentItem {
                    id: item.product_id.to_string(),
                    name: item.product_name.clone(),
                    price: item.unit_price,
                    quantity: item.quantity,
                })
                .collect(),
            customer: PaymentCustomer {
                name: customer.name.clone(),
                email: customer.email.clone(),
                phone: customer.phone.clone(),
            },
        }
    }
}

/// Checkout session returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

/// Asynchronous status notification posted by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct PaymentNotification {
    #[validate(length(min = 1, message = "order_id is required"))]
    #[schema(example = "7b7c6e1a-3f7e-4f55-9d1a-7a7c8e3b2f10")]
    pub order_id: String,
    #[schema(example = "200")]
    pub status_code: String,
    #[schema(example = "40000.00")]
    pub gross_amount: String,
    #[schema(example = "settlement")]
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    pub signature_key: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
}

impl PaymentNotification {
    /// Map the gateway's transaction status to an order state.
    ///
    /// `None` means the notification does not change the order.
    pub fn target_status(&self) -> Option<OrderStatus> {
        match self.transaction_status.as_str() {
            "capture" => match self.fraud_status.as_deref() {
                None | Some("accept") => Some(OrderStatus::Paid),
                Some("deny") => Some(OrderStatus::Cancelled),
                _ => None,
            },
            "settlement" => Some(OrderStatus::Paid),
            "deny" | "cancel" | "expire" => Some(OrderStatus::Cancelled),
            "failure" => Some(OrderStatus::Failed),
            _ => None,
        }
    }
}
