//! Payment gateway webhook.

use axum::{extract::State, response::Json, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::PaymentNotification;
use crate::errors::AppResult;
use crate::types::MessageResponse;

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/notification", post(notification))
}

/// Receive an asynchronous transaction status from the payment gateway
#[utoipa::path(
    post,
    path = "/api/payments/notification",
    tag = "Payments",
    request_body = PaymentNotification,
    responses(
        (status = 200, description = "Notification processed", body = MessageResponse),
        (status = 400, description = "Malformed notification body"),
        (status = 401, description = "Signature mismatch"),
        (status = 404, description = "Unknown order")
    )
)]
pub async fn notification(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PaymentNotification>,
) -> AppResult<Json<MessageResponse>> {
    let order = state.order_service.handle_notification(payload).await?;
    Ok(Json(MessageResponse::new(format!(
        "Order {} is {}",
        order.id, order.status
    ))))
}
