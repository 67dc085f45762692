//! Customer checkout and order history.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::parse_id;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Order, OrderDetail, OrderLineRequest};
use crate::errors::AppResult;
use crate::services::Checkout;
use crate::types::{Created, Paginated, PaginatedOrders, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub game_id: Uuid,
    /// In-game player id to credit
    #[validate(length(min = 1, message = "Game account id is required"))]
    #[schema(example = "12345678")]
    pub game_account_id: String,
    #[schema(example = "2001")]
    pub game_server: Option<String>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderLineRequest>,
}

/// Routes under /api/orders; the caller must already be authenticated
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created; payment_url points at the hosted checkout", body = OrderDetail),
        (status = 400, description = "Invalid items or unavailable products"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Payment provider failed; order marked failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Created<OrderDetail>> {
    let detail = state
        .order_service
        .create_order(
            current_user.id,
            Checkout {
                game_id: payload.game_id,
                game_account_id: payload.game_account_id,
                game_server: payload.game_server,
                items: payload.items,
            },
        )
        .await?;

    Ok(Created(detail))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(PaginationParams),
    responses(
        (status = 200, description = "Caller's orders, newest first", body = PaginatedOrders),
        (status = 400, description = "Malformed query or page out of range"),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Order>>> {
    Ok(Json(
        state.order_service.list_orders(current_user.id, params).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items", body = OrderDetail),
        (status = 400, description = "Malformed order id"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let id = parse_id(&id)?;
    let detail = state
        .order_service
        .get_order(current_user.id, current_user.is_admin(), id)
        .await?;
    Ok(Json(detail))
}
