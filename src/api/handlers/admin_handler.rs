//! Admin dashboard endpoints. Every route here sits behind the admin guard.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::catalog_handler::GameListQuery;
use super::parse_id;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    Category, Game, GameChanges, NewGame, NewProduct, Order, OrderStatus, Product,
    ProductChanges, UserResponse,
};
use crate::errors::{AppError, AppResult};
use crate::services::DashboardStats;
use crate::types::{
    Created, NoContent, Paginated, PaginatedGames, PaginatedOrders, PaginatedUsers,
    PaginationParams,
};

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Include soft-deleted accounts
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// pending, paid, completed, cancelled or failed
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl Validate for UserListQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        PaginationParams::from_query(self.page, self.per_page).validate()
    }
}

impl Validate for OrderListQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        PaginationParams::from_query(self.page, self.per_page).validate()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[schema(example = "admin")]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Battle Royale")]
    pub name: String,
    /// Derived from the name when omitted
    #[schema(example = "battle-royale")]
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGameRequest {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Mobile Legends: Bang Bang")]
    pub name: String,
    /// Derived from the name when omitted
    #[schema(example = "mobile-legends")]
    pub slug: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
    #[validate(url(message = "banner_url must be a URL"))]
    pub banner_url: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGameRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
    #[validate(url(message = "banner_url must be a URL"))]
    pub banner_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "86 Diamonds")]
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units, > 0
    #[schema(example = 20000)]
    pub price: i64,
    /// Defaults to true
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[schema(example = "completed")]
    pub status: String,
}

// =============================================================================
// Routes
// =============================================================================

/// Routes under /api/admin; the admin guard is applied by the router
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/users/:id/restore", post(restore_user))
        .route("/categories", post(create_category))
        .route("/categories/:id", delete(delete_category))
        .route("/games", get(list_games).post(create_game))
        .route("/games/:id", put(update_game).delete(delete_game))
        .route("/games/:id/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/orders", get(list_orders))
        .route("/orders/:id/status", put(update_order_status))
}

// =============================================================================
// Dashboard
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Store counters", body = DashboardStats),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    Ok(Json(state.stats_service.dashboard().await?))
}

// =============================================================================
// Users
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(UserListQuery),
    responses((status = 200, description = "Users, newest first", body = PaginatedUsers)),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserListQuery>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page = state
        .user_service
        .list_users(
            PaginationParams::from_query(query.page, query.per_page),
            query.include_deleted.unwrap_or(false),
        )
        .await?;
    Ok(Json(page.map(UserResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User, including deleted accounts", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user_with_deleted(parse_id(&id)?).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Unknown role or empty name"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .update_user(parse_id(&id)?, payload.name, payload.role)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User soft-deleted"),
        (status = 400, description = "Admins cannot delete themselves"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state
        .user_service
        .delete_user(current_user.id, parse_id(&id)?)
        .await?;
    Ok(NoContent)
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/restore",
    tag = "Admin",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn restore_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.restore_user(parse_id(&id)?).await?;
    Ok(Json(UserResponse::from(user)))
}

// =============================================================================
// Catalog
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    tag = "Admin",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid or duplicate slug")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> AppResult<Created<Category>> {
    let category = state
        .catalog_service
        .create_category(payload.name, payload.slug)
        .await?;
    Ok(Created(category))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted; its games become uncategorised"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.catalog_service.delete_category(parse_id(&id)?).await?;
    Ok(NoContent)
}

#[utoipa::path(
    get,
    path = "/api/admin/games",
    tag = "Admin",
    params(GameListQuery),
    responses((status = 200, description = "All games including inactive", body = PaginatedGames)),
    security(("bearer_auth" = []))
)]
pub async fn list_games(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<GameListQuery>,
) -> AppResult<Json<Paginated<Game>>> {
    let params = query.pagination();
    let filter = query.into_filter(true);
    Ok(Json(state.catalog_service.list_games(filter, params).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/games",
    tag = "Admin",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = Game),
        (status = 400, description = "Invalid input, unknown category or duplicate slug")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_game(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateGameRequest>,
) -> AppResult<Created<Game>> {
    let game = state
        .catalog_service
        .create_game(NewGame {
            category_id: payload.category_id,
            name: payload.name,
            slug: payload.slug.unwrap_or_default(),
            publisher: payload.publisher,
            description: payload.description,
            image_url: payload.image_url,
            banner_url: payload.banner_url,
            is_active: payload.is_active.unwrap_or(true),
        })
        .await?;
    Ok(Created(game))
}

#[utoipa::path(
    put,
    path = "/api/admin/games/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Game id")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = Game),
        (status = 400, description = "Invalid input or duplicate slug"),
        (status = 404, description = "Game not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateGameRequest>,
) -> AppResult<Json<Game>> {
    let changes = GameChanges {
        category_id: payload.category_id,
        name: payload.name,
        slug: payload.slug,
        publisher: payload.publisher,
        description: payload.description,
        image_url: payload.image_url,
        banner_url: payload.banner_url,
        is_active: payload.is_active,
    };
    Ok(Json(
        state.catalog_service.update_game(parse_id(&id)?, changes).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/games/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Game id")),
    responses(
        (status = 204, description = "Game and its products deleted"),
        (status = 404, description = "Game not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.catalog_service.delete_game(parse_id(&id)?).await?;
    Ok(NoContent)
}

#[utoipa::path(
    post,
    path = "/api/admin/games/{id}/products",
    tag = "Admin",
    params(("id" = String, Path, description = "Game id")),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid name or price"),
        (status = 404, description = "Game not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<Created<Product>> {
    let product = state
        .catalog_service
        .create_product(NewProduct {
            game_id: parse_id(&game_id)?,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            is_active: payload.is_active.unwrap_or(true),
        })
        .await?;
    Ok(Created(product))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid name or price"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    let changes = ProductChanges {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        is_active: payload.is_active,
    };
    Ok(Json(
        state.catalog_service.update_product(parse_id(&id)?, changes).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.catalog_service.delete_product(parse_id(&id)?).await?;
    Ok(NoContent)
}

// =============================================================================
// Orders
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Admin",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders, newest first", body = PaginatedOrders),
        (status = 400, description = "Unknown status filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<OrderListQuery>,
) -> AppResult<Json<Paginated<Order>>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;
    let orders = state
        .order_service
        .list_all_orders(status, PaginationParams::from_query(query.page, query.per_page))
        .await?;
    Ok(Json(orders))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    tag = "Admin",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Order),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let status = parse_status(&payload.status)?;
    Ok(Json(
        state.order_service.update_status(parse_id(&id)?, status).await?,
    ))
}

fn parse_status(raw: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(raw)
        .ok_or_else(|| AppError::bad_request(format!("Unknown order status '{}'", raw)))
}
