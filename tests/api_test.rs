//! API integration tests.
//!
//! The router is driven end to end with `tower::ServiceExt::oneshot`; services
//! are hand-written fakes so no database or payment gateway is needed.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use topup_store::api::create_router;
use topup_store::domain::{
    Category, Game, GameChanges, GameDetail, GameFilter, NewGame, NewProduct, Order, OrderDetail,
    OrderItem, OrderStatus, PaymentNotification, Product, ProductChanges, ProfileChanges, User,
    UserRole,
};
use topup_store::errors::{AppError, AppResult};
use topup_store::infra::Database;
use topup_store::services::{
    AuthService, CatalogService, Checkout, Claims, DashboardStats, OrderService, Registration,
    Services, StatsService, TokenResponse, UserService,
};
use topup_store::types::{Paginated, PaginationParams};
use topup_store::AppState;

const USER_TOKEN: &str = "valid-test-token";
const ADMIN_TOKEN: &str = "admin-token";
const TAKEN_EMAIL: &str = "taken@example.com";

const CUSTOMER_ID: Uuid = Uuid::from_u128(1);
const ADMIN_ID: Uuid = Uuid::from_u128(2);
const MEMBER_ID: Uuid = Uuid::from_u128(3);
const GAME_ID: Uuid = Uuid::from_u128(10);
const CATEGORY_ID: Uuid = Uuid::from_u128(11);
const PRODUCT_ID: Uuid = Uuid::from_u128(12);
const OWN_ORDER_ID: Uuid = Uuid::from_u128(20);
const FOREIGN_ORDER_ID: Uuid = Uuid::from_u128(21);

const UNIT_PRICE: i64 = 20_000;

// =============================================================================
// Fixtures
// =============================================================================

fn test_user(id: Uuid, role: UserRole) -> User {
    User {
        id,
        email: "player@example.com".to_string(),
        password_hash: "hashed".to_string(),
        name: "Player".to_string(),
        phone: None,
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

fn test_game(id: Uuid, name: &str, slug: &str, is_active: bool) -> Game {
    Game {
        id,
        category_id: Some(CATEGORY_ID),
        name: name.to_string(),
        slug: slug.to_string(),
        publisher: Some("Moonton".to_string()),
        description: None,
        image_url: None,
        banner_url: None,
        is_active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_product(id: Uuid, game_id: Uuid, price: i64) -> Product {
    Product {
        id,
        game_id,
        name: "86 Diamonds".to_string(),
        description: None,
        price,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_order(id: Uuid, user_id: Uuid, status: OrderStatus) -> Order {
    Order {
        id,
        user_id,
        status,
        total_amount: UNIT_PRICE,
        game_account_id: "12345678".to_string(),
        game_server: None,
        payment_token: None,
        payment_url: None,
        paid_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_detail(order: Order) -> OrderDetail {
    let item = OrderItem {
        id: Uuid::new_v4(),
        order_id: order.id,
        product_id: PRODUCT_ID,
        product_name: "86 Diamonds".to_string(),
        quantity: 1,
        unit_price: UNIT_PRICE,
        subtotal: UNIT_PRICE,
    };
    OrderDetail {
        order,
        items: vec![item],
    }
}

// =============================================================================
// Fake Services
// =============================================================================

struct FakeAuthService;

#[async_trait]
impl AuthService for FakeAuthService {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        if registration.email == TAKEN_EMAIL {
            return Err(AppError::bad_request("Email already registered"));
        }
        Ok(User {
            email: registration.email,
            name: registration.name,
            phone: registration.phone,
            ..test_user(Uuid::new_v4(), UserRole::User)
        })
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        if email != "player@example.com" || password != "password123" {
            return Err(AppError::InvalidCredentials);
        }
        Ok(TokenResponse {
            access_token: USER_TOKEN.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let (sub, role) = match token {
            USER_TOKEN => (CUSTOMER_ID, UserRole::User),
            ADMIN_TOKEN => (ADMIN_ID, UserRole::Admin),
            _ => return Err(AppError::Unauthorized),
        };
        Ok(Claims {
            sub,
            email: "player@example.com".to_string(),
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }
}

struct FakeUserService;

#[async_trait]
impl UserService for FakeUserService {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        Ok(test_user(id, UserRole::User))
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User> {
        let mut user = test_user(id, UserRole::User);
        if let Some(name) = changes.name {
            user.name = name;
        }
        Ok(user)
    }

    async fn change_password(&self, _id: Uuid, _current: String, _new: String) -> AppResult<()> {
        Ok(())
    }

    async fn list_users(
        &self,
        params: PaginationParams,
        _include_deleted: bool,
    ) -> AppResult<Paginated<User>> {
        Ok(Paginated::new(vec![test_user(MEMBER_ID, UserRole::User)], &params, 1))
    }

    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User> {
        if id != MEMBER_ID {
            return Err(AppError::NotFound);
        }
        Ok(test_user(id, UserRole::User))
    }

    async fn update_user(
        &self,
        id: Uuid,
        name: Option<String>,
        role: Option<String>,
    ) -> AppResult<User> {
        let mut user = self.get_user_with_deleted(id).await?;
        if let Some(name) = name {
            user.name = name;
        }
        match role.as_deref() {
            None => {}
            Some("user") => user.role = UserRole::User,
            Some("admin") => user.role = UserRole::Admin,
            Some(other) => return Err(AppError::validation(format!("Invalid role '{}'", other))),
        }
        Ok(user)
    }

    async fn delete_user(&self, actor: Uuid, id: Uuid) -> AppResult<()> {
        if actor == id {
            return Err(AppError::validation("You cannot delete your own account"));
        }
        self.get_user_with_deleted(id).await.map(|_| ())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        self.get_user_with_deleted(id).await
    }
}

struct FakeCatalogService;

impl FakeCatalogService {
    fn games() -> Vec<Game> {
        vec![
            test_game(GAME_ID, "Mobile Legends", "mobile-legends", true),
            test_game(Uuid::from_u128(13), "Legends Arena", "legends-arena", false),
        ]
    }
}

#[async_trait]
impl CatalogService for FakeCatalogService {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(vec![])
    }

    async fn list_games(
        &self,
        filter: GameFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Game>> {
        let search = filter.search.map(|s| s.to_lowercase());
        let games: Vec<Game> = Self::games()
            .into_iter()
            .filter(|g| filter.include_inactive || g.is_active)
            .filter(|g| {
                search
                    .as_deref()
                    .map_or(true, |s| g.name.to_lowercase().contains(s))
            })
            .collect();
        let total = games.len() as u64;
        Ok(Paginated::new(games, &params, total))
    }

    async fn get_game(&self, slug: &str) -> AppResult<GameDetail> {
        let game = Self::games()
            .into_iter()
            .find(|g| g.slug == slug && g.is_active)
            .ok_or(AppError::NotFound)?;
        Ok(GameDetail {
            game,
            category: None,
            products: vec![test_product(PRODUCT_ID, GAME_ID, UNIT_PRICE)],
        })
    }

    async fn create_category(&self, name: String, slug: Option<String>) -> AppResult<Category> {
        let slug = slug.unwrap_or_else(|| name.to_lowercase().replace(' ', "-"));
        Ok(Category {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: Utc::now(),
        })
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        if id != CATEGORY_ID {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn create_game(&self, game: NewGame) -> AppResult<Game> {
        if game.slug == "mobile-legends" {
            return Err(AppError::bad_request("Slug already in use"));
        }
        let mut created = test_game(Uuid::new_v4(), &game.name, &game.slug, game.is_active);
        created.category_id = game.category_id;
        Ok(created)
    }

    async fn update_game(&self, id: Uuid, changes: GameChanges) -> AppResult<Game> {
        let mut game = Self::games()
            .into_iter()
            .find(|g| g.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(active) = changes.is_active {
            game.is_active = active;
        }
        Ok(game)
    }

    async fn delete_game(&self, id: Uuid) -> AppResult<()> {
        if id != GAME_ID {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        if product.game_id != GAME_ID {
            return Err(AppError::NotFound);
        }
        if product.price <= 0 {
            return Err(AppError::validation("Price must be greater than zero"));
        }
        Ok(test_product(Uuid::new_v4(), product.game_id, product.price))
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        if id != PRODUCT_ID {
            return Err(AppError::NotFound);
        }
        Ok(test_product(id, GAME_ID, changes.price.unwrap_or(UNIT_PRICE)))
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        if id != PRODUCT_ID {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

struct FakeOrderService;

#[async_trait]
impl OrderService for FakeOrderService {
    async fn create_order(&self, user_id: Uuid, checkout: Checkout) -> AppResult<OrderDetail> {
        if checkout.game_id != GAME_ID {
            return Err(AppError::bad_request("Game is not available"));
        }
        let mut order = test_order(Uuid::new_v4(), user_id, OrderStatus::Pending);
        order.game_account_id = checkout.game_account_id;
        order.payment_token = Some("snap-token".to_string());
        order.payment_url = Some("https://pay.example/snap-token".to_string());

        let items: Vec<OrderItem> = checkout
            .items
            .iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: line.product_id,
                product_name: "86 Diamonds".to_string(),
                quantity: line.quantity,
                unit_price: UNIT_PRICE,
                subtotal: UNIT_PRICE * i64::from(line.quantity),
            })
            .collect();
        order.total_amount = items.iter().map(|i| i.subtotal).sum();
        Ok(OrderDetail { order, items })
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Paginated<Order>> {
        let orders = vec![test_order(OWN_ORDER_ID, user_id, OrderStatus::Paid)];
        Ok(Paginated::new(orders, &params, 1))
    }

    async fn get_order(&self, actor_id: Uuid, is_admin: bool, id: Uuid) -> AppResult<OrderDetail> {
        let owner = match id {
            OWN_ORDER_ID => CUSTOMER_ID,
            FOREIGN_ORDER_ID => MEMBER_ID,
            _ => return Err(AppError::NotFound),
        };
        if owner != actor_id && !is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(test_detail(test_order(id, owner, OrderStatus::Paid)))
    }

    async fn handle_notification(&self, notification: PaymentNotification) -> AppResult<Order> {
        if notification.signature_key != "good-signature" {
            return Err(AppError::InvalidSignature);
        }
        Err(AppError::NotFound)
    }

    async fn list_all_orders(
        &self,
        _status: Option<OrderStatus>,
        params: PaginationParams,
    ) -> AppResult<Paginated<Order>> {
        Ok(Paginated::new(vec![], &params, 0))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        if id != OWN_ORDER_ID {
            return Err(AppError::NotFound);
        }
        Ok(test_order(id, CUSTOMER_ID, status))
    }
}

struct FakeStatsService;

#[async_trait]
impl StatsService for FakeStatsService {
    async fn dashboard(&self) -> AppResult<DashboardStats> {
        Ok(DashboardStats {
            users: 2,
            games: 1,
            products: 3,
            orders: 0,
            orders_by_status: BTreeMap::new(),
            revenue: 0,
        })
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn app_with_static_dir(static_dir: impl Into<PathBuf>) -> Router {
    let services = Services::new(
        Arc::new(FakeAuthService),
        Arc::new(FakeUserService),
        Arc::new(FakeCatalogService),
        Arc::new(FakeOrderService),
        Arc::new(FakeStatsService),
    );
    let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
    create_router(AppState::new(&services, database, static_dir))
}

fn app() -> Router {
    app_with_static_dir("./no-frontend-bundle")
}

/// Router serving a throwaway frontend bundle with a single index page
fn app_with_frontend() -> Router {
    let dir = std::env::temp_dir().join(format!("topup-store-frontend-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<html>storefront</html>").unwrap();
    app_with_static_dir(dir)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, None)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    request(Method::POST, uri, None, Some(body))
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Asserts a 400 carrying the JSON error body
async fn assert_json_bad_request(response: Response) -> Value {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "got {}", content_type);
    let body = json_body(response).await;
    assert!(body["error"]["code"].is_string());
    assert!(body["error"]["message"].is_string());
    body
}

// =============================================================================
// Public Endpoints
// =============================================================================

#[tokio::test]
async fn test_root_without_frontend_bundle_returns_banner() {
    let response = app().oneshot(get("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Top-Up Store API");
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let response = app().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_game_detail_by_slug() {
    let response = app()
        .oneshot(get("/api/games/mobile-legends", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    // Game fields sit next to products, not under a "game" key
    assert_eq!(body["slug"], "mobile-legends");
    assert_eq!(body["products"][0]["price"], UNIT_PRICE);
}

#[tokio::test]
async fn test_unknown_game_slug_is_not_found() {
    let response = app()
        .oneshot(get("/api/games/no-such-game", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_api_path_is_json_not_found() {
    let response = app().oneshot(get("/api/nope", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_game_list_is_paginated_and_hides_inactive() {
    let response = app()
        .oneshot(get("/api/games?page=2&per_page=5", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["per_page"], 5);
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn test_game_list_rejects_huge_page() {
    let uri = format!("/api/games?page={}", u64::MAX);
    let response = app().oneshot(get(&uri, None)).await.unwrap();

    let body = assert_json_bad_request(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_game_list_rejects_non_numeric_page() {
    let response = app().oneshot(get("/api/games?page=abc", None)).await.unwrap();

    assert_json_bad_request(response).await;
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_register_duplicate_email_is_bad_request() {
    let request = post_json(
        "/api/auth/register",
        json!({"email": TAKEN_EMAIL, "password": "password123", "name": "Dup"}),
    );
    let response = app().oneshot(request).await.unwrap();

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let request = post_json(
        "/api/auth/register",
        json!({"email": "new@example.com", "password": "short", "name": "New"}),
    );
    let response = app().oneshot(request).await.unwrap();

    let body = assert_json_bad_request(response).await;
    assert_eq!(body["error"]["message"], "Password must be at least 8 characters");
}

#[tokio::test]
async fn test_register_creates_account() {
    let request = post_json(
        "/api/auth/register",
        json!({"email": "new@example.com", "password": "password123", "name": "New"}),
    );
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["email"], "new@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let request = post_json(
        "/api/auth/login",
        json!({"email": "player@example.com", "password": "password123"}),
    );
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_token=valid-test-token"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let request = post_json(
        "/api/auth/login",
        json!({"email": "player@example.com", "password": "nope-nope"}),
    );
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_accepts_cookie() {
    let request = Request::builder()
        .uri("/api/auth/session")
        .header(header::COOKIE, format!("session_token={}", USER_TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], CUSTOMER_ID.to_string());
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_requires_authentication() {
    let response = app().oneshot(get("/api/user/profile", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_with_token_returns_user() {
    let response = app()
        .oneshot(get("/api/user/profile", Some(USER_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["email"], "player@example.com");
}

#[tokio::test]
async fn test_profile_rejects_unsupported_method() {
    let request = request(Method::POST, "/api/user/profile", Some(USER_TOKEN), None);
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Checkout and Orders
// =============================================================================

fn checkout_body(items: Value) -> Value {
    json!({
        "game_id": GAME_ID,
        "game_account_id": "12345678",
        "game_server": "2001",
        "items": items
    })
}

#[tokio::test]
async fn test_checkout_requires_authentication() {
    let body = checkout_body(json!([{"product_id": PRODUCT_ID, "quantity": 1}]));
    let response = app()
        .oneshot(request(Method::POST, "/api/orders", None, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkout_returns_order_with_payment_url() {
    let body = checkout_body(json!([{"product_id": PRODUCT_ID, "quantity": 3}]));
    let response = app()
        .oneshot(request(Method::POST, "/api/orders", Some(USER_TOKEN), Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    // Order fields sit next to the items, not under an "order" key
    assert!(body.get("order").is_none());
    assert_eq!(body["status"], "pending");
    assert_eq!(body["user_id"], CUSTOMER_ID.to_string());
    assert_eq!(body["payment_url"], "https://pay.example/snap-token");
    assert_eq!(body["total_amount"], UNIT_PRICE * 3);
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["items"][0]["subtotal"], UNIT_PRICE * 3);
}

#[tokio::test]
async fn test_checkout_without_items_is_bad_request() {
    let body = checkout_body(json!([]));
    let response = app()
        .oneshot(request(Method::POST, "/api/orders", Some(USER_TOKEN), Some(body)))
        .await
        .unwrap();

    let body = assert_json_bad_request(response).await;
    assert_eq!(body["error"]["message"], "Order must contain at least one item");
}

#[tokio::test]
async fn test_checkout_for_unavailable_game_is_bad_request() {
    let mut body = checkout_body(json!([{"product_id": PRODUCT_ID, "quantity": 1}]));
    body["game_id"] = json!(Uuid::new_v4());
    let response = app()
        .oneshot(request(Method::POST, "/api/orders", Some(USER_TOKEN), Some(body)))
        .await
        .unwrap();

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_orders_require_authentication() {
    let response = app().oneshot(get("/api/orders", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_history_lists_callers_orders() {
    let response = app()
        .oneshot(get("/api/orders", Some(USER_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["id"], OWN_ORDER_ID.to_string());
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn test_own_order_is_returned_with_items() {
    let uri = format!("/api/orders/{}", OWN_ORDER_ID);
    let response = app().oneshot(get(&uri, Some(USER_TOKEN))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], OWN_ORDER_ID.to_string());
    assert_eq!(body["items"][0]["product_id"], PRODUCT_ID.to_string());
}

#[tokio::test]
async fn test_someone_elses_order_is_forbidden() {
    let uri = format!("/api/orders/{}", FOREIGN_ORDER_ID);
    let response = app().oneshot(get(&uri, Some(USER_TOKEN))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_read_any_order() {
    let uri = format!("/api/orders/{}", FOREIGN_ORDER_ID);
    let response = app().oneshot(get(&uri, Some(ADMIN_TOKEN))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let uri = format!("/api/orders/{}", Uuid::new_v4());
    let response = app().oneshot(get(&uri, Some(USER_TOKEN))).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_order_id_is_bad_request() {
    let response = app()
        .oneshot(get("/api/orders/not-a-uuid", Some(USER_TOKEN)))
        .await
        .unwrap();

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_order_history_rejects_huge_page() {
    let uri = format!("/api/orders?page={}", u64::MAX);
    let response = app().oneshot(get(&uri, Some(USER_TOKEN))).await.unwrap();

    assert_json_bad_request(response).await;
}

// =============================================================================
// Payment Notifications
// =============================================================================

#[tokio::test]
async fn test_notification_with_bad_signature_is_unauthorized() {
    let request = post_json(
        "/api/payments/notification",
        json!({
            "order_id": Uuid::new_v4().to_string(),
            "status_code": "200",
            "gross_amount": "40000.00",
            "transaction_status": "settlement",
            "signature_key": "forged"
        }),
    );
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_incomplete_notification_is_json_bad_request() {
    let request = post_json("/api/payments/notification", json!({"order_id": "x"}));
    let response = app().oneshot(request).await.unwrap();

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_notification_that_is_not_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/payments/notification")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("order_id=x"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_json_bad_request(response).await;
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_stats_without_token_is_unauthorized() {
    let response = app().oneshot(get("/api/admin/stats", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_stats_for_customer_is_forbidden() {
    let response = app()
        .oneshot(get("/api/admin/stats", Some(USER_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_stats_for_admin() {
    let response = app()
        .oneshot(get("/api/admin/stats", Some(ADMIN_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["products"], 3);
}

#[tokio::test]
async fn test_admin_user_writes_for_customer_are_forbidden() {
    let uri = format!("/api/admin/users/{}", MEMBER_ID);
    let response = app()
        .oneshot(request(Method::DELETE, &uri, Some(USER_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_and_reads_users() {
    let response = app()
        .oneshot(get("/api/admin/users?include_deleted=true", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["id"], MEMBER_ID.to_string());
    assert!(body["data"][0].get("password_hash").is_none());

    let uri = format!("/api/admin/users/{}", MEMBER_ID);
    let response = app().oneshot(get(&uri, Some(ADMIN_TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/admin/users/{}", Uuid::new_v4());
    let response = app().oneshot(get(&uri, Some(ADMIN_TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_updates_user_role() {
    let uri = format!("/api/admin/users/{}", MEMBER_ID);
    let response = app()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(ADMIN_TOKEN),
            Some(json!({"role": "admin"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["role"], "admin");

    let response = app()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(ADMIN_TOKEN),
            Some(json!({"role": "owner"})),
        ))
        .await
        .unwrap();
    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_admin_deletes_and_restores_user() {
    let uri = format!("/api/admin/users/{}", MEMBER_ID);
    let response = app()
        .oneshot(request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let uri = format!("/api/admin/users/{}/restore", MEMBER_ID);
    let response = app()
        .oneshot(request(Method::POST, &uri, Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_delete_themselves() {
    let uri = format!("/api/admin/users/{}", ADMIN_ID);
    let response = app()
        .oneshot(request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None))
        .await
        .unwrap();

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_admin_catalog_crud() {
    let response = app()
        .oneshot(request(
            Method::POST,
            "/api/admin/categories",
            Some(ADMIN_TOKEN),
            Some(json!({"name": "Battle Royale"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["slug"], "battle-royale");

    let response = app()
        .oneshot(request(
            Method::POST,
            "/api/admin/games",
            Some(ADMIN_TOKEN),
            Some(json!({"name": "Free Fire", "slug": "free-fire", "category_id": CATEGORY_ID})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["slug"], "free-fire");
    assert_eq!(body["is_active"], true);

    let uri = format!("/api/admin/games/{}", GAME_ID);
    let response = app()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(ADMIN_TOKEN),
            Some(json!({"is_active": false})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_active"], false);

    let uri = format!("/api/admin/games/{}/products", GAME_ID);
    let response = app()
        .oneshot(request(
            Method::POST,
            &uri,
            Some(ADMIN_TOKEN),
            Some(json!({"name": "172 Diamonds", "price": 40000})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["price"], 40000);

    let uri = format!("/api/admin/products/{}", PRODUCT_ID);
    let response = app()
        .oneshot(request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let uri = format!("/api/admin/categories/{}", CATEGORY_ID);
    let response = app()
        .oneshot(request(Method::DELETE, &uri, Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_admin_duplicate_game_slug_is_bad_request() {
    let response = app()
        .oneshot(request(
            Method::POST,
            "/api/admin/games",
            Some(ADMIN_TOKEN),
            Some(json!({"name": "Mobile Legends", "slug": "mobile-legends"})),
        ))
        .await
        .unwrap();

    assert_json_bad_request(response).await;
}

#[tokio::test]
async fn test_admin_product_for_unknown_game_is_not_found() {
    let uri = format!("/api/admin/games/{}/products", Uuid::new_v4());
    let response = app()
        .oneshot(request(
            Method::POST,
            &uri,
            Some(ADMIN_TOKEN),
            Some(json!({"name": "Pass", "price": 10000})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_game_list_includes_inactive_and_searches() {
    let response = app()
        .oneshot(get("/api/admin/games?search=arena", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["slug"], "legends-arena");
    assert_eq!(body["data"][0]["is_active"], false);

    let response = app()
        .oneshot(get("/api/games?search=arena", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["meta"]["total"], 0);
}

#[tokio::test]
async fn test_admin_order_status_update() {
    let uri = format!("/api/admin/orders/{}/status", OWN_ORDER_ID);
    let response = app()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(ADMIN_TOKEN),
            Some(json!({"status": "completed"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "completed");
}

#[tokio::test]
async fn test_admin_order_status_unknown_value_is_bad_request() {
    let uri = format!("/api/admin/orders/{}/status", OWN_ORDER_ID);
    let response = app()
        .oneshot(request(
            Method::PUT,
            &uri,
            Some(ADMIN_TOKEN),
            Some(json!({"status": "shipped"})),
        ))
        .await
        .unwrap();

    let body = assert_json_bad_request(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_admin_order_list_rejects_unknown_status_filter() {
    let response = app()
        .oneshot(get("/api/admin/orders?status=shipped", Some(ADMIN_TOKEN)))
        .await
        .unwrap();

    assert_json_bad_request(response).await;
}

// =============================================================================
// Frontend Page Guard
// =============================================================================

#[tokio::test]
async fn test_account_page_redirects_to_login() {
    let response = app().oneshot(get("/account", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?callbackUrl=%2Faccount"
    );
}

#[tokio::test]
async fn test_redirect_keeps_query_string() {
    let response = app().oneshot(get("/orders?x=1", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?callbackUrl=%2Forders%3Fx%3D1"
    );
}

#[tokio::test]
async fn test_account_page_with_session_serves_frontend() {
    let request = Request::builder()
        .uri("/account/settings")
        .header(header::COOKIE, format!("session_token={}", USER_TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = app_with_frontend().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body_text(response).await, "<html>storefront</html>");
}

#[tokio::test]
async fn test_account_page_with_invalid_session_redirects() {
    let request = Request::builder()
        .uri("/account")
        .header(header::COOKIE, "session_token=expired")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_public_page_is_not_guarded() {
    let response = app_with_frontend()
        .oneshot(get("/accounting", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
