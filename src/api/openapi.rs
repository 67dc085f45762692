//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, catalog_handler, order_handler, payment_handler,
    profile_handler,
};
use crate::domain::{
    Category, Game, GameDetail, Order, OrderDetail, OrderItem, OrderLineRequest, OrderStatus,
    PaymentNotification, Product, UserResponse, UserRole,
};
use crate::services::{DashboardStats, TokenResponse};
use crate::types::{
    MessageResponse, PaginatedGames, PaginatedOrders, PaginatedUsers, PaginationMeta,
};

/// OpenAPI documentation for the storefront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Top-Up Store API",
        version = "0.1.0",
        description = "Game top-up and voucher storefront: catalog, checkout, payment webhook and admin dashboard",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::session,
        // Profile
        profile_handler::get_profile,
        profile_handler::update_profile,
        profile_handler::change_password,
        // Catalog
        catalog_handler::list_categories,
        catalog_handler::list_games,
        catalog_handler::get_game,
        // Orders
        order_handler::create_order,
        order_handler::list_orders,
        order_handler::get_order,
        // Payments
        payment_handler::notification,
        // Admin
        admin_handler::stats,
        admin_handler::list_users,
        admin_handler::get_user,
        admin_handler::update_user,
        admin_handler::delete_user,
        admin_handler::restore_user,
        admin_handler::create_category,
        admin_handler::delete_category,
        admin_handler::list_games,
        admin_handler::create_game,
        admin_handler::update_game,
        admin_handler::delete_game,
        admin_handler::create_product,
        admin_handler::update_product,
        admin_handler::delete_product,
        admin_handler::list_orders,
        admin_handler::update_order_status,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            Category,
            Game,
            GameDetail,
            Product,
            Order,
            OrderItem,
            OrderDetail,
            OrderLineRequest,
            OrderStatus,
            PaymentNotification,
            // Shared
            MessageResponse,
            PaginationMeta,
            PaginatedGames,
            PaginatedOrders,
            PaginatedUsers,
            TokenResponse,
            DashboardStats,
            // Request bodies
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            profile_handler::UpdateProfileRequest,
            profile_handler::ChangePasswordRequest,
            order_handler::CreateOrderRequest,
            admin_handler::UpdateUserRequest,
            admin_handler::CreateCategoryRequest,
            admin_handler::CreateGameRequest,
            admin_handler::UpdateGameRequest,
            admin_handler::CreateProductRequest,
            admin_handler::UpdateProductRequest,
            admin_handler::UpdateOrderStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and sessions"),
        (name = "Profile", description = "Signed-in user's own account"),
        (name = "Catalog", description = "Public games and products"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Payments", description = "Payment gateway webhook"),
        (name = "Admin", description = "Dashboard operations, admin role only")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT from /api/auth/login; the session_token cookie is also accepted",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_storefront_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/games/{slug}"));
        assert!(paths.contains_key("/api/payments/notification"));
        assert!(paths.contains_key("/api/admin/orders/{id}/status"));
    }
}
