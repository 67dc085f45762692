//! Public storefront catalog.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::{Validate, ValidationErrors};

use crate::api::extractors::ValidatedQuery;
use crate::api::AppState;
use crate::domain::{Category, Game, GameDetail, GameFilter};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginatedGames, PaginationParams};

/// Game listing query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameListQuery {
    /// Category slug
    pub category: Option<String>,
    /// Case-insensitive name search
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl GameListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::from_query(self.page, self.per_page)
    }

    /// Catalog filter; `include_inactive` is only set by the admin listing.
    pub fn into_filter(self, include_inactive: bool) -> GameFilter {
        GameFilter {
            category_slug: self.category.filter(|c| !c.trim().is_empty()),
            search: self.search,
            include_inactive,
        }
    }
}

impl Validate for GameListQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.pagination().validate()
    }
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/games", get(list_games))
        .route("/games/:slug", get(get_game))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses((status = 200, description = "All categories by name", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog_service.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/games",
    tag = "Catalog",
    params(GameListQuery),
    responses(
        (status = 200, description = "Active games by name", body = PaginatedGames),
        (status = 400, description = "Malformed query or page out of range")
    )
)]
pub async fn list_games(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<GameListQuery>,
) -> AppResult<Json<Paginated<Game>>> {
    let params = query.pagination();
    let filter = query.into_filter(false);
    Ok(Json(state.catalog_service.list_games(filter, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/games/{slug}",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Game slug")),
    responses(
        (status = 200, description = "Game with category and active products", body = GameDetail),
        (status = 404, description = "Unknown or inactive game")
    )
)]
pub async fn get_game(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<GameDetail>> {
    Ok(Json(state.catalog_service.get_game(&slug).await?))
}
