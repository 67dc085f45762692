//! Catalog service - storefront browsing and admin catalog management.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::catalog::{resolve_slug, validate_price};
use crate::domain::{
    Category, Game, GameChanges, GameDetail, GameFilter, NewGame, NewProduct, Product,
    ProductChanges,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    /// Games matching `filter`, ordered by name.
    async fn list_games(&self, filter: GameFilter, params: PaginationParams) -> AppResult<Paginated<Game>>;

    /// Storefront game page. Inactive games are reported as missing.
    async fn get_game(&self, slug: &str) -> AppResult<GameDetail>;

    async fn create_category(&self, name: String, slug: Option<String>) -> AppResult<Category>;

    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    /// Create a game. An empty `slug` is derived from the name.
    async fn create_game(&self, game: NewGame) -> AppResult<Game>;

    async fn update_game(&self, id: Uuid, changes: GameChanges) -> AppResult<Game>;

    async fn delete_game(&self, id: Uuid) -> AppResult<()>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    async fn delete_product(&self, id: Uuid) -> AppResult<()>;
}

pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_category_exists(&self, id: Option<Uuid>) -> AppResult<()> {
        if let Some(id) = id {
            if self.uow.catalog().find_category(id).await?.is_none() {
                return Err(AppError::bad_request(format!("Category {} does not exist", id)));
            }
        }
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        if self.uow.catalog().game_slug_taken(slug, except).await? {
            return Err(AppError::bad_request(format!(
                "A game with slug '{}' already exists",
                slug
            )));
        }
        Ok(())
    }
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    Ok(name.to_string())
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.uow.catalog().list_categories().await
    }

    async fn list_games(&self, filter: GameFilter, params: PaginationParams) -> AppResult<Paginated<Game>> {
        let filter = GameFilter {
            search: filter
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            ..filter
        };
        let (games, total) = self.uow.catalog().list_games(&filter, &params).await?;
        Ok(Paginated::new(games, &params, total))
    }

    async fn get_game(&self, slug: &str) -> AppResult<GameDetail> {
        let catalog = self.uow.catalog();
        let game = catalog
            .find_game_by_slug(slug)
            .await?
            .filter(|g| g.is_active)
            .ok_or_not_found()?;

        let category = match game.category_id {
            Some(id) => catalog.find_category(id).await?,
            None => None,
        };
        let products = catalog.list_products(game.id, false).await?;

        Ok(GameDetail {
            game,
            category,
            products,
        })
    }

    async fn create_category(&self, name: String, slug: Option<String>) -> AppResult<Category> {
        let name = required_name(&name)?;
        let slug = resolve_slug(slug.as_deref().filter(|s| !s.trim().is_empty()), &name)?;

        let catalog = self.uow.catalog();
        if catalog.find_category_by_slug(&slug).await?.is_some() {
            return Err(AppError::bad_request(format!(
                "A category with slug '{}' already exists",
                slug
            )));
        }

        let category = catalog.create_category(name, slug).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        self.uow.catalog().delete_category(id).await
    }

    async fn create_game(&self, game: NewGame) -> AppResult<Game> {
        let name = required_name(&game.name)?;
        let requested = Some(game.slug.as_str()).filter(|s| !s.trim().is_empty());
        let slug = resolve_slug(requested, &name)?;

        self.ensure_category_exists(game.category_id).await?;
        self.ensure_slug_free(&slug, None).await?;

        let game = self
            .uow
            .catalog()
            .create_game(NewGame { name, slug, ..game })
            .await?;
        tracing::info!(game_id = %game.id, slug = %game.slug, "Game created");
        Ok(game)
    }

    async fn update_game(&self, id: Uuid, changes: GameChanges) -> AppResult<Game> {
        let current = self
            .uow
            .catalog()
            .find_game(id)
            .await?
            .ok_or_not_found()?;

        let name = changes.name.as_deref().map(required_name).transpose()?;
        let slug = match changes.slug.as_deref() {
            Some(slug) => {
                let slug = resolve_slug(Some(slug), name.as_deref().unwrap_or(&current.name))?;
                if slug != current.slug {
                    self.ensure_slug_free(&slug, Some(id)).await?;
                }
                Some(slug)
            }
            None => None,
        };
        self.ensure_category_exists(changes.category_id).await?;

        self.uow
            .catalog()
            .update_game(
                id,
                GameChanges {
                    name,
                    slug,
                    ..changes
                },
            )
            .await
    }

    async fn delete_game(&self, id: Uuid) -> AppResult<()> {
        self.uow.catalog().delete_game(id).await?;
        tracing::info!(game_id = %id, "Game deleted");
        Ok(())
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let name = required_name(&product.name)?;
        validate_price(product.price)?;

        let catalog = self.uow.catalog();
        if catalog.find_game(product.game_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        catalog.create_product(NewProduct { name, ..product }).await
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        if let Some(price) = changes.price {
            validate_price(price)?;
        }
        let name = changes.name.as_deref().map(required_name).transpose()?;

        self.uow
            .catalog()
            .update_product(id, ProductChanges { name, ..changes })
            .await
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        self.uow.catalog().delete_product(id).await
    }
}
