//! Catalog repository: categories, games and products.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{
    category::{self, Entity as CategoryEntity},
    game::{self, Entity as GameEntity},
    product::{self, Entity as ProductEntity},
};
use crate::domain::{
    Category, Game, GameChanges, GameFilter, NewGame, NewProduct, Product, ProductChanges,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(test)]
use mockall::automock;

const LIKE_ESCAPE: char = '\\';

/// Case-folded `%…%` pattern matching `search` literally.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // Categories
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn find_category(&self, id: Uuid) -> AppResult<Option<Category>>;

    async fn find_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>>;

    async fn create_category(&self, name: String, slug: String) -> AppResult<Category>;

    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    // Games
    /// Page of games ordered by name. Inactive games only with `include_inactive`.
    async fn list_games(&self, filter: &GameFilter, params: &PaginationParams) -> AppResult<(Vec<Game>, u64)>;

    async fn find_game(&self, id: Uuid) -> AppResult<Option<Game>>;

    async fn find_game_by_slug(&self, slug: &str) -> AppResult<Option<Game>>;

    /// Whether another game already uses `slug`.
    async fn game_slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool>;

    async fn create_game(&self, game: NewGame) -> AppResult<Game>;

    async fn update_game(&self, id: Uuid, changes: GameChanges) -> AppResult<Game>;

    async fn delete_game(&self, id: Uuid) -> AppResult<()>;

    async fn count_games(&self) -> AppResult<u64>;

    // Products
    /// Products of a game, cheapest first.
    async fn list_products(&self, game_id: Uuid, include_inactive: bool) -> AppResult<Vec<Product>>;

    async fn find_products(&self, ids: Vec<Uuid>) -> AppResult<Vec<Product>>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    async fn delete_product(&self, id: Uuid) -> AppResult<()>;

    async fn count_products(&self) -> AppResult<u64>;
}

pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for CatalogStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(categories.into_iter().map(Category::from).collect())
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Category::from))
    }

    async fn find_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        Ok(CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .map(Category::from))
    }

    async fn create_category(&self, name: String, slug: String) -> AppResult<Category> {
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            slug: Set(slug),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(Category::from(model))
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let result = CategoryEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list_games(&self, filter: &GameFilter, params: &PaginationParams) -> AppResult<(Vec<Game>, u64)> {
        let mut query = GameEntity::find().order_by_asc(game::Column::Name);

        if !filter.include_inactive {
            query = query.filter(game::Column::IsActive.eq(true));
        }

        if let Some(slug) = &filter.category_slug {
            let category_ids: Vec<Uuid> = CategoryEntity::find()
                .select_only()
                .column(category::Column::Id)
                .filter(category::Column::Slug.eq(slug.as_str()))
                .into_tuple()
                .all(&self.db)
                .await?;
            if category_ids.is_empty() {
                return Ok((Vec::new(), 0));
            }
            query = query.filter(game::Column::CategoryId.is_in(category_ids));
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = LikeExpr::new(contains_pattern(search)).escape(LIKE_ESCAPE);
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((game::Entity, game::Column::Name)))).like(pattern),
            );
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let games = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Game::from)
            .collect();

        Ok((games, total))
    }

    async fn find_game(&self, id: Uuid) -> AppResult<Option<Game>> {
        Ok(GameEntity::find_by_id(id).one(&self.db).await?.map(Game::from))
    }

    async fn find_game_by_slug(&self, slug: &str) -> AppResult<Option<Game>> {
        Ok(GameEntity::find()
            .filter(game::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .map(Game::from))
    }

    async fn game_slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query = GameEntity::find().filter(game::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(game::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    async fn create_game(&self, new: NewGame) -> AppResult<Game> {
        let now = Utc::now();
        let model = game::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(new.category_id),
            name: Set(new.name),
            slug: Set(new.slug),
            publisher: Set(new.publisher),
            description: Set(new.description),
            image_url: Set(new.image_url),
            banner_url: Set(new.banner_url),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(Game::from(model))
    }

    async fn update_game(&self, id: Uuid, changes: GameChanges) -> AppResult<Game> {
        let mut active: game::ActiveModel = GameEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?
            .into();

        if let Some(category_id) = changes.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(publisher) = changes.publisher {
            active.publisher = Set(Some(publisher));
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(image_url) = changes.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(banner_url) = changes.banner_url {
            active.banner_url = Set(Some(banner_url));
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(Game::from(active.update(&self.db).await?))
    }

    async fn delete_game(&self, id: Uuid) -> AppResult<()> {
        let result = GameEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn count_games(&self) -> AppResult<u64> {
        Ok(GameEntity::find().count(&self.db).await?)
    }

    async fn list_products(&self, game_id: Uuid, include_inactive: bool) -> AppResult<Vec<Product>> {
        let mut query = ProductEntity::find()
            .filter(product::Column::GameId.eq(game_id))
            .order_by_asc(product::Column::Price);
        if !include_inactive {
            query = query.filter(product::Column::IsActive.eq(true));
        }
        Ok(query.all(&self.db).await?.into_iter().map(Product::from).collect())
    }

    async fn find_products(&self, ids: Vec<Uuid>) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    async fn create_product(&self, new: NewProduct) -> AppResult<Product> {
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            game_id: Set(new.game_id),
            name: Set(new.name),
            description: Set(new.description),
            price: Set(new.price),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(Product::from(model))
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        let mut active: product::ActiveModel = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?
            .into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(Product::from(active.update(&self.db).await?))
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let result = ProductEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn count_products(&self) -> AppResult<u64> {
        Ok(ProductEntity::find().count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Free Fire"), "%free fire%");
        assert_eq!(contains_pattern("%"), "%\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }
}
