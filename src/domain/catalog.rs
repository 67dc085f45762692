//! Catalog entities: categories, games and their top-up products.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap_or_else(|e| panic!("invalid slug regex: {e}"))
});

/// Game category (e.g. "MOBA", "Battle Royale")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "MOBA")]
    pub name: String,
    #[schema(example = "moba")]
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A game customers can top up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Game {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Mobile Legends")]
    pub name: String,
    #[schema(example = "mobile-legends")]
    pub slug: String,
    #[schema(example = "Moonton")]
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub banner_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchasable denomination of a game's currency or voucher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub game_id: Uuid,
    #[schema(example = "86 Diamonds")]
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units
    #[schema(example = 20000)]
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Game page payload: the game, its category and its active products
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: Game,
    pub category: Option<Category>,
    pub products: Vec<Product>,
}

/// Listing filter for games
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub category_slug: Option<String>,
    pub search: Option<String>,
    pub include_inactive: bool,
}

/// Input for creating a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub banner_url: Option<String>,
    pub is_active: bool,
}

/// Partial update of a game; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameChanges {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub banner_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for creating a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub game_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

/// Derive a URL slug from a display name.
///
/// Non-alphanumeric runs collapse into a single hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Validate an explicit slug, or derive one from `name` when absent.
pub fn resolve_slug(slug: Option<&str>, name: &str) -> AppResult<String> {
    let slug = match slug {
        Some(s) => s.trim().to_string(),
        None => slugify(name),
    };
    if !SLUG_PATTERN.is_match(&slug) {
        return Err(AppError::validation(
            "Slug may only contain lowercase letters, digits and single hyphens",
        ));
    }
    Ok(slug)
}

/// Prices are strictly positive minor-unit amounts.
pub fn validate_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::validation("Price must be greater than zero"));
    }
    Ok(())
}
