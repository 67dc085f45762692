//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod category;
pub mod game;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;
