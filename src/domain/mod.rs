//! Domain layer - Core business entities and logic
//!
//! Storefront concepts independent of persistence and transport:
//! users, the game catalog, orders and payment messages.

pub mod catalog;
pub mod order;
pub mod password;
pub mod payment;
pub mod user;

pub use catalog::{
    Category, Game, GameChanges, GameDetail, GameFilter, NewGame, NewProduct, Product,
    ProductChanges,
};
pub use order::{
    NewOrder, NewOrderItem, Order, OrderDetail, OrderItem, OrderLineRequest, OrderStatus,
};
pub use password::Password;
pub use payment::{PaymentNotification, PaymentRequest, PaymentSession};
pub use user::{ProfileChanges, User, UserResponse, UserRole};
