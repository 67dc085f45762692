//! Shared request/response types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginatedGames, PaginatedOrders, PaginatedUsers, PaginationMeta, PaginationParams};
pub use response::{Created, MessageResponse, NoContent};
