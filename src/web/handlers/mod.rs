pub mod auth_handlers;
pub mod catalog_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod search_handlers;
