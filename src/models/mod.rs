//! Data structures representing database entities.

pub mod order;
pub mod product;
pub mod user;

pub use order::{CustomerInfo, NewOrder, Order, OrderLine, OrderedProduct};
pub use product::Product;
pub use user::User;
