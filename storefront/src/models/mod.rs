// storefront/src/models/mod.rs

//! Records shared by the stores, the services and the HTTP layer.

pub mod cart;
pub mod line_item;
pub mod order;
pub mod product;

pub use cart::CartSnapshot;
pub use line_item::LineItem;
pub use order::{Address, Order, OrderDraft, OrderStatus, PaymentMethod};
pub use product::Product;
