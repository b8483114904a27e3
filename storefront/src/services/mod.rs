// storefront/src/services/mod.rs

//! Order operations. Placement and reconciliation run as registered pipelines;
//! administration talks to the order store directly.

pub mod cart_reducer;
pub mod order_admin;
pub mod order_placement;
pub mod reconciliation;
