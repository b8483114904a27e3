// storefront/src/models/cart.rs

use std::collections::BTreeMap;

/// Client-held cart: product id -> size -> quantity.
///
/// Ordered maps keep line-item order stable for a given cart. Quantities of
/// zero or less mean "not in the cart".
pub type CartSnapshot = BTreeMap<String, BTreeMap<String, i64>>;
