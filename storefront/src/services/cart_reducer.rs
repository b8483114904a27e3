// storefront/src/services/cart_reducer.rs

use tracing::{debug, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::models::{CartSnapshot, LineItem};
use crate::store::ProductCatalog;

/// Flattens a cart into line items priced from the catalog.
///
/// Order follows the cart's key order (product id, then size). Non-positive
/// quantities are ignored and products missing from the catalog are dropped.
/// An empty result is [`AppError::EmptyOrder`].
#[instrument(skip_all, fields(products = cart.len()))]
pub async fn resolve_line_items(cart: &CartSnapshot, catalog: &dyn ProductCatalog) -> AppResult<Vec<LineItem>> {
  let mut items = Vec::new();

  for (product_id, sizes) in cart {
    let wanted: Vec<(&String, i64)> = sizes.iter().filter(|(_, qty)| **qty > 0).map(|(s, q)| (s, *q)).collect();
    if wanted.is_empty() {
      continue;
    }

    let Some(product) = catalog.find_product(product_id).await? else {
      debug!(%product_id, "Cart references a product that no longer exists; skipping.");
      continue;
    };

    for (size, quantity) in wanted {
      items.push(LineItem::from_product(&product, size, quantity));
    }
  }

  if items.is_empty() {
    return Err(AppError::EmptyOrder);
  }
  debug!(line_items = items.len(), "Cart resolved.");
  Ok(items)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Product;
  use crate::store::MemoryCatalog;
  use rust_decimal::Decimal;
  use std::collections::BTreeMap;

  fn product(id: &str, price: i64) -> Product {
    Product {
      id: id.to_string(),
      name: format!("Product {}", id),
      description: String::new(),
      price: Decimal::from(price),
      image: vec![format!("https://img.example/{}.png", id)],
    }
  }

  fn cart(entries: &[(&str, &str, i64)]) -> CartSnapshot {
    let mut cart: CartSnapshot = BTreeMap::new();
    for (pid, size, qty) in entries {
      cart.entry(pid.to_string()).or_default().insert(size.to_string(), *qty);
    }
    cart
  }

  #[tokio::test]
  async fn flattens_sizes_in_key_order() {
    let catalog = MemoryCatalog::with_products([product("P1", 100), product("P2", 50)]);
    let items = resolve_line_items(&cart(&[("P2", "L", 1), ("P1", "S", 1), ("P1", "M", 2)]), &catalog)
      .await
      .unwrap();

    let flat: Vec<(&str, &str, i64)> = items
      .iter()
      .map(|i| (i.product_id.as_str(), i.size.as_str(), i.quantity))
      .collect();
    assert_eq!(flat, vec![("P1", "M", 2), ("P1", "S", 1), ("P2", "L", 1)]);
    assert_eq!(items[0].price, Decimal::from(100));
    assert_eq!(items[0].name, "Product P1");
  }

  #[tokio::test]
  async fn skips_non_positive_quantities_and_dangling_products() {
    let catalog = MemoryCatalog::with_products([product("P1", 100)]);
    let items = resolve_line_items(&cart(&[("P1", "M", 0), ("P1", "L", -3), ("P1", "S", 1), ("GONE", "M", 4)]), &catalog)
      .await
      .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].size, "S");
  }

  #[tokio::test]
  async fn nothing_purchasable_is_empty_order() {
    let catalog = MemoryCatalog::with_products([product("P1", 100)]);
    for snapshot in [cart(&[]), cart(&[("P1", "M", 0)]), cart(&[("GONE", "M", 2)])] {
      let err = resolve_line_items(&snapshot, &catalog).await.unwrap_err();
      assert!(matches!(err, AppError::EmptyOrder));
    }
  }
}
