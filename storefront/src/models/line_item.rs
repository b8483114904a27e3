// storefront/src/models/line_item.rs

use crate::models::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One purchased (product, size) pair, copied out of the catalog at placement
/// time. Later catalog edits never reach a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub product_id: String,
  pub name: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  #[serde(default)]
  pub image: Vec<String>,
  pub size: String,
  pub quantity: i64,
}

impl LineItem {
  pub fn from_product(product: &Product, size: &str, quantity: i64) -> Self {
    Self {
      product_id: product.id.clone(),
      name: product.name.clone(),
      price: product.price,
      image: product.image.clone(),
      size: size.to_string(),
      quantity,
    }
  }

  /// `price * quantity`, or `None` on overflow.
  pub fn subtotal(&self) -> Option<Decimal> {
    self.price.checked_mul(Decimal::from(self.quantity))
  }
}
