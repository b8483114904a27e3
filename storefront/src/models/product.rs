// storefront/src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog record. Prices are in major currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  #[serde(default)]
  pub image: Vec<String>,
}
