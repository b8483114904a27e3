// storefront/src/store/memory.rs

//! In-process stores, used when `STORE_BACKEND=memory` and by the test suites.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{CartStore, OrderPatch, OrderStore, PatchOutcome, ProductCatalog, StoreError};
use crate::models::{CartSnapshot, Order, OrderDraft, Product};

#[derive(Default)]
pub struct MemoryOrderStore {
  orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.orders.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.orders.read().is_empty()
  }

  fn sorted_newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  #[instrument(skip_all, fields(user_id = %draft.user_id))]
  async fn create(&self, draft: OrderDraft) -> Result<Order, StoreError> {
    let order = Order::from_draft(Uuid::new_v4(), draft, Utc::now());
    self.orders.write().insert(order.id, order.clone());
    debug!(order_id = %order.id, "Order stored in memory.");
    Ok(order)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Order, StoreError> {
    self
      .orders
      .read()
      .get(&id)
      .cloned()
      .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))
  }

  #[instrument(skip(self))]
  async fn update_by_id(&self, id: Uuid, patch: OrderPatch) -> Result<PatchOutcome, StoreError> {
    // Check and write under one guard.
    let mut orders = self.orders.write();
    let order = orders
      .get_mut(&id)
      .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))?;
    let kind = patch.apply_to(order);
    debug!(?kind, "Patch evaluated.");
    Ok(kind.with(order.clone()))
  }

  async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
    let orders = self
      .orders
      .read()
      .values()
      .filter(|o| o.user_id == user_id)
      .cloned()
      .collect();
    Ok(Self::sorted_newest_first(orders))
  }

  async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
    let orders = self.orders.read().values().cloned().collect();
    Ok(Self::sorted_newest_first(orders))
  }
}

#[derive(Default)]
pub struct MemoryCatalog {
  products: RwLock<HashMap<String, Product>>,
}

impl MemoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
    let catalog = Self::new();
    for product in products {
      catalog.upsert(product);
    }
    catalog
  }

  /// Loads a JSON array of products.
  pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
    let raw = std::fs::read_to_string(path)?;
    let products: Vec<Product> = serde_json::from_str(&raw)?;
    info!(path = %path.display(), count = products.len(), "Catalog loaded from file.");
    Ok(Self::with_products(products))
  }

  pub fn upsert(&self, product: Product) {
    self.products.write().insert(product.id.clone(), product);
  }

  pub fn remove(&self, id: &str) -> Option<Product> {
    self.products.write().remove(id)
  }
}

#[async_trait]
impl ProductCatalog for MemoryCatalog {
  async fn find_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
    Ok(self.products.read().get(id).cloned())
  }
}

/// Server-side carts. Counts successful clears and can be switched to fail,
/// which lets callers observe the best-effort clearing paths.
#[derive(Default)]
pub struct MemoryCartStore {
  carts: RwLock<HashMap<String, CartSnapshot>>,
  clears: AtomicUsize,
  unavailable: AtomicBool,
}

impl MemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn put_cart(&self, user_id: &str, cart: CartSnapshot) {
    self.carts.write().insert(user_id.to_string(), cart);
  }

  pub fn cart(&self, user_id: &str) -> CartSnapshot {
    self.carts.read().get(user_id).cloned().unwrap_or_default()
  }

  /// Test hook: successful clears so far.
  pub fn clear_count(&self) -> usize {
    self.clears.load(Ordering::SeqCst)
  }

  /// Test hook: while set, `clear_cart` fails with `Unavailable`.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }
}

#[async_trait]
impl CartStore for MemoryCartStore {
  async fn clear_cart(&self, user_id: &str) -> Result<(), StoreError> {
    if self.unavailable.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("cart store switched off".to_string()));
    }
    self.carts.write().insert(user_id.to_string(), CartSnapshot::new());
    self.clears.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}
