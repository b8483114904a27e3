// storefront/src/store/mod.rs

//! Persistence contracts: orders, the product catalog and server-side carts.
//!
//! Each contract has an in-memory implementation (development and tests) and a
//! PostgreSQL one. Order patches are conditional: the check and the write happen
//! as one atomic step per order, which is what makes payment confirmation
//! exactly-once under concurrent callbacks.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Order, OrderDraft, OrderStatus, Product};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCartStore, MemoryCatalog, MemoryOrderStore};
pub use postgres::{PgCartStore, PgCatalog, PgOrderStore};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{0} not found")]
  NotFound(String),

  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("{0}")]
  Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
  fn from(err: sqlx::Error) -> Self {
    match err {
      sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
      other => StoreError::Unavailable(other.to_string()),
    }
  }
}

/// A conditional change to one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPatch {
  /// Applies only while the order is unpaid: sets `payment`, `payment_id`, and
  /// moves `Placed` to `PaymentConfirmed`.
  ConfirmPayment { payment_id: String },
  /// Compare-and-set on the status field.
  SetStatus { expected: OrderStatus, next: OrderStatus },
  /// Claims the post-payment cart clear. Applies once per paid order; an
  /// unpaid order is `Stale`, an already claimed one `Unchanged`.
  MarkCartCleared,
  /// Gives the claim back after the cart store failed, so a later
  /// confirmation retries the clear.
  UnmarkCartCleared,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
  /// The patch was written; carries the updated order.
  Applied(Order),
  /// The patch's effect was already in place (e.g. order already paid).
  Unchanged(Order),
  /// The precondition no longer holds; carries the order as it is now.
  Stale(Order),
}

impl OrderPatch {
  /// Applies the patch to an in-memory order. Shared by every store so the
  /// conditional rules live in one place.
  pub fn apply_to(&self, order: &mut Order) -> PatchKind {
    match self {
      OrderPatch::ConfirmPayment { payment_id } => {
        if order.payment {
          return PatchKind::Unchanged;
        }
        order.payment = true;
        order.payment_id = Some(payment_id.clone());
        if order.status == OrderStatus::Placed {
          order.status = OrderStatus::PaymentConfirmed;
        }
        PatchKind::Applied
      }
      OrderPatch::SetStatus { expected, next } => {
        if order.status != *expected {
          return PatchKind::Stale;
        }
        order.status = *next;
        PatchKind::Applied
      }
      OrderPatch::MarkCartCleared => {
        if !order.payment {
          return PatchKind::Stale;
        }
        if order.cart_cleared {
          return PatchKind::Unchanged;
        }
        order.cart_cleared = true;
        PatchKind::Applied
      }
      OrderPatch::UnmarkCartCleared => {
        if !order.cart_cleared {
          return PatchKind::Unchanged;
        }
        order.cart_cleared = false;
        PatchKind::Applied
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
  Applied,
  Unchanged,
  Stale,
}

impl PatchKind {
  pub fn with(self, order: Order) -> PatchOutcome {
    match self {
      PatchKind::Applied => PatchOutcome::Applied(order),
      PatchKind::Unchanged => PatchOutcome::Unchanged(order),
      PatchKind::Stale => PatchOutcome::Stale(order),
    }
  }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists a new unpaid order in status `Placed`.
  async fn create(&self, draft: OrderDraft) -> Result<Order, StoreError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Order, StoreError>;

  async fn update_by_id(&self, id: Uuid, patch: OrderPatch) -> Result<PatchOutcome, StoreError>;

  /// Newest first.
  async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError>;

  /// Newest first.
  async fn list_all(&self) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
  /// `Ok(None)` when the product does not exist (any more).
  async fn find_product(&self, id: &str) -> Result<Option<Product>, StoreError>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  async fn clear_cart(&self, user_id: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Address, PaymentMethod};
  use chrono::Utc;
  use rust_decimal::Decimal;

  fn order(method: PaymentMethod) -> Order {
    let draft = OrderDraft {
      user_id: "u1".into(),
      items: vec![],
      amount: Decimal::from(10),
      address: Address::default(),
      payment_method: method,
    };
    Order::from_draft(Uuid::new_v4(), draft, Utc::now())
  }

  #[test]
  fn confirm_payment_applies_once() {
    let mut o = order(PaymentMethod::Razorpay);
    let patch = OrderPatch::ConfirmPayment {
      payment_id: "pay_1".into(),
    };
    assert_eq!(patch.apply_to(&mut o), PatchKind::Applied);
    assert!(o.payment);
    assert_eq!(o.payment_id.as_deref(), Some("pay_1"));
    assert_eq!(o.status, OrderStatus::PaymentConfirmed);

    let again = OrderPatch::ConfirmPayment {
      payment_id: "pay_2".into(),
    };
    assert_eq!(again.apply_to(&mut o), PatchKind::Unchanged);
    assert_eq!(o.payment_id.as_deref(), Some("pay_1"));
  }

  #[test]
  fn confirm_payment_keeps_later_status() {
    let mut o = order(PaymentMethod::Razorpay);
    o.status = OrderStatus::Packing;
    let patch = OrderPatch::ConfirmPayment {
      payment_id: "pay_1".into(),
    };
    assert_eq!(patch.apply_to(&mut o), PatchKind::Applied);
    assert_eq!(o.status, OrderStatus::Packing);
  }

  #[test]
  fn set_status_is_compare_and_set() {
    let mut o = order(PaymentMethod::CashOnDelivery);
    let stale = OrderPatch::SetStatus {
      expected: OrderStatus::Packing,
      next: OrderStatus::Shipped,
    };
    assert_eq!(stale.apply_to(&mut o), PatchKind::Stale);
    assert_eq!(o.status, OrderStatus::Placed);

    let ok = OrderPatch::SetStatus {
      expected: OrderStatus::Placed,
      next: OrderStatus::Packing,
    };
    assert_eq!(ok.apply_to(&mut o), PatchKind::Applied);
    assert_eq!(o.status, OrderStatus::Packing);
  }

  #[test]
  fn cart_clear_is_claimed_once_per_paid_order() {
    let mut o = order(PaymentMethod::Razorpay);
    assert_eq!(OrderPatch::MarkCartCleared.apply_to(&mut o), PatchKind::Stale);
    assert!(!o.cart_cleared);

    o.payment = true;
    assert_eq!(OrderPatch::MarkCartCleared.apply_to(&mut o), PatchKind::Applied);
    assert!(o.cart_cleared);
    assert_eq!(OrderPatch::MarkCartCleared.apply_to(&mut o), PatchKind::Unchanged);

    assert_eq!(OrderPatch::UnmarkCartCleared.apply_to(&mut o), PatchKind::Applied);
    assert!(!o.cart_cleared);
    assert_eq!(OrderPatch::UnmarkCartCleared.apply_to(&mut o), PatchKind::Unchanged);
    assert_eq!(OrderPatch::MarkCartCleared.apply_to(&mut o), PatchKind::Applied);
  }
}
