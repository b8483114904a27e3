// storefront/src/store/postgres.rs

//! PostgreSQL stores. Table layout is in `storefront/schema.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{CartStore, OrderPatch, OrderStore, PatchOutcome, ProductCatalog, StoreError};
use crate::models::{Address, LineItem, Order, OrderDraft, OrderStatus, PaymentMethod, Product};

const ORDER_COLUMNS: &str =
  "id, user_id, items, amount, address, payment_method, payment, payment_id, status, created_at, cart_cleared";

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: String,
  items: Json<Vec<LineItem>>,
  amount: Decimal,
  address: Json<Address>,
  payment_method: String,
  payment: bool,
  payment_id: Option<String>,
  status: String,
  created_at: DateTime<Utc>,
  cart_cleared: bool,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let payment_method = row
      .payment_method
      .parse::<PaymentMethod>()
      .map_err(|e| StoreError::Corrupt(format!("order {}: {}", row.id, e)))?;
    let status = row
      .status
      .parse::<OrderStatus>()
      .map_err(|e| StoreError::Corrupt(format!("order {}: {}", row.id, e)))?;
    Ok(Order {
      id: row.id,
      user_id: row.user_id,
      items: row.items.0,
      amount: row.amount,
      address: row.address.0,
      payment_method,
      payment: row.payment,
      payment_id: row.payment_id,
      status,
      created_at: row.created_at,
      cart_cleared: row.cart_cleared,
    })
  }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, StoreError> {
  rows.into_iter().map(Order::try_from).collect()
}

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn fetch_row(&self, id: Uuid) -> Result<Option<OrderRow>, StoreError> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, OrderRow>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  /// Resolves a conditional UPDATE that matched no row: either the order is
  /// missing or its precondition failed.
  async fn unmatched(&self, id: Uuid, stale: bool) -> Result<PatchOutcome, StoreError> {
    let current: Order = self
      .fetch_row(id)
      .await?
      .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))?
      .try_into()?;
    Ok(if stale {
      PatchOutcome::Stale(current)
    } else {
      PatchOutcome::Unchanged(current)
    })
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(skip_all, fields(user_id = %draft.user_id))]
  async fn create(&self, draft: OrderDraft) -> Result<Order, StoreError> {
    let order = Order::from_draft(Uuid::new_v4(), draft, Utc::now());
    let sql = format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
      ORDER_COLUMNS, ORDER_COLUMNS
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(order.id)
      .bind(&order.user_id)
      .bind(Json(&order.items))
      .bind(order.amount)
      .bind(Json(&order.address))
      .bind(order.payment_method.as_str())
      .bind(order.payment)
      .bind(&order.payment_id)
      .bind(order.status.as_str())
      .bind(order.created_at)
      .bind(order.cart_cleared)
      .fetch_one(&self.pool)
      .await?;
    debug!(order_id = %row.id, "Order inserted.");
    row.try_into()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Order, StoreError> {
    self
      .fetch_row(id)
      .await?
      .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))?
      .try_into()
  }

  #[instrument(skip(self))]
  async fn update_by_id(&self, id: Uuid, patch: OrderPatch) -> Result<PatchOutcome, StoreError> {
    match patch {
      OrderPatch::ConfirmPayment { payment_id } => {
        let sql = format!(
          "UPDATE orders SET payment = TRUE, payment_id = $2, \
           status = CASE WHEN status = $3 THEN $4 ELSE status END \
           WHERE id = $1 AND payment = FALSE RETURNING {}",
          ORDER_COLUMNS
        );
        let updated = sqlx::query_as::<_, OrderRow>(&sql)
          .bind(id)
          .bind(&payment_id)
          .bind(OrderStatus::Placed.as_str())
          .bind(OrderStatus::PaymentConfirmed.as_str())
          .fetch_optional(&self.pool)
          .await?;
        match updated {
          Some(row) => Ok(PatchOutcome::Applied(row.try_into()?)),
          None => self.unmatched(id, false).await,
        }
      }
      OrderPatch::SetStatus { expected, next } => {
        let sql = format!(
          "UPDATE orders SET status = $3 WHERE id = $1 AND status = $2 RETURNING {}",
          ORDER_COLUMNS
        );
        let updated = sqlx::query_as::<_, OrderRow>(&sql)
          .bind(id)
          .bind(expected.as_str())
          .bind(next.as_str())
          .fetch_optional(&self.pool)
          .await?;
        match updated {
          Some(row) => Ok(PatchOutcome::Applied(row.try_into()?)),
          None => self.unmatched(id, true).await,
        }
      }
      OrderPatch::MarkCartCleared => {
        let sql = format!(
          "UPDATE orders SET cart_cleared = TRUE \
           WHERE id = $1 AND payment = TRUE AND cart_cleared = FALSE RETURNING {}",
          ORDER_COLUMNS
        );
        let updated = sqlx::query_as::<_, OrderRow>(&sql)
          .bind(id)
          .fetch_optional(&self.pool)
          .await?;
        match updated {
          Some(row) => Ok(PatchOutcome::Applied(row.try_into()?)),
          None => {
            let current = self.find_by_id(id).await?;
            Ok(if current.payment {
              PatchOutcome::Unchanged(current)
            } else {
              PatchOutcome::Stale(current)
            })
          }
        }
      }
      OrderPatch::UnmarkCartCleared => {
        let sql = format!(
          "UPDATE orders SET cart_cleared = FALSE WHERE id = $1 AND cart_cleared = TRUE RETURNING {}",
          ORDER_COLUMNS
        );
        let updated = sqlx::query_as::<_, OrderRow>(&sql)
          .bind(id)
          .fetch_optional(&self.pool)
          .await?;
        match updated {
          Some(row) => Ok(PatchOutcome::Applied(row.try_into()?)),
          None => self.unmatched(id, false).await,
        }
      }
    }
  }

  async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
    let sql = format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    );
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(user_id)
      .fetch_all(&self.pool)
      .await?;
    into_orders(rows)
  }

  async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
    let sql = format!("SELECT {} FROM orders ORDER BY created_at DESC", ORDER_COLUMNS);
    let rows = sqlx::query_as::<_, OrderRow>(&sql).fetch_all(&self.pool).await?;
    into_orders(rows)
  }
}

#[derive(Clone)]
pub struct PgCatalog {
  pool: PgPool,
}

impl PgCatalog {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
  async fn find_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
    let product = sqlx::query_as::<_, Product>("SELECT id, name, description, price, image FROM products WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }
}

#[derive(Clone)]
pub struct PgCartStore {
  pool: PgPool,
}

impl PgCartStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CartStore for PgCartStore {
  async fn clear_cart(&self, user_id: &str) -> Result<(), StoreError> {
    sqlx::query("UPDATE carts SET cart_data = '{}'::jsonb, updated_at = NOW() WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}
