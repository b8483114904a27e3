// storefront/src/services/order_admin.rs

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderStatus, PaymentMethod};
use crate::state::AppState;
use crate::store::{OrderPatch, PatchOutcome};

#[instrument(name = "service::list_user_orders", skip(state))]
pub async fn list_user_orders(state: &AppState, user_id: &str) -> AppResult<Vec<Order>> {
  Ok(state.orders.list_by_user(user_id).await?)
}

#[instrument(name = "service::list_all_orders", skip(state))]
pub async fn list_all_orders(state: &AppState) -> AppResult<Vec<Order>> {
  Ok(state.orders.list_all().await?)
}

/// Whether an admin may move an order from `current` to `next`.
///
/// Only the immediate next stage is allowed, and `PaymentConfirmed` is reserved
/// for payment reconciliation. Repeating the current status is accepted.
pub fn admin_may_transition(current: OrderStatus, next: OrderStatus, method: PaymentMethod) -> bool {
  if current == next {
    return true;
  }
  next != OrderStatus::PaymentConfirmed && current.next_for(method) == Some(next)
}

#[instrument(name = "service::update_status", skip(state))]
pub async fn update_status(state: &AppState, order_id: Uuid, next: OrderStatus) -> AppResult<Order> {
  let order = state.orders.find_by_id(order_id).await?;
  if order.status == next {
    info!("Status unchanged.");
    return Ok(order);
  }
  if !admin_may_transition(order.status, next, order.payment_method) {
    return Err(AppError::InvalidTransition(format!(
      "cannot move a {} order from '{}' to '{}'",
      order.payment_method, order.status, next
    )));
  }

  let patch = OrderPatch::SetStatus {
    expected: order.status,
    next,
  };
  match state.orders.update_by_id(order_id, patch).await? {
    PatchOutcome::Applied(updated) => {
      info!(from = %order.status, to = %next, "Order status updated.");
      Ok(updated)
    }
    PatchOutcome::Stale(current) | PatchOutcome::Unchanged(current) => {
      warn!(expected = %order.status, found = %current.status, "Order changed concurrently.");
      Err(AppError::InvalidTransition(format!(
        "order status changed to '{}' meanwhile; retry",
        current.status
      )))
    }
  }
}
