// storefront/src/services/order_placement.rs

use rust_decimal::Decimal;
use storefront_flow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::gateway::GatewayIntent;
use crate::models::{Address, CartSnapshot, Order, PaymentMethod};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
  pub user_id: String,
  pub cart: CartSnapshot,
  pub address: Address,
  pub payment_method: PaymentMethod,
  pub claimed_amount: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub enum Placement {
  /// Stored unpaid; settles on delivery.
  CashOnDelivery { order: Order },
  /// Stored unpaid; the client completes payment against `intent`.
  Gateway { order: Order, intent: GatewayIntent },
}

impl Placement {
  pub fn order(&self) -> &Order {
    match self {
      Placement::CashOnDelivery { order } | Placement::Gateway { order, .. } => order,
    }
  }
}

/// Turns a cart into a stored order and, for gateway payments, a remote intent.
///
/// Nothing here marks an order paid. If the intent cannot be opened the order
/// stays stored and unpaid and the call fails with `GatewayUnavailable`.
#[instrument(
  name = "service::place_order",
  skip(state, request),
  fields(user_id = %request.user_id, method = %request.payment_method)
)]
pub async fn place_order(state: &AppState, request: PlaceOrderRequest) -> AppResult<Placement> {
  let ctx = ContextData::new(PlaceOrderCtxData::new(
    state.clone(),
    request.user_id,
    request.cart,
    request.address,
    request.payment_method,
    request.claimed_amount,
  ));

  match state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {}
    PipelineResult::Stopped => {
      warn!("Placement pipeline stopped before completing.");
      return Err(AppError::Internal("order placement halted".to_string()));
    }
  }

  let guard = ctx.read();
  let order = guard
    .order
    .clone()
    .ok_or_else(|| AppError::Internal("placement completed without an order".to_string()))?;
  info!(order_id = %order.id, cart_cleared = guard.cart_cleared, "Placement finished.");

  match order.payment_method {
    PaymentMethod::CashOnDelivery => Ok(Placement::CashOnDelivery { order }),
    PaymentMethod::Razorpay => {
      let intent = guard
        .intent
        .clone()
        .ok_or_else(|| AppError::Internal("gateway placement completed without an intent".to_string()))?;
      Ok(Placement::Gateway { order, intent })
    }
  }
}
