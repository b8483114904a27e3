// storefront/src/services/reconciliation.rs

use serde::Deserialize;
use storefront_flow::{ContextData, PipelineResult};
use tracing::{info, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::models::Order;
use crate::pipelines::contexts::VerifyPaymentCtxData;
use crate::state::AppState;

/// The checkout callback the client forwards after paying.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfirmation {
  #[serde(rename = "razorpay_order_id")]
  pub intent_id: String,
  #[serde(rename = "razorpay_payment_id")]
  pub payment_id: String,
  #[serde(rename = "razorpay_signature")]
  pub signature: String,
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
  pub order: Order,
  /// False when the order was already paid before this call.
  pub newly_confirmed: bool,
  pub cart_cleared: bool,
}

/// Confirms a gateway payment against the gateway's own record and marks the
/// matching order paid, at most once.
#[instrument(
  name = "service::verify_payment",
  skip(state, confirmation),
  fields(user_id = %user_id, intent_id = %confirmation.intent_id)
)]
pub async fn verify_payment(state: &AppState, user_id: &str, confirmation: PaymentConfirmation) -> AppResult<Reconciliation> {
  let ctx = ContextData::new(VerifyPaymentCtxData::new(
    state.clone(),
    user_id.to_string(),
    confirmation.intent_id,
    confirmation.payment_id,
    confirmation.signature,
  ));

  let result = state.flows.run(ctx.clone()).await?;
  let guard = ctx.read();

  if result == PipelineResult::Stopped {
    let status = guard
      .intent_status
      .as_ref()
      .map(|s| s.status.to_string())
      .unwrap_or_else(|| "unknown".to_string());
    return Err(AppError::PaymentNotConfirmed(format!(
      "gateway reports intent {} as '{}'",
      guard.intent_id, status
    )));
  }

  let order = guard
    .order
    .clone()
    .ok_or_else(|| AppError::Internal("reconciliation completed without an order".to_string()))?;
  info!(order_id = %order.id, newly_confirmed = guard.applied, "Reconciliation finished.");
  Ok(Reconciliation {
    order,
    newly_confirmed: guard.applied,
    cart_cleared: guard.cart_cleared,
  })
}
