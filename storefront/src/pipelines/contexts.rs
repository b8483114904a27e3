// storefront/src/pipelines/contexts.rs

//! Data carried through the order pipelines. Handlers receive these wrapped in
//! `storefront_flow::ContextData`.

use rust_decimal::Decimal;

use crate::gateway::{GatewayIntent, GatewayIntentStatus};
use crate::models::{Address, CartSnapshot, LineItem, Order, PaymentMethod};
use crate::state::AppState;

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub user_id: String,
  pub cart: CartSnapshot,
  pub address: Address,
  pub payment_method: PaymentMethod,
  /// What the client believes the total is. Only compared, never stored.
  pub claimed_amount: Option<Decimal>,

  pub items: Vec<LineItem>,
  pub amount: Decimal,
  pub order: Option<Order>,
  pub intent: Option<GatewayIntent>,
  pub cart_cleared: bool,
}

impl PlaceOrderCtxData {
  pub fn new(
    app_state: AppState,
    user_id: String,
    cart: CartSnapshot,
    address: Address,
    payment_method: PaymentMethod,
    claimed_amount: Option<Decimal>,
  ) -> Self {
    Self {
      app_state,
      user_id,
      cart,
      address,
      payment_method,
      claimed_amount,
      items: Vec::new(),
      amount: Decimal::ZERO,
      order: None,
      intent: None,
      cart_cleared: false,
    }
  }
}

#[derive(Clone)]
pub struct VerifyPaymentCtxData {
  pub app_state: AppState,
  pub user_id: String,
  pub intent_id: String,
  pub payment_id: String,
  pub signature: String,

  pub intent_status: Option<GatewayIntentStatus>,
  pub order: Option<Order>,
  /// True only for the call that moved the order from unpaid to paid.
  pub applied: bool,
  pub cart_cleared: bool,
}

impl VerifyPaymentCtxData {
  pub fn new(app_state: AppState, user_id: String, intent_id: String, payment_id: String, signature: String) -> Self {
    Self {
      app_state,
      user_id,
      intent_id,
      payment_id,
      signature,
      intent_status: None,
      order: None,
      applied: false,
      cart_cleared: false,
    }
  }
}
