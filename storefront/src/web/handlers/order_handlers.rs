// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Address, CartSnapshot, OrderStatus, PaymentMethod};
use crate::services::order_admin;
use crate::services::order_placement::{self, Placement, PlaceOrderRequest};
use crate::services::reconciliation::{self, PaymentConfirmation};
use crate::state::AppState;
use crate::web::auth::{AdminUser, AuthenticatedUser};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderPayload {
  pub items: CartSnapshot,
  #[serde(default, with = "rust_decimal::serde::float_option")]
  pub amount: Option<Decimal>,
  #[serde(default)]
  pub address: Address,
  /// Accepted for compatibility; the token decides whose order this is.
  #[serde(default)]
  pub user_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
  pub order_id: String,
  pub status: String,
}

fn to_request(auth_user: &AuthenticatedUser, payload: PlaceOrderPayload, method: PaymentMethod) -> PlaceOrderRequest {
  if let Some(body_user) = payload.user_id.as_deref() {
    if body_user != auth_user.user_id {
      warn!(token_user = %auth_user.user_id, %body_user, "Ignoring userId in request body.");
    }
  }
  PlaceOrderRequest {
    user_id: auth_user.user_id.clone(),
    cart: payload.items,
    address: payload.address,
    payment_method: method,
    claimed_amount: payload.amount,
  }
}

// --- Handlers ---
// Identity extractors come before the body so a bad token wins over a bad body.

#[instrument(name = "handler::place_order", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<PlaceOrderPayload>,
) -> AppResult<HttpResponse> {
  let request = to_request(&auth_user, req_payload.into_inner(), PaymentMethod::CashOnDelivery);
  let placement = order_placement::place_order(app_state.get_ref(), request).await?;
  let order = placement.order();
  info!(order_id = %order.id, "Cash-on-delivery order placed.");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Order Placed",
    "orderId": order.id,
    "order": order,
  })))
}

#[instrument(name = "handler::place_gateway_order", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn place_gateway_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<PlaceOrderPayload>,
) -> AppResult<HttpResponse> {
  let request = to_request(&auth_user, req_payload.into_inner(), PaymentMethod::Razorpay);
  match order_placement::place_order(app_state.get_ref(), request).await? {
    Placement::Gateway { order, intent } => Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "orderId": order.id,
      "order": intent,
    }))),
    Placement::CashOnDelivery { order } => {
      warn!(order_id = %order.id, "Gateway placement produced a cash-on-delivery order.");
      Err(AppError::Internal("unexpected placement kind".to_string()))
    }
  }
}

#[instrument(name = "handler::verify_payment", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn verify_payment_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<PaymentConfirmation>,
) -> AppResult<HttpResponse> {
  let outcome = reconciliation::verify_payment(app_state.get_ref(), &auth_user.user_id, req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Payment Successful",
    "orderId": outcome.order.id,
    "alreadyConfirmed": !outcome.newly_confirmed,
  })))
}

#[instrument(name = "handler::user_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn user_orders_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> AppResult<HttpResponse> {
  let orders = order_admin::list_user_orders(app_state.get_ref(), &auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(name = "handler::list_orders", skip(app_state, admin), fields(admin_id = %admin.user_id))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, admin: AdminUser) -> AppResult<HttpResponse> {
  let orders = order_admin::list_all_orders(app_state.get_ref()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(name = "handler::update_status", skip(app_state, req_payload, admin), fields(admin_id = %admin.user_id))]
pub async fn update_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req_payload: web::Json<UpdateStatusPayload>,
) -> AppResult<HttpResponse> {
  let payload = req_payload.into_inner();
  let order_id = Uuid::parse_str(&payload.order_id)
    .map_err(|_| AppError::NotFound(format!("order {}", payload.order_id)))?;
  let status = payload
    .status
    .parse::<OrderStatus>()
    .map_err(|e| AppError::Validation(e.to_string()))?;

  let order = order_admin::update_status(app_state.get_ref(), order_id, status).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Status Updated",
    "status": order.status,
  })))
}
