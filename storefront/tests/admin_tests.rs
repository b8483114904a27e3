// tests/admin_tests.rs
mod common;

use common::*;
use storefront::errors::AppError;
use storefront::gateway::IntentStatus;
use storefront::models::{OrderStatus, PaymentMethod};
use storefront::services::order_admin::{list_all_orders, list_user_orders, update_status};
use storefront::services::order_placement::{place_order, Placement};
use storefront::services::reconciliation::verify_payment;
use uuid::Uuid;

#[tokio::test]
async fn test_cash_on_delivery_order_walks_every_stage() {
  let h = harness();
  let order = place_order(&h.state, place_request("u1", cart(&[("P1", "M", 1)]), PaymentMethod::CashOnDelivery))
    .await
    .unwrap()
    .order()
    .clone();

  for next in [
    OrderStatus::Packing,
    OrderStatus::Shipped,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
  ] {
    let updated = update_status(&h.state, order.id, next).await.unwrap();
    assert_eq!(updated.status, next);
  }

  // Status changes never touch the payment fields.
  let orders = list_user_orders(&h.state, "u1").await.unwrap();
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0].status, OrderStatus::Delivered);
  assert!(!orders[0].payment);
}

#[tokio::test]
async fn test_repeating_current_status_is_a_no_op() {
  let h = harness();
  let order = place_order(&h.state, place_request("u1", cart(&[("P1", "M", 1)]), PaymentMethod::CashOnDelivery))
    .await
    .unwrap()
    .order()
    .clone();

  let updated = update_status(&h.state, order.id, OrderStatus::Placed).await.unwrap();
  assert_eq!(updated, order);
}

#[tokio::test]
async fn test_skipping_or_reversing_stages_is_rejected() {
  let h = harness();
  let order = place_order(&h.state, place_request("u1", cart(&[("P1", "M", 1)]), PaymentMethod::CashOnDelivery))
    .await
    .unwrap()
    .order()
    .clone();

  for bad in [OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::PaymentConfirmed] {
    let err = update_status(&h.state, order.id, bad).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)), "got {:?}", err);
  }

  update_status(&h.state, order.id, OrderStatus::Packing).await.unwrap();
  let err = update_status(&h.state, order.id, OrderStatus::Placed).await.unwrap_err();
  assert!(matches!(err, AppError::InvalidTransition(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_gateway_orders_are_packed_only_after_payment() {
  let h = harness();
  let Placement::Gateway { order, intent } =
    place_order(&h.state, place_request("u1", cart(&[("P2", "L", 1)]), PaymentMethod::Razorpay))
      .await
      .unwrap()
  else {
    panic!("expected a gateway placement");
  };

  let err = update_status(&h.state, order.id, OrderStatus::Packing).await.unwrap_err();
  assert!(matches!(err, AppError::InvalidTransition(_)), "got {:?}", err);

  h.gateway.set_status(&intent.id, IntentStatus::Paid);
  verify_payment(&h.state, "u1", confirmation(&intent.id, "pay_9")).await.unwrap();

  let packed = update_status(&h.state, order.id, OrderStatus::Packing).await.unwrap();
  assert_eq!(packed.status, OrderStatus::Packing);
  assert!(packed.payment);
  assert_eq!(packed.payment_id.as_deref(), Some("pay_9"));
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
  let h = harness();
  let err = update_status(&h.state, Uuid::new_v4(), OrderStatus::Packing).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_listings_are_scoped_per_user() {
  let h = harness();
  for user in ["u1", "u1", "u2"] {
    place_order(&h.state, place_request(user, cart(&[("P1", "M", 1)]), PaymentMethod::CashOnDelivery))
      .await
      .unwrap();
  }

  let mine = list_user_orders(&h.state, "u1").await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|o| o.user_id == "u1"));
  assert!(mine[0].created_at >= mine[1].created_at);

  assert!(list_user_orders(&h.state, "nobody").await.unwrap().is_empty());
  assert_eq!(list_all_orders(&h.state).await.unwrap().len(), 3);
}
