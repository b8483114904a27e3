// storefront/src/models/order.rs

use crate::models::LineItem;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Order lifecycle. Linear, no cycles; `PaymentConfirmed` only exists on the
/// gateway path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
  #[serde(rename = "Order Placed")]
  Placed,
  #[serde(rename = "Payment Confirmed")]
  PaymentConfirmed,
  #[serde(rename = "Packing")]
  Packing,
  #[serde(rename = "Shipped")]
  Shipped,
  #[serde(rename = "Out for delivery")]
  OutForDelivery,
  #[serde(rename = "Delivered")]
  Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
  pub kind: &'static str,
  pub value: String,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Placed,
    OrderStatus::PaymentConfirmed,
    OrderStatus::Packing,
    OrderStatus::Shipped,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
  ];

  /// Wire and storage form.
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Placed => "Order Placed",
      OrderStatus::PaymentConfirmed => "Payment Confirmed",
      OrderStatus::Packing => "Packing",
      OrderStatus::Shipped => "Shipped",
      OrderStatus::OutForDelivery => "Out for delivery",
      OrderStatus::Delivered => "Delivered",
    }
  }

  /// The stage that follows `self` for an order paid with `method`.
  pub fn next_for(self, method: PaymentMethod) -> Option<OrderStatus> {
    match (self, method) {
      (OrderStatus::Placed, PaymentMethod::CashOnDelivery) => Some(OrderStatus::Packing),
      (OrderStatus::Placed, PaymentMethod::Razorpay) => Some(OrderStatus::PaymentConfirmed),
      (OrderStatus::PaymentConfirmed, _) => Some(OrderStatus::Packing),
      (OrderStatus::Packing, _) => Some(OrderStatus::Shipped),
      (OrderStatus::Shipped, _) => Some(OrderStatus::OutForDelivery),
      (OrderStatus::OutForDelivery, _) => Some(OrderStatus::Delivered),
      (OrderStatus::Delivered, _) => None,
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| UnknownVariant {
        kind: "order status",
        value: s.to_string(),
      })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
  #[serde(rename = "COD")]
  CashOnDelivery,
  #[serde(rename = "Razorpay")]
  Razorpay,
}

impl PaymentMethod {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentMethod::CashOnDelivery => "COD",
      PaymentMethod::Razorpay => "Razorpay",
    }
  }
}

impl fmt::Display for PaymentMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentMethod {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "COD" => Ok(PaymentMethod::CashOnDelivery),
      "Razorpay" => Ok(PaymentMethod::Razorpay),
      other => Err(UnknownVariant {
        kind: "payment method",
        value: other.to_string(),
      }),
    }
  }
}

/// Shipping address as entered at checkout. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub street: String,
  pub city: String,
  pub state: String,
  pub zipcode: String,
  pub country: String,
  pub phone: String,
}

/// What placement hands to the order store. Payment fields are absent on
/// purpose: a new order is always unpaid.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
  pub user_id: String,
  pub items: Vec<LineItem>,
  pub amount: Decimal,
  pub address: Address,
  pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: String,
  pub items: Vec<LineItem>,
  #[serde(with = "rust_decimal::serde::float")]
  pub amount: Decimal,
  pub address: Address,
  pub payment_method: PaymentMethod,
  pub payment: bool,
  pub payment_id: Option<String>,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  /// Set once the buyer's cart has been emptied after a gateway payment.
  #[serde(default)]
  pub cart_cleared: bool,
}

impl Order {
  /// A freshly placed, unpaid order.
  pub fn from_draft(id: Uuid, draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
    Self {
      id,
      user_id: draft.user_id,
      items: draft.items,
      amount: draft.amount,
      address: draft.address,
      payment_method: draft.payment_method,
      payment: false,
      payment_id: None,
      status: OrderStatus::Placed,
      created_at,
      cart_cleared: false,
    }
  }
}
