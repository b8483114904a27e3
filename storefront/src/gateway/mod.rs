// storefront/src/gateway/mod.rs

//! Payment gateway contract, callback authentication and amount conversion.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

pub mod mock;
pub mod razorpay;

pub use mock::MockGateway;
pub use razorpay::RazorpayGateway;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum GatewayError {
  /// Transport failure, timeout, or a response that could not be read.
  #[error("gateway unreachable: {0}")]
  Unavailable(String),

  /// The gateway answered with a non-success status.
  #[error("gateway rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("callback signature mismatch")]
  BadSignature,

  #[error("amount not representable in minor units: {0}")]
  InvalidAmount(String),
}

/// A remote payment intent ("order" in Razorpay terms). `amount` is in minor
/// units; `receipt` is our order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayIntent {
  pub id: String,
  pub amount: i64,
  pub currency: String,
  pub receipt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentStatus {
  Created,
  Attempted,
  Paid,
  Failed,
  Other(String),
}

impl IntentStatus {
  pub fn as_str(&self) -> &str {
    match self {
      IntentStatus::Created => "created",
      IntentStatus::Attempted => "attempted",
      IntentStatus::Paid => "paid",
      IntentStatus::Failed => "failed",
      IntentStatus::Other(s) => s.as_str(),
    }
  }
}

impl From<&str> for IntentStatus {
  fn from(s: &str) -> Self {
    match s {
      "created" => IntentStatus::Created,
      "attempted" => IntentStatus::Attempted,
      "paid" => IntentStatus::Paid,
      "failed" => IntentStatus::Failed,
      other => IntentStatus::Other(other.to_string()),
    }
  }
}

impl fmt::Display for IntentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The gateway's authoritative view of an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayIntentStatus {
  pub id: String,
  pub status: IntentStatus,
  pub receipt: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Opens a remote intent for `amount` (major units) tagged with `receipt`.
  async fn create_intent(&self, amount: Decimal, currency: &str, receipt: &str) -> Result<GatewayIntent, GatewayError>;

  async fn fetch_intent(&self, intent_id: &str) -> Result<GatewayIntentStatus, GatewayError>;
}

/// Major to minor units (x100), rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64, GatewayError> {
  if amount.is_sign_negative() && !amount.is_zero() {
    return Err(GatewayError::InvalidAmount(amount.to_string()));
  }
  amount
    .checked_mul(Decimal::ONE_HUNDRED)
    .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    .and_then(|minor| minor.to_i64())
    .ok_or_else(|| GatewayError::InvalidAmount(amount.to_string()))
}

fn callback_mac(key_secret: &str, intent_id: &str, payment_id: &str) -> Result<HmacSha256, GatewayError> {
  let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
    .map_err(|e| GatewayError::Unavailable(format!("HMAC key error: {}", e)))?;
  mac.update(intent_id.as_bytes());
  mac.update(b"|");
  mac.update(payment_id.as_bytes());
  Ok(mac)
}

/// Hex HMAC-SHA256 of `intent_id|payment_id`, as the gateway signs its
/// checkout callback.
pub fn sign_callback(key_secret: &str, intent_id: &str, payment_id: &str) -> Result<String, GatewayError> {
  let mac = callback_mac(key_secret, intent_id, payment_id)?;
  Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a checkout callback signature.
pub fn verify_callback_signature(
  key_secret: &str,
  intent_id: &str,
  payment_id: &str,
  signature: &str,
) -> Result<(), GatewayError> {
  let sig_bytes = hex::decode(signature.trim()).map_err(|_| GatewayError::BadSignature)?;
  callback_mac(key_secret, intent_id, payment_id)?
    .verify_slice(&sig_bytes)
    .map_err(|_| GatewayError::BadSignature)
}
