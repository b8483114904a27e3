// storefront/src/gateway/mock.rs

//! In-process gateway for local runs (`GATEWAY_MODE=mock`) and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{to_minor_units, GatewayError, GatewayIntent, GatewayIntentStatus, IntentStatus, PaymentGateway};

#[derive(Debug, Clone)]
struct MockIntent {
  intent: GatewayIntent,
  status: IntentStatus,
}

/// Keeps intents in memory. With `auto_capture` every known intent reports
/// `paid` when fetched; otherwise statuses move only through [`MockGateway::set_status`].
/// The switch and counters below are test hooks.
#[derive(Default)]
pub struct MockGateway {
  intents: RwLock<HashMap<String, MockIntent>>,
  auto_capture: bool,
  unavailable: AtomicBool,
  create_calls: AtomicUsize,
  fetch_calls: AtomicUsize,
}

impl MockGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn auto_capture() -> Self {
    Self {
      auto_capture: true,
      ..Self::default()
    }
  }

  /// While set, every call fails as if the gateway were unreachable.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  pub fn set_status(&self, intent_id: &str, status: IntentStatus) -> bool {
    match self.intents.write().get_mut(intent_id) {
      Some(entry) => {
        entry.status = status;
        true
      }
      None => false,
    }
  }

  /// Registers an intent directly, bypassing `create_intent`.
  pub fn insert_intent(&self, intent: GatewayIntent, status: IntentStatus) {
    self
      .intents
      .write()
      .insert(intent.id.clone(), MockIntent { intent, status });
  }

  pub fn intent(&self, intent_id: &str) -> Option<GatewayIntent> {
    self.intents.read().get(intent_id).map(|m| m.intent.clone())
  }

  pub fn create_calls(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }

  pub fn fetch_calls(&self) -> usize {
    self.fetch_calls.load(Ordering::SeqCst)
  }

  fn check_available(&self) -> Result<(), GatewayError> {
    if self.unavailable.load(Ordering::SeqCst) {
      return Err(GatewayError::Unavailable("mock gateway switched off".to_string()));
    }
    Ok(())
  }
}

#[async_trait]
impl PaymentGateway for MockGateway {
  #[instrument(name = "mock_gateway::create_intent", skip(self))]
  async fn create_intent(&self, amount: Decimal, currency: &str, receipt: &str) -> Result<GatewayIntent, GatewayError> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    self.check_available()?;
    let intent = GatewayIntent {
      id: format!("order_mock_{}", Uuid::new_v4().simple()),
      amount: to_minor_units(amount)?,
      currency: currency.to_string(),
      receipt: receipt.to_string(),
    };
    info!(intent_id = %intent.id, "Simulated gateway intent created.");
    self.insert_intent(intent.clone(), IntentStatus::Created);
    Ok(intent)
  }

  #[instrument(name = "mock_gateway::fetch_intent", skip(self))]
  async fn fetch_intent(&self, intent_id: &str) -> Result<GatewayIntentStatus, GatewayError> {
    self.fetch_calls.fetch_add(1, Ordering::SeqCst);
    self.check_available()?;
    let entry = self
      .intents
      .read()
      .get(intent_id)
      .cloned()
      .ok_or_else(|| GatewayError::Rejected {
        status: 400,
        message: format!("unknown intent {}", intent_id),
      })?;
    let status = if self.auto_capture {
      IntentStatus::Paid
    } else {
      entry.status
    };
    Ok(GatewayIntentStatus {
      id: entry.intent.id,
      status,
      receipt: Some(entry.intent.receipt),
    })
  }
}
