// storefront/src/gateway/razorpay.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{to_minor_units, GatewayError, GatewayIntent, GatewayIntentStatus, IntentStatus, PaymentGateway};
use crate::config::GatewayConfig;

/// Razorpay Orders API over HTTPS with basic auth.
pub struct RazorpayGateway {
  client: reqwest::Client,
  base_url: String,
  key_id: String,
  key_secret: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
  amount: i64,
  currency: &'a str,
  receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
  id: String,
  #[serde(default)]
  amount: i64,
  #[serde(default)]
  currency: String,
  #[serde(default)]
  receipt: Option<String>,
  #[serde(default)]
  status: String,
}

impl RazorpayGateway {
  pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| GatewayError::Unavailable(format!("HTTP client setup failed: {}", e)))?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      key_id: config.key_id.clone(),
      key_secret: config.key_secret.clone(),
    })
  }

  async fn read_order(resp: reqwest::Response) -> Result<RazorpayOrder, GatewayError> {
    let status = resp.status();
    if !status.is_success() {
      let message = resp.text().await.unwrap_or_default();
      warn!(status = status.as_u16(), "Gateway returned an error status.");
      return Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
      });
    }
    resp.json::<RazorpayOrder>().await.map_err(transport_error)
  }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
  if err.is_timeout() {
    GatewayError::Unavailable("request timed out".to_string())
  } else {
    GatewayError::Unavailable(err.to_string())
  }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
  #[instrument(name = "razorpay::create_intent", skip(self))]
  async fn create_intent(&self, amount: Decimal, currency: &str, receipt: &str) -> Result<GatewayIntent, GatewayError> {
    let body = CreateOrderBody {
      amount: to_minor_units(amount)?,
      currency,
      receipt,
    };
    let resp = self
      .client
      .post(format!("{}/orders", self.base_url))
      .basic_auth(&self.key_id, Some(&self.key_secret))
      .json(&body)
      .send()
      .await
      .map_err(transport_error)?;
    let order = Self::read_order(resp).await?;
    info!(intent_id = %order.id, "Gateway intent created.");
    Ok(GatewayIntent {
      id: order.id,
      amount: order.amount,
      currency: order.currency,
      receipt: order.receipt.unwrap_or_else(|| receipt.to_string()),
    })
  }

  #[instrument(name = "razorpay::fetch_intent", skip(self))]
  async fn fetch_intent(&self, intent_id: &str) -> Result<GatewayIntentStatus, GatewayError> {
    let resp = self
      .client
      .get(format!("{}/orders/{}", self.base_url, intent_id))
      .basic_auth(&self.key_id, Some(&self.key_secret))
      .send()
      .await
      .map_err(transport_error)?;
    let order = Self::read_order(resp).await?;
    Ok(GatewayIntentStatus {
      id: order.id,
      status: IntentStatus::from(order.status.as_str()),
      receipt: order.receipt,
    })
  }
}
