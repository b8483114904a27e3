// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RAZORPAY_BASE_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Memory,
  Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
  Razorpay,
  /// In-process gateway that captures every intent; for local runs.
  Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Clone)]
pub struct GatewayConfig {
  pub mode: GatewayMode,
  pub key_id: String,
  /// Also the HMAC key for checkout callback signatures.
  pub key_secret: String,
  pub base_url: String,
  pub timeout: Duration,
}

impl GatewayConfig {
  pub fn mock(key_secret: &str) -> Self {
    Self {
      mode: GatewayMode::Mock,
      key_id: "rzp_mock".to_string(),
      key_secret: key_secret.to_string(),
      base_url: DEFAULT_RAZORPAY_BASE_URL.to_string(),
      timeout: Duration::from_secs(10),
    }
  }
}

impl fmt::Debug for GatewayConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GatewayConfig")
      .field("mode", &self.mode)
      .field("key_id", &self.key_id)
      .field("key_secret", &"[REDACTED]")
      .field("base_url", &self.base_url)
      .field("timeout", &self.timeout)
      .finish()
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  /// JSON product list seeded into the in-memory catalog.
  pub catalog_file: Option<PathBuf>,
  pub gateway: GatewayConfig,
  pub currency: String,
  /// Flat charge added to every order, in major units.
  pub delivery_charge: Decimal,
  pub jwt_secret: String,
  pub log_format: LogFormat,
}

impl fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("store_backend", &self.store_backend)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("catalog_file", &self.catalog_file)
      .field("gateway", &self.gateway)
      .field("currency", &self.currency)
      .field("delivery_charge", &self.delivery_charge)
      .field("jwt_secret", &"[REDACTED]")
      .field("log_format", &self.log_format)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_source(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable lookup. Blank values count as unset.
  pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let require = |name: &str| get(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)));

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(get("SERVER_PORT"), "SERVER_PORT", 4000u16)?;

    let store_backend = match get("STORE_BACKEND").as_deref() {
      None | Some("memory") => StoreBackend::Memory,
      Some("postgres") => StoreBackend::Postgres,
      Some(other) => return Err(AppError::Config(format!("Invalid STORE_BACKEND: {}", other))),
    };
    let database_url = get("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "DATABASE_URL is required when STORE_BACKEND=postgres".to_string(),
      ));
    }
    let catalog_file = get("CATALOG_FILE").map(PathBuf::from);

    let mode = match get("GATEWAY_MODE").as_deref() {
      None | Some("razorpay") => GatewayMode::Razorpay,
      Some("mock") => GatewayMode::Mock,
      Some(other) => return Err(AppError::Config(format!("Invalid GATEWAY_MODE: {}", other))),
    };
    let key_id = match mode {
      GatewayMode::Razorpay => require("RAZORPAY_KEY_ID")?,
      GatewayMode::Mock => get("RAZORPAY_KEY_ID").unwrap_or_else(|| "rzp_mock".to_string()),
    };
    let gateway = GatewayConfig {
      mode,
      key_id,
      key_secret: require("RAZORPAY_KEY_SECRET")?,
      base_url: get("RAZORPAY_BASE_URL").unwrap_or_else(|| DEFAULT_RAZORPAY_BASE_URL.to_string()),
      timeout: Duration::from_secs(parse_or(get("GATEWAY_TIMEOUT_SECS"), "GATEWAY_TIMEOUT_SECS", 10u64)?),
    };

    let currency = get("CURRENCY").unwrap_or_else(|| "INR".to_string()).to_uppercase();
    let delivery_charge = parse_or(get("DELIVERY_CHARGE"), "DELIVERY_CHARGE", Decimal::from(10))?;
    if delivery_charge.is_sign_negative() {
      return Err(AppError::Config("DELIVERY_CHARGE must not be negative".to_string()));
    }

    let log_format = match get("LOG_FORMAT").as_deref() {
      None | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    let config = Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      catalog_file,
      gateway,
      currency,
      delivery_charge,
      jwt_secret: require("JWT_SECRET")?,
      log_format,
    };
    tracing::debug!(config = ?config, "Application configuration loaded.");
    Ok(config)
  }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(value) => value
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  const REQUIRED: [(&str, &str); 3] = [
    ("RAZORPAY_KEY_ID", "rzp_test_1"),
    ("RAZORPAY_KEY_SECRET", "shh"),
    ("JWT_SECRET", "jwt"),
  ];

  #[test]
  fn defaults_apply() {
    let cfg = AppConfig::from_source(source(&REQUIRED)).unwrap();
    assert_eq!(cfg.server_host, "127.0.0.1");
    assert_eq!(cfg.server_port, 4000);
    assert_eq!(cfg.store_backend, StoreBackend::Memory);
    assert_eq!(cfg.gateway.mode, GatewayMode::Razorpay);
    assert_eq!(cfg.gateway.base_url, DEFAULT_RAZORPAY_BASE_URL);
    assert_eq!(cfg.gateway.timeout, Duration::from_secs(10));
    assert_eq!(cfg.currency, "INR");
    assert_eq!(cfg.delivery_charge, Decimal::from(10));
    assert_eq!(cfg.log_format, LogFormat::Pretty);
  }

  #[test]
  fn missing_secrets_are_errors() {
    let err = AppConfig::from_source(source(&[("RAZORPAY_KEY_SECRET", "shh"), ("JWT_SECRET", "jwt")])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("RAZORPAY_KEY_ID")));

    let err = AppConfig::from_source(source(&[("RAZORPAY_KEY_ID", "id"), ("RAZORPAY_KEY_SECRET", "shh")])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("JWT_SECRET")));
  }

  #[test]
  fn mock_gateway_needs_no_key_id() {
    let cfg = AppConfig::from_source(source(&[
      ("GATEWAY_MODE", "mock"),
      ("RAZORPAY_KEY_SECRET", "shh"),
      ("JWT_SECRET", "jwt"),
    ]))
    .unwrap();
    assert_eq!(cfg.gateway.mode, GatewayMode::Mock);
    assert_eq!(cfg.gateway.key_id, "rzp_mock");
  }

  #[test]
  fn postgres_requires_database_url() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("STORE_BACKEND", "postgres"));
    assert!(AppConfig::from_source(source(&pairs)).is_err());
    pairs.push(("DATABASE_URL", "postgres://localhost/shop"));
    let cfg = AppConfig::from_source(source(&pairs)).unwrap();
    assert_eq!(cfg.store_backend, StoreBackend::Postgres);
  }

  #[test]
  fn invalid_values_are_rejected() {
    for (name, value) in [
      ("SERVER_PORT", "eighty"),
      ("DELIVERY_CHARGE", "-1"),
      ("GATEWAY_MODE", "stripe"),
      ("GATEWAY_TIMEOUT_SECS", "soon"),
    ] {
      let mut pairs = REQUIRED.to_vec();
      pairs.push((name, value));
      assert!(AppConfig::from_source(source(&pairs)).is_err(), "{} accepted", name);
    }
  }

  #[test]
  fn debug_output_redacts_secrets() {
    let cfg = AppConfig::from_source(source(&REQUIRED)).unwrap();
    let printed = format!("{:?}", cfg);
    assert!(!printed.contains("shh"));
    assert!(!printed.contains("\"jwt\""));
    assert!(printed.contains("[REDACTED]"));
  }
}
