// tests/common/mod.rs
#![allow(dead_code)]

use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Level;

use storefront::config::AppConfig;
use storefront::gateway::{sign_callback, MockGateway};
use storefront::models::{Address, CartSnapshot, PaymentMethod, Product};
use storefront::services::order_placement::PlaceOrderRequest;
use storefront::services::reconciliation::PaymentConfirmation;
use storefront::state::AppState;
use storefront::store::{MemoryCartStore, MemoryCatalog, MemoryOrderStore};
use storefront::web::auth::Claims;

pub const KEY_SECRET: &str = "test_key_secret";
pub const JWT_SECRET: &str = "test_jwt_secret";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config() -> AppConfig {
  let vars: HashMap<&str, &str> = HashMap::from([
    ("GATEWAY_MODE", "mock"),
    ("RAZORPAY_KEY_SECRET", KEY_SECRET),
    ("JWT_SECRET", JWT_SECRET),
    ("CURRENCY", "INR"),
    ("DELIVERY_CHARGE", "10"),
  ]);
  AppConfig::from_source(|name| vars.get(name).map(|v| v.to_string())).unwrap()
}

pub fn product(id: &str, price: i64) -> Product {
  Product {
    id: id.to_string(),
    name: format!("Product {}", id),
    description: format!("About {}", id),
    price: Decimal::from(price),
    image: vec![format!("https://img.example/{}.png", id)],
  }
}

/// Application state over in-memory stores and a manual mock gateway, with
/// handles to each collaborator for assertions.
pub struct Harness {
  pub state: AppState,
  pub orders: Arc<MemoryOrderStore>,
  pub catalog: Arc<MemoryCatalog>,
  pub carts: Arc<MemoryCartStore>,
  pub gateway: Arc<MockGateway>,
}

pub fn harness() -> Harness {
  setup_tracing();
  let orders = Arc::new(MemoryOrderStore::new());
  let catalog = Arc::new(MemoryCatalog::with_products([product("P1", 100), product("P2", 250)]));
  let carts = Arc::new(MemoryCartStore::new());
  let gateway = Arc::new(MockGateway::new());
  let state = AppState::new(
    Arc::new(test_config()),
    orders.clone(),
    catalog.clone(),
    carts.clone(),
    gateway.clone(),
  );
  Harness {
    state,
    orders,
    catalog,
    carts,
    gateway,
  }
}

pub fn cart(entries: &[(&str, &str, i64)]) -> CartSnapshot {
  let mut cart = CartSnapshot::new();
  for (pid, size, qty) in entries {
    cart.entry(pid.to_string()).or_default().insert(size.to_string(), *qty);
  }
  cart
}

pub fn address() -> Address {
  Address {
    first_name: "Asha".into(),
    last_name: "Rao".into(),
    email: "asha@example.com".into(),
    street: "12 MG Road".into(),
    city: "Pune".into(),
    state: "MH".into(),
    zipcode: "411001".into(),
    country: "India".into(),
    phone: "9999999999".into(),
  }
}

pub fn place_request(user_id: &str, cart: CartSnapshot, method: PaymentMethod) -> PlaceOrderRequest {
  PlaceOrderRequest {
    user_id: user_id.to_string(),
    cart,
    address: address(),
    payment_method: method,
    claimed_amount: None,
  }
}

pub fn confirmation(intent_id: &str, payment_id: &str) -> PaymentConfirmation {
  PaymentConfirmation {
    intent_id: intent_id.to_string(),
    payment_id: payment_id.to_string(),
    signature: sign_callback(KEY_SECRET, intent_id, payment_id).unwrap(),
  }
}

pub fn token(user_id: &str, role: Option<&str>) -> String {
  let claims = Claims {
    sub: user_id.to_string(),
    exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    role: role.map(String::from),
  };
  encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap()
}
