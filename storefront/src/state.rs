// storefront/src/state.rs

use sqlx::PgPool;
use std::sync::Arc;
use storefront_flow::FlowRegistry;
use tracing::info;

use crate::config::{AppConfig, GatewayMode, StoreBackend};
use crate::errors::{AppError, Result};
use crate::gateway::{MockGateway, PaymentGateway, RazorpayGateway};
use crate::pipelines;
use crate::store::{
  CartStore, MemoryCartStore, MemoryCatalog, MemoryOrderStore, OrderStore, PgCartStore, PgCatalog, PgOrderStore,
  ProductCatalog,
};

/// Everything a request handler or pipeline step needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
  pub orders: Arc<dyn OrderStore>,
  pub catalog: Arc<dyn ProductCatalog>,
  pub carts: Arc<dyn CartStore>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the collaborators together and registers the order pipelines.
  pub fn new(
    config: Arc<AppConfig>,
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductCatalog>,
    carts: Arc<dyn CartStore>,
    gateway: Arc<dyn PaymentGateway>,
  ) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    Self {
      orders,
      catalog,
      carts,
      gateway,
      flows,
      config,
    }
  }

  /// Builds the stores and gateway selected by `config`.
  pub async fn from_config(config: Arc<AppConfig>) -> Result<Self> {
    let gateway: Arc<dyn PaymentGateway> = match config.gateway.mode {
      GatewayMode::Razorpay => Arc::new(RazorpayGateway::new(&config.gateway)?),
      GatewayMode::Mock => {
        info!("Using the in-process mock payment gateway.");
        Arc::new(MockGateway::auto_capture())
      }
    };

    let state = match config.store_backend {
      StoreBackend::Memory => {
        let catalog = match &config.catalog_file {
          Some(path) => MemoryCatalog::from_json_file(path)
            .map_err(|e| AppError::Config(format!("Cannot load CATALOG_FILE {}: {}", path.display(), e)))?,
          None => MemoryCatalog::new(),
        };
        info!("Using in-memory stores.");
        Self::new(
          config.clone(),
          Arc::new(MemoryOrderStore::new()),
          Arc::new(catalog),
          Arc::new(MemoryCartStore::new()),
          gateway,
        )
      }
      StoreBackend::Postgres => {
        let url = config
          .database_url
          .as_deref()
          .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
        let pool = PgPool::connect(url)
          .await
          .map_err(|e| AppError::StoreUnavailable(format!("database connection failed: {}", e)))?;
        info!("Successfully connected to the database.");
        Self::new(
          config.clone(),
          Arc::new(PgOrderStore::new(pool.clone())),
          Arc::new(PgCatalog::new(pool.clone())),
          Arc::new(PgCartStore::new(pool)),
          gateway,
        )
      }
    };
    Ok(state)
  }
}
