// storefront/src/pipelines/mod.rs

//! Defines and registers the order pipelines.

use storefront_flow::FlowRegistry;

use crate::errors::AppError;

pub mod contexts;

pub mod place_order_pipeline;
pub mod verify_payment_pipeline;

/// Registers every application pipeline. Called once when the state is built.
pub fn register_all_pipelines(registry: &FlowRegistry<AppError>) {
  tracing::info!("Registering order pipelines...");

  place_order_pipeline::register_place_order_pipeline(registry);
  verify_payment_pipeline::register_verify_payment_pipeline(registry);

  tracing::info!("All order pipelines registered.");
}
