// storefront/src/lib.rs

//! Order placement and payment reconciliation service for the storefront.
//!
//! Requests enter through [`web`], become pipeline runs on the shared
//! [`storefront_flow::FlowRegistry`] held in [`state::AppState`], and reach the
//! outside world only through the [`store`] and [`gateway`] traits.

pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
