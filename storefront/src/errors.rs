// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront_flow::FlowError;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Order contains no purchasable items")]
  EmptyOrder,

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Invalid Status Transition: {0}")]
  InvalidTransition(String),

  #[error("Payment Not Confirmed: {0}")]
  PaymentNotConfirmed(String),

  #[error("Payment Gateway Unavailable: {0}")]
  GatewayUnavailable(String),

  #[error("Store Unavailable: {0}")]
  StoreUnavailable(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<StoreError> for AppError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::NotFound(what) => AppError::NotFound(what),
      StoreError::Unavailable(detail) => AppError::StoreUnavailable(detail),
      StoreError::Corrupt(detail) => AppError::Internal(format!("corrupt stored record: {}", detail)),
    }
  }
}

impl From<GatewayError> for AppError {
  fn from(err: GatewayError) -> Self {
    match err {
      GatewayError::BadSignature => AppError::Auth("payment confirmation signature mismatch".to_string()),
      GatewayError::InvalidAmount(detail) => AppError::Validation(detail),
      other @ (GatewayError::Unavailable(_) | GatewayError::Rejected { .. }) => {
        AppError::GatewayUnavailable(other.to_string())
      }
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::EmptyOrder | AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::InvalidTransition(_) => StatusCode::CONFLICT,
      AppError::PaymentNotConfirmed(_) => StatusCode::PAYMENT_REQUIRED,
      AppError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
      AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }
    // Internal details stay in the logs.
    let message = match self {
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => "An internal error occurred".to_string(),
      other => other.to_string(),
    };
    HttpResponse::build(status).json(json!({ "success": false, "message": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
