// storefront-flow/src/error.rs
use thiserror::Error;

/// Failures raised by the engine itself, as opposed to the ones a handler returns.
///
/// Pipelines are generic over their handler error type `Err`, which must be
/// `From<FlowError>` so that these can be folded into it.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for required step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Context type mismatch in registry dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Handler failed: {source}")]
  Handler {
    #[source]
    source: anyhow::Error,
  },

  #[error("Internal flow error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for FlowError {
  fn from(source: anyhow::Error) -> Self {
    // Avoid nesting Handler(Handler(..)) when an anyhow error already wraps a FlowError.
    match source.downcast::<FlowError>() {
      Ok(flow_err) => flow_err,
      Err(source) => FlowError::Handler { source },
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
