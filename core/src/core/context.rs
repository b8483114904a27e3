// storefront-flow/src/core/context.rs

//! The boxed handler type stored by a [`Pipeline`](crate::Pipeline).

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A step handler: takes a clone of the shared context handle and resolves to a
/// [`PipelineControl`] or the pipeline's error type.
///
/// Handlers lock the context with `.read()` / `.write()` and must drop the guard
/// before the next `.await`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>> + Send + Sync,
>;
