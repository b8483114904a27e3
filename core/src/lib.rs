// storefront-flow/src/lib.rs

//! Asynchronous step pipelines for the storefront order services.
//!
//! A [`Pipeline`] is an ordered list of named steps run against one shared
//! context. Each step can have `on` and `after` handlers, can be marked optional,
//! and can be skipped by a condition evaluated on the context. Handlers get a
//! cloned [`ContextData`] handle and answer with a [`PipelineControl`].
//!
//! Optional steps are best-effort: a missing handler is tolerated and a failing
//! handler is logged and swallowed, so the run carries on with the next step.
//!
//! [`FlowRegistry`] keys pipelines by their context type, which lets a request
//! handler dispatch with nothing more than the context value it built.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
