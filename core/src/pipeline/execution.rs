// storefront-flow/src/pipeline/execution.rs

//! `Pipeline::run`, the step loop.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepDef;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

/// Outcome of one phase (`on` or `after`) of a step.
enum PhaseOutcome<Err> {
  Continue,
  Stop,
  Failed(Err),
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// A required step without handlers fails the run with
  /// [`FlowError::HandlerMissing`]. A handler error on a required step aborts the
  /// run; on an optional step it is logged and the run moves to the next step.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      let outcome = self
        .run_step(step_def, ctx_data.clone())
        .instrument(step_span)
        .await;

      match outcome {
        PhaseOutcome::Continue => {}
        PhaseOutcome::Stop => return Ok(PipelineResult::Stopped),
        PhaseOutcome::Failed(e) if step_def.optional => {
          event!(Level::WARN, step_name = %step_def.name, error = %e, "Optional step failed; continuing.");
        }
        PhaseOutcome::Failed(e) => return Err(e),
      }
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: ContextData<TData>) -> PhaseOutcome<Err> {
    if let Some(skip_if) = &step_def.skip_if {
      if skip_if(ctx_data.clone()) {
        event!(Level::DEBUG, "Step skipped by condition.");
        return PhaseOutcome::Continue;
      }
    }

    let name = step_def.name.as_str();
    let on_handlers = self.on.get(name).filter(|h| !h.is_empty());
    let after_handlers = self.after.get(name).filter(|h| !h.is_empty());

    if on_handlers.is_none() && after_handlers.is_none() {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers.");
        return PhaseOutcome::Continue;
      }
      event!(Level::ERROR, "Required step has no handlers.");
      return PhaseOutcome::Failed(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in [("on", on_handlers), ("after", after_handlers)] {
      let Some(handlers) = handlers else { continue };
      match run_phase(phase, handlers, &ctx_data).await {
        PhaseOutcome::Continue => {}
        other => return other,
      }
    }
    PhaseOutcome::Continue
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> PhaseOutcome<Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    let handler_span = span!(Level::DEBUG, "step_handler", phase, handler_index = handler_idx);
    match handler_fn(ctx_data.clone()).instrument(handler_span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(Level::INFO, phase, "Pipeline stopped by handler.");
        return PhaseOutcome::Stop;
      }
      Err(e) => {
        event!(Level::ERROR, phase, error = %e, "Handler failed.");
        return PhaseOutcome::Failed(e);
      }
    }
  }
  PhaseOutcome::Continue
}
