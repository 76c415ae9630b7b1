// cartflow/src/pipeline/execution.rs

//! Contains `Pipeline::run()`, which executes the steps and their handlers in order.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepKey;
use crate::error::{FlowError, StepFailure};
use crate::pipeline::definition::Pipeline;
use tracing::{event, span, Instrument, Level};

impl<S, TData, Err> Pipeline<S, TData, Err>
where
  S: StepKey,
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against the shared context `ctx_data`.
  ///
  /// Steps run strictly in order. There is no retry. The first handler error ends the
  /// run and is returned tagged with the step it came from. A non-optional step with no
  /// handlers at all is reported as `FlowError::HandlerMissing`, converted into `Err`.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult<S>, StepFailure<S, Err>> {
    event!(Level::DEBUG, num_steps = self.steps.len(), "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step = step_def.key;
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step = %step,
        step_index = step_idx,
        optional = step_def.optional
      );

      let outcome = async {
        if let Some(skip_cond_fn) = &step_def.skip_if {
          if skip_cond_fn(ctx_data.clone()) {
            event!(Level::INFO, "Step skipped due to 'skip_if' condition.");
            return Ok(PipelineControl::Continue);
          }
        }

        let has_any = [&self.before, &self.on, &self.after]
          .iter()
          .any(|phase| phase.get(&step).map_or(false, |v| !v.is_empty()));
        if !has_any {
          if step_def.optional {
            event!(Level::DEBUG, "Optional step has no handlers, skipping.");
            return Ok(PipelineControl::Continue);
          }
          event!(Level::ERROR, "Non-optional step has no handlers.");
          return Err(Err::from(FlowError::HandlerMissing {
            step_name: step.to_string(),
          }));
        }

        for (phase, handlers) in [("before", &self.before), ("on", &self.on), ("after", &self.after)] {
          if let Some(handlers) = handlers.get(&step) {
            if run_phase(phase, handlers, &ctx_data).await? == PipelineControl::Stop {
              return Ok(PipelineControl::Stop);
            }
          }
        }
        event!(Level::DEBUG, "Step processing finished successfully.");
        Ok(PipelineControl::Continue)
      }
      .instrument(step_span)
      .await;

      match outcome {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, step = %step, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped { at: step });
        }
        Err(e) => {
          event!(Level::ERROR, step = %step, error = %e, "Pipeline step failed.");
          return Err(StepFailure::new(step, e));
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<PipelineControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    match handler_fn(ctx_data.clone()).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(Level::DEBUG, phase, handler_index = handler_idx, "Handler requested stop.");
        return Ok(PipelineControl::Stop);
      }
      Err(e) => {
        event!(Level::DEBUG, phase, handler_index = handler_idx, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(PipelineControl::Continue)
}
