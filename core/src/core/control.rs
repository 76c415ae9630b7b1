// cartflow/src/core/control.rs

//! Signals for controlling pipeline flow and the outcome of a pipeline run.

/// Signal from a handler indicating whether the pipeline should continue or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Continue with the remaining handlers and steps.
  Continue,
  /// Halt the pipeline. No further handlers in this step or later steps run.
  /// Checkout uses this when the customer dismisses the payment sheet.
  Stop,
}

/// Outcome of a full pipeline execution that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult<S> {
  /// Every step that was not skipped ran to completion.
  Completed,
  /// A handler of step `at` returned `PipelineControl::Stop`.
  Stopped { at: S },
}

impl<S> PipelineResult<S> {
  pub fn is_completed(&self) -> bool {
    matches!(self, PipelineResult::Completed)
  }
}
