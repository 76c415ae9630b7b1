// cartflow/src/error.rs
use crate::core::step::StepKey;
use thiserror::Error;

/// Failures of the step pipeline itself, as opposed to failures reported by
/// the cart or checkout handlers running on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Internal flow error: {0}")]
  Internal(String),
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;

/// A handler error tagged with the step that produced it.
///
/// Checkout relies on this to report *which* stage failed without each
/// handler having to repeat its own stage name.
#[derive(Debug)]
pub struct StepFailure<S, Err> {
  pub step: S,
  pub source: Err,
}

impl<S, Err> StepFailure<S, Err> {
  pub fn new(step: S, source: Err) -> Self {
    Self { step, source }
  }

  pub fn into_source(self) -> Err {
    self.source
  }
}

impl<S: StepKey, Err: std::error::Error> std::fmt::Display for StepFailure<S, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "step '{}' failed: {}", self.step, self.source)
  }
}

impl<S: StepKey, Err: std::error::Error + 'static> std::error::Error for StepFailure<S, Err> {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    Some(&self.source)
  }
}
