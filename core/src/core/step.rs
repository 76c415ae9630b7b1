// cartflow/src/core/step.rs

//! Defines the structure for a single step within a pipeline.

use super::ContextData;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A typed step identifier. Flows name their steps with a small `Copy` enum
/// (`CartStage`, `CheckoutStage`) so a failure can be reported by stage
/// without string matching.
pub trait StepKey: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static {}

impl<T> StepKey for T where T: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static {}

/// Skip condition evaluated against the run's context before a step starts.
pub type SkipCondition<TData> = std::sync::Arc<dyn Fn(ContextData<TData>) -> bool + Send + Sync + 'static>;

/// Definition of a pipeline step: its key, optionality, and skip condition.
#[derive(Clone)]
pub struct StepDef<S: StepKey, T: 'static + Send + Sync> {
  pub key: S,
  pub optional: bool,
  // If this evaluates to true the step is skipped entirely.
  pub skip_if: Option<SkipCondition<T>>,
}

impl<S: StepKey, T: 'static + Send + Sync> std::fmt::Debug for StepDef<S, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("key", &self.key)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
