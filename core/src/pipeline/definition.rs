// cartflow/src/pipeline/definition.rs

//! Contains the `Pipeline<S, TData, Err>` struct definition and its construction.

use crate::core::context::Handler;
use crate::core::step::{SkipCondition, StepDef, StepKey};
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered list of typed steps with `before` / `on` / `after` handlers.
///
/// `S` is the step key (a stage enum), `TData` the run's context data and
/// `Err` the error type every handler returns. `Err` must be constructible
/// from `FlowError` so that misconfiguration surfaces through the same type.
pub struct Pipeline<S, TData, Err>
where
  S: StepKey,
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Ordered list of step definitions for this pipeline.
  pub(crate) steps: Vec<StepDef<S, TData>>,

  // Handlers for the phases of each step.
  pub(crate) before: HashMap<S, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<S, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<S, Vec<Handler<TData, Err>>>,
}

impl<S, TData, Err> Pipeline<S, TData, Err>
where
  S: StepKey,
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a new `Pipeline` from `(step, optional, skip_if)` tuples, in run order.
  pub fn new(step_defs: &[(S, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(key, optional, skip_cond_opt)| StepDef {
        key: *key,
        optional: *optional,
        skip_if: skip_cond_opt.clone(),
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Step keys in run order.
  pub fn step_keys(&self) -> Vec<S> {
    self.steps.iter().map(|s| s.key).collect()
  }

  /// Panics if `step` was not declared. Registering a handler on an undeclared
  /// step is a wiring mistake, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step: S) {
    if !self.steps.iter().any(|s| s.key == step) {
      panic!("Pipeline setup error: step '{}' not found in pipeline definition.", step);
    }
  }
}
