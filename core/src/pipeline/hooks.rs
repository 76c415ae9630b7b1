// cartflow/src/pipeline/hooks.rs

//! Methods for registering `before`, `on`, and `after` handlers for pipeline steps.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::step::StepKey;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;

impl<S, TData, Err> Pipeline<S, TData, Err>
where
  S: StepKey,
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Registers a `before` hook for `step`. Preconditions that guard entry
  /// into a stage (the COD ceiling, for one) live here.
  ///
  /// The handler's own error type only has to convert into the pipeline's `Err`.
  pub fn before<F, UserProvidedErr>(&mut self, step: S, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step);
    let handler = wrap(handler_fn);
    self.before.entry(step).or_default().push(handler);
  }

  /// Registers an `on` hook for `step`. This is where a stage does its work.
  pub fn on<F, UserProvidedErr>(&mut self, step: S, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step);
    let handler = wrap(handler_fn);
    self.on.entry(step).or_default().push(handler);
  }

  /// Registers an `after` hook for `step`.
  pub fn after<F, UserProvidedErr>(&mut self, step: S, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step);
    let handler = wrap(handler_fn);
    self.after.entry(step).or_default().push(handler);
  }

  /// Registers the same `before` hook on every declared step.
  /// Checkout uses it to record stage transitions.
  pub fn before_each<F, UserProvidedErr>(&mut self, handler_fn: impl Fn(S, ContextData<TData>) -> F + Send + Sync + Clone + 'static)
  where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    for step in self.step_keys() {
      let per_step = handler_fn.clone();
      let handler = wrap(move |ctx_data| per_step(step, ctx_data));
      self.before.entry(step).or_default().push(handler);
    }
  }
}

fn wrap<TData, Err, F, UserProvidedErr>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
  UserProvidedErr: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let user_fut = handler_fn(ctx_data);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}
