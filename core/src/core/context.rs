// cartflow/src/core/context.rs

//! Defines the `Handler<TData, Err>` type for pipeline step handlers.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A pipeline step handler.
///
/// A handler is an asynchronous function that receives a clone of the run's
/// `ContextData<TData>` and resolves to `Result<PipelineControl, Err>`.
///
/// Handlers are responsible for:
/// 1. Copying what they need out of the context under a short lock.
/// 2. **Dropping every lock guard BEFORE any `.await` (remote calls, payment waits).**
/// 3. Writing their results back under a new short lock.
/// 4. Returning `PipelineControl::Continue` to proceed or `PipelineControl::Stop` to halt.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
