pub mod context;
pub mod context_data;
pub mod control;
pub mod step;

// Re-export key types for easier access from the pipeline and the flows built on it
pub use context::Handler;
pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use step::{StepDef, StepKey};
