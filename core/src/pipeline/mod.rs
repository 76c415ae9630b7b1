// cartflow/src/pipeline/mod.rs

//! The typed step pipeline that cart and checkout flows run on.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Pipeline;
