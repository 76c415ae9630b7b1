// cartflow/src/checkout/mod.rs

//! Checkout: turn an open draft order into a placed order.

pub mod failure;
pub mod orchestrator;
pub mod stage;

pub use failure::CheckoutFailure;
pub use orchestrator::{CheckoutCtxData, CheckoutOrchestrator};
pub use stage::{CheckoutReport, CheckoutRequest, CheckoutStage, CheckoutState, OrderResult};
