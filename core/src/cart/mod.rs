// cartflow/src/cart/mod.rs

//! Cart reconciliation: turn raw add-to-cart input into a validated request,
//! find the customer's open draft order, merge the line in, and persist it.

pub mod error;
pub mod flow;
pub mod merger;
pub mod normalizer;
pub mod resolver;

pub use error::{CartError, CartField, QuantityLimit, ValidationError};
pub use flow::{cart_pipeline, CartCtxData, CartStage, CartTarget};
pub use merger::{merge, AddToCartOutcome, MergeMode, MergePlan, MergeTag};
pub use normalizer::{normalize, CartLineRequest};
pub use resolver::DraftOrderResolver;
