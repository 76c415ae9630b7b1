// cartflow/src/lib.rs

//! cartflow: cart reconciliation and checkout on top of a remote draft-order API.
//!
//! A customer's cart lives remotely as an open *draft order*. This crate:
//!  - Validates add-to-cart input and merges it into the draft order, either
//!    summing quantities (add to cart) or replacing them (cart edits).
//!  - Serializes every read-modify-write per customer, so concurrent adds
//!    cannot lose updates.
//!  - Validates promo codes against the remote price-rule catalog.
//!  - Computes order summaries.
//!  - Drives checkout through address, update, payment, completion and draft
//!    cleanup, reporting exactly which stage failed.
//!
//! Cart and checkout flows run on a small async step pipeline ([`Pipeline`])
//! with typed stage keys and `before` / `on` / `after` hooks.

pub mod core;
pub mod error;
pub mod pipeline;

pub mod cart;
pub mod checkout;
pub mod collaborators;
pub mod config;
pub mod discount;
pub mod engine;
pub mod locks;
pub mod memory;
pub mod model;
pub mod summary;

// --- Re-exports for the Public API ---

pub use crate::core::{ContextData, PipelineControl, PipelineResult, StepDef, StepKey};
pub use crate::error::{FlowError, FlowResult, StepFailure};
pub use crate::pipeline::Pipeline;

pub use crate::cart::{AddToCartOutcome, CartError, CartLineRequest, MergeMode, QuantityLimit, ValidationError};
pub use crate::checkout::{CheckoutFailure, CheckoutReport, CheckoutRequest, CheckoutStage, CheckoutState, OrderResult};
pub use crate::collaborators::{
  AddressError, AddressProvider, Collaborators, CurrencyContext, DraftOrderStore, PaymentConfirmation, PaymentReply,
  PaymentRequest, PriceRuleCatalog, RemoteError, SessionProvider,
};
pub use crate::config::{ConfigError, EmailMatch, EngineConfig};
pub use crate::discount::{PromoError, ValidatedDiscount};
pub use crate::engine::CartEngine;
pub use crate::model::{Address, DraftOrder, LineItem, PaymentMethod, PriceRule};
pub use crate::summary::{summarize, OrderSummary};
