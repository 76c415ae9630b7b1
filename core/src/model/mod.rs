// cartflow/src/model/mod.rs

//! Remote resource representations the engine reads and writes.
//!
//! Field names follow the commerce platform's JSON so the same structs can be
//! decoded from and sent back to the remote store unchanged.

pub mod address;
pub mod draft_order;
pub mod price_rule;

pub use address::Address;
pub use draft_order::{AppliedDiscount, DraftOrder, DraftOrderId, DraftOrderStatus, LineItem, LineItemId};
pub use price_rule::{DiscountCode, DiscountValueType, PriceRule, SubtotalRange};

use serde::{Deserialize, Serialize};

/// How the customer pays. Drives the checkout branch and the COD ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  /// Cash on delivery. Completes immediately, subject to the COD ceiling.
  Cash,
  /// Card or wallet. Waits for the external payment confirmation.
  CardOrWallet,
}

impl std::fmt::Display for PaymentMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PaymentMethod::Cash => f.write_str("cash on delivery"),
      PaymentMethod::CardOrWallet => f.write_str("card or wallet"),
    }
  }
}
