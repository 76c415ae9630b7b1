// cartflow/src/cart/error.rs
use crate::collaborators::RemoteError;
use crate::error::FlowError;
use crate::model::{DraftOrderId, LineItemId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartField {
  CustomerEmail,
  ProductId,
  VariantId,
  Quantity,
}

impl std::fmt::Display for CartField {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      CartField::CustomerEmail => f.write_str("customer email"),
      CartField::ProductId => f.write_str("product id"),
      CartField::VariantId => f.write_str("variant id"),
      CartField::Quantity => f.write_str("quantity"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("invalid cart data: {field} {reason}")]
  InvalidCartData { field: CartField, reason: String },
}

/// Which bound a merged quantity ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityLimit {
  Stock,
  PerLineCap,
}

impl std::fmt::Display for QuantityLimit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      QuantityLimit::Stock => f.write_str("available stock"),
      QuantityLimit::PerLineCap => f.write_str("per-line limit"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// `requested` is the resulting line quantity, `allowed` the most that line may hold.
  #[error("quantity {requested} for variant {variant_id} exceeds the {limit} of {allowed}")]
  QuantityExceedsLimit {
    variant_id: u64,
    requested: u32,
    allowed: u32,
    limit: QuantityLimit,
  },

  #[error("could not load the cart: {0}")]
  RemoteFetch(#[source] RemoteError),

  #[error("could not save the cart: {0}")]
  RemoteWrite(#[source] RemoteError),

  #[error("draft order {0} is not an open cart for this customer")]
  DraftOrderNotFound(DraftOrderId),

  #[error("line item {0} is not in the cart")]
  LineItemNotFound(LineItemId),

  #[error("no customer is signed in")]
  NotSignedIn,

  #[error("cart flow error: {0}")]
  Flow(#[from] FlowError),
}

impl CartError {
  /// Text suitable for showing the shopper.
  pub fn user_message(&self) -> String {
    match self {
      CartError::Validation(_) => "That item could not be added. Please try again.".to_string(),
      CartError::QuantityExceedsLimit {
        limit: QuantityLimit::Stock,
        allowed,
        ..
      } => format!("Only {} of this item can be in your cart based on current stock.", allowed),
      CartError::QuantityExceedsLimit {
        limit: QuantityLimit::PerLineCap,
        allowed,
        ..
      } => format!("You can add at most {} of this item.", allowed),
      CartError::RemoteFetch(_) | CartError::RemoteWrite(_) => {
        "We couldn't reach the store. Please check your connection and try again.".to_string()
      }
      CartError::DraftOrderNotFound(_) | CartError::LineItemNotFound(_) => {
        "Your cart changed. Please refresh and try again.".to_string()
      }
      CartError::NotSignedIn => "Please sign in to use your cart.".to_string(),
      CartError::Flow(_) => "Something went wrong. Please try again.".to_string(),
    }
  }

  pub fn is_retryable(&self) -> bool {
    matches!(self, CartError::RemoteFetch(_) | CartError::RemoteWrite(_))
  }
}
