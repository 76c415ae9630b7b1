// cartflow/src/checkout/failure.rs
use crate::collaborators::{AddressError, RemoteError};
use crate::error::FlowError;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutFailure {
  #[error("no shipping address available: {0}")]
  NoAddress(#[source] AddressError),

  #[error("cash on delivery is limited to {ceiling}; order total is {total}")]
  CodLimitExceeded { total: Decimal, ceiling: Decimal },

  #[error("could not update the draft order: {0}")]
  UpdateFailed(#[source] RemoteError),

  #[error("payment was not confirmed within {0:?}")]
  PaymentTimeout(Duration),

  #[error("could not complete the order: {0}")]
  CompleteFailed(#[source] RemoteError),

  #[error("could not delete the completed draft order: {0}")]
  DeleteFailed(#[source] RemoteError),

  #[error("the remote declined to delete the completed draft order")]
  DeleteDeclined,

  #[error("checkout flow error: {0}")]
  Flow(#[from] FlowError),
}

impl CheckoutFailure {
  pub fn user_message(&self) -> String {
    match self {
      CheckoutFailure::NoAddress(_) => "Please add a shipping address to continue.".to_string(),
      CheckoutFailure::CodLimitExceeded { ceiling, .. } => {
        format!("Cash on delivery is available for orders up to {}. Please choose another payment method.", ceiling)
      }
      CheckoutFailure::UpdateFailed(_) | CheckoutFailure::CompleteFailed(_) => {
        "We couldn't place your order. Please try again.".to_string()
      }
      CheckoutFailure::PaymentTimeout(_) => "Payment was not confirmed in time. Please try again.".to_string(),
      CheckoutFailure::DeleteFailed(_) | CheckoutFailure::DeleteDeclined => "Your order has been placed.".to_string(),
      CheckoutFailure::Flow(_) => "Something went wrong. Please try again.".to_string(),
    }
  }
}
