// cartflow/src/checkout/stage.rs
use super::failure::CheckoutFailure;
use crate::model::{Address, DraftOrder, DraftOrderId, PaymentMethod};
use crate::summary::OrderSummary;
use uuid::Uuid;

/// Checkout stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStage {
  AddressEnsuring,
  OrderUpdating,
  /// Skipped for cash on delivery.
  PaymentAwaiting,
  OrderCompleting,
  DraftDeleting,
}

impl std::fmt::Display for CheckoutStage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      CheckoutStage::AddressEnsuring => "address_ensuring",
      CheckoutStage::OrderUpdating => "order_updating",
      CheckoutStage::PaymentAwaiting => "payment_awaiting",
      CheckoutStage::OrderCompleting => "order_completing",
      CheckoutStage::DraftDeleting => "draft_deleting",
    };
    f.write_str(name)
  }
}

/// Observable position of a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
  #[default]
  Idle,
  AddressEnsuring,
  OrderUpdating,
  PaymentAwaiting,
  OrderCompleting,
  DraftDeleting,
  Success,
  Failed,
}

impl From<CheckoutStage> for CheckoutState {
  fn from(stage: CheckoutStage) -> Self {
    match stage {
      CheckoutStage::AddressEnsuring => CheckoutState::AddressEnsuring,
      CheckoutStage::OrderUpdating => CheckoutState::OrderUpdating,
      CheckoutStage::PaymentAwaiting => CheckoutState::PaymentAwaiting,
      CheckoutStage::OrderCompleting => CheckoutState::OrderCompleting,
      CheckoutStage::DraftDeleting => CheckoutState::DraftDeleting,
    }
  }
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
  pub draft_order: DraftOrder,
  /// Address picked on the checkout screen. Falls back to the customer's default.
  pub address: Option<Address>,
  pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderResult {
  Success {
    draft_order_id: DraftOrderId,
    summary: OrderSummary,
  },
  /// The customer backed out of payment. Nothing was completed.
  Cancelled { draft_order_id: DraftOrderId },
  FailedAtStage {
    stage: CheckoutStage,
    reason: CheckoutFailure,
  },
  /// The order was placed but its draft could not be removed. The purchase
  /// stands; only cleanup is outstanding.
  CompletedCleanupPending {
    draft_order_id: DraftOrderId,
    reason: CheckoutFailure,
  },
}

impl OrderResult {
  /// True once the remote order exists, whether or not cleanup finished.
  pub fn purchase_completed(&self) -> bool {
    matches!(self, OrderResult::Success { .. } | OrderResult::CompletedCleanupPending { .. })
  }

  pub fn user_message(&self) -> String {
    match self {
      OrderResult::Success { .. } | OrderResult::CompletedCleanupPending { .. } => {
        "Thank you! Your order has been placed.".to_string()
      }
      OrderResult::Cancelled { .. } => "Payment was cancelled. Your cart is unchanged.".to_string(),
      OrderResult::FailedAtStage { reason, .. } => reason.user_message(),
    }
  }
}

/// Everything a caller may want to know about one checkout attempt.
#[derive(Debug, Clone)]
pub struct CheckoutReport {
  pub attempt_id: Uuid,
  pub result: OrderResult,
  /// Stages actually entered, in order. Skipped stages are absent.
  pub stages_entered: Vec<CheckoutStage>,
  pub final_state: CheckoutState,
}
