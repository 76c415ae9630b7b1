// cartflow/src/collaborators.rs

//! Seams to everything outside the engine: the remote draft-order store, the
//! price-rule catalog, address selection, payment confirmation, the signed-in
//! session and the active currency.

use crate::model::{Address, DraftOrder, DraftOrderId, LineItem, PriceRule};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Failure talking to the remote commerce platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
  #[error("transport failure: {0}")]
  Transport(String),

  #[error("could not decode remote payload: {0}")]
  Decode(String),

  #[error("remote rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("draft order {0} not found")]
  NotFound(DraftOrderId),
}

/// Remote CRUD over draft orders.
///
/// `replace_draft_order` sends the whole order; the remote overwrites every
/// field it receives, line items included.
#[async_trait]
pub trait DraftOrderStore: Send + Sync {
  async fn fetch_all_open_draft_orders(&self) -> Result<Vec<DraftOrder>, RemoteError>;

  async fn create_draft_order(&self, line_items: Vec<LineItem>, customer_email: &str) -> Result<DraftOrder, RemoteError>;

  async fn replace_draft_order(&self, id: DraftOrderId, order: &DraftOrder) -> Result<DraftOrder, RemoteError>;

  async fn complete_draft_order(&self, id: DraftOrderId) -> Result<(), RemoteError>;

  /// `Ok(false)` means the remote answered but declined to delete.
  async fn delete_draft_order(&self, id: DraftOrderId) -> Result<bool, RemoteError>;
}

/// Read-only view of price rules, each carrying its discount codes.
#[async_trait]
pub trait PriceRuleCatalog: Send + Sync {
  async fn fetch_price_rules_with_codes(&self) -> Result<Vec<PriceRule>, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
  #[error("no default address on file for {0}")]
  Missing(String),

  #[error("address selection was abandoned")]
  Abandoned,

  #[error(transparent)]
  Remote(#[from] RemoteError),
}

#[async_trait]
pub trait AddressProvider: Send + Sync {
  async fn default_address(&self, customer_email: &str) -> Result<Option<Address>, AddressError>;

  /// Asks the customer to pick or enter an address. Only called when there is no default.
  async fn ensure_default_address(&self, customer_email: &str) -> Result<Address, AddressError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
  pub draft_order_id: DraftOrderId,
  pub customer_email: String,
  pub amount: Decimal,
  pub currency_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentSignal {
  Completed,
  Cancelled,
}

/// One-shot answer channel handed to the payment collaborator.
///
/// Dropping it without answering counts as a cancellation.
#[derive(Debug)]
pub struct PaymentReply {
  tx: oneshot::Sender<PaymentSignal>,
}

impl PaymentReply {
  pub(crate) fn channel() -> (Self, oneshot::Receiver<PaymentSignal>) {
    let (tx, rx) = oneshot::channel();
    (Self { tx }, rx)
  }

  pub fn completed(self) {
    self.send(PaymentSignal::Completed);
  }

  pub fn cancelled(self) {
    self.send(PaymentSignal::Cancelled);
  }

  fn send(self, signal: PaymentSignal) {
    if self.tx.send(signal).is_err() {
      debug!(?signal, "Payment answer arrived after checkout stopped waiting.");
    }
  }
}

/// Presents the payment UI and answers through the supplied [`PaymentReply`].
pub trait PaymentConfirmation: Send + Sync {
  fn request_payment(&self, request: PaymentRequest, reply: PaymentReply);
}

pub trait SessionProvider: Send + Sync {
  fn current_customer_email(&self) -> Option<String>;
}

pub trait CurrencyContext: Send + Sync {
  fn currency_code(&self) -> String;
}

/// Every collaborator the engine needs, shared behind `Arc`s.
#[derive(Clone)]
pub struct Collaborators {
  pub store: Arc<dyn DraftOrderStore>,
  pub price_rules: Arc<dyn PriceRuleCatalog>,
  pub addresses: Arc<dyn AddressProvider>,
  pub payments: Arc<dyn PaymentConfirmation>,
  pub session: Arc<dyn SessionProvider>,
  pub currency: Arc<dyn CurrencyContext>,
}

impl std::fmt::Debug for Collaborators {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Collaborators").finish_non_exhaustive()
  }
}
