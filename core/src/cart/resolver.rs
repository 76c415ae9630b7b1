// cartflow/src/cart/resolver.rs

use super::error::CartError;
use crate::collaborators::DraftOrderStore;
use crate::config::EmailMatch;
use crate::model::{DraftOrder, DraftOrderId};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Finds the open draft order that acts as a customer's cart.
pub struct DraftOrderResolver {
  store: Arc<dyn DraftOrderStore>,
  email_match: EmailMatch,
}

impl DraftOrderResolver {
  pub fn new(store: Arc<dyn DraftOrderStore>, email_match: EmailMatch) -> Self {
    Self { store, email_match }
  }

  /// The customer's open draft order, if any. When the remote somehow holds
  /// several, the first one returned wins.
  #[instrument(name = "DraftOrderResolver::resolve", skip(self), err(Display))]
  pub async fn resolve(&self, customer_email: &str) -> Result<Option<DraftOrder>, CartError> {
    let mut candidates = self.open_orders_for(customer_email).await?;
    if candidates.len() > 1 {
      warn!(count = candidates.len(), "Customer has more than one open draft order; using the first.");
    }
    let found = if candidates.is_empty() { None } else { Some(candidates.swap_remove(0)) };
    debug!(draft_order_id = ?found.as_ref().map(|o| o.id), "Resolved cart.");
    Ok(found)
  }

  /// The open draft order `id`, provided it belongs to the customer.
  #[instrument(name = "DraftOrderResolver::resolve_by_id", skip(self), err(Display))]
  pub async fn resolve_by_id(&self, customer_email: &str, id: DraftOrderId) -> Result<DraftOrder, CartError> {
    self
      .open_orders_for(customer_email)
      .await?
      .into_iter()
      .find(|o| o.id == id)
      .ok_or(CartError::DraftOrderNotFound(id))
  }

  async fn open_orders_for(&self, customer_email: &str) -> Result<Vec<DraftOrder>, CartError> {
    let orders = self.store.fetch_all_open_draft_orders().await.map_err(CartError::RemoteFetch)?;
    // The listing endpoint may return non-open drafts; filter anyway.
    Ok(
      orders
        .into_iter()
        .filter(|o| o.is_open() && self.email_match.matches(&o.customer_email, customer_email))
        .collect(),
    )
  }
}
