// cartflow/src/cart/flow.rs

//! The three-stage cart pipeline shared by add-to-cart and line edits.
//!
//! Both entry points resolve a draft order, merge one line into it and write
//! it back. They differ in how the draft is found ([`CartTarget`]) and in the
//! [`MergeMode`] used.

use super::error::CartError;
use super::merger::{merge, MergeMode, MergePlan};
use super::normalizer::{normalize, CartLineRequest};
use super::resolver::DraftOrderResolver;
use crate::collaborators::DraftOrderStore;
use crate::core::{ContextData, PipelineControl};
use crate::error::FlowError;
use crate::model::{DraftOrder, DraftOrderId, LineItemId};
use crate::pipeline::Pipeline;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartStage {
  ResolveDraft,
  MergeLines,
  PersistDraft,
}

impl std::fmt::Display for CartStage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      CartStage::ResolveDraft => f.write_str("resolve_draft"),
      CartStage::MergeLines => f.write_str("merge_lines"),
      CartStage::PersistDraft => f.write_str("persist_draft"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartTarget {
  /// Whatever open draft order belongs to the customer, if any.
  Customer,
  /// One line of a specific draft order, set to an absolute quantity.
  LineItem {
    draft_order_id: DraftOrderId,
    item_id: LineItemId,
    quantity: i64,
  },
}

pub struct CartCtxData {
  pub store: Arc<dyn DraftOrderStore>,
  pub resolver: Arc<DraftOrderResolver>,
  pub max_quantity_per_line: u32,

  pub customer_email: String,
  pub target: CartTarget,
  pub mode: MergeMode,
  /// Known up front for adds; derived from the targeted line for edits.
  pub request: Option<CartLineRequest>,

  pub existing: Option<DraftOrder>,
  pub plan: Option<MergePlan>,
  pub saved: Option<DraftOrder>,
}

impl CartCtxData {
  pub fn for_add(
    request: CartLineRequest,
    store: Arc<dyn DraftOrderStore>,
    resolver: Arc<DraftOrderResolver>,
    max_quantity_per_line: u32,
  ) -> Self {
    Self {
      store,
      resolver,
      max_quantity_per_line,
      customer_email: request.customer_email().to_string(),
      target: CartTarget::Customer,
      mode: MergeMode::Additive,
      request: Some(request),
      existing: None,
      plan: None,
      saved: None,
    }
  }

  pub fn for_line_edit(
    customer_email: &str,
    draft_order_id: DraftOrderId,
    item_id: LineItemId,
    quantity: i64,
    store: Arc<dyn DraftOrderStore>,
    resolver: Arc<DraftOrderResolver>,
    max_quantity_per_line: u32,
  ) -> Self {
    Self {
      store,
      resolver,
      max_quantity_per_line,
      customer_email: customer_email.to_string(),
      target: CartTarget::LineItem {
        draft_order_id,
        item_id,
        quantity,
      },
      mode: MergeMode::Replace,
      request: None,
      existing: None,
      plan: None,
      saved: None,
    }
  }
}

/// Builds the cart pipeline. It holds no state and is built once per engine.
pub fn cart_pipeline() -> Pipeline<CartStage, CartCtxData, CartError> {
  let mut p = Pipeline::<CartStage, CartCtxData, CartError>::new(&[
    (CartStage::ResolveDraft, false, None),
    (CartStage::MergeLines, false, None),
    (CartStage::PersistDraft, false, None),
  ]);

  p.on(CartStage::ResolveDraft, |ctx_data: ContextData<CartCtxData>| async move {
    let (resolver, email, target, max) = ctx_data.get(|d| {
      (
        d.resolver.clone(),
        d.customer_email.clone(),
        d.target,
        d.max_quantity_per_line,
      )
    });

    match target {
      CartTarget::Customer => {
        let existing = resolver.resolve(&email).await?;
        info!(draft_order_id = ?existing.as_ref().map(|o| o.id), "Cart: resolved customer draft order.");
        ctx_data.write().existing = existing;
      }
      CartTarget::LineItem {
        draft_order_id,
        item_id,
        quantity,
      } => {
        let order = resolver.resolve_by_id(&email, draft_order_id).await?;
        let line = order.line_by_id(item_id).ok_or(CartError::LineItemNotFound(item_id))?;
        let request = normalize(&email, line.product_id as i64, line.variant_id as i64, quantity, max)?;
        info!(draft_order_id, item_id, variant_id = line.variant_id, "Cart: resolved line to edit.");
        ctx_data.update(|d| {
          d.request = Some(request);
          d.existing = Some(order);
        });
      }
    }
    Ok::<_, CartError>(PipelineControl::Continue)
  });

  p.on(CartStage::MergeLines, |ctx_data: ContextData<CartCtxData>| async move {
    let plan = {
      let guard = ctx_data.read();
      let request = guard
        .request
        .as_ref()
        .ok_or_else(|| FlowError::Internal("merge reached without a cart request".to_string()))?;
      merge(guard.existing.as_ref(), request, guard.mode, guard.max_quantity_per_line)
    };
    let plan = plan.inspect_err(|e| warn!(error = %e, "Cart: merge rejected."))?;
    info!(tag = ?plan.tag, lines = plan.line_items.len(), "Cart: merge planned.");
    ctx_data.write().plan = Some(plan);
    Ok::<_, CartError>(PipelineControl::Continue)
  });

  p.on(CartStage::PersistDraft, |ctx_data: ContextData<CartCtxData>| async move {
    let (store, plan, existing, email) = ctx_data.get(|d| {
      (
        d.store.clone(),
        d.plan.clone(),
        d.existing.clone(),
        d.customer_email.clone(),
      )
    });
    let plan = plan.ok_or_else(|| FlowError::Internal("persist reached without a merge plan".to_string()))?;

    let saved = match existing {
      None => store.create_draft_order(plan.line_items, &email).await,
      Some(mut order) => {
        order.line_items = plan.line_items;
        store.replace_draft_order(order.id, &order).await
      }
    }
    .map_err(CartError::RemoteWrite)?;

    info!(draft_order_id = saved.id, lines = saved.line_items.len(), "Cart: draft order saved.");
    ctx_data.write().saved = Some(saved);
    Ok::<_, CartError>(PipelineControl::Continue)
  });

  p
}
