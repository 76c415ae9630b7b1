// cartflow/src/cart/merger.rs

//! Decides how a validated request changes a draft order's line items.
//!
//! Lines are matched by variant id in both modes. The modes differ only in
//! what the incoming quantity means:
//!
//! * [`MergeMode::Additive`] (add to cart) adds it to the existing line.
//! * [`MergeMode::Replace`] (cart screen edit) makes it the new line quantity.

use super::error::{CartError, QuantityLimit};
use super::normalizer::CartLineRequest;
use crate::model::{DraftOrder, LineItem};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
  Additive,
  Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeTag {
  /// No draft order existed; the plan's lines form a new one.
  Created,
  /// The variant was not in the order and was appended.
  LineItemAdded,
  /// An existing line's quantity changed.
  QuantityUpdated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
  pub tag: MergeTag,
  pub line_items: Vec<LineItem>,
}

/// Result of an add-to-cart as reported to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddToCartOutcome {
  Added,
  AlreadyExist,
}

impl From<MergeTag> for AddToCartOutcome {
  fn from(tag: MergeTag) -> Self {
    match tag {
      MergeTag::Created | MergeTag::LineItemAdded => AddToCartOutcome::Added,
      MergeTag::QuantityUpdated => AddToCartOutcome::AlreadyExist,
    }
  }
}

impl LineItem {
  /// A line carrying only what the customer asked for. The store fills in
  /// title, price and stock when it persists the order.
  pub fn from_request(request: &CartLineRequest) -> Self {
    LineItem {
      id: None,
      variant_id: request.variant_id(),
      product_id: request.product_id(),
      title: String::new(),
      variant_title: None,
      quantity: request.quantity(),
      price: String::new(),
      stock: None,
    }
  }
}

/// Computes the new line items. Every other line is carried over unchanged.
pub fn merge(
  existing: Option<&DraftOrder>,
  incoming: &CartLineRequest,
  mode: MergeMode,
  max_quantity_per_line: u32,
) -> Result<MergePlan, CartError> {
  let Some(order) = existing else {
    return Ok(MergePlan {
      tag: MergeTag::Created,
      line_items: vec![LineItem::from_request(incoming)],
    });
  };

  let mut line_items = order.line_items.clone();
  let Some((idx, current)) = order.line_for_variant(incoming.variant_id()) else {
    line_items.push(LineItem::from_request(incoming));
    return Ok(MergePlan {
      tag: MergeTag::LineItemAdded,
      line_items,
    });
  };

  let new_quantity = match mode {
    MergeMode::Additive => current.quantity.saturating_add(incoming.quantity()),
    MergeMode::Replace => incoming.quantity(),
  };

  if let Some(stock) = current.stock {
    // Additive: stock - existing < incoming. Replace: stock < new. Both reduce to this.
    if i64::from(new_quantity) > stock {
      return Err(CartError::QuantityExceedsLimit {
        variant_id: incoming.variant_id(),
        requested: new_quantity,
        allowed: stock.clamp(0, i64::from(u32::MAX)) as u32,
        limit: QuantityLimit::Stock,
      });
    }
  }
  if new_quantity > max_quantity_per_line {
    return Err(CartError::QuantityExceedsLimit {
      variant_id: incoming.variant_id(),
      requested: new_quantity,
      allowed: max_quantity_per_line,
      limit: QuantityLimit::PerLineCap,
    });
  }

  line_items[idx].quantity = new_quantity;
  Ok(MergePlan {
    tag: MergeTag::QuantityUpdated,
    line_items,
  })
}
