// cartflow/src/model/draft_order.rs

use super::address::Address;
use super::price_rule::DiscountValueType;
use serde::{Deserialize, Serialize};

pub type DraftOrderId = u64;
pub type LineItemId = u64;

/// Remote lifecycle state of a draft order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftOrderStatus {
  #[default]
  Open,
  InvoiceSent,
  Completed,
  /// Any state this engine does not act on.
  #[serde(other)]
  Other,
}

/// One product variant and quantity inside a draft order.
///
/// `id`, `title`, `price` and `stock` are filled in by the remote store. A line
/// built locally from a cart request carries only the ids and the quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<LineItemId>,
  pub variant_id: u64,
  pub product_id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant_title: Option<String>,
  pub quantity: u32,
  /// Unit price as the decimal string the remote sends.
  #[serde(default)]
  pub price: String,
  /// Inventory snapshot taken when the line was last written.
  #[serde(default, rename = "inventory_quantity", skip_serializing_if = "Option::is_none")]
  pub stock: Option<i64>,
}

/// Discount attached to a draft order at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
  #[serde(default)]
  pub title: Option<String>,
  pub description: String,
  pub value: String,
  pub value_type: DiscountValueType,
  pub amount: String,
}

/// The remote pre-purchase order that mirrors a customer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOrder {
  pub id: DraftOrderId,
  #[serde(rename = "email")]
  pub customer_email: String,
  #[serde(default)]
  pub status: DraftOrderStatus,
  #[serde(default)]
  pub line_items: Vec<LineItem>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub shipping_address: Option<Address>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub applied_discount: Option<AppliedDiscount>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subtotal_price: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_price: Option<String>,
  /// Id of the placed order, set by the remote once the draft is completed.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_id: Option<u64>,
}

impl DraftOrder {
  pub fn is_open(&self) -> bool {
    self.status == DraftOrderStatus::Open
  }

  /// Position and line for `variant_id`. This is the merge identity.
  pub fn line_for_variant(&self, variant_id: u64) -> Option<(usize, &LineItem)> {
    self.line_items.iter().enumerate().find(|(_, li)| li.variant_id == variant_id)
  }

  pub fn line_by_id(&self, item_id: LineItemId) -> Option<&LineItem> {
    self.line_items.iter().find(|li| li.id == Some(item_id))
  }

  pub fn total_quantity(&self) -> u32 {
    self.line_items.iter().map(|li| li.quantity).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_remote_payload() {
    let payload = r#"{
      "id": 994118539,
      "email": "bob.norman@mail.example.com",
      "status": "open",
      "line_items": [{
        "id": 994118540,
        "variant_id": 39072856,
        "product_id": 632910392,
        "title": "IPod Nano - 8gb",
        "variant_title": "green",
        "quantity": 1,
        "price": "199.00",
        "inventory_quantity": 4
      }],
      "subtotal_price": "199.00",
      "tags": "",
      "currency": "USD"
    }"#;
    let order: DraftOrder = serde_json::from_str(payload).unwrap();
    assert!(order.is_open());
    assert_eq!(order.customer_email, "bob.norman@mail.example.com");
    let (idx, line) = order.line_for_variant(39072856).unwrap();
    assert_eq!(idx, 0);
    assert_eq!(line.stock, Some(4));
    assert_eq!(order.line_by_id(994118540).map(|l| l.quantity), Some(1));
    assert_eq!(order.total_quantity(), 1);
  }

  #[test]
  fn unknown_status_is_not_open() {
    let order: DraftOrder = serde_json::from_str(r#"{"id": 1, "email": "a@b.c", "status": "archived"}"#).unwrap();
    assert_eq!(order.status, DraftOrderStatus::Other);
    assert!(!order.is_open());
  }
}
