// cartflow/src/summary.rs

use crate::model::LineItem;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

/// Money breakdown shown on the cart and checkout screens.
///
/// `total` is `subtotal + tax - discount` and is not clamped; a discount larger
/// than the subtotal yields a negative total for the caller to handle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OrderSummary {
  pub subtotal: Decimal,
  pub tax: Decimal,
  pub discount: Decimal,
  pub total: Decimal,
  /// Line item ids (or variant ids for unsaved lines) whose price could not be parsed.
  pub unpriced_lines: Vec<u64>,
}

impl OrderSummary {
  pub fn is_fully_priced(&self) -> bool {
    self.unpriced_lines.is_empty()
  }
}

/// Sums `price × quantity` over the lines. Tax is always zero here.
pub fn summarize(line_items: &[LineItem], discount: Decimal) -> OrderSummary {
  let mut subtotal = Decimal::ZERO;
  let mut unpriced_lines = Vec::new();

  for line in line_items {
    match Decimal::from_str(line.price.trim()) {
      Ok(unit) => subtotal += unit * Decimal::from(line.quantity),
      Err(e) => {
        let key = line.id.unwrap_or(line.variant_id);
        warn!(line = key, price = %line.price, error = %e, "Unparseable line price; counted as zero.");
        unpriced_lines.push(key);
      }
    }
  }

  let tax = Decimal::ZERO;
  OrderSummary {
    subtotal,
    tax,
    discount,
    total: subtotal + tax - discount,
    unpriced_lines,
  }
}
