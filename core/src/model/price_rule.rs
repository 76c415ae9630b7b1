// cartflow/src/model/price_rule.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountValueType {
  Percentage,
  FixedAmount,
  #[serde(other)]
  Unknown,
}

impl std::fmt::Display for DiscountValueType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DiscountValueType::Percentage => f.write_str("percentage"),
      DiscountValueType::FixedAmount => f.write_str("fixed_amount"),
      DiscountValueType::Unknown => f.write_str("unknown"),
    }
  }
}

/// A redeemable code and how often it has been used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCode {
  pub id: u64,
  pub code: String,
  #[serde(default)]
  pub usage_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtotalRange {
  pub greater_than_or_equal_to: Decimal,
}

/// Catalog entry defining a discount. The remote stores `value` negated
/// (`-10.0` for ten percent off), so consumers use its absolute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRule {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  pub value: Decimal,
  pub value_type: DiscountValueType,
  #[serde(default)]
  pub usage_limit: Option<u32>,
  #[serde(default)]
  pub prerequisite_subtotal_range: Option<SubtotalRange>,
  #[serde(default)]
  pub discount_codes: Vec<DiscountCode>,
}

impl PriceRule {
  pub fn minimum_subtotal(&self) -> Option<Decimal> {
    self.prerequisite_subtotal_range.as_ref().map(|r| r.greater_than_or_equal_to)
  }

  /// The code owned by this rule that matches `code`, ignoring ASCII case.
  pub fn find_code(&self, code: &str) -> Option<&DiscountCode> {
    let wanted = code.trim();
    self.discount_codes.iter().find(|dc| dc.code.eq_ignore_ascii_case(wanted))
  }
}
