// cartflow/src/discount.rs

//! Promo code validation against the remote price-rule catalog.

use crate::collaborators::{PriceRuleCatalog, RemoteError};
use crate::model::{AppliedDiscount, DiscountValueType, PriceRule};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
  #[error("discount code '{code}' does not exist")]
  CodeNotFound { code: String },

  #[error("discount code '{code}' has reached its usage limit of {usage_limit}")]
  ExceededUsageLimit { code: String, usage_limit: u32 },

  #[error("order subtotal must be at least {min_required} for this code")]
  InsufficientSubtotal { min_required: Decimal },

  #[error("cash on delivery is limited to {ceiling}; discounted total is {total}")]
  TotalExceedsCodLimit { total: Decimal, ceiling: Decimal },

  #[error("could not check discount code: {0}")]
  Unknown(#[source] RemoteError),
}

impl PromoError {
  pub fn user_message(&self) -> String {
    match self {
      PromoError::CodeNotFound { .. } => "This promo code is not valid.".to_string(),
      PromoError::ExceededUsageLimit { .. } => "This promo code has already been used up.".to_string(),
      PromoError::InsufficientSubtotal { min_required } => {
        format!("Add more items to use this code. Minimum order is {}.", min_required)
      }
      PromoError::TotalExceedsCodLimit { ceiling, .. } => {
        format!("Cash on delivery is available for orders up to {}. Please choose another payment method.", ceiling)
      }
      PromoError::Unknown(_) => "We couldn't check this code right now. Please try again.".to_string(),
    }
  }
}

/// A code that passed validation, with its amount computed for one subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedDiscount {
  /// The code as stored in the catalog.
  pub code: String,
  pub amount: Decimal,
  pub price_rule_id: u64,
  pub discount_code_id: u64,
  /// Absolute rule value: a percentage or a fixed amount.
  pub value: Decimal,
  pub value_type: DiscountValueType,
}

impl ValidatedDiscount {
  pub fn to_applied_discount(&self) -> AppliedDiscount {
    AppliedDiscount {
      title: Some(self.code.clone()),
      description: self.code.clone(),
      value: self.value.to_string(),
      value_type: self.value_type,
      amount: self.amount.to_string(),
    }
  }
}

/// Discount amount for `subtotal`, rounded to cents. Unknown value types give zero.
pub fn discount_amount(value_type: DiscountValueType, value: Decimal, subtotal: Decimal) -> Decimal {
  let value = value.abs();
  let amount = match value_type {
    DiscountValueType::Percentage => subtotal * value / Decimal::ONE_HUNDRED,
    DiscountValueType::FixedAmount => value,
    DiscountValueType::Unknown => Decimal::ZERO,
  };
  amount.round_dp(2)
}

/// Applies the validation rules, in order, to an already-fetched catalog.
pub fn evaluate(rules: &[PriceRule], code: &str, subtotal: Decimal) -> Result<ValidatedDiscount, PromoError> {
  let (rule, dc) = rules
    .iter()
    .find_map(|rule| rule.find_code(code).map(|dc| (rule, dc)))
    .ok_or_else(|| PromoError::CodeNotFound { code: code.trim().to_string() })?;

  if let Some(usage_limit) = rule.usage_limit {
    if dc.usage_count >= usage_limit {
      return Err(PromoError::ExceededUsageLimit {
        code: dc.code.clone(),
        usage_limit,
      });
    }
  }

  if let Some(min_required) = rule.minimum_subtotal() {
    if subtotal < min_required {
      return Err(PromoError::InsufficientSubtotal { min_required });
    }
  }

  Ok(ValidatedDiscount {
    code: dc.code.clone(),
    amount: discount_amount(rule.value_type, rule.value, subtotal),
    price_rule_id: rule.id,
    discount_code_id: dc.id,
    value: rule.value.abs(),
    value_type: rule.value_type,
  })
}

pub struct DiscountPolicy {
  catalog: Arc<dyn PriceRuleCatalog>,
}

impl DiscountPolicy {
  pub fn new(catalog: Arc<dyn PriceRuleCatalog>) -> Self {
    Self { catalog }
  }

  /// Fetches the catalog and validates `code` against `subtotal`.
  #[instrument(name = "DiscountPolicy::validate", skip(self, subtotal), fields(subtotal = %subtotal), err(Display))]
  pub async fn validate(&self, code: &str, subtotal: Decimal) -> Result<ValidatedDiscount, PromoError> {
    let rules = self.catalog.fetch_price_rules_with_codes().await.map_err(PromoError::Unknown)?;
    debug!(rules = rules.len(), "Fetched price rules.");
    let validated = evaluate(&rules, code, subtotal)?;
    info!(code = %validated.code, amount = %validated.amount, "Promo code accepted.");
    Ok(validated)
  }
}

/// The discount each customer currently has applied, keyed by lower-cased email.
/// Cleared once checkout has written it onto the draft order.
#[derive(Debug, Default)]
pub struct DiscountBook {
  applied: Mutex<HashMap<String, ValidatedDiscount>>,
}

impl DiscountBook {
  pub fn get(&self, customer_email: &str) -> Option<ValidatedDiscount> {
    self.applied.lock().get(&key(customer_email)).cloned()
  }

  pub fn set(&self, customer_email: &str, discount: ValidatedDiscount) {
    self.applied.lock().insert(key(customer_email), discount);
  }

  pub fn clear(&self, customer_email: &str) -> Option<ValidatedDiscount> {
    self.applied.lock().remove(&key(customer_email))
  }
}

fn key(customer_email: &str) -> String {
  customer_email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{DiscountCode, SubtotalRange};
  use rust_decimal_macros::dec;

  fn rule(value: Decimal, value_type: DiscountValueType, usage_limit: Option<u32>, min: Option<Decimal>) -> PriceRule {
    PriceRule {
      id: 1,
      title: "Spring".into(),
      value,
      value_type,
      usage_limit,
      prerequisite_subtotal_range: min.map(|m| SubtotalRange { greater_than_or_equal_to: m }),
      discount_codes: vec![DiscountCode {
        id: 11,
        code: "SAVE10".into(),
        usage_count: 3,
      }],
    }
  }

  #[test]
  fn percentage_uses_absolute_value() {
    let rules = [rule(dec!(-10.0), DiscountValueType::Percentage, None, None)];
    let v = evaluate(&rules, "save10", dec!(80)).unwrap();
    assert_eq!(v.amount, dec!(8.00));
    assert_eq!(v.code, "SAVE10");
    assert_eq!(v.value, dec!(10.0));
  }

  #[test]
  fn fixed_amount_and_rounding() {
    assert_eq!(discount_amount(DiscountValueType::FixedAmount, dec!(-5), dec!(80)), dec!(5));
    assert_eq!(discount_amount(DiscountValueType::Percentage, dec!(-15), dec!(33.33)), dec!(5.00));
    assert_eq!(discount_amount(DiscountValueType::Unknown, dec!(-15), dec!(33.33)), Decimal::ZERO);
  }

  #[test]
  fn usage_limit_reached() {
    let rules = [rule(dec!(-10), DiscountValueType::Percentage, Some(3), None)];
    let err = evaluate(&rules, "SAVE10", dec!(80)).unwrap_err();
    assert_eq!(
      err,
      PromoError::ExceededUsageLimit {
        code: "SAVE10".into(),
        usage_limit: 3
      }
    );
  }

  #[test]
  fn minimum_subtotal_is_inclusive() {
    let rules = [rule(dec!(-10), DiscountValueType::Percentage, None, Some(dec!(50)))];
    assert!(evaluate(&rules, "SAVE10", dec!(50)).is_ok());
    assert_eq!(
      evaluate(&rules, "SAVE10", dec!(49.99)).unwrap_err(),
      PromoError::InsufficientSubtotal { min_required: dec!(50) }
    );
  }

  #[test]
  fn unknown_code() {
    let rules = [rule(dec!(-10), DiscountValueType::Percentage, None, None)];
    assert!(matches!(evaluate(&rules, "NOPE", dec!(80)), Err(PromoError::CodeNotFound { .. })));
  }

  #[test]
  fn book_is_case_insensitive_per_customer() {
    let book = DiscountBook::default();
    let rules = [rule(dec!(-10), DiscountValueType::Percentage, None, None)];
    book.set("A@shop.io", evaluate(&rules, "SAVE10", dec!(80)).unwrap());
    assert!(book.get("a@shop.io").is_some());
    assert!(book.get("b@shop.io").is_none());
    assert!(book.clear("a@shop.io").is_some());
    assert!(book.get("A@shop.io").is_none());
  }
}
