// tests/discount_tests.rs
mod common;

use cartflow::model::{DiscountCode, DiscountValueType, PriceRule};
use cartflow::{PaymentMethod, PromoError, RemoteError};
use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_code_match_ignores_case_and_computes_percentage() {
  let h = Harness::new();
  let discount = h.engine.apply_promo("save10", dec!(100), PaymentMethod::Cash).await.unwrap();
  assert_eq!(discount.amount, dec!(10.0));
  assert_eq!(discount.code, "SAVE10");
  assert_eq!(discount.value_type, DiscountValueType::Percentage);
  assert_eq!(h.engine.applied_promo(), Some(discount));
}

#[tokio::test]
async fn test_plain_percentage_rule_without_limits() {
  // value "10", percentage, no minimum, no usage limit.
  let rules = vec![PriceRule {
    id: 9,
    title: "Plain".into(),
    value: dec!(10),
    value_type: DiscountValueType::Percentage,
    usage_limit: None,
    prerequisite_subtotal_range: None,
    discount_codes: vec![DiscountCode {
      id: 90,
      code: "SAVE10".into(),
      usage_count: 0,
    }],
  }];
  let validated = cartflow::discount::evaluate(&rules, "save10", dec!(100)).unwrap();
  assert_eq!(validated.amount, dec!(10.0));
}

#[tokio::test]
async fn test_minimum_subtotal_not_met() {
  let h = Harness::new();
  let err = h.engine.apply_promo("SAVE10", dec!(40), PaymentMethod::CardOrWallet).await.unwrap_err();
  assert_eq!(err, PromoError::InsufficientSubtotal { min_required: dec!(50) });
  assert!(err.user_message().contains("50"));
  assert_eq!(h.engine.applied_promo(), None);
}

#[tokio::test]
async fn test_usage_limit_and_unknown_code() {
  let h = Harness::new();
  let err = h.engine.apply_promo("LAUNCH", dec!(80), PaymentMethod::CardOrWallet).await.unwrap_err();
  assert!(matches!(err, PromoError::ExceededUsageLimit { usage_limit: 2, .. }));

  let err = h.engine.apply_promo("BOGUS", dec!(80), PaymentMethod::CardOrWallet).await.unwrap_err();
  assert_eq!(err, PromoError::CodeNotFound { code: "BOGUS".into() });
}

#[tokio::test]
async fn test_fixed_amount_code() {
  let h = Harness::new();
  let discount = h.engine.apply_promo("fiveoff", dec!(12.50), PaymentMethod::CardOrWallet).await.unwrap();
  assert_eq!(discount.amount, dec!(5));
}

#[tokio::test]
async fn test_cash_total_after_discount_must_fit_cod_ceiling() {
  let h = Harness::new();
  // 200 - 5 = 195 > 100
  let err = h.engine.apply_promo("FIVEOFF", dec!(200), PaymentMethod::Cash).await.unwrap_err();
  assert_eq!(
    err,
    PromoError::TotalExceedsCodLimit {
      total: dec!(195),
      ceiling: dec!(100)
    }
  );
  // The same code is fine for card payments.
  assert!(h.engine.apply_promo("FIVEOFF", dec!(200), PaymentMethod::CardOrWallet).await.is_ok());
}

#[tokio::test]
async fn test_catalog_failure_is_unknown() {
  let h = Harness::new();
  h.catalog.fail_with(RemoteError::Decode("unexpected token".into()));
  let err = h.engine.apply_promo("SAVE10", dec!(80), PaymentMethod::CardOrWallet).await.unwrap_err();
  assert!(matches!(err, PromoError::Unknown(RemoteError::Decode(_))));
  assert_eq!(h.catalog.fetches(), 1);
}

#[tokio::test]
async fn test_remove_promo_clears_it() {
  let h = Harness::new();
  h.engine.apply_promo("FIVEOFF", dec!(30), PaymentMethod::CardOrWallet).await.unwrap();
  assert!(h.engine.remove_promo().is_some());
  assert!(h.engine.applied_promo().is_none());
}

#[test]
fn test_summary_examples() {
  let empty = cartflow::summarize(&[], Decimal::ZERO);
  assert_eq!(empty.subtotal, Decimal::ZERO);
  assert_eq!(empty.tax, Decimal::ZERO);
  assert_eq!(empty.discount, Decimal::ZERO);
  assert_eq!(empty.total, Decimal::ZERO);

  let s = cartflow::summarize(&[line(1, TEE, 2, "10.00", None)], dec!(5));
  assert_eq!(s.subtotal, dec!(20));
  assert_eq!(s.tax, Decimal::ZERO);
  assert_eq!(s.discount, dec!(5));
  assert_eq!(s.total, dec!(15));
}

#[test]
fn test_price_rule_payload_decodes() {
  let payload = r#"[{
    "id": 507328175,
    "title": "SUMMERSALE10OFF",
    "value_type": "percentage",
    "value": "-10.0",
    "usage_limit": 20,
    "prerequisite_subtotal_range": { "greater_than_or_equal_to": "40.0" },
    "discount_codes": [{ "id": 1054381139, "code": "SUMMERSALE10OFF", "usage_count": 0 }]
  }, {
    "id": 2,
    "value_type": "shipping_line",
    "value": "-100.0"
  }]"#;
  let rules: Vec<PriceRule> = serde_json::from_str(payload).unwrap();
  assert_eq!(rules[0].minimum_subtotal(), Some(dec!(40.0)));
  assert_eq!(rules[0].value, dec!(-10.0));
  assert_eq!(rules[1].value_type, DiscountValueType::Unknown);
  assert!(rules[1].discount_codes.is_empty());
}
