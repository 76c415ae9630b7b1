// storefront/src/state.rs
use crate::config::StorefrontConfig;
use cartflow::memory::{
  FixedCurrency, InMemoryDraftOrderStore, InMemoryPriceRuleCatalog, ScriptedPayment, StaticAddressBook, StaticSession,
  VariantInfo,
};
use cartflow::model::{DiscountCode, DiscountValueType, SubtotalRange};
use cartflow::{Address, CartEngine, Collaborators, PriceRule};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const TEE: u64 = 4001;
pub const MUG: u64 = 4002;
pub const POSTER: u64 = 4003;

#[derive(Clone)]
pub struct AppState {
  pub engine: Arc<CartEngine>,
  pub store: Arc<InMemoryDraftOrderStore>,
  pub config: Arc<StorefrontConfig>,
}

impl AppState {
  pub fn build(config: StorefrontConfig) -> Self {
    let store = Arc::new(
      InMemoryDraftOrderStore::new()
        .with_variant(TEE, VariantInfo::new("Logo Tee", "24.00", 12))
        .with_variant(MUG, VariantInfo::new("Enamel Mug", "11.50", 2))
        .with_variant(POSTER, VariantInfo::new("Launch Poster", "140.00", 4)),
    );
    let addresses = StaticAddressBook::new().with_default(&config.customer_email, demo_address());

    let collaborators = Collaborators {
      store: store.clone(),
      price_rules: Arc::new(InMemoryPriceRuleCatalog::new(demo_price_rules())),
      addresses: Arc::new(addresses),
      payments: Arc::new(ScriptedPayment::new(config.payment_script)),
      session: Arc::new(StaticSession::signed_in(&config.customer_email)),
      currency: Arc::new(FixedCurrency("USD".to_string())),
    };

    Self {
      engine: Arc::new(CartEngine::new(collaborators, config.engine.clone())),
      store,
      config: Arc::new(config),
    }
  }
}

fn demo_address() -> Address {
  Address {
    first_name: "Ada".to_string(),
    last_name: "Lovelace".to_string(),
    address1: "12 Analytical Row".to_string(),
    city: "London".to_string(),
    country: "GB".to_string(),
    zip: Some("N1 9GU".to_string()),
    ..Default::default()
  }
}

fn demo_price_rules() -> Vec<PriceRule> {
  vec![
    PriceRule {
      id: 1,
      title: "Ten percent over fifty".to_string(),
      value: Decimal::new(-100, 1),
      value_type: DiscountValueType::Percentage,
      usage_limit: Some(500),
      prerequisite_subtotal_range: Some(SubtotalRange {
        greater_than_or_equal_to: Decimal::from(50),
      }),
      discount_codes: vec![DiscountCode {
        id: 11,
        code: "SAVE10".to_string(),
        usage_count: 41,
      }],
    },
    PriceRule {
      id: 2,
      title: "Five off".to_string(),
      value: Decimal::from(-5),
      value_type: DiscountValueType::FixedAmount,
      usage_limit: None,
      prerequisite_subtotal_range: None,
      discount_codes: vec![DiscountCode {
        id: 21,
        code: "FIVEOFF".to_string(),
        usage_count: 0,
      }],
    },
  ]
}
