// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset

use cartflow::memory::{
  FixedCurrency, InMemoryDraftOrderStore, InMemoryPriceRuleCatalog, PaymentScript, ScriptedPayment, StaticAddressBook,
  StaticSession, VariantInfo,
};
use cartflow::model::{DiscountCode, DiscountValueType, DraftOrderStatus, SubtotalRange};
use cartflow::{
  Address, CartEngine, Collaborators, ContextData, DraftOrder, EngineConfig, FlowError, LineItem, PipelineControl,
  PriceRule,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::Level;

pub const CUSTOMER: &str = "ada@shop.io";
pub const OTHER_CUSTOMER: &str = "grace@shop.io";

/// Tee: 20.00, stock 10.
pub const TEE: u64 = 10;
/// Mug: 12.50, stock 3.
pub const MUG: u64 = 11;
/// Poster: 150.00, stock 5.
pub const POSTER: u64 = 12;

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---
pub fn store_with_catalog() -> InMemoryDraftOrderStore {
  InMemoryDraftOrderStore::new()
    .with_variant(TEE, VariantInfo::new("Tee", "20.00", 10))
    .with_variant(MUG, VariantInfo::new("Mug", "12.50", 3))
    .with_variant(POSTER, VariantInfo::new("Poster", "150.00", 5))
}

pub fn home_address() -> Address {
  Address {
    first_name: "Ada".into(),
    last_name: "Lovelace".into(),
    address1: "12 Analytical Row".into(),
    city: "London".into(),
    country: "GB".into(),
    zip: Some("N1 9GU".into()),
    ..Default::default()
  }
}

pub fn price_rules() -> Vec<PriceRule> {
  vec![
    PriceRule {
      id: 1,
      title: "Ten percent".into(),
      value: dec!(-10.0),
      value_type: DiscountValueType::Percentage,
      usage_limit: Some(100),
      prerequisite_subtotal_range: Some(SubtotalRange {
        greater_than_or_equal_to: dec!(50),
      }),
      discount_codes: vec![DiscountCode {
        id: 101,
        code: "SAVE10".into(),
        usage_count: 3,
      }],
    },
    PriceRule {
      id: 2,
      title: "Five off".into(),
      value: dec!(-5.0),
      value_type: DiscountValueType::FixedAmount,
      usage_limit: None,
      prerequisite_subtotal_range: None,
      discount_codes: vec![DiscountCode {
        id: 201,
        code: "FIVEOFF".into(),
        usage_count: 0,
      }],
    },
    PriceRule {
      id: 3,
      title: "Launch".into(),
      value: dec!(-50.0),
      value_type: DiscountValueType::Percentage,
      usage_limit: Some(2),
      prerequisite_subtotal_range: None,
      discount_codes: vec![DiscountCode {
        id: 301,
        code: "LAUNCH".into(),
        usage_count: 2,
      }],
    },
  ]
}

pub fn line(id: u64, variant_id: u64, quantity: u32, price: &str, stock: Option<i64>) -> LineItem {
  LineItem {
    id: Some(id),
    variant_id,
    product_id: variant_id * 100,
    title: format!("Variant {}", variant_id),
    variant_title: None,
    quantity,
    price: price.into(),
    stock,
  }
}

pub fn draft(id: u64, email: &str, line_items: Vec<LineItem>) -> DraftOrder {
  DraftOrder {
    id,
    customer_email: email.into(),
    status: DraftOrderStatus::Open,
    line_items,
    shipping_address: None,
    applied_discount: None,
    subtotal_price: None,
    total_price: None,
    order_id: None,
  }
}

/// An engine wired to in-memory collaborators, with handles kept for assertions.
pub struct Harness {
  pub store: Arc<InMemoryDraftOrderStore>,
  pub catalog: Arc<InMemoryPriceRuleCatalog>,
  pub addresses: Arc<StaticAddressBook>,
  pub payment: Arc<ScriptedPayment>,
  pub session: Arc<StaticSession>,
  pub engine: CartEngine,
}

impl Harness {
  pub fn new() -> Self {
    Self::build(store_with_catalog(), EngineConfig::default(), PaymentScript::Complete)
  }

  pub fn with_store(store: InMemoryDraftOrderStore) -> Self {
    Self::build(store, EngineConfig::default(), PaymentScript::Complete)
  }

  pub fn build(store: InMemoryDraftOrderStore, config: EngineConfig, script: PaymentScript) -> Self {
    Self::build_with_addresses(
      store,
      config,
      script,
      StaticAddressBook::new().with_default(CUSTOMER, home_address()),
    )
  }

  pub fn build_with_addresses(
    store: InMemoryDraftOrderStore,
    config: EngineConfig,
    script: PaymentScript,
    addresses: StaticAddressBook,
  ) -> Self {
    setup_tracing();
    let store = Arc::new(store);
    let catalog = Arc::new(InMemoryPriceRuleCatalog::new(price_rules()));
    let addresses = Arc::new(addresses);
    let payment = Arc::new(ScriptedPayment::new(script));
    let session = Arc::new(StaticSession::signed_in(CUSTOMER));

    let collaborators = Collaborators {
      store: store.clone(),
      price_rules: catalog.clone(),
      addresses: addresses.clone(),
      payments: payment.clone(),
      session: session.clone(),
      currency: Arc::new(FixedCurrency("USD".into())),
    };

    Self {
      engine: CartEngine::new(collaborators, config),
      store,
      catalog,
      addresses,
      payment,
      session,
    }
  }

  /// Normalizes and adds in one go.
  pub async fn add(&self, variant_id: u64, quantity: i64) -> Result<cartflow::AddToCartOutcome, cartflow::CartError> {
    let request = self
      .engine
      .normalize(CUSTOMER, (variant_id * 100) as i64, variant_id as i64, quantity)?;
    self.engine.add_to_cart(request).await
  }

  pub async fn cart(&self) -> DraftOrder {
    self.engine.current_cart().await.unwrap().expect("customer should have a cart")
  }
}

pub fn subtotal_of(order: &DraftOrder) -> Decimal {
  cartflow::summarize(&order.line_items, Decimal::ZERO).subtotal
}

// --- Pipeline test context ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStep {
  One,
  Two,
  Three,
}

impl std::fmt::Display for TestStep {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<TestStep>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(#[from] FlowError),

  #[error("test handler failed: {0}")]
  Handler(String),
}

pub fn create_simple_handler(
  step: TestStep,
  label: &'static str,
) -> impl Fn(ContextData<TestContext>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<PipelineControl, TestError>> + Send>>
     + Send
     + Sync
     + 'static {
  move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.steps_executed.push(label.to_string());
      tracing::debug!(target: "test_handlers", %step, counter = guard.counter, "executed");
      if guard.should_stop_at == Some(step) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

pub fn create_failing_handler(
  label: &'static str,
  error_message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<PipelineControl, TestError>> + Send>>
     + Send
     + Sync
     + 'static {
  move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(label.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  }
}
