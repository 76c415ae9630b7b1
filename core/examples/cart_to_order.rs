// cartflow/examples/cart_to_order.rs

use cartflow::memory::{
  FixedCurrency, InMemoryDraftOrderStore, InMemoryPriceRuleCatalog, PaymentScript, ScriptedPayment, StaticAddressBook,
  StaticSession, VariantInfo,
};
use cartflow::model::{DiscountCode, DiscountValueType};
use cartflow::{
  Address, CartEngine, CartError, CheckoutRequest, Collaborators, EngineConfig, PaymentMethod, PriceRule,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

const EMAIL: &str = "ada@shop.io";

#[tokio::main]
async fn main() -> Result<(), CartError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Cart To Order Example ---");

  // 1. In-memory stand-ins for the remote store and the device-side collaborators
  let store = Arc::new(InMemoryDraftOrderStore::new().with_variant(7, VariantInfo::new("Canvas Tote", "18.00", 6)));
  let rules = vec![PriceRule {
    id: 1,
    title: "Five off".into(),
    value: Decimal::from(-5),
    value_type: DiscountValueType::FixedAmount,
    usage_limit: None,
    prerequisite_subtotal_range: None,
    discount_codes: vec![DiscountCode {
      id: 10,
      code: "FIVEOFF".into(),
      usage_count: 0,
    }],
  }];
  let address = Address {
    first_name: "Ada".into(),
    address1: "12 Analytical Row".into(),
    city: "London".into(),
    country: "GB".into(),
    ..Default::default()
  };

  let engine = CartEngine::new(
    Collaborators {
      store: store.clone(),
      price_rules: Arc::new(InMemoryPriceRuleCatalog::new(rules)),
      addresses: Arc::new(StaticAddressBook::new().with_default(EMAIL, address)),
      payments: Arc::new(ScriptedPayment::new(PaymentScript::Complete)),
      session: Arc::new(StaticSession::signed_in(EMAIL)),
      currency: Arc::new(FixedCurrency("GBP".into())),
    },
    EngineConfig::default(),
  );

  // 2. Two adds of the same variant land on one line
  engine.add_to_cart(engine.normalize(EMAIL, 1, 7, 1)?).await?;
  let outcome = engine.add_to_cart(engine.normalize(EMAIL, 1, 7, 2)?).await?;
  info!(?outcome, "Second add merged into the existing line.");

  // 3. Price it, apply a code, check out with card
  let cart = engine.current_cart().await?.ok_or(CartError::NotSignedIn)?;
  let subtotal = engine.summarize(&cart.line_items, Decimal::ZERO).subtotal;
  let discount = match engine.apply_promo("fiveoff", subtotal, PaymentMethod::CardOrWallet).await {
    Ok(validated) => validated.amount,
    Err(e) => {
      info!(error = %e, "Promo rejected.");
      Decimal::ZERO
    }
  };
  info!(summary = ?engine.summarize(&cart.line_items, discount), "Priced cart.");

  let report = engine
    .place_order_with_report(CheckoutRequest {
      draft_order: cart,
      address: None,
      payment_method: PaymentMethod::CardOrWallet,
    })
    .await;

  info!(stages = ?report.stages_entered, result = ?report.result, "Checkout finished.");
  info!(completed = store.completed_orders().await.len(), "Orders on the remote.");
  Ok(())
}
