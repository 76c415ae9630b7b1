// cartflow/src/engine.rs

//! `CartEngine`: the operations a storefront UI calls.

use crate::cart::{
  cart_pipeline, normalize, AddToCartOutcome, CartCtxData, CartError, CartLineRequest, CartStage, DraftOrderResolver,
  ValidationError,
};
use crate::checkout::{CheckoutOrchestrator, CheckoutReport, CheckoutRequest, OrderResult};
use crate::collaborators::Collaborators;
use crate::config::EngineConfig;
use crate::core::{ContextData, PipelineResult};
use crate::discount::{DiscountBook, DiscountPolicy, PromoError, ValidatedDiscount};
use crate::error::FlowError;
use crate::locks::CustomerLocks;
use crate::model::{DraftOrder, DraftOrderId, LineItem, LineItemId, PaymentMethod};
use crate::pipeline::Pipeline;
use crate::summary::{self, OrderSummary};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct CartEngine {
  config: EngineConfig,
  collaborators: Collaborators,
  resolver: Arc<DraftOrderResolver>,
  cart_pipeline: Pipeline<CartStage, CartCtxData, CartError>,
  discounts: DiscountPolicy,
  discount_book: Arc<DiscountBook>,
  checkout: CheckoutOrchestrator,
  locks: CustomerLocks,
}

impl CartEngine {
  pub fn new(collaborators: Collaborators, config: EngineConfig) -> Self {
    let resolver = Arc::new(DraftOrderResolver::new(collaborators.store.clone(), config.email_match));
    let discount_book = Arc::new(DiscountBook::default());
    Self {
      resolver,
      cart_pipeline: cart_pipeline(),
      discounts: DiscountPolicy::new(collaborators.price_rules.clone()),
      checkout: CheckoutOrchestrator::new(collaborators.clone(), &config, discount_book.clone()),
      discount_book,
      locks: CustomerLocks::new(),
      collaborators,
      config,
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Validates raw add-to-cart input against this engine's per-line cap.
  pub fn normalize(
    &self,
    customer_email: &str,
    product_id: i64,
    variant_id: i64,
    quantity: i64,
  ) -> Result<CartLineRequest, ValidationError> {
    normalize(customer_email, product_id, variant_id, quantity, self.config.max_quantity_per_line)
  }

  /// Adds the requested quantity to the customer's cart, creating the draft
  /// order if the customer has none.
  #[instrument(
    name = "CartEngine::add_to_cart",
    skip_all,
    fields(customer = %request.customer_email(), variant_id = request.variant_id(), quantity = request.quantity()),
    err(Display)
  )]
  pub async fn add_to_cart(&self, request: CartLineRequest) -> Result<AddToCartOutcome, CartError> {
    let _guard = self.locks.acquire(request.customer_email()).await;

    let ctx_data = ContextData::new(CartCtxData::for_add(
      request,
      self.collaborators.store.clone(),
      self.resolver.clone(),
      self.config.max_quantity_per_line,
    ));
    self.run_cart(ctx_data.clone()).await?;

    let tag = ctx_data
      .get(|d| d.plan.as_ref().map(|p| p.tag))
      .ok_or_else(|| FlowError::Internal("cart pipeline finished without a merge plan".to_string()))?;
    let outcome = AddToCartOutcome::from(tag);
    info!(?outcome, "Added to cart.");
    Ok(outcome)
  }

  /// Sets one line of the signed-in customer's cart to `new_quantity`.
  #[instrument(name = "CartEngine::update_line_quantity", skip(self), err(Display))]
  pub async fn update_line_quantity(
    &self,
    order_id: DraftOrderId,
    item_id: LineItemId,
    new_quantity: i64,
  ) -> Result<(), CartError> {
    let email = self.session_email()?;
    let _guard = self.locks.acquire(&email).await;

    let ctx_data = ContextData::new(CartCtxData::for_line_edit(
      &email,
      order_id,
      item_id,
      new_quantity,
      self.collaborators.store.clone(),
      self.resolver.clone(),
      self.config.max_quantity_per_line,
    ));
    self.run_cart(ctx_data).await?;
    Ok(())
  }

  /// Drops one line. Removing the last line deletes the draft order and returns `None`.
  #[instrument(name = "CartEngine::remove_line_item", skip(self), err(Display))]
  pub async fn remove_line_item(
    &self,
    order_id: DraftOrderId,
    item_id: LineItemId,
  ) -> Result<Option<DraftOrder>, CartError> {
    let email = self.session_email()?;
    let _guard = self.locks.acquire(&email).await;

    let mut order = self.resolver.resolve_by_id(&email, order_id).await?;
    if order.line_by_id(item_id).is_none() {
      return Err(CartError::LineItemNotFound(item_id));
    }
    order.line_items.retain(|li| li.id != Some(item_id));

    let store = &self.collaborators.store;
    if order.line_items.is_empty() {
      let deleted = store.delete_draft_order(order_id).await.map_err(CartError::RemoteWrite)?;
      if !deleted {
        warn!("Remote did not delete the emptied draft order.");
        return Err(CartError::DraftOrderNotFound(order_id));
      }
      info!("Last line removed; draft order deleted.");
      return Ok(None);
    }

    let saved = store
      .replace_draft_order(order_id, &order)
      .await
      .map_err(CartError::RemoteWrite)?;
    Ok(Some(saved))
  }

  /// The signed-in customer's open draft order, if any.
  #[instrument(name = "CartEngine::current_cart", skip(self), err(Display))]
  pub async fn current_cart(&self) -> Result<Option<DraftOrder>, CartError> {
    let email = self.session_email()?;
    self.resolver.resolve(&email).await
  }

  /// Validates `code` for `subtotal` and remembers it for the signed-in
  /// customer's next checkout. For cash on delivery the discounted total must
  /// stay within the COD ceiling.
  #[instrument(name = "CartEngine::apply_promo", skip(self, subtotal), fields(subtotal = %subtotal), err(Display))]
  pub async fn apply_promo(
    &self,
    code: &str,
    subtotal: Decimal,
    payment_method: PaymentMethod,
  ) -> Result<ValidatedDiscount, PromoError> {
    let validated = self.discounts.validate(code, subtotal).await?;

    if payment_method == PaymentMethod::Cash {
      let total = subtotal - validated.amount;
      if total > self.config.cod_ceiling {
        return Err(PromoError::TotalExceedsCodLimit {
          total,
          ceiling: self.config.cod_ceiling,
        });
      }
    }

    match self.collaborators.session.current_customer_email() {
      Some(email) => self.discount_book.set(&email, validated.clone()),
      None => warn!("No signed-in customer; promo validated but not kept for checkout."),
    }
    Ok(validated)
  }

  /// Forgets the signed-in customer's applied promo.
  pub fn remove_promo(&self) -> Option<ValidatedDiscount> {
    let email = self.collaborators.session.current_customer_email()?;
    self.discount_book.clear(&email)
  }

  pub fn applied_promo(&self) -> Option<ValidatedDiscount> {
    let email = self.collaborators.session.current_customer_email()?;
    self.discount_book.get(&email)
  }

  pub fn summarize(&self, line_items: &[LineItem], discount: Decimal) -> OrderSummary {
    summary::summarize(line_items, discount)
  }

  pub async fn place_order(&self, request: CheckoutRequest) -> OrderResult {
    self.place_order_with_report(request).await.result
  }

  /// Runs checkout for `request.draft_order` with whatever promo its customer
  /// has applied.
  #[instrument(
    name = "CartEngine::place_order",
    skip_all,
    fields(draft_order_id = request.draft_order.id, payment_method = %request.payment_method)
  )]
  pub async fn place_order_with_report(&self, request: CheckoutRequest) -> CheckoutReport {
    let email = request.draft_order.customer_email.clone();
    let _guard = self.locks.acquire(&email).await;
    let discount = self.discount_book.get(&email);
    self.checkout.run(request, discount).await
  }

  fn session_email(&self) -> Result<String, CartError> {
    self
      .collaborators
      .session
      .current_customer_email()
      .filter(|e| !e.trim().is_empty())
      .ok_or(CartError::NotSignedIn)
  }

  async fn run_cart(&self, ctx_data: ContextData<CartCtxData>) -> Result<DraftOrder, CartError> {
    match self.cart_pipeline.run(ctx_data.clone()).await {
      Ok(PipelineResult::Completed) => ctx_data
        .get(|d| d.saved.clone())
        .ok_or_else(|| FlowError::Internal("cart pipeline finished without saving".to_string()).into()),
      Ok(PipelineResult::Stopped { at }) => {
        Err(FlowError::Internal(format!("cart pipeline stopped at {}", at)).into())
      }
      Err(failure) => Err(failure.into_source()),
    }
  }
}
