// storefront/src/session.rs

//! A scripted shopper session against the engine: add, merge, edit, promo,
//! summary, checkout.

use crate::errors::{AppError, Result};
use crate::state::{AppState, MUG, TEE};
use cartflow::{CartError, CheckoutReport, CheckoutRequest};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

#[instrument(skip_all, fields(customer = %state.config.customer_email))]
pub async fn run(state: &AppState) -> Result<CheckoutReport> {
  let engine = &state.engine;
  let email = state.config.customer_email.as_str();

  let outcome = engine.add_to_cart(engine.normalize(email, 1, TEE as i64, 2)?).await?;
  info!(?outcome, "Added two tees.");

  let outcome = engine.add_to_cart(engine.normalize(email, 1, TEE as i64, 1)?).await?;
  info!(?outcome, "Added one more tee; quantities merged.");

  let outcome = engine.add_to_cart(engine.normalize(email, 2, MUG as i64, 1)?).await?;
  info!(?outcome, "Added a mug.");

  // Over the per-line cap: reported to the shopper, the session carries on.
  match engine.add_to_cart(engine.normalize(email, 1, TEE as i64, 3)?).await {
    Err(e @ CartError::QuantityExceedsLimit { .. }) => warn!(error = %e, message = %e.user_message(), "Rejected as expected."),
    Err(e) => return Err(e.into()),
    Ok(outcome) => warn!(?outcome, "Over-cap add was accepted."),
  }

  let cart = engine
    .current_cart()
    .await?
    .ok_or_else(|| AppError::Checkout("cart disappeared before checkout".to_string()))?;
  if let Some(mug) = cart.line_items.iter().find(|li| li.variant_id == MUG).and_then(|li| li.id) {
    engine.update_line_quantity(cart.id, mug, 2).await?;
    info!("Set mug quantity to 2 from the cart screen.");
  }

  let cart = engine
    .current_cart()
    .await?
    .ok_or_else(|| AppError::Checkout("cart disappeared before checkout".to_string()))?;
  let before_promo = engine.summarize(&cart.line_items, Decimal::ZERO);
  info!(subtotal = %before_promo.subtotal, lines = cart.line_items.len(), "Cart summary.");

  let payment_method = state.config.payment_method;
  let mut discount = Decimal::ZERO;
  if let Some(code) = &state.config.promo_code {
    match engine.apply_promo(code, before_promo.subtotal, payment_method).await {
      Ok(validated) => {
        info!(code = %validated.code, amount = %validated.amount, "Promo applied.");
        discount = validated.amount;
      }
      Err(e) => warn!(error = %e, message = %e.user_message(), "Promo not applied."),
    }
  }
  let summary = engine.summarize(&cart.line_items, discount);
  info!(total = %summary.total, discount = %summary.discount, "Summary before checkout.");

  let report = engine
    .place_order_with_report(CheckoutRequest {
      draft_order: cart,
      address: None,
      payment_method,
    })
    .await;
  info!(
    attempt_id = %report.attempt_id,
    state = ?report.final_state,
    message = %report.result.user_message(),
    "Checkout finished."
  );
  Ok(report)
}
