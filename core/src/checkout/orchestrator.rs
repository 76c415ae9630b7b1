// cartflow/src/checkout/orchestrator.rs

//! Runs one checkout attempt as a five-stage pipeline.
//!
//! Stages execute strictly in order with no retries. A failure stops the run
//! and is reported with the stage it happened in. Once `OrderCompleting` has
//! succeeded the purchase stands, so a `DraftDeleting` failure is reported as
//! [`OrderResult::CompletedCleanupPending`] instead of a failure.

use super::failure::CheckoutFailure;
use super::stage::{CheckoutReport, CheckoutRequest, CheckoutStage, CheckoutState, OrderResult};
use crate::collaborators::{Collaborators, PaymentReply, PaymentRequest, PaymentSignal};
use crate::config::EngineConfig;
use crate::core::step::SkipCondition;
use crate::core::{ContextData, PipelineControl, PipelineResult};
use crate::discount::{DiscountBook, ValidatedDiscount};
use crate::error::FlowError;
use crate::model::{Address, DraftOrder, PaymentMethod};
use crate::pipeline::Pipeline;
use crate::summary::{summarize, OrderSummary};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

type Handled = Result<PipelineControl, CheckoutFailure>;

pub struct CheckoutCtxData {
  pub attempt_id: Uuid,
  pub collaborators: Collaborators,
  pub discount_book: Arc<DiscountBook>,
  pub cod_ceiling: Decimal,
  pub payment_timeout: Duration,

  pub customer_email: String,
  pub payment_method: PaymentMethod,
  pub draft_order: DraftOrder,
  pub address: Option<Address>,
  /// Cleared once it has been written onto the draft order.
  pub discount: Option<ValidatedDiscount>,
  pub summary: OrderSummary,

  pub state: CheckoutState,
  pub stages_entered: Vec<CheckoutStage>,
}

pub struct CheckoutOrchestrator {
  pipeline: Pipeline<CheckoutStage, CheckoutCtxData, CheckoutFailure>,
  collaborators: Collaborators,
  discount_book: Arc<DiscountBook>,
  cod_ceiling: Decimal,
  payment_timeout: Duration,
}

impl CheckoutOrchestrator {
  pub fn new(collaborators: Collaborators, config: &EngineConfig, discount_book: Arc<DiscountBook>) -> Self {
    Self {
      pipeline: checkout_pipeline(),
      collaborators,
      discount_book,
      cod_ceiling: config.cod_ceiling,
      payment_timeout: config.payment_timeout,
    }
  }

  pub fn stages(&self) -> Vec<CheckoutStage> {
    self.pipeline.step_keys()
  }

  /// Runs one attempt. The caller is responsible for serializing attempts per customer.
  pub async fn run(&self, request: CheckoutRequest, discount: Option<ValidatedDiscount>) -> CheckoutReport {
    let attempt_id = Uuid::new_v4();
    let draft_order_id = request.draft_order.id;
    let discount_amount = discount.as_ref().map_or(Decimal::ZERO, |d| d.amount);
    let summary = summarize(&request.draft_order.line_items, discount_amount);

    let span = info_span!(
      "checkout",
      %attempt_id,
      draft_order_id,
      payment_method = %request.payment_method,
      total = %summary.total,
    );

    let ctx_data = ContextData::new(CheckoutCtxData {
      attempt_id,
      collaborators: self.collaborators.clone(),
      discount_book: self.discount_book.clone(),
      cod_ceiling: self.cod_ceiling,
      payment_timeout: self.payment_timeout,
      customer_email: request.draft_order.customer_email.clone(),
      payment_method: request.payment_method,
      draft_order: request.draft_order,
      address: request.address,
      discount,
      summary,
      state: CheckoutState::Idle,
      stages_entered: Vec::new(),
    });

    async move {
      info!("Checkout attempt starting.");
      let outcome = self.pipeline.run(ctx_data.clone()).await;
      let summary = ctx_data.get(|d| d.summary.clone());

      let (result, final_state) = match outcome {
        Ok(PipelineResult::Completed) => (OrderResult::Success { draft_order_id, summary }, CheckoutState::Success),
        Ok(PipelineResult::Stopped {
          at: CheckoutStage::PaymentAwaiting,
        }) => (OrderResult::Cancelled { draft_order_id }, CheckoutState::Idle),
        Ok(PipelineResult::Stopped { at }) => {
          let reason = CheckoutFailure::Flow(FlowError::Internal(format!("stage {} stopped the checkout", at)));
          (OrderResult::FailedAtStage { stage: at, reason }, CheckoutState::Failed)
        }
        Err(failure) if failure.step == CheckoutStage::DraftDeleting => {
          warn!(error = %failure.source, "Order placed but draft cleanup is pending.");
          (
            OrderResult::CompletedCleanupPending {
              draft_order_id,
              reason: failure.into_source(),
            },
            CheckoutState::Success,
          )
        }
        Err(failure) => {
          error!(stage = %failure.step, error = %failure.source, "Checkout failed.");
          (
            OrderResult::FailedAtStage {
              stage: failure.step,
              reason: failure.source,
            },
            CheckoutState::Failed,
          )
        }
      };

      let stages_entered = ctx_data.update(|d| {
        d.state = final_state;
        std::mem::take(&mut d.stages_entered)
      });
      info!(state = ?final_state, "Checkout attempt finished.");

      CheckoutReport {
        attempt_id,
        result,
        stages_entered,
        final_state,
      }
    }
    .instrument(span)
    .await
  }
}

fn checkout_pipeline() -> Pipeline<CheckoutStage, CheckoutCtxData, CheckoutFailure> {
  let pay_on_delivery: SkipCondition<CheckoutCtxData> =
    Arc::new(|ctx_data: ContextData<CheckoutCtxData>| ctx_data.get(|d| d.payment_method == PaymentMethod::Cash));

  let mut p = Pipeline::<CheckoutStage, CheckoutCtxData, CheckoutFailure>::new(&[
    (CheckoutStage::AddressEnsuring, false, None),
    (CheckoutStage::OrderUpdating, false, None),
    (CheckoutStage::PaymentAwaiting, false, Some(pay_on_delivery)),
    (CheckoutStage::OrderCompleting, false, None),
    (CheckoutStage::DraftDeleting, false, None),
  ]);

  // Registered first so the state reflects a stage even when its own guard fails.
  p.before_each(enter_stage);

  p.on(CheckoutStage::AddressEnsuring, ensure_address);
  p.before(CheckoutStage::OrderUpdating, enforce_cod_ceiling);
  p.on(CheckoutStage::OrderUpdating, update_order);
  p.on(CheckoutStage::PaymentAwaiting, await_payment);
  p.on(CheckoutStage::OrderCompleting, complete_order);
  p.on(CheckoutStage::DraftDeleting, delete_draft);

  p
}

async fn enter_stage(stage: CheckoutStage, ctx_data: ContextData<CheckoutCtxData>) -> Handled {
  ctx_data.update(|d| {
    d.state = stage.into();
    d.stages_entered.push(stage);
  });
  info!(stage = %stage, "Checkout: entering stage.");
  Ok(PipelineControl::Continue)
}

async fn ensure_address(ctx_data: ContextData<CheckoutCtxData>) -> Handled {
  let (addresses, email, chosen) = ctx_data.get(|d| {
    (
      d.collaborators.addresses.clone(),
      d.customer_email.clone(),
      d.address.is_some(),
    )
  });
  if chosen {
    return Ok(PipelineControl::Continue);
  }

  let address = match addresses.default_address(&email).await.map_err(CheckoutFailure::NoAddress)? {
    Some(address) => address,
    None => {
      info!("Checkout: no default address, asking the customer.");
      addresses
        .ensure_default_address(&email)
        .await
        .map_err(CheckoutFailure::NoAddress)?
    }
  };
  info!(address = %address.one_line(), "Checkout: shipping address set.");
  ctx_data.write().address = Some(address);
  Ok(PipelineControl::Continue)
}

/// Runs before any remote write so an over-limit COD order touches nothing.
async fn enforce_cod_ceiling(ctx_data: ContextData<CheckoutCtxData>) -> Handled {
  let (method, total, ceiling) = ctx_data.get(|d| (d.payment_method, d.summary.total, d.cod_ceiling));
  if method == PaymentMethod::Cash && total > ceiling {
    warn!(%total, %ceiling, "Checkout: cash on delivery over the ceiling.");
    return Err(CheckoutFailure::CodLimitExceeded { total, ceiling });
  }
  Ok(PipelineControl::Continue)
}

async fn update_order(ctx_data: ContextData<CheckoutCtxData>) -> Handled {
  let (store, payload) = ctx_data.get(|d| {
    let mut order = d.draft_order.clone();
    order.shipping_address = d.address.clone();
    if let Some(discount) = &d.discount {
      order.applied_discount = Some(discount.to_applied_discount());
    }
    (d.collaborators.store.clone(), order)
  });

  let updated = store
    .replace_draft_order(payload.id, &payload)
    .await
    .map_err(CheckoutFailure::UpdateFailed)?;

  let (book, email) = ctx_data.update(|d| {
    d.draft_order = updated;
    d.discount = None;
    (d.discount_book.clone(), d.customer_email.clone())
  });
  book.clear(&email);
  info!("Checkout: draft order updated with address and discount.");
  Ok(PipelineControl::Continue)
}

async fn await_payment(ctx_data: ContextData<CheckoutCtxData>) -> Handled {
  let (payments, request, timeout) = ctx_data.get(|d| {
    let request = PaymentRequest {
      draft_order_id: d.draft_order.id,
      customer_email: d.customer_email.clone(),
      amount: d.summary.total,
      currency_code: d.collaborators.currency.currency_code(),
    };
    (d.collaborators.payments.clone(), request, d.payment_timeout)
  });

  let (reply, answer) = PaymentReply::channel();
  info!(amount = %request.amount, currency = %request.currency_code, "Checkout: awaiting payment.");
  payments.request_payment(request, reply);

  match tokio::time::timeout(timeout, answer).await {
    Ok(Ok(PaymentSignal::Completed)) => {
      info!("Checkout: payment confirmed.");
      Ok(PipelineControl::Continue)
    }
    Ok(Ok(PaymentSignal::Cancelled)) | Ok(Err(_)) => {
      info!("Checkout: payment cancelled by the customer.");
      Ok(PipelineControl::Stop)
    }
    Err(_) => {
      warn!(?timeout, "Checkout: payment confirmation timed out.");
      Err(CheckoutFailure::PaymentTimeout(timeout))
    }
  }
}

async fn complete_order(ctx_data: ContextData<CheckoutCtxData>) -> Handled {
  let (store, id) = ctx_data.get(|d| (d.collaborators.store.clone(), d.draft_order.id));
  store.complete_draft_order(id).await.map_err(CheckoutFailure::CompleteFailed)?;
  info!("Checkout: draft order completed.");
  Ok(PipelineControl::Continue)
}

async fn delete_draft(ctx_data: ContextData<CheckoutCtxData>) -> Handled {
  let (store, id) = ctx_data.get(|d| (d.collaborators.store.clone(), d.draft_order.id));
  match store.delete_draft_order(id).await {
    Ok(true) => {
      info!("Checkout: completed draft order removed.");
      Ok(PipelineControl::Continue)
    }
    Ok(false) => Err(CheckoutFailure::DeleteDeclined),
    Err(e) => Err(CheckoutFailure::DeleteFailed(e)),
  }
}
