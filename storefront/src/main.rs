// storefront/src/main.rs

mod config;
mod errors;
mod session;
mod state;

use crate::config::{LogFormat, StorefrontConfig};
use crate::state::AppState;
use anyhow::Context;
use cartflow::OrderResult;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,cartflow=debug"));
  match format {
    LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config = StorefrontConfig::from_env().context("loading storefront configuration")?;
  init_tracing(config.log_format);
  tracing::info!(customer = %config.customer_email, payment_method = %config.payment_method, "Starting storefront session.");

  let state = AppState::build(config);
  let report = session::run(&state).await.context("running shopper session")?;

  let completed = state.store.completed_orders().await;
  let outcome = match &report.result {
    OrderResult::Success { summary, .. } => json!({ "status": "success", "summary": summary }),
    OrderResult::Cancelled { draft_order_id } => json!({ "status": "cancelled", "draft_order_id": draft_order_id }),
    OrderResult::FailedAtStage { stage, reason } => {
      json!({ "status": "failed", "stage": stage.to_string(), "reason": reason.to_string() })
    }
    OrderResult::CompletedCleanupPending { draft_order_id, reason } => {
      json!({ "status": "completed_cleanup_pending", "draft_order_id": draft_order_id, "reason": reason.to_string() })
    }
  };
  let stages: Vec<String> = report.stages_entered.iter().map(ToString::to_string).collect();
  println!(
    "{}",
    serde_json::to_string_pretty(&json!({
      "attempt_id": report.attempt_id.to_string(),
      "stages": stages,
      "outcome": outcome,
      "completed_orders": completed.len(),
    }))?
  );

  if let OrderResult::FailedAtStage { stage, reason } = report.result {
    anyhow::bail!("checkout failed at {}: {}", stage, reason.user_message());
  }
  Ok(())
}
