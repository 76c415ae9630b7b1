// storefront/src/config.rs

use crate::errors::{AppError, Result};
use cartflow::memory::PaymentScript;
use cartflow::{EngineConfig, PaymentMethod};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
  pub engine: EngineConfig,
  pub customer_email: String,
  pub payment_method: PaymentMethod,
  /// Applied before checkout when set.
  pub promo_code: Option<String>,
  /// How the stand-in payment sheet answers.
  pub payment_script: PaymentScript,
  pub log_format: LogFormat,
}

impl StorefrontConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let engine = EngineConfig::from_env()?;
    let customer_email = get_env("STOREFRONT_CUSTOMER").unwrap_or_else(|| "ada@shop.io".to_string());

    let payment_method = match get_env("STOREFRONT_PAYMENT_METHOD").as_deref().unwrap_or("card") {
      "cash" | "cod" => PaymentMethod::Cash,
      "card" | "wallet" => PaymentMethod::CardOrWallet,
      other => return Err(AppError::Config(format!("Invalid STOREFRONT_PAYMENT_METHOD: {}", other))),
    };

    let payment_script = match get_env("STOREFRONT_PAYMENT_SCRIPT").as_deref().unwrap_or("complete") {
      "complete" => PaymentScript::Complete,
      "cancel" => PaymentScript::Cancel,
      "dismiss" => PaymentScript::Dismiss,
      "hold" => PaymentScript::Hold,
      other => return Err(AppError::Config(format!("Invalid STOREFRONT_PAYMENT_SCRIPT: {}", other))),
    };

    let log_format = match get_env("LOG_FORMAT").as_deref().unwrap_or("pretty") {
      "pretty" => LogFormat::Pretty,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    // Unset means the demo code; set-but-empty disables the promo step.
    let promo_code = match env::var("STOREFRONT_PROMO_CODE") {
      Ok(code) if code.trim().is_empty() => None,
      Ok(code) => Some(code.trim().to_string()),
      Err(_) => Some("SAVE10".to_string()),
    };

    Ok(Self {
      engine,
      customer_email,
      payment_method,
      promo_code,
      payment_script,
      log_format,
    })
  }
}
