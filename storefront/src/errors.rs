// storefront/src/errors.rs

use cartflow::{CartError, ConfigError, PromoError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Engine Configuration Error: {0}")]
  EngineConfig(#[from] ConfigError),

  #[error("Cart Error: {0}")]
  Cart(#[from] CartError),

  #[error("Promo Error: {0}")]
  Promo(#[from] PromoError),

  #[error("Checkout Error: {0}")]
  Checkout(String),
}

impl From<cartflow::ValidationError> for AppError {
  fn from(err: cartflow::ValidationError) -> Self {
    AppError::Cart(err.into())
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
