// cartflow/src/cart/normalizer.rs

use super::error::{CartField, ValidationError};
use serde::Serialize;

/// A validated add-to-cart intent. Only [`normalize`] can build one, so any
/// value in hand has positive ids, a non-empty email and a quantity within
/// `1..=max_quantity_per_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineRequest {
  customer_email: String,
  product_id: u64,
  variant_id: u64,
  quantity: u32,
}

impl CartLineRequest {
  pub fn customer_email(&self) -> &str {
    &self.customer_email
  }

  pub fn product_id(&self) -> u64 {
    self.product_id
  }

  pub fn variant_id(&self) -> u64 {
    self.variant_id
  }

  pub fn quantity(&self) -> u32 {
    self.quantity
  }
}

/// Validates raw cart input. Ids and quantity arrive signed because upstream
/// callers use `0` or negatives as "missing".
pub fn normalize(
  customer_email: &str,
  product_id: i64,
  variant_id: i64,
  quantity: i64,
  max_quantity_per_line: u32,
) -> Result<CartLineRequest, ValidationError> {
  let email = customer_email.trim();
  if email.is_empty() {
    return Err(invalid(CartField::CustomerEmail, "must not be empty"));
  }
  let product_id = positive_id(CartField::ProductId, product_id)?;
  let variant_id = positive_id(CartField::VariantId, variant_id)?;

  if quantity < 1 {
    return Err(invalid(CartField::Quantity, format!("must be at least 1, got {}", quantity)));
  }
  if quantity > i64::from(max_quantity_per_line) {
    return Err(invalid(
      CartField::Quantity,
      format!("must be at most {}, got {}", max_quantity_per_line, quantity),
    ));
  }

  Ok(CartLineRequest {
    customer_email: email.to_string(),
    product_id,
    variant_id,
    quantity: quantity as u32,
  })
}

fn positive_id(field: CartField, raw: i64) -> Result<u64, ValidationError> {
  if raw <= 0 {
    return Err(invalid(field, format!("must be positive, got {}", raw)));
  }
  Ok(raw as u64)
}

fn invalid(field: CartField, reason: impl Into<String>) -> ValidationError {
  ValidationError::InvalidCartData {
    field,
    reason: reason.into(),
  }
}
