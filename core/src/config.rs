// cartflow/src/config.rs

//! Engine tunables. Defaults match the storefront's production values and can
//! be overridden from `CARTFLOW_*` environment variables.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_MAX_PER_LINE: &str = "CARTFLOW_MAX_PER_LINE";
pub const ENV_COD_CEILING: &str = "CARTFLOW_COD_CEILING";
pub const ENV_PAYMENT_TIMEOUT_SECS: &str = "CARTFLOW_PAYMENT_TIMEOUT_SECS";
pub const ENV_EMAIL_MATCH: &str = "CARTFLOW_EMAIL_MATCH";

/// How a draft order's email is compared with the signed-in customer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailMatch {
  #[default]
  Exact,
  CaseInsensitive,
}

impl EmailMatch {
  pub fn matches(self, order_email: &str, customer_email: &str) -> bool {
    match self {
      EmailMatch::Exact => order_email == customer_email,
      EmailMatch::CaseInsensitive => order_email.eq_ignore_ascii_case(customer_email),
    }
  }
}

impl FromStr for EmailMatch {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "exact" => Ok(EmailMatch::Exact),
      "case_insensitive" | "case-insensitive" | "ci" => Ok(EmailMatch::CaseInsensitive),
      other => Err(format!("expected 'exact' or 'case_insensitive', got '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("invalid value '{value}' for {var}: {reason}")]
  Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
  /// Upper bound on any single line's quantity.
  pub max_quantity_per_line: u32,
  /// Largest order total accepted for cash on delivery.
  pub cod_ceiling: Decimal,
  /// How long checkout waits for a payment confirmation.
  pub payment_timeout: Duration,
  pub email_match: EmailMatch,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_quantity_per_line: 5,
      cod_ceiling: Decimal::from(100),
      payment_timeout: Duration::from_secs(120),
      email_match: EmailMatch::Exact,
    }
  }
}

impl EngineConfig {
  /// Defaults overridden by any `CARTFLOW_*` variables present in the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|var| std::env::var(var).ok())
  }

  /// Same as [`EngineConfig::from_env`] but reads variables through `lookup`.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut config = Self::default();

    if let Some(raw) = lookup(ENV_MAX_PER_LINE) {
      let max: u32 = parse(ENV_MAX_PER_LINE, &raw)?;
      if max == 0 {
        return Err(invalid(ENV_MAX_PER_LINE, &raw, "must be at least 1"));
      }
      config.max_quantity_per_line = max;
    }
    if let Some(raw) = lookup(ENV_COD_CEILING) {
      let ceiling: Decimal = parse(ENV_COD_CEILING, &raw)?;
      if ceiling.is_sign_negative() {
        return Err(invalid(ENV_COD_CEILING, &raw, "must not be negative"));
      }
      config.cod_ceiling = ceiling;
    }
    if let Some(raw) = lookup(ENV_PAYMENT_TIMEOUT_SECS) {
      let secs: u64 = parse(ENV_PAYMENT_TIMEOUT_SECS, &raw)?;
      config.payment_timeout = Duration::from_secs(secs);
    }
    if let Some(raw) = lookup(ENV_EMAIL_MATCH) {
      config.email_match = raw.parse().map_err(|reason| invalid(ENV_EMAIL_MATCH, &raw, reason))?;
    }

    Ok(config)
  }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw.trim().parse::<T>().map_err(|e| invalid(var, raw, e.to_string()))
}

fn invalid(var: &'static str, raw: &str, reason: impl Into<String>) -> ConfigError {
  ConfigError::Invalid {
    var,
    value: raw.to_string(),
    reason: reason.into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k| map.get(k).cloned()
  }

  #[test]
  fn defaults_when_nothing_is_set() {
    let config = EngineConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.max_quantity_per_line, 5);
    assert_eq!(config.cod_ceiling, Decimal::from(100));
  }

  #[test]
  fn overrides_are_applied() {
    let config = EngineConfig::from_lookup(lookup_from(&[
      (ENV_MAX_PER_LINE, "8"),
      (ENV_COD_CEILING, "250.50"),
      (ENV_PAYMENT_TIMEOUT_SECS, "30"),
      (ENV_EMAIL_MATCH, "case_insensitive"),
    ]))
    .unwrap();
    assert_eq!(config.max_quantity_per_line, 8);
    assert_eq!(config.cod_ceiling, Decimal::new(25050, 2));
    assert_eq!(config.payment_timeout, Duration::from_secs(30));
    assert_eq!(config.email_match, EmailMatch::CaseInsensitive);
  }

  #[test]
  fn rejects_bad_values() {
    let err = EngineConfig::from_lookup(lookup_from(&[(ENV_MAX_PER_LINE, "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: ENV_MAX_PER_LINE, .. }));

    let err = EngineConfig::from_lookup(lookup_from(&[(ENV_COD_CEILING, "lots")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: ENV_COD_CEILING, .. }));

    let err = EngineConfig::from_lookup(lookup_from(&[(ENV_EMAIL_MATCH, "fuzzy")])).unwrap_err();
    assert!(err.to_string().contains("fuzzy"));
  }

  #[test]
  fn email_match_modes() {
    assert!(EmailMatch::Exact.matches("a@shop.io", "a@shop.io"));
    assert!(!EmailMatch::Exact.matches("A@shop.io", "a@shop.io"));
    assert!(EmailMatch::CaseInsensitive.matches("A@Shop.io", "a@shop.io"));
  }
}
