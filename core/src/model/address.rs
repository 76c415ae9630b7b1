use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  pub address1: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address2: Option<String>,
  pub city: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub province: Option<String>,
  pub country: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub zip: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
}

impl Address {
  /// One-line form for logs and confirmation text.
  pub fn one_line(&self) -> String {
    let mut parts = vec![self.address1.clone()];
    parts.extend(self.address2.clone());
    parts.push(self.city.clone());
    parts.push(self.country.clone());
    parts.retain(|p| !p.trim().is_empty());
    parts.join(", ")
  }
}
