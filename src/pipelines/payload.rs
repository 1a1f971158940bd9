//! Wire shape of an incoming order. Every field is optional or defaulted so
//! that deserialization never rejects a request on its own; the validator
//! owns rejection and reports the full set of violations at once.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
  #[serde(default)]
  pub items: Vec<ItemPayload>,
  /// Trusted from the client, not recomputed server-side.
  #[serde(default, alias = "total")]
  pub total_price: Option<f64>,
  #[serde(default)]
  pub customer_info: Option<CustomerPayload>,
}

/// Flat line-item shape as submitted by the storefront.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub price: Option<f64>,
  /// Accepted as a number so a fractional quantity can be reported as a
  /// violation instead of a deserialization failure.
  #[serde(default)]
  pub quantity: Option<f64>,
  #[serde(default)]
  pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub city: Option<String>,
  #[serde(default)]
  pub comment: Option<String>,
  #[serde(default)]
  pub privacy_consent: Option<bool>,
}
