use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub external_id: String,
  pub name: String,
  pub full_name: Option<String>,
  // Precomputed search shadow fields, rewritten by the repository on write.
  pub name_search: String,
  pub full_name_search: String,
  pub price: f64,
  pub currency: Option<String>,
  pub unit: Option<String>,
  pub unit_code: Option<String>,
  pub group_id: Option<String>,
  pub category: Option<String>,
  pub weight: f64,
  pub quantity: Option<f64>,
  pub description: Option<String>,
  pub in_stock: bool,
  pub image: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Incoming catalog entry, as accepted by `POST /api/product`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  #[serde(alias = "externalId")]
  pub external_id: String,
  pub name: String,
  #[serde(default, alias = "fullName")]
  pub full_name: Option<String>,
  #[serde(default)]
  pub price: f64,
  #[serde(default)]
  pub currency: Option<String>,
  #[serde(default)]
  pub unit: Option<String>,
  #[serde(default, alias = "unitCode")]
  pub unit_code: Option<String>,
  #[serde(default, alias = "groupId")]
  pub group_id: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub weight: f64,
  #[serde(default)]
  pub quantity: Option<f64>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default = "default_in_stock", alias = "inStock")]
  pub in_stock: bool,
  #[serde(default)]
  pub image: Option<String>,
}

fn default_in_stock() -> bool {
  true
}
