use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Snapshot of the purchased product embedded in a line item. Denormalized on
/// purpose: later catalog edits must not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedProduct {
  pub id: String,
  pub name: String,
  pub price: f64,
  pub image: String,
}

/// One product + quantity entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
  pub product: OrderedProduct,
  pub quantity: i64,
}

impl OrderLine {
  pub fn line_total(&self) -> f64 {
    self.product.price * self.quantity as f64
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
  pub email: String,
  pub name: String,
  pub phone: String,
  pub city: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
}

/// Fields the pipeline hands to the repository; id, order number and
/// timestamp are assigned at persistence time.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub items: Vec<OrderLine>,
  pub total_price: f64,
  pub customer_info: CustomerInfo,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub order_number: String,
  pub items: Json<Vec<OrderLine>>,
  pub total_price: f64,
  pub customer_info: Json<CustomerInfo>,
  pub created_at: DateTime<Utc>,
}
