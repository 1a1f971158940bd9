use crate::errors::Result;
use crate::models::{NewOrder, Order};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

/// Short human-facing code for an order, shown in the notification subject
/// and echoed to the client.
pub fn order_number_for(id: Uuid) -> String {
  let simple = id.simple().to_string();
  format!("ORD-{}", simple[..8].to_uppercase())
}

/// Persists one order. The id, order number and creation timestamp are
/// assigned here; the record is immutable afterwards. A storage-layer
/// rejection is terminal for the whole request — no partial order is ever
/// handed back to the caller.
#[instrument(name = "orders::create", skip(pool, new_order), fields(item_count = new_order.items.len()))]
pub async fn create(pool: &PgPool, new_order: NewOrder) -> Result<Order> {
  let id = Uuid::new_v4();
  let order_number = order_number_for(id);

  let order: Order = sqlx::query_as(
    "INSERT INTO orders (id, order_number, items, total_price, customer_info) \
     VALUES ($1, $2, $3, $4, $5) \
     RETURNING id, order_number, items, total_price, customer_info, created_at",
  )
  .bind(id)
  .bind(&order_number)
  .bind(Json(&new_order.items))
  .bind(new_order.total_price)
  .bind(Json(&new_order.customer_info))
  .fetch_one(pool)
  .await?;

  info!(order_id = %order.id, order_number = %order.order_number, "Order persisted.");
  Ok(order)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn order_number_is_short_and_stable() {
    let id = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
    assert_eq!(order_number_for(id), "ORD-A1B2C3D4");
    assert_eq!(order_number_for(id), order_number_for(id));
  }
}
