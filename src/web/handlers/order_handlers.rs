use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::pipelines::{self, OrderPayload};
use crate::state::AppState;

/// `POST /api/orders`. Runs the submission pipeline; a 201 always means the
/// order was persisted, and an attached `warning` means a post-acceptance
/// side effect (the operator notification) was degraded.
#[instrument(name = "handler::create_order", skip(app_state, payload), fields(item_count = payload.items.len()))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<OrderPayload>,
) -> Result<HttpResponse, AppError> {
  let receipt = pipelines::submit_order(app_state.get_ref(), payload.into_inner()).await?;

  info!(order_id = %receipt.order.id, degraded = receipt.warning.is_some(), "Order submission finished.");

  let mut body = json!({
    "success": true,
    "orderId": receipt.order.id,
    "orderNumber": receipt.order.order_number,
  });
  if let Some(warning) = receipt.warning {
    body["warning"] = json!(warning);
  }
  Ok(HttpResponse::Created().json(body))
}
