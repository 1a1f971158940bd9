//! Orchestrates one order submission:
//! `Validating → Normalizing → Persisting → ComposingNotification →
//! Dispatching → Done`.
//!
//! Failures before or at persistence are fatal and propagate as errors.
//! Everything after a successful insert returns a tagged [`StageOutcome`]
//! instead, which the orchestrator maps onto the response deterministically:
//! a degraded notification becomes a warning on an otherwise-successful 201.

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::{CustomerInfo, NewOrder, Order, OrderLine};
use crate::pipelines::payload::OrderPayload;
use crate::pipelines::{transform, validate};
use crate::repositories;
use crate::services::mailer::MailDispatcher;
use crate::services::notification;
use crate::state::AppState;
use crate::util::normalize_image_url;
use tracing::{info, instrument, warn};

/// Outcome of a best-effort stage running after the point of no return.
#[derive(Debug, PartialEq, Eq)]
pub enum StageOutcome {
  Completed,
  /// The stage failed or was skipped; the order stands, the caller gets the
  /// reason as a warning.
  Degraded(String),
}

impl StageOutcome {
  pub fn into_warning(self) -> Option<String> {
    match self {
      StageOutcome::Completed => None,
      StageOutcome::Degraded(reason) => Some(reason),
    }
  }
}

#[derive(Debug)]
pub struct SubmissionReceipt {
  pub order: Order,
  pub warning: Option<String>,
}

/// Runs the full submission pipeline for one payload.
#[instrument(name = "pipeline::submit_order", skip(state, payload), fields(item_count = payload.items.len()))]
pub async fn submit_order(state: &AppState, payload: OrderPayload) -> Result<SubmissionReceipt> {
  // Validating. Rejection carries the complete violation list.
  let report = validate::validate_order(&payload);
  if !report.is_valid() {
    return Err(AppError::InvalidOrder { details: report.errors });
  }

  // Normalizing + transforming into the record to persist.
  let record = build_new_order(&payload, &state.config)?;

  // Persisting. An error here is terminal for the request; success is the
  // point of no return for order acceptance.
  let order = repositories::orders::create(&state.db_pool, record).await?;

  // ComposingNotification + Dispatching, best effort.
  let warning = dispatch_notification(state, &order).await.into_warning();
  if let Some(reason) = &warning {
    warn!(order_id = %order.id, reason, "Order accepted with degraded notification.");
  } else {
    info!(order_id = %order.id, "Order accepted and notification dispatched.");
  }

  Ok(SubmissionReceipt { order, warning })
}

/// Builds the record to persist from a payload that already passed
/// validation. The normalized image is what gets persisted and what the
/// notification shows; the client total is taken verbatim.
fn build_new_order(payload: &OrderPayload, config: &AppConfig) -> Result<NewOrder> {
  let items: Vec<OrderLine> = payload
    .items
    .iter()
    .map(|item| {
      let image = normalize_image_url(item.image.as_deref(), config);
      transform::to_order_line(item, image)
    })
    .collect();

  let customer = payload
    .customer_info
    .as_ref()
    .ok_or_else(|| AppError::Internal("customer info lost after validation".to_string()))?;
  let customer_info = CustomerInfo {
    email: customer.email.clone().unwrap_or_default(),
    name: customer.name.clone().unwrap_or_default(),
    phone: customer.phone.clone().unwrap_or_default(),
    city: customer.city.clone().unwrap_or_default(),
    comment: customer.comment.clone().filter(|c| !c.trim().is_empty()),
  };
  let total_price = payload
    .total_price
    .ok_or_else(|| AppError::Internal("total price lost after validation".to_string()))?;

  Ok(NewOrder {
    items,
    total_price,
    customer_info,
  })
}

/// Composes and sends the operator notification for a persisted order.
/// Never fails: every problem is folded into a `Degraded` outcome.
pub async fn dispatch_notification(state: &AppState, order: &Order) -> StageOutcome {
  let dispatcher = match MailDispatcher::from_config(&state.config) {
    Ok(dispatcher) => dispatcher,
    Err(e) => {
      return StageOutcome::Degraded(format!("Order accepted, notification skipped: {}", e));
    }
  };

  let body = notification::compose_message(order);

  // Spreadsheet failure is isolated: the email still goes out without the
  // attachment.
  let (attachment, compose_warning) = if state.config.order_xlsx_attachment {
    match notification::compose_spreadsheet(order) {
      Ok(sheet) => (Some(sheet), None),
      Err(e) => (
        None,
        Some(format!("Order accepted, notification sent without attachment: {}", e)),
      ),
    }
  } else {
    (None, None)
  };

  match dispatcher.send(&body, attachment.as_ref()).await {
    Ok(()) => match compose_warning {
      Some(reason) => StageOutcome::Degraded(reason),
      None => StageOutcome::Completed,
    },
    Err(e) => StageOutcome::Degraded(format!("Order accepted, notification email not sent: {}", e)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::models::{CustomerInfo, OrderedProduct};
  use chrono::Utc;
  use sqlx::postgres::PgPoolOptions;
  use sqlx::types::Json;
  use std::sync::Arc;
  use uuid::Uuid;

  /// State with a lazy pool: any actual database access in a test would fail,
  /// which is exactly what the pre-persistence tests rely on.
  fn state_with(config: AppConfig) -> AppState {
    let db_pool = PgPoolOptions::new()
      .connect_lazy("postgres://localhost/storefront_test")
      .unwrap();
    AppState {
      db_pool,
      config: Arc::new(config),
    }
  }

  fn persisted_order() -> Order {
    Order {
      id: Uuid::new_v4(),
      order_number: "ORD-TEST0001".to_string(),
      items: Json(vec![OrderLine {
        product: OrderedProduct {
          id: "p1".to_string(),
          name: "Widget".to_string(),
          price: 100.0,
          image: "https://shop.example.com/images/p1.jpg".to_string(),
        },
        quantity: 2,
      }]),
      total_price: 200.0,
      customer_info: Json(CustomerInfo {
        email: "a@b.com".to_string(),
        name: "Jo".to_string(),
        phone: "1234567890".to_string(),
        city: "NY".to_string(),
        comment: None,
      }),
      created_at: Utc::now(),
    }
  }

  #[tokio::test]
  async fn invalid_payload_is_rejected_before_any_persistence() {
    let state = state_with(AppConfig::for_tests());
    let payload: OrderPayload = serde_json::from_str(r#"{"items": [], "totalPrice": -5}"#).unwrap();

    match submit_order(&state, payload).await {
      Err(AppError::InvalidOrder { details }) => {
        assert!(details.iter().any(|e| e.contains("items")));
        assert!(details.iter().any(|e| e.contains("totalPrice")));
        assert!(details.iter().any(|e| e.contains("customerInfo")));
      }
      other => panic!("expected InvalidOrder, got {:?}", other.map(|_| ())),
    }
  }

  #[tokio::test]
  async fn missing_customer_field_rejects_the_whole_submission() {
    let state = state_with(AppConfig::for_tests());
    let payload: OrderPayload = serde_json::from_str(
      r#"{
        "items": [{"id": "p1", "name": "Widget", "price": 100, "quantity": 2}],
        "totalPrice": 200,
        "customerInfo": {"email": "a@b.com", "name": "Jo", "phone": "1234567890", "privacyConsent": true}
      }"#,
    )
    .unwrap();
    assert!(matches!(
      submit_order(&state, payload).await,
      Err(AppError::InvalidOrder { .. })
    ));
  }

  #[tokio::test]
  async fn unconfigured_transport_degrades_instead_of_failing() {
    // for_tests() carries no SMTP settings at all.
    let state = state_with(AppConfig::for_tests());
    let outcome = dispatch_notification(&state, &persisted_order()).await;
    match outcome {
      StageOutcome::Degraded(reason) => assert!(reason.contains("notification skipped")),
      StageOutcome::Completed => panic!("expected a degraded outcome"),
    }
  }

  #[tokio::test]
  async fn unreachable_transport_degrades_with_a_send_warning() {
    let mut config = AppConfig::for_tests();
    config.smtp.host = Some("192.0.2.1".to_string());
    config.smtp.port = Some(2525);
    config.smtp.user = Some("mailer".to_string());
    config.smtp.pass = Some("secret".to_string());
    config.smtp.sender = Some("shop@example.com".to_string());
    config.smtp.recipient = Some("orders@example.com".to_string());
    let state = state_with(config);

    let outcome = dispatch_notification(&state, &persisted_order()).await;
    match outcome {
      StageOutcome::Degraded(reason) => assert!(reason.contains("email not sent")),
      StageOutcome::Completed => panic!("expected a degraded outcome"),
    }
  }

  #[test]
  fn degraded_outcome_maps_to_a_warning() {
    assert_eq!(StageOutcome::Completed.into_warning(), None);
    assert_eq!(
      StageOutcome::Degraded("reason".to_string()).into_warning(),
      Some("reason".to_string())
    );
  }

  #[test]
  fn persisted_record_echoes_items_total_and_customer() {
    let payload: OrderPayload = serde_json::from_str(
      r#"{
        "items": [
          {"id": "p1", "name": "Widget", "price": 100, "quantity": 2,
           "image": "http://backend:5000/images/p1.jpg"},
          {"id": "p2", "name": "Gadget", "price": 49.5, "quantity": 1}
        ],
        "totalPrice": 249.5,
        "customerInfo": {
          "email": "a@b.com", "name": "Jo", "phone": "1234567890",
          "city": "NY", "comment": "   ", "privacyConsent": true
        }
      }"#,
    )
    .unwrap();
    assert!(validate::validate_order(&payload).is_valid());

    let config = AppConfig::for_tests();
    let record = build_new_order(&payload, &config).unwrap();

    assert_eq!(record.items.len(), 2);
    assert_eq!(record.items[0].product.id, "p1");
    assert_eq!(record.items[0].quantity, 2);
    assert_eq!(record.items[0].product.image, "https://shop.example.com/images/p1.jpg");
    assert_eq!(record.items[1].product.image, config.fallback_image_url);
    assert_eq!(record.total_price, 249.5);
    assert_eq!(record.customer_info.email, "a@b.com");
    assert_eq!(record.customer_info.name, "Jo");
    assert_eq!(record.customer_info.phone, "1234567890");
    assert_eq!(record.customer_info.city, "NY");
    // Blank comments are dropped instead of being persisted as whitespace.
    assert_eq!(record.customer_info.comment, None);
  }

  /// Known trust boundary: the client-supplied total is persisted verbatim
  /// and never recomputed from line items.
  #[tokio::test]
  async fn total_price_is_trusted_from_the_client() {
    let payload: OrderPayload = serde_json::from_str(
      r#"{
        "items": [{"id": "p1", "name": "Widget", "price": 100, "quantity": 2}],
        "totalPrice": 1,
        "customerInfo": {
          "email": "a@b.com", "name": "Jo", "phone": "1234567890",
          "city": "NY", "privacyConsent": true
        }
      }"#,
    )
    .unwrap();
    // A mismatched total passes validation; only negative totals are refused.
    assert!(validate::validate_order(&payload).is_valid());
  }
}
