//! Input validation for order payloads. Collects every violation instead of
//! short-circuiting, so the caller sees the full error set at once. Never
//! fails itself.

use crate::pipelines::payload::{CustomerPayload, OrderPayload};

#[derive(Debug, Default)]
pub struct ValidationReport {
  pub errors: Vec<String>,
}

impl ValidationReport {
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }
}

/// Minimal `local@domain.tld` shape check.
pub(crate) fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let mut parts = email.splitn(2, '@');
  let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
    None => false,
  }
}

fn validate_customer(customer: &CustomerPayload, errors: &mut Vec<String>) {
  match customer.email.as_deref() {
    Some(email) if is_valid_email(email) => {}
    Some(_) => errors.push("customerInfo.email is not a valid email address".to_string()),
    None => errors.push("customerInfo.email is required".to_string()),
  }
  match customer.name.as_deref() {
    Some(name) if name.trim().chars().count() >= 2 => {}
    Some(_) => errors.push("customerInfo.name must be at least 2 characters".to_string()),
    None => errors.push("customerInfo.name is required".to_string()),
  }
  match customer.phone.as_deref() {
    Some(phone) if phone.chars().count() >= 10 => {}
    Some(_) => errors.push("customerInfo.phone must be at least 10 characters".to_string()),
    None => errors.push("customerInfo.phone is required".to_string()),
  }
  match customer.city.as_deref() {
    Some(city) if city.trim().chars().count() >= 2 => {}
    Some(_) => errors.push("customerInfo.city must be at least 2 characters".to_string()),
    None => errors.push("customerInfo.city is required".to_string()),
  }
  if customer.privacy_consent != Some(true) {
    errors.push("customerInfo.privacyConsent must be accepted".to_string());
  }
}

/// Checks shape, type and range of an incoming order payload.
pub fn validate_order(payload: &OrderPayload) -> ValidationReport {
  let mut errors = Vec::new();

  if payload.items.is_empty() {
    errors.push("items must be a non-empty list".to_string());
  }
  for (idx, item) in payload.items.iter().enumerate() {
    if item.id.as_deref().map(|id| id.is_empty()).unwrap_or(true) {
      errors.push(format!("items[{}].id is required", idx));
    }
    if item.name.is_none() {
      errors.push(format!("items[{}].name is required", idx));
    }
    match item.price {
      Some(price) if price >= 0.0 => {}
      Some(_) => errors.push(format!("items[{}].price must not be negative", idx)),
      None => errors.push(format!("items[{}].price is required", idx)),
    }
    match item.quantity {
      Some(quantity) if quantity >= 1.0 && quantity.fract() == 0.0 => {}
      Some(_) => errors.push(format!("items[{}].quantity must be an integer of at least 1", idx)),
      None => errors.push(format!("items[{}].quantity is required", idx)),
    }
  }

  match payload.total_price {
    Some(total) if total >= 0.0 => {}
    Some(_) => errors.push("totalPrice must not be negative".to_string()),
    None => errors.push("totalPrice is required and must be a number".to_string()),
  }

  match &payload.customer_info {
    Some(customer) => validate_customer(customer, &mut errors),
    None => errors.push("customerInfo is required".to_string()),
  }

  ValidationReport { errors }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_payload() -> OrderPayload {
    serde_json::from_str(
      r#"{
        "items": [{"id": "p1", "name": "Widget", "price": 100, "quantity": 2}],
        "totalPrice": 200,
        "customerInfo": {
          "email": "a@b.com", "name": "Jo", "phone": "1234567890",
          "city": "NY", "privacyConsent": true
        }
      }"#,
    )
    .unwrap()
  }

  #[test]
  fn accepts_a_valid_payload() {
    let report = validate_order(&valid_payload());
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
  }

  #[test]
  fn collects_all_violations_at_once() {
    let report = validate_order(&serde_json::from_str("{}").unwrap());
    assert!(!report.is_valid());
    // Empty items, missing total, missing customer block.
    assert!(report.errors.iter().any(|e| e.contains("items")));
    assert!(report.errors.iter().any(|e| e.contains("totalPrice")));
    assert!(report.errors.iter().any(|e| e.contains("customerInfo")));
    assert_eq!(report.errors.len(), 3);
  }

  #[test]
  fn rejects_bad_item_fields() {
    let mut payload = valid_payload();
    payload.items[0].id = Some(String::new());
    payload.items[0].price = Some(-1.0);
    payload.items[0].quantity = Some(1.5);
    let report = validate_order(&payload);
    assert_eq!(report.errors.len(), 3);
    assert!(report.errors.iter().any(|e| e.contains("items[0].id")));
    assert!(report.errors.iter().any(|e| e.contains("price")));
    assert!(report.errors.iter().any(|e| e.contains("quantity")));
  }

  #[test]
  fn rejects_zero_quantity() {
    let mut payload = valid_payload();
    payload.items[0].quantity = Some(0.0);
    assert!(!validate_order(&payload).is_valid());
  }

  #[test]
  fn every_missing_customer_field_is_reported() {
    let mut payload = valid_payload();
    payload.customer_info = Some(serde_json::from_str("{}").unwrap());
    let report = validate_order(&payload);
    for field in ["email", "name", "phone", "city", "privacyConsent"] {
      assert!(
        report.errors.iter().any(|e| e.contains(field)),
        "no error mentions {}: {:?}",
        field,
        report.errors
      );
    }
  }

  #[test]
  fn rejects_consent_left_unset_or_false() {
    let mut payload = valid_payload();
    payload.customer_info.as_mut().unwrap().privacy_consent = Some(false);
    assert!(!validate_order(&payload).is_valid());
    payload.customer_info.as_mut().unwrap().privacy_consent = None;
    assert!(!validate_order(&payload).is_valid());
  }

  #[test]
  fn email_shape_is_checked() {
    for bad in ["", "a@b", "a b@c.com", "@b.com", "a@.com", "a@com."] {
      assert!(!is_valid_email(bad), "accepted {:?}", bad);
    }
    for good in ["a@b.com", "jo.smith+tag@mail.example.org"] {
      assert!(is_valid_email(good), "rejected {:?}", good);
    }
  }

  #[test]
  fn short_name_phone_city_are_rejected() {
    let mut payload = valid_payload();
    {
      let customer = payload.customer_info.as_mut().unwrap();
      customer.name = Some(" J ".to_string());
      customer.phone = Some("123456789".to_string());
      customer.city = Some(" N ".to_string());
    }
    let report = validate_order(&payload);
    assert_eq!(report.errors.len(), 3);
  }
}
