use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;
use actix_web::{web, FromRequest, HttpRequest};
use tracing::warn;
use uuid::Uuid;

/// Identity extracted from a `Authorization: Bearer <token>` header.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub roles: Vec<String>,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let result = extract(req);
    if result.is_err() {
      warn!("AuthenticatedUser extractor: missing or invalid bearer token.");
    }
    futures_util::future::ready(result)
  }
}

fn extract(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state not configured".to_string()))?;

  let header = req
    .headers()
    .get("Authorization")
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| AppError::Auth("Missing Authorization header.".to_string()))?;
  let token = header
    .strip_prefix("Bearer ")
    .ok_or_else(|| AppError::Auth("Expected a bearer token.".to_string()))?;

  let claims = auth_service::decode_token(&state.config, token)?;
  Ok(AuthenticatedUser {
    user_id: claims.sub,
    roles: claims.roles,
  })
}
