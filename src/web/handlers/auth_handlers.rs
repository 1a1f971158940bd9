use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::validate::is_valid_email;
use crate::repositories::users;
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
  pub email: String,
  pub password: String,
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

/// `POST /api/auth/register`. Email uniqueness comes from the storage
/// layer's unique index, surfaced as a validation-class error.
#[instrument(name = "handler::register", skip(app_state, payload))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  if !is_valid_email(&payload.email) {
    return Err(AppError::Validation("Valid email is required.".to_string()));
  }
  if payload.password.chars().count() < 8 {
    return Err(AppError::Validation(
      "Password must be at least 8 characters long.".to_string(),
    ));
  }
  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Name is required.".to_string()));
  }

  let password_hash = auth_service::hash_password(&payload.password)?;
  match users::create(&app_state.db_pool, &payload.email, &password_hash, payload.name.trim()).await {
    Ok(user) => {
      info!(user_id = %user.id, "User registered.");
      Ok(HttpResponse::Created().json(json!({ "message": "User created", "userId": user.id })))
    }
    Err(e) if AppError::is_unique_violation(&e) => {
      warn!("Registration attempt with an email already in use.");
      Err(AppError::Validation("Email already in use.".to_string()))
    }
    Err(e) => Err(AppError::Sqlx(e)),
  }
}

/// `POST /api/auth/login` — issues a bearer token with configurable expiry.
#[instrument(name = "handler::login", skip(app_state, payload))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();

  let user = users::find_by_email(&app_state.db_pool, &payload.email).await?;
  let Some(user) = user else {
    return Err(AppError::Auth("Invalid credentials.".to_string()));
  };
  if !auth_service::verify_password(&user.password_hash, &payload.password)? {
    return Err(AppError::Auth("Invalid credentials.".to_string()));
  }

  let token = auth_service::issue_token(&app_state.config, &user)?;
  info!(user_id = %user.id, "User logged in.");
  Ok(HttpResponse::Ok().json(json!({ "token": token })))
}

/// `GET /api/auth/me`.
#[instrument(name = "handler::me", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user = users::find_by_id(&app_state.db_pool, auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "user": user })))
}
