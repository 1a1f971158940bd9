use crate::errors::Result;
use crate::models::User;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, name, roles, created_at";

/// Inserts a user. Email uniqueness is enforced by the storage layer's unique
/// index; the raw error is returned so callers can surface a constraint hit
/// as a validation-class error.
#[instrument(name = "users::create", skip(pool, password_hash))]
pub async fn create(pool: &PgPool, email: &str, password_hash: &str, name: &str) -> Result<User, sqlx::Error> {
  let user: User = sqlx::query_as(&format!(
    "INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3) RETURNING {}",
    USER_COLUMNS
  ))
  .bind(email.trim().to_lowercase())
  .bind(password_hash)
  .bind(name)
  .fetch_one(pool)
  .await?;
  Ok(user)
}

#[instrument(name = "users::find_by_email", skip(pool))]
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
  let user: Option<User> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
    .bind(email.trim().to_lowercase())
    .fetch_optional(pool)
    .await?;
  Ok(user)
}

#[instrument(name = "users::find_by_id", skip(pool))]
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
  let user: Option<User> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(user)
}
