//! Password hashing and bearer-token issuance.

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::User;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Hashes a plain-text password with Argon2 and a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", e))
    })
}

/// Verifies a plain-text password against a stored Argon2 hash. `Ok(false)`
/// means the password simply does not match.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if hashed_password_str.is_empty() || provided_password.is_empty() {
    return Err(AppError::Auth("Invalid credentials format.".to_string()));
  }
  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|e| {
    error!(error = %e, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", e))
  })?;
  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => {
      error!(error = %e, "Argon2 password verification encountered an error.");
      Err(AppError::Internal(format!("Password verification failed: {}", e)))
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// User id.
  pub sub: Uuid,
  pub roles: Vec<String>,
  /// Expiry, seconds since the Unix epoch.
  pub exp: i64,
}

/// Issues a signed bearer token for a user, expiring after the configured
/// number of seconds.
#[instrument(name = "auth_service::issue_token", skip(config, user), fields(user_id = %user.id))]
pub fn issue_token(config: &AppConfig, user: &User) -> Result<String, AppError> {
  let claims = Claims {
    sub: user.id,
    roles: user.roles.clone(),
    exp: Utc::now().timestamp() + config.jwt_expires_secs as i64,
  };
  encode(
    &Header::default(),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// Decodes and validates a bearer token, returning its claims.
pub fn decode_token(config: &AppConfig, token: &str) -> Result<Claims, AppError> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &Validation::default(),
  )
  .map(|data| data.claims)
  .map_err(|e| {
    debug!(error = %e, "Token validation failed.");
    AppError::Auth("Invalid or expired token.".to_string())
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn test_user() -> User {
    User {
      id: Uuid::new_v4(),
      email: "a@b.com".to_string(),
      password_hash: String::new(),
      name: "Test".to_string(),
      roles: vec!["user".to_string()],
      created_at: Utc::now(),
    }
  }

  #[test]
  fn hash_then_verify_roundtrip() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "wrong horse").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(hash_password("").is_err());
  }

  #[test]
  fn issued_token_decodes_back_to_claims() {
    let config = AppConfig::for_tests();
    let user = test_user();
    let token = issue_token(&config, &user).unwrap();
    let claims = decode_token(&config, &token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.roles, vec!["user".to_string()]);
    assert!(claims.exp > Utc::now().timestamp());
  }

  #[test]
  fn tampered_token_is_rejected() {
    let config = AppConfig::for_tests();
    let token = issue_token(&config, &test_user()).unwrap();
    let mut tampered = token.clone();
    tampered.push('x');
    assert!(decode_token(&config, &tampered).is_err());
  }
}
