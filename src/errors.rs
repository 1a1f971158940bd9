use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  /// Order payload rejected; carries the full set of violations so the
  /// caller sees every problem at once.
  #[error("Invalid order payload ({} violations)", details.len())]
  InvalidOrder { details: Vec<String> },

  /// Search query rejected with a machine-readable code.
  #[error("Query rejected ({code}): {message}")]
  Query { code: &'static str, message: String },

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// Operator-fixable configuration problem. Inside the order pipeline this
  /// degrades to a warning; anywhere else it surfaces as a server error.
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  /// Mail transport failure. Degrades to a warning after persistence.
  #[error("Dispatch Error: {0}")]
  Dispatch(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// in handlers using `?` on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      // Unwrap is safe: the downcast was just checked.
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

impl AppError {
  /// Whether a database error is a connectivity loss (503) rather than a
  /// storage-layer rejection (500).
  fn is_connectivity_loss(err: &sqlx::Error) -> bool {
    matches!(
      err,
      sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Tls(_)
    )
  }

  /// Whether a database error is the storage layer enforcing a unique index,
  /// surfaced to callers as a validation-class error.
  pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
      sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
      _ => false,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::InvalidOrder { .. } | AppError::Query { .. } => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Sqlx(e) if Self::is_connectivity_loss(e) => StatusCode::SERVICE_UNAVAILABLE,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({ "error": m })),
      AppError::InvalidOrder { details } => {
        HttpResponse::BadRequest().json(json!({ "error": "Invalid order payload", "details": details }))
      }
      AppError::Query { code, message } => HttpResponse::BadRequest().json(json!({ "error": code, "message": message })),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({ "error": m })),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({ "error": m })),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({ "error": "Configuration issue", "message": m }))
      }
      AppError::Sqlx(e) => {
        let body = json!({ "error": "Database operation failed", "message": "The request could not be completed" });
        if Self::is_connectivity_loss(e) {
          HttpResponse::ServiceUnavailable().json(body)
        } else {
          HttpResponse::InternalServerError().json(body)
        }
      }
      AppError::Dispatch(m) => {
        HttpResponse::InternalServerError().json(json!({ "error": "Notification dispatch failed", "message": m }))
      }
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({ "error": "An internal error occurred", "message": m }))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn not_found_responds_with_404() {
    let err = AppError::NotFound("Category not found".to_string());
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn rejection_classes_respond_with_400() {
    assert_eq!(
      AppError::InvalidOrder { details: vec![] }.status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      AppError::Query {
        code: "EMPTY_QUERY",
        message: "Search query is empty".to_string(),
      }
      .status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      AppError::Validation("bad input".to_string()).status_code(),
      StatusCode::BAD_REQUEST
    );
  }

  #[test]
  fn connectivity_loss_responds_with_503() {
    assert_eq!(
      AppError::Sqlx(sqlx::Error::PoolTimedOut).status_code(),
      StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
      AppError::Sqlx(sqlx::Error::RowNotFound).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
