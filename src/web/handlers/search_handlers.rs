use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::repositories::products;
use crate::state::AppState;
use crate::util::normalize_search_text;
use crate::web::handlers::catalog_handlers::page_window;
use crate::web::handlers::product_handlers::ProductView;

const DEFAULT_PAGE_SIZE: i64 = 20;
/// Valid normalized query lengths lie in (2, 60] characters.
const MIN_QUERY_LEN: usize = 3;
const MAX_QUERY_LEN: usize = 60;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
  #[serde(default, alias = "query")]
  pub q: Option<String>,
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

/// Normalizes and bounds-checks the raw search query. Rejections carry a
/// machine-readable code.
pub fn validate_query(raw: &str) -> Result<String, AppError> {
  let normalized = normalize_search_text(raw);
  if normalized.is_empty() {
    return Err(AppError::Query {
      code: "EMPTY_QUERY",
      message: "Search query is empty".to_string(),
    });
  }
  let len = normalized.chars().count();
  if len < MIN_QUERY_LEN {
    return Err(AppError::Query {
      code: "QUERY_TOO_SHORT",
      message: format!("Search query must be longer than {} characters", MIN_QUERY_LEN - 1),
    });
  }
  if len > MAX_QUERY_LEN {
    return Err(AppError::Query {
      code: "QUERY_TOO_LONG",
      message: format!("Search query must not exceed {} characters", MAX_QUERY_LEN),
    });
  }
  if !normalized.chars().any(char::is_alphanumeric) {
    return Err(AppError::Query {
      code: "INVALID_QUERY",
      message: "Search query must contain at least one letter or digit".to_string(),
    });
  }
  Ok(normalized)
}

/// `GET /api/search?q=` — normalized prefix search over the shadow fields.
#[instrument(name = "handler::search", skip(app_state, query))]
pub async fn search_handler(
  app_state: web::Data<AppState>,
  query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let normalized = validate_query(query.q.as_deref().unwrap_or(""))?;

  let (page, limit, offset) = page_window(query.page, query.limit, DEFAULT_PAGE_SIZE);

  let found = products::search_by_prefix(&app_state.db_pool, &normalized, limit, offset).await?;
  info!(query = %normalized, hits = found.len(), "Search served.");

  let results: Vec<ProductView> = found
    .into_iter()
    .map(|p| ProductView::from_product(p, app_state.get_ref()))
    .collect();

  Ok(HttpResponse::Ok().json(json!({
    "query": normalized,
    "page": page,
    "limit": limit,
    "results": results,
  })))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn code_of(result: Result<String, AppError>) -> &'static str {
    match result {
      Err(AppError::Query { code, .. }) => code,
      Ok(_) => "OK",
      Err(_) => "OTHER",
    }
  }

  #[test]
  fn empty_and_whitespace_queries_are_rejected() {
    assert_eq!(code_of(validate_query("")), "EMPTY_QUERY");
    assert_eq!(code_of(validate_query("   ")), "EMPTY_QUERY");
  }

  #[test]
  fn two_char_query_is_too_short_after_normalization() {
    assert_eq!(code_of(validate_query("оё")), "QUERY_TOO_SHORT");
    assert_eq!(code_of(validate_query("  ab  ")), "QUERY_TOO_SHORT");
  }

  #[test]
  fn over_long_query_is_rejected_by_normalized_length() {
    let long = "ф".repeat(61);
    assert_eq!(code_of(validate_query(&long)), "QUERY_TOO_LONG");
    let at_limit = "ф".repeat(60);
    assert_eq!(code_of(validate_query(&at_limit)), "OK");
  }

  #[test]
  fn symbol_only_query_is_invalid() {
    assert_eq!(code_of(validate_query("!!! ---")), "INVALID_QUERY");
  }

  #[test]
  fn valid_query_comes_back_normalized() {
    assert_eq!(validate_query("  Ёлка  ").unwrap(), "елка");
  }
}
