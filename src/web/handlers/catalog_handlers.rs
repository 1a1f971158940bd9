use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::Product;
use crate::repositories::products::{self, CatalogFilter, CatalogSort};
use crate::state::AppState;
use crate::web::handlers::product_handlers::ProductView;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Resolves raw query paging values into `(page, limit, offset)`. Values are
/// clamped and the offset saturates, so hostile extremes never overflow.
pub(crate) fn page_window(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64, i64) {
  let page = page.unwrap_or(1).max(1);
  let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
  let offset = page.saturating_sub(1).saturating_mul(limit);
  (page, limit, offset)
}

/// An empty filtered page means the category has nothing behind it; callers
/// get a 404, never an empty 200 list.
fn page_or_not_found(products: Vec<Product>) -> Result<Vec<Product>, AppError> {
  if products.is_empty() {
    return Err(AppError::NotFound("Category not found".to_string()));
  }
  Ok(products)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
  pub min_price: Option<f64>,
  pub max_price: Option<f64>,
  /// `inStock=true` keeps only products with quantity > 0.
  pub in_stock: Option<String>,
  pub category: Option<String>,
  /// Comma-separated list of additional category filters.
  pub categories: Option<String>,
  pub sort: Option<String>,
}

/// `GET /api/catalog/{category}` — paginated listing for one product group.
/// An empty filtered page is a 404, not an empty 200 list.
#[instrument(name = "handler::catalog", skip(app_state, query), fields(group_id = %path.as_ref()))]
pub async fn catalog_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<CatalogQuery>,
) -> Result<HttpResponse, AppError> {
  let group_id = path.into_inner();
  let query = query.into_inner();

  let (page, limit, offset) = page_window(query.page, query.limit, DEFAULT_PAGE_SIZE);

  let mut categories: Vec<String> = Vec::new();
  if let Some(category) = query.category {
    categories.push(category);
  }
  if let Some(raw) = query.categories {
    categories.extend(raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from));
  }

  let filter = CatalogFilter {
    group_id: group_id.clone(),
    categories,
    min_price: query.min_price,
    max_price: query.max_price,
    in_stock_only: query.in_stock.as_deref() == Some("true"),
    sort: query.sort.as_deref().and_then(CatalogSort::parse),
  };

  let total = products::count_for_catalog(&app_state.db_pool, &filter).await?;
  let page_products = page_or_not_found(products::list_for_catalog(&app_state.db_pool, &filter, limit, offset).await?)?;

  info!(total, page, "Catalog page served.");

  let views: Vec<ProductView> = page_products
    .into_iter()
    .map(|p| ProductView::from_product(p, app_state.get_ref()))
    .collect();
  let total_pages = (total + limit - 1) / limit;

  Ok(HttpResponse::Ok().json(json!({
    "category": group_id,
    "products": views,
    "page": page,
    "totalPages": total_pages,
    "total": total,
  })))
}

/// `GET /api/categories` — distinct non-null category values.
#[instrument(name = "handler::categories", skip(app_state))]
pub async fn categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = products::distinct_categories(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}
