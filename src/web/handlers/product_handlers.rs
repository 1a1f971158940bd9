use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::product::{NewProduct, Product};
use crate::repositories::products;
use crate::state::AppState;
use crate::util::normalize_image_url;

/// Client-facing product shape, keyed by the external catalog id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
  pub id: String,
  pub name: String,
  pub full_name: Option<String>,
  pub description: Option<String>,
  pub price: f64,
  pub stock: Option<f64>,
  pub in_stock: bool,
  pub unit: Option<String>,
  pub weight: f64,
  pub image: String,
}

impl ProductView {
  pub fn from_product(product: Product, state: &AppState) -> Self {
    Self {
      id: product.external_id,
      name: product.name,
      full_name: product.full_name,
      description: product.description,
      price: product.price,
      stock: product.quantity,
      in_stock: product.in_stock,
      unit: product.unit,
      weight: product.weight,
      image: normalize_image_url(product.image.as_deref(), &state.config),
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = products::list_all(&app_state.db_pool).await?;
  info!("Fetched {} products.", products.len());
  let views: Vec<ProductView> = products
    .into_iter()
    .map(|p| ProductView::from_product(p, app_state.get_ref()))
    .collect();
  Ok(HttpResponse::Ok().json(views))
}

/// `GET /api/product/{id}` — lookup by external catalog id.
#[instrument(name = "handler::get_product", skip(app_state, path), fields(external_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let external_id = path.into_inner();
  match products::find_by_external_id(&app_state.db_pool, &external_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(ProductView::from_product(product, app_state.get_ref()))),
    None => {
      warn!("Product {} not found.", external_id);
      Err(AppError::NotFound("Product not found".to_string()))
    }
  }
}

/// `POST /api/product`. The repository recomputes the search shadow fields
/// before the write; a duplicate external id surfaces the storage layer's
/// unique-index rejection as a validation-class error.
#[instrument(name = "handler::create_product", skip(app_state, payload), fields(external_id = %payload.external_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  match products::create(&app_state.db_pool, payload.into_inner()).await {
    Ok(product) => Ok(HttpResponse::Created().json(json!({
      "message": "Product created",
      "product": ProductView::from_product(product, app_state.get_ref()),
    }))),
    Err(e) if AppError::is_unique_violation(&e) => Err(AppError::Validation(
      "A product with this external id already exists".to_string(),
    )),
    Err(e) => Err(AppError::Sqlx(e)),
  }
}
