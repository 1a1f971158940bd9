use crate::errors::Result;
use crate::models::product::{NewProduct, Product};
use crate::util::normalize_search_text;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, external_id, name, full_name, name_search, full_name_search, price, currency, \
                               unit, unit_code, group_id, category, weight, quantity, description, in_stock, image, created_at";

/// Catalog listing filter, built from query parameters.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
  pub group_id: String,
  pub categories: Vec<String>,
  pub min_price: Option<f64>,
  pub max_price: Option<f64>,
  pub in_stock_only: bool,
  pub sort: Option<CatalogSort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSort {
  PriceAsc,
  PriceDesc,
  NameAsc,
  NameDesc,
}

impl CatalogSort {
  /// Parses the `sort` query parameter; unknown values leave the listing
  /// unsorted, matching lenient query handling elsewhere.
  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "price-asc" => Some(Self::PriceAsc),
      "price-desc" => Some(Self::PriceDesc),
      "name-asc" => Some(Self::NameAsc),
      "name-desc" => Some(Self::NameDesc),
      _ => None,
    }
  }

  fn order_clause(self) -> &'static str {
    match self {
      Self::PriceAsc => " ORDER BY price ASC",
      Self::PriceDesc => " ORDER BY price DESC",
      Self::NameAsc => " ORDER BY name ASC",
      Self::NameDesc => " ORDER BY name DESC",
    }
  }
}

fn push_filter_clauses(qb: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter) {
  qb.push(" WHERE group_id = ");
  qb.push_bind(filter.group_id.clone());
  if !filter.categories.is_empty() {
    qb.push(" AND category = ANY(");
    qb.push_bind(filter.categories.clone());
    qb.push(")");
  }
  if let Some(min) = filter.min_price {
    qb.push(" AND price >= ");
    qb.push_bind(min);
  }
  if let Some(max) = filter.max_price {
    qb.push(" AND price <= ");
    qb.push_bind(max);
  }
  if filter.in_stock_only {
    qb.push(" AND quantity > 0");
  }
}

#[instrument(name = "products::count_for_catalog", skip(pool, filter), fields(group_id = %filter.group_id))]
pub async fn count_for_catalog(pool: &PgPool, filter: &CatalogFilter) -> Result<i64> {
  let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
  push_filter_clauses(&mut qb, filter);
  let total: i64 = qb.build_query_scalar().fetch_one(pool).await?;
  Ok(total)
}

#[instrument(name = "products::list_for_catalog", skip(pool, filter), fields(group_id = %filter.group_id))]
pub async fn list_for_catalog(pool: &PgPool, filter: &CatalogFilter, limit: i64, offset: i64) -> Result<Vec<Product>> {
  let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
  push_filter_clauses(&mut qb, filter);
  if let Some(sort) = filter.sort {
    qb.push(sort.order_clause());
  }
  qb.push(" LIMIT ");
  qb.push_bind(limit);
  qb.push(" OFFSET ");
  qb.push_bind(offset);

  let products = qb.build_query_as::<Product>().fetch_all(pool).await?;
  Ok(products)
}

/// Escapes LIKE wildcards so user queries match literally.
fn escape_like(s: &str) -> String {
  s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Prefix search over the normalized shadow fields. `normalized_query` must
/// already have gone through [`normalize_search_text`].
#[instrument(name = "products::search_by_prefix", skip(pool))]
pub async fn search_by_prefix(pool: &PgPool, normalized_query: &str, limit: i64, offset: i64) -> Result<Vec<Product>> {
  let prefix = format!("{}%", escape_like(normalized_query));
  let products: Vec<Product> = sqlx::query_as(&format!(
    "SELECT {} FROM products \
     WHERE name_search LIKE $1 OR full_name_search LIKE $1 \
     ORDER BY name ASC LIMIT $2 OFFSET $3",
    PRODUCT_COLUMNS
  ))
  .bind(&prefix)
  .bind(limit)
  .bind(offset)
  .fetch_all(pool)
  .await?;
  Ok(products)
}

#[instrument(name = "products::find_by_external_id", skip(pool))]
pub async fn find_by_external_id(pool: &PgPool, external_id: &str) -> Result<Option<Product>> {
  let product: Option<Product> = sqlx::query_as(&format!(
    "SELECT {} FROM products WHERE external_id = $1",
    PRODUCT_COLUMNS
  ))
  .bind(external_id)
  .fetch_optional(pool)
  .await?;
  Ok(product)
}

#[instrument(name = "products::list_all", skip(pool))]
pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>> {
  let products: Vec<Product> =
    sqlx::query_as(&format!("SELECT {} FROM products ORDER BY name ASC", PRODUCT_COLUMNS))
      .fetch_all(pool)
      .await?;
  Ok(products)
}

#[instrument(name = "products::distinct_categories", skip(pool))]
pub async fn distinct_categories(pool: &PgPool) -> Result<Vec<String>> {
  let categories: Vec<String> =
    sqlx::query_scalar("SELECT DISTINCT category FROM products WHERE category IS NOT NULL ORDER BY category")
      .fetch_all(pool)
      .await?;
  Ok(categories)
}

/// Inserts a catalog entry. The search shadow fields are recomputed here, as
/// an explicit step before the write, so they can never drift from the
/// visible name fields.
#[instrument(name = "products::create", skip(pool, new_product), fields(external_id = %new_product.external_id))]
pub async fn create(pool: &PgPool, new_product: NewProduct) -> Result<Product, sqlx::Error> {
  let name_search = normalize_search_text(&new_product.name);
  let full_name_search = normalize_search_text(new_product.full_name.as_deref().unwrap_or(""));

  let product: Product = sqlx::query_as(&format!(
    "INSERT INTO products \
       (external_id, name, full_name, name_search, full_name_search, price, currency, unit, unit_code, \
        group_id, category, weight, quantity, description, in_stock, image) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
     RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(&new_product.external_id)
  .bind(&new_product.name)
  .bind(&new_product.full_name)
  .bind(&name_search)
  .bind(&full_name_search)
  .bind(new_product.price)
  .bind(&new_product.currency)
  .bind(&new_product.unit)
  .bind(&new_product.unit_code)
  .bind(&new_product.group_id)
  .bind(&new_product.category)
  .bind(new_product.weight)
  .bind(new_product.quantity)
  .bind(&new_product.description)
  .bind(new_product.in_stock)
  .bind(&new_product.image)
  .fetch_one(pool)
  .await?;
  Ok(product)
}

/// Row subset used by the `rebuild-search-fields` maintenance binary.
#[derive(Debug, sqlx::FromRow)]
pub struct SearchFieldRow {
  pub id: Uuid,
  pub name: String,
  pub full_name: Option<String>,
  pub name_search: String,
  pub full_name_search: String,
}

pub async fn list_search_fields(pool: &PgPool) -> Result<Vec<SearchFieldRow>> {
  let rows: Vec<SearchFieldRow> =
    sqlx::query_as("SELECT id, name, full_name, name_search, full_name_search FROM products")
      .fetch_all(pool)
      .await?;
  Ok(rows)
}

pub async fn update_search_fields(pool: &PgPool, id: Uuid, name_search: &str, full_name_search: &str) -> Result<()> {
  sqlx::query("UPDATE products SET name_search = $2, full_name_search = $3 WHERE id = $1")
    .bind(id)
    .bind(name_search)
    .bind(full_name_search)
    .execute(pool)
    .await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_sort_keys() {
    assert_eq!(CatalogSort::parse("price-asc"), Some(CatalogSort::PriceAsc));
    assert_eq!(CatalogSort::parse("price-desc"), Some(CatalogSort::PriceDesc));
    assert_eq!(CatalogSort::parse("name-asc"), Some(CatalogSort::NameAsc));
    assert_eq!(CatalogSort::parse("name-desc"), Some(CatalogSort::NameDesc));
    assert_eq!(CatalogSort::parse("newest"), None);
  }

  #[test]
  fn escapes_like_wildcards() {
    assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
  }
}
