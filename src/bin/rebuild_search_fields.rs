//! Maintenance tool: rewrites the products' search shadow fields through the
//! same normalization the repository applies on write. Run after changing
//! normalization rules or importing data that bypassed the repository.

use sqlx::PgPool;
use storefront::config::AppConfig;
use storefront::repositories::products;
use storefront::util::normalize_search_text;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let config = AppConfig::from_env()?;
  let pool = PgPool::connect(&config.database_url).await?;

  let rows = products::list_search_fields(&pool).await?;
  let seen = rows.len();
  let mut modified = 0usize;

  for row in rows {
    let name_new = normalize_search_text(&row.name);
    let full_new = normalize_search_text(row.full_name.as_deref().unwrap_or(""));
    if row.name_search != name_new || row.full_name_search != full_new {
      products::update_search_fields(&pool, row.id, &name_new, &full_new).await?;
      modified += 1;
      if modified % 1000 == 0 {
        tracing::info!(seen, modified, "progress");
      }
    }
  }

  tracing::info!(seen, modified, "Search fields rebuilt.");
  Ok(())
}
