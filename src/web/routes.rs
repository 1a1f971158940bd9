use actix_web::web;

use crate::web::handlers::{auth_handlers, catalog_handlers, order_handlers, product_handlers, search_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Wires all routes onto the Actix app; called from `main.rs`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/api")
        .service(
          web::scope("/auth")
            .route("/register", web::post().to(auth_handlers::register_handler))
            .route("/login", web::post().to(auth_handlers::login_handler))
            .route("/me", web::get().to(auth_handlers::me_handler)),
        )
        .service(web::scope("/orders").route("", web::post().to(order_handlers::create_order_handler)))
        .service(
          web::scope("/product")
            .route("", web::get().to(product_handlers::list_products_handler))
            .route("", web::post().to(product_handlers::create_product_handler))
            .route("/{id}", web::get().to(product_handlers::get_product_handler)),
        )
        .service(web::scope("/catalog").route("/{category}", web::get().to(catalog_handlers::catalog_handler)))
        .service(web::scope("/search").route("", web::get().to(search_handlers::search_handler)))
        .service(web::scope("/categories").route("", web::get().to(catalog_handlers::categories_handler))),
    );
}
