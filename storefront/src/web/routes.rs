// storefront/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::order_handlers;

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "success": true, "status": "ok" }))
}

/// Malformed JSON bodies get the same `{success, message}` shape as every
/// other error.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .app_data(json_config())
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/order")
          // Admin
          .route("/list", web::post().to(order_handlers::list_orders_handler))
          .route("/update", web::post().to(order_handlers::update_status_handler))
          // Payment
          .route("/place", web::post().to(order_handlers::place_order_handler))
          .route("/razorpay", web::post().to(order_handlers::place_gateway_order_handler))
          .route("/verifyRazorpay", web::post().to(order_handlers::verify_payment_handler))
          // User
          .route("/userorders", web::post().to(order_handlers::user_orders_handler)),
      ),
  );
}
