use actix_web::{web, HttpResponse, Responder};

use crate::models::HealthResponse;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or_else(|e| {
        tracing::warn!("Database health check failed: {}", e);
        false
    });

    let (status, message) = if pg_healthy {
        ("ok", "Server is running")
    } else {
        ("degraded", "Database unavailable")
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        message: message.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
