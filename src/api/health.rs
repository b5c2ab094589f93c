use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::Store;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub version: String,
    /// `Connected` or `Disconnected`
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running; `database` reports store reachability", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<Store>) -> impl Responder {
    let database = match store.health.ping().await {
        Ok(()) => "Connected",
        Err(e) => {
            log::warn!("⚠️ Health check: database unreachable: {}", e);
            "Disconnected"
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        success: true,
        message: "CourseShare API is running!".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}
