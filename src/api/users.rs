use actix_web::{web, HttpResponse};

use crate::database::Store;
use crate::models::UserResponse;
use crate::services::auth_service::Identity;
use crate::services::user_service;
use crate::utils::AppError;

/// POST /api/users - idempotent get-or-create of the caller's record
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Existing or newly created user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_user(user: web::ReqData<Identity>, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    log::info!("👤 POST /api/users - {}", user.uid);

    let stored = user_service::get_or_create(&store, &user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserResponse::from(stored)
    })))
}

/// GET /api/users/me - caller's profile, created on first access
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_me(user: web::ReqData<Identity>, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let stored = user_service::get_or_create(&store, &user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserResponse::from(stored)
    })))
}
