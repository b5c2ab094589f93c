pub mod courses;
pub mod enrollments;
pub mod health;
pub mod swagger;
pub mod users;

use actix_web::{guard, web, HttpResponse};

use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

/// Registers every `/api` route. Store and token verifier are expected as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .route("/api/health", web::get().to(health::health_check))
        // Courses: reads are public, writes require a token
        .service(
            web::scope("/api/courses")
                .service(web::resource("").guard(guard::Get()).to(courses::list_courses))
                .service(
                    web::resource("")
                        .guard(guard::Post())
                        .wrap(AuthMiddleware)
                        .to(courses::create_course),
                )
                .service(web::resource("/{id}").guard(guard::Get()).to(courses::get_course))
                .service(
                    web::resource("/{id}")
                        .guard(guard::Put())
                        .wrap(AuthMiddleware)
                        .to(courses::update_course),
                )
                .service(
                    web::resource("/{id}/enroll")
                        .guard(guard::Post())
                        .wrap(AuthMiddleware)
                        .to(courses::enroll_in_course),
                ),
        )
        .service(
            web::scope("/api/enrollments")
                .wrap(AuthMiddleware)
                .route("/my-courses", web::get().to(enrollments::my_courses))
                .route("/{id}/progress", web::put().to(enrollments::update_progress))
                .route("/check/{courseId}", web::get().to(enrollments::check_enrollment)),
        )
        .service(
            web::scope("/api/users")
                .wrap(AuthMiddleware)
                .route("", web::post().to(users::create_user))
                .route("/me", web::get().to(users::get_me)),
        );
}

/// Fallback for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "success": false,
        "message": "API route not found"
    }))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        log::warn!("⚠️ {} {} - rejected body: {}", req.method(), req.path(), err);
        AppError::InvalidRequest(format!("Invalid request body: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        log::warn!("⚠️ {} {} - rejected query: {}", req.method(), req.path(), err);
        AppError::InvalidRequest(format!("Invalid query parameters: {}", err)).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::InvalidRequest(format!("Invalid path: {}", err)).into())
}


#[cfg(test)]
mod tests {
    use super::testing::{body_json, test_app};
    use crate::database::Store;
    use actix_web::{http::StatusCode, test};

    #[actix_web::test]
    async fn test_unknown_route_is_json_404() {
        let app = test::init_service(test_app(Store::in_memory())).await;

        let req = test::TestRequest::get().uri("/api/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "API route not found");
    }

    #[actix_web::test]
    async fn test_malformed_json_is_400() {
        let app = test::init_service(test_app(Store::in_memory())).await;

        let req = test::TestRequest::post()
            .uri("/api/courses")
            .insert_header(("Authorization", "Bearer someone"))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["success"], false);
    }
}
