use actix_web::{web, HttpResponse};

use crate::database::Store;
use crate::models::{EnrolledCourse, EnrollmentResponse, ProgressUpdateRequest};
use crate::services::auth_service::Identity;
use crate::services::enrollment_service;
use crate::utils::AppError;

/// GET /api/enrollments/my-courses - courses the caller is enrolled in
#[utoipa::path(
    get,
    path = "/api/enrollments/my-courses",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrolled courses, most recent first", body = [EnrolledCourse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_courses(user: web::ReqData<Identity>, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /api/enrollments/my-courses for {}", user.uid);

    let courses = enrollment_service::my_courses(&store, &user).await?;
    log::info!("✅ {} enrolled courses", courses.len());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "courses": courses
    })))
}

#[utoipa::path(
    put,
    path = "/api/enrollments/{id}/progress",
    tag = "Enrollments",
    params(("id" = String, Path, description = "Enrollment ObjectId")),
    request_body = ProgressUpdateRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Progress saved", body = EnrollmentResponse),
        (status = 400, description = "Invalid ID or body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn update_progress(
    user: web::ReqData<Identity>,
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<ProgressUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let enrollment_id = path.into_inner();
    log::info!("📈 PUT /api/enrollments/{}/progress - {}%", enrollment_id, body.progress);

    let enrollment = enrollment_service::update_progress(&store, &user, &enrollment_id, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "enrollment": EnrollmentResponse::from(enrollment)
    })))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/check/{courseId}",
    tag = "Enrollments",
    params(("courseId" = String, Path, description = "Course id as stored on the enrollment")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "`isEnrolled` flag plus the enrollment, or null"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn check_enrollment(
    user: web::ReqData<Identity>,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();

    let enrollment = enrollment_service::check_enrollment(&store, &user, &course_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "isEnrolled": enrollment.is_some(),
        "enrollment": enrollment.map(EnrollmentResponse::from)
    })))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{auth, body_json, test_app};
    use crate::database::Store;
    use crate::services::auth_service::Identity;
    use crate::services::{course_service, enrollment_service};
    use actix_web::{http::StatusCode, test};
    use serde_json::json;

    async fn create_and_enroll(store: &Store) -> (String, String) {
        let author = Identity {
            uid: "author".into(),
            email: "user@example.com".into(),
            display_name: "Demo User".into(),
            photo_url: String::new(),
        };
        let student = Identity { uid: "student".into(), ..author.clone() };

        let request = serde_json::from_value(json!({ "title": "Async Rust", "category": "programming", "price": 19.5 }))
            .unwrap();
        let course = course_service::create_course(store, &author, request).await.unwrap();
        let course_id = course.id.unwrap().to_hex();

        let enrollment = enrollment_service::enroll(store, &student, &course_id).await.unwrap();
        (course_id, enrollment.id.unwrap().to_hex())
    }

    #[actix_web::test]
    async fn test_progress_flow() {
        let store = Store::in_memory();
        let app = test::init_service(test_app(store.clone())).await;
        let (_, enrollment_id) = create_and_enroll(&store).await;

        for (sent, expected, status) in [(40.0, 40.0, "in-progress"), (150.0, 100.0, "completed"), (0.0, 0.0, "not-started")] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/enrollments/{}/progress", enrollment_id))
                .insert_header(auth("student"))
                .set_json(json!({ "progress": sent, "completedLessons": 2 }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body = body_json(resp).await;
            assert_eq!(body["enrollment"]["progress"], expected);
            assert_eq!(body["enrollment"]["status"], status);
            assert_eq!(body["enrollment"]["completedLessons"], 2);
        }

        let req = test::TestRequest::put()
            .uri(&format!("/api/enrollments/{}/progress", enrollment_id))
            .insert_header(auth("someone-else"))
            .set_json(json!({ "progress": 10 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri("/api/enrollments/zzz/progress")
            .insert_header(auth("student"))
            .set_json(json!({ "progress": 10 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_my_courses_projection() {
        let store = Store::in_memory();
        let app = test::init_service(test_app(store.clone())).await;
        let (course_id, enrollment_id) = create_and_enroll(&store).await;

        let req = test::TestRequest::get()
            .uri("/api/enrollments/my-courses")
            .insert_header(auth("student"))
            .to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        let courses = body["courses"].as_array().unwrap();

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0]["_id"], enrollment_id.as_str());
        assert_eq!(courses[0]["courseId"], course_id.as_str());
        assert_eq!(courses[0]["title"], "Async Rust");
        assert_eq!(courses[0]["instructor"], "Demo User");
        assert_eq!(courses[0]["category"], "programming");
        assert_eq!(courses[0]["price"], 19.5);
        assert_eq!(courses[0]["status"], "not-started");

        let req = test::TestRequest::get()
            .uri("/api/enrollments/my-courses")
            .insert_header(auth("author"))
            .to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        assert!(body["courses"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_check_enrollment() {
        let store = Store::in_memory();
        let app = test::init_service(test_app(store.clone())).await;
        let (course_id, _) = create_and_enroll(&store).await;

        let check = |who: &str| {
            test::TestRequest::get()
                .uri(&format!("/api/enrollments/check/{}", course_id))
                .insert_header(auth(who))
                .to_request()
        };

        let body = body_json(test::call_service(&app, check("student")).await).await;
        assert_eq!(body["isEnrolled"], true);
        assert_eq!(body["enrollment"]["courseId"], course_id.as_str());

        let body = body_json(test::call_service(&app, check("author")).await).await;
        assert_eq!(body["isEnrolled"], false);
        assert!(body["enrollment"].is_null());
    }
}
