use actix_web::{web, HttpResponse};

use crate::database::Store;
use crate::models::{CourseListResponse, CourseResponse, CreateCourseRequest, EnrollmentResponse, UpdateCourseRequest};
use crate::services::auth_service::Identity;
use crate::services::course_service::{self, CourseListQuery};
use crate::services::enrollment_service;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "Courses",
    params(CourseListQuery),
    responses(
        (status = 200, description = "Page of courses, newest first", body = CourseListResponse),
        (status = 400, description = "Malformed query string")
    )
)]
pub async fn list_courses(
    store: web::Data<Store>,
    query: web::Query<CourseListQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("📚 GET /api/courses - {:?}", query);

    let response = course_service::list_courses(&store, &query).await?;
    log::info!("✅ Listed {} of {} courses", response.courses.len(), response.total);

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course ObjectId (24 hex chars)")),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 400, description = "Invalid course ID format"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(store: web::Data<Store>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    log::info!("🔎 GET /api/courses/{}", course_id);

    let course = course_service::get_course(&store, &course_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "course": CourseResponse::from(course)
    })))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "Courses",
    request_body = CreateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid course data"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_course(
    user: web::ReqData<Identity>,
    store: web::Data<Store>,
    body: web::Json<CreateCourseRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /api/courses - '{}' by {}", body.title, user.uid);

    let course = course_service::create_course(&store, &user, body.into_inner()).await?;
    log::info!("✅ Course created: {:?}", course.id.map(|id| id.to_hex()));

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "course": CourseResponse::from(course)
    })))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course ObjectId")),
    request_body = UpdateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid ID or body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Requester is not the owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn update_course(
    user: web::ReqData<Identity>,
    store: web::Data<Store>,
    path: web::Path<String>,
    body: web::Json<UpdateCourseRequest>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    log::info!("🔧 PUT /api/courses/{} by {}", course_id, user.uid);

    let course = course_service::update_course(&store, &user, &course_id, body.into_inner())
        .await
        .map_err(|e| {
            log::warn!("⚠️ Update of course {} refused: {}", course_id, e);
            e
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "course": CourseResponse::from(course)
    })))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/enroll",
    tag = "Enrollments",
    params(("id" = String, Path, description = "Course ObjectId")),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 400, description = "Invalid ID or already enrolled"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn enroll_in_course(
    user: web::ReqData<Identity>,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    log::info!("🎓 POST /api/courses/{}/enroll by {}", course_id, user.uid);

    let enrollment = enrollment_service::enroll(&store, &user, &course_id)
        .await
        .map_err(|e| {
            log::warn!("⚠️ Enrollment into {} failed: {}", course_id, e);
            e
        })?;
    log::info!("✅ Enrollment successful for course: {}", course_id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Successfully enrolled in course",
        "enrollment": EnrollmentResponse::from(enrollment)
    })))
}
