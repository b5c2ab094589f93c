use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CourseShare API",
        version = "1.0.0",
        description = "Course catalog, user records and per-user enrollment progress.\n\n**Authentication:** write routes and everything under `/api/enrollments` and `/api/users` require a Bearer token."
    ),
    paths(
        crate::api::health::health_check,

        crate::api::courses::list_courses,
        crate::api::courses::get_course,
        crate::api::courses::create_course,
        crate::api::courses::update_course,
        crate::api::courses::enroll_in_course,

        crate::api::enrollments::my_courses,
        crate::api::enrollments::update_progress,
        crate::api::enrollments::check_enrollment,

        crate::api::users::create_user,
        crate::api::users::get_me,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,

            crate::models::Instructor,
            crate::models::CourseResponse,
            crate::models::CourseListResponse,
            crate::models::CreateCourseRequest,
            crate::models::UpdateCourseRequest,

            crate::models::EnrollmentStatus,
            crate::models::EnrollmentResponse,
            crate::models::EnrolledCourse,
            crate::models::ProgressUpdateRequest,

            crate::models::UserRole,
            crate::models::UserResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service and database status."),
        (name = "Courses", description = "Catalog listing, search and owner-only course management."),
        (name = "Enrollments", description = "Enrolling into courses and tracking progress."),
        (name = "Users", description = "Profile of the authenticated caller."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Identity token of the caller"))
                        .build(),
                ),
            );
        }
    }
}
