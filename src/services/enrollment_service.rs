use futures::future::join_all;
use mongodb::bson::oid::ObjectId;

use crate::database::Store;
use crate::models::{EnrolledCourse, Enrollment, ProgressUpdateRequest};
use crate::services::course_service::parse_object_id;
use crate::services::auth_service::Identity;
use crate::utils::AppError;

/// Enrolls the user and bumps the course's student counter.
///
/// The two writes are not transactional: if the increment fails the
/// enrollment stays and the caller gets the store error.
pub async fn enroll(store: &Store, user: &Identity, course_id: &str) -> Result<Enrollment, AppError> {
    let object_id = parse_object_id(course_id, "course")?;
    // Canonical lowercase hex, so every spelling of an id maps to one enrollment
    let course_id = object_id.to_hex();

    let course = store
        .courses
        .find_by_id(object_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))?;

    if store
        .enrollments
        .find_for_user_and_course(&user.uid, &course_id)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyEnrolled);
    }

    let now = chrono::Utc::now().timestamp_millis();
    let enrollment = store
        .enrollments
        .insert(Enrollment::new(&user.uid, &course_id, &course, now))
        .await?;

    if let Err(e) = store.courses.increment_students(object_id).await {
        log::error!(
            "❌ Enrollment {:?} created but student counter of course {} was not incremented",
            enrollment.id.map(|id| id.to_hex()),
            course_id
        );
        return Err(e);
    }

    Ok(enrollment)
}

async fn join_course(store: &Store, enrollment: Enrollment) -> Result<Option<EnrolledCourse>, AppError> {
    let course_id = match ObjectId::parse_str(&enrollment.course_id) {
        Ok(id) => id,
        Err(_) => {
            log::warn!("⚠️ Invalid courseId in enrollment: {}", enrollment.course_id);
            return Ok(None);
        }
    };

    match store.courses.find_by_id(course_id).await? {
        Some(course) => Ok(Some(EnrolledCourse::new(enrollment, course))),
        None => {
            log::warn!("⚠️ Course not found for enrollment: {}", enrollment.course_id);
            Ok(None)
        }
    }
}

/// Enrollments of the user joined with their courses. Entries whose course
/// id is malformed or whose course no longer exists are dropped.
pub async fn my_courses(store: &Store, user: &Identity) -> Result<Vec<EnrolledCourse>, AppError> {
    let enrollments = store.enrollments.list_for_user(&user.uid).await?;

    let joined = join_all(enrollments.into_iter().map(|e| join_course(store, e))).await;

    let mut courses = Vec::with_capacity(joined.len());
    for entry in joined {
        if let Some(course) = entry? {
            courses.push(course);
        }
    }
    Ok(courses)
}

pub async fn update_progress(
    store: &Store,
    user: &Identity,
    enrollment_id: &str,
    request: ProgressUpdateRequest,
) -> Result<Enrollment, AppError> {
    let object_id = parse_object_id(enrollment_id, "enrollment")?;
    let change = request.into_change(chrono::Utc::now().timestamp_millis())?;

    store
        .enrollments
        .update_progress(object_id, &user.uid, &change)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".into()))
}

/// A malformed course id is simply not enrolled.
pub async fn check_enrollment(store: &Store, user: &Identity, course_id: &str) -> Result<Option<Enrollment>, AppError> {
    let course_id = match ObjectId::parse_str(course_id) {
        Ok(id) => id.to_hex(),
        Err(_) => course_id.to_string(),
    };
    store.enrollments.find_for_user_and_course(&user.uid, &course_id).await
}
