use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{timestamp, Course};
use crate::utils::AppError;

/// Used when the course has no lesson count recorded
pub const DEFAULT_TOTAL_LESSONS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EnrollmentStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl EnrollmentStatus {
    /// Status is a pure function of the (already clamped) progress.
    pub fn from_progress(progress: f64) -> Self {
        if progress <= 0.0 {
            EnrollmentStatus::NotStarted
        } else if progress >= 100.0 {
            EnrollmentStatus::Completed
        } else {
            EnrollmentStatus::InProgress
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnrollmentStatus::NotStarted => "not-started",
            EnrollmentStatus::InProgress => "in-progress",
            EnrollmentStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// Clamps a progress percentage into [0, 100].
pub fn clamp_progress(progress: f64) -> f64 {
    progress.clamp(0.0, 100.0)
}

/// Enrollment of a user into a course (stored in MongoDB `enrollments`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub user_id: String,

    /// Hex id of the course. Not a foreign key: the course may be gone.
    pub course_id: String,

    #[serde(with = "crate::models::timestamp")]
    pub enrolled_at: i64,
    pub progress: f64,
    pub completed_lessons: i64,
    pub total_lessons: i64,
    #[serde(with = "crate::models::timestamp")]
    pub last_accessed: i64,
    pub status: EnrollmentStatus,
}

impl Enrollment {
    pub fn new(user_id: &str, course_id: &str, course: &Course, now: i64) -> Self {
        let total_lessons = if course.lessons > 0 { course.lessons } else { DEFAULT_TOTAL_LESSONS };

        Self {
            id: None,
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            enrolled_at: now,
            progress: 0.0,
            completed_lessons: 0,
            total_lessons,
            last_accessed: now,
            status: EnrollmentStatus::from_progress(0.0),
        }
    }
}

/// Body of `PUT /api/enrollments/{id}/progress`
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdateRequest {
    pub progress: f64,
    pub completed_lessons: Option<i64>,
}

/// Fields written by a progress update
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressChange {
    pub progress: f64,
    pub status: EnrollmentStatus,
    pub completed_lessons: Option<i64>,
    pub last_accessed: i64,
}

impl ProgressUpdateRequest {
    pub fn into_change(self, now: i64) -> Result<ProgressChange, AppError> {
        if !self.progress.is_finite() {
            return Err(AppError::InvalidRequest("Progress must be a number".into()));
        }
        if matches!(self.completed_lessons, Some(n) if n < 0) {
            return Err(AppError::InvalidRequest("Completed lessons cannot be negative".into()));
        }

        let progress = clamp_progress(self.progress);
        Ok(ProgressChange {
            progress,
            status: EnrollmentStatus::from_progress(progress),
            completed_lessons: self.completed_lessons,
            last_accessed: now,
        })
    }
}

impl ProgressChange {
    pub fn apply_to(&self, enrollment: &mut Enrollment) {
        enrollment.progress = self.progress;
        enrollment.status = self.status;
        if let Some(completed) = self.completed_lessons {
            enrollment.completed_lessons = completed;
        }
        enrollment.last_accessed = self.last_accessed;
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: String,
    pub progress: f64,
    pub completed_lessons: i64,
    pub total_lessons: i64,
    pub last_accessed: String,
    pub status: EnrollmentStatus,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(e: Enrollment) -> Self {
        Self {
            id: e.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: e.user_id,
            course_id: e.course_id,
            enrolled_at: timestamp::to_iso(e.enrolled_at),
            progress: e.progress,
            completed_lessons: e.completed_lessons,
            total_lessons: e.total_lessons,
            last_accessed: timestamp::to_iso(e.last_accessed),
            status: e.status,
        }
    }
}

/// Denormalized enrollment + course entry for the "my courses" page
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub image: Option<String>,
    pub instructor: String,
    pub enrolled_at: String,
    pub progress: f64,
    pub last_accessed: String,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub status: EnrollmentStatus,
    pub category: String,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub description: String,
}

impl EnrolledCourse {
    pub fn new(enrollment: Enrollment, course: Course) -> Self {
        Self {
            id: enrollment.id.map(|id| id.to_hex()).unwrap_or_default(),
            course_id: enrollment.course_id,
            title: course.title,
            image: course.image,
            instructor: course.instructor.name,
            enrolled_at: timestamp::to_iso(enrollment.enrolled_at),
            progress: enrollment.progress,
            last_accessed: timestamp::to_iso(enrollment.last_accessed),
            total_lessons: enrollment.total_lessons,
            completed_lessons: enrollment.completed_lessons,
            status: enrollment.status,
            category: course.category,
            duration: course.duration,
            price: course.price,
            description: course.description,
        }
    }
}
