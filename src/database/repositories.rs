use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::models::{Course, CourseFilter, Enrollment, ProgressChange, UpdateCourseRequest, User};
use crate::utils::AppError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, AppError>;

    /// Inserts the user and returns it with its id assigned
    async fn insert(&self, user: User) -> Result<User, AppError>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Newest first
    async fn list(&self, filter: &CourseFilter, skip: u64, limit: i64) -> Result<Vec<Course>, AppError>;

    async fn count(&self, filter: &CourseFilter) -> Result<u64, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Course>, AppError>;

    async fn insert(&self, course: Course) -> Result<Course, AppError>;

    /// Applies `changes` to the course only if `owner` still owns it.
    /// Returns the updated course, or None when no document matched.
    async fn update(
        &self,
        id: ObjectId,
        owner: &str,
        changes: &UpdateCourseRequest,
        updated_at: i64,
    ) -> Result<Option<Course>, AppError>;

    async fn increment_students(&self, id: ObjectId) -> Result<(), AppError>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_for_user_and_course(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, AppError>;

    /// Most recently enrolled first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError>;

    /// Fails with `AppError::AlreadyEnrolled` when the (user, course) pair exists
    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment, AppError>;

    /// Updates an enrollment owned by `user_id`; None when it doesn't exist for that user
    async fn update_progress(
        &self,
        id: ObjectId,
        user_id: &str,
        change: &ProgressChange,
    ) -> Result<Option<Enrollment>, AppError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
}

/// Store handles injected into every handler through `web::Data<Store>`
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub health: Arc<dyn StoreHealth>,
}
