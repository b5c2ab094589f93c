use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{CourseRepository, EnrollmentRepository, StoreHealth, UserRepository};
use crate::models::{Course, CourseFilter, Enrollment, ProgressChange, UpdateCourseRequest, User};
use crate::utils::AppError;

/// Process-local store backing the handler tests
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    courses: RwLock<Vec<Course>>,
    enrollments: RwLock<Vec<Enrollment>>,
}

/// Descending by timestamp, ties broken by insertion order (ObjectIds grow)
fn newest_first(a: (i64, Option<ObjectId>), b: (i64, Option<ObjectId>)) -> std::cmp::Ordering {
    let key = |(ts, id): (i64, Option<ObjectId>)| (ts, id.map(|id| id.bytes()));
    key(b).cmp(&key(a))
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.iter().find(|u| u.uid == uid).cloned())
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.iter().find(|u| u.uid == user.uid) {
            return Ok(existing.clone());
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn list(&self, filter: &CourseFilter, skip: u64, limit: i64) -> Result<Vec<Course>, AppError> {
        let mut matching: Vec<Course> = self
            .courses
            .read()
            .await
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));

        Ok(matching
            .into_iter()
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &CourseFilter) -> Result<u64, AppError> {
        Ok(self.courses.read().await.iter().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Course>, AppError> {
        Ok(self.courses.read().await.iter().find(|c| c.id == Some(id)).cloned())
    }

    async fn insert(&self, mut course: Course) -> Result<Course, AppError> {
        course.id = Some(ObjectId::new());
        self.courses.write().await.push(course.clone());
        Ok(course)
    }

    async fn update(
        &self,
        id: ObjectId,
        owner: &str,
        changes: &UpdateCourseRequest,
        updated_at: i64,
    ) -> Result<Option<Course>, AppError> {
        let mut courses = self.courses.write().await;
        match courses.iter_mut().find(|c| c.id == Some(id) && c.owner == owner) {
            Some(course) => {
                changes.apply_to(course);
                course.updated_at = updated_at;
                Ok(Some(course.clone()))
            }
            None => Ok(None),
        }
    }

    async fn increment_students(&self, id: ObjectId) -> Result<(), AppError> {
        if let Some(course) = self.courses.write().await.iter_mut().find(|c| c.id == Some(id)) {
            course.students += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn find_for_user_and_course(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, AppError> {
        Ok(self
            .enrollments
            .read()
            .await
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError> {
        let mut mine: Vec<Enrollment> = self
            .enrollments
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| newest_first((a.enrolled_at, a.id), (b.enrolled_at, b.id)));
        Ok(mine)
    }

    async fn insert(&self, mut enrollment: Enrollment) -> Result<Enrollment, AppError> {
        let mut enrollments = self.enrollments.write().await;
        if enrollments
            .iter()
            .any(|e| e.user_id == enrollment.user_id && e.course_id == enrollment.course_id)
        {
            return Err(AppError::AlreadyEnrolled);
        }
        enrollment.id = Some(ObjectId::new());
        enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn update_progress(
        &self,
        id: ObjectId,
        user_id: &str,
        change: &ProgressChange,
    ) -> Result<Option<Enrollment>, AppError> {
        let mut enrollments = self.enrollments.write().await;
        match enrollments.iter_mut().find(|e| e.id == Some(id) && e.user_id == user_id) {
            Some(enrollment) => {
                change.apply_to(enrollment);
                Ok(Some(enrollment.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
