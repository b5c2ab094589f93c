use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

use super::{CourseRepository, EnrollmentRepository, MongoDB, UserRepository, COURSES, ENROLLMENTS, USERS};
use crate::models::{timestamp, Course, CourseFilter, Enrollment, ProgressChange, UpdateCourseRequest, User};
use crate::utils::AppError;

const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

fn inserted_object_id(id: &Bson) -> Result<ObjectId, AppError> {
    id.as_object_id()
        .ok_or_else(|| AppError::DatabaseError(format!("Unexpected inserted id: {}", id)))
}

/// Escapes regex metacharacters so user search text is matched literally.
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\^$.|?*+()[]{}/-".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the MongoDB query for a course listing filter.
pub fn course_filter_document(filter: &CourseFilter) -> Document {
    let mut query = doc! {};

    if let Some(category) = &filter.category {
        query.insert("category", category.as_str());
    }
    if filter.featured_only {
        query.insert("isFeatured", true);
    }
    if let Some(search) = &filter.search {
        let pattern = escape_regex(search);
        query.insert(
            "$or",
            vec![
                doc! { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "description": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "instructor.name": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }

    query
}

/// `$set` document for a partial course update
pub fn course_update_document(changes: &UpdateCourseRequest, updated_at: i64) -> Document {
    let mut update_doc = doc! { "updatedAt": timestamp::to_bson(updated_at) };

    if let Some(title) = &changes.title { update_doc.insert("title", title.trim()); }
    if let Some(description) = &changes.description { update_doc.insert("description", description.as_str()); }
    if let Some(category) = &changes.category { update_doc.insert("category", category.as_str()); }
    if let Some(image) = &changes.image { update_doc.insert("image", image.as_str()); }
    if let Some(duration) = &changes.duration { update_doc.insert("duration", duration.as_str()); }
    if let Some(price) = changes.price { update_doc.insert("price", price); }
    if let Some(level) = &changes.level { update_doc.insert("level", level.as_str()); }
    if let Some(is_featured) = changes.is_featured { update_doc.insert("isFeatured", is_featured); }
    if let Some(lessons) = changes.lessons { update_doc.insert("lessons", lessons); }

    update_doc
}

/// `$set` document for a progress update
pub fn progress_update_document(change: &ProgressChange) -> Document {
    let mut update_doc = doc! {
        "progress": change.progress,
        "status": change.status.to_string(),
        "lastAccessed": timestamp::to_bson(change.last_accessed),
    };
    if let Some(completed) = change.completed_lessons {
        update_doc.insert("completedLessons", completed);
    }
    update_doc
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &MongoDB) -> Self {
        Self { collection: db.collection(USERS) }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, AppError> {
        Ok(self.collection.find_one(doc! { "uid": uid }).await?)
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        match self.collection.insert_one(&user).await {
            Ok(result) => {
                user.id = Some(inserted_object_id(&result.inserted_id)?);
                Ok(user)
            }
            // Two first requests raced; the other one created the record
            Err(e) if is_duplicate_key(&e) => self
                .find_by_uid(&user.uid)
                .await?
                .ok_or_else(|| AppError::DatabaseError(format!("User {} vanished after duplicate insert", user.uid))),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct MongoCourseRepository {
    collection: Collection<Course>,
}

impl MongoCourseRepository {
    pub fn new(db: &MongoDB) -> Self {
        Self { collection: db.collection(COURSES) }
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn list(&self, filter: &CourseFilter, skip: u64, limit: i64) -> Result<Vec<Course>, AppError> {
        let cursor = self
            .collection
            .find(course_filter_document(filter))
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .skip(skip)
            .limit(limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, filter: &CourseFilter) -> Result<u64, AppError> {
        Ok(self.collection.count_documents(course_filter_document(filter)).await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Course>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn insert(&self, mut course: Course) -> Result<Course, AppError> {
        let result = self.collection.insert_one(&course).await?;
        course.id = Some(inserted_object_id(&result.inserted_id)?);
        Ok(course)
    }

    async fn update(
        &self,
        id: ObjectId,
        owner: &str,
        changes: &UpdateCourseRequest,
        updated_at: i64,
    ) -> Result<Option<Course>, AppError> {
        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": id, "owner": owner },
                doc! { "$set": course_update_document(changes, updated_at) },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn increment_students(&self, id: ObjectId) -> Result<(), AppError> {
        self.collection
            .update_one(doc! { "_id": id }, doc! { "$inc": { "students": 1 } })
            .await?;
        Ok(())
    }
}

pub struct MongoEnrollmentRepository {
    collection: Collection<Enrollment>,
}

impl MongoEnrollmentRepository {
    pub fn new(db: &MongoDB) -> Self {
        Self { collection: db.collection(ENROLLMENTS) }
    }
}

#[async_trait]
impl EnrollmentRepository for MongoEnrollmentRepository {
    async fn find_for_user_and_course(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, AppError> {
        Ok(self
            .collection
            .find_one(doc! { "userId": user_id, "courseId": course_id })
            .await?)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError> {
        let cursor = self
            .collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "enrolledAt": -1, "_id": -1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, mut enrollment: Enrollment) -> Result<Enrollment, AppError> {
        match self.collection.insert_one(&enrollment).await {
            Ok(result) => {
                enrollment.id = Some(inserted_object_id(&result.inserted_id)?);
                Ok(enrollment)
            }
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyEnrolled),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_progress(
        &self,
        id: ObjectId,
        user_id: &str,
        change: &ProgressChange,
    ) -> Result<Option<Enrollment>, AppError> {
        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": id, "userId": user_id },
                doc! { "$set": progress_update_document(change) },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrollmentStatus;

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("c++"), "c\\+\\+");
        assert_eq!(escape_regex("a.b (intro)"), "a\\.b \\(intro\\)");
        assert_eq!(escape_regex("plain"), "plain");
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(course_filter_document(&CourseFilter::default()).is_empty());
    }

    #[test]
    fn test_search_filter_covers_three_fields() {
        let filter = CourseFilter {
            category: Some("design".into()),
            featured_only: true,
            search: Some("UI".into()),
        };
        let query = course_filter_document(&filter);

        assert_eq!(query.get_str("category").unwrap(), "design");
        assert!(query.get_bool("isFeatured").unwrap());
        let or = query.get_array("$or").unwrap();
        assert_eq!(or.len(), 3);
        let title = or[0].as_document().unwrap().get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), "UI");
        assert_eq!(title.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_course_update_document_only_sets_present_fields() {
        let changes = UpdateCourseRequest { title: Some("  New ".into()), ..Default::default() };
        let update = course_update_document(&changes, 42);

        assert_eq!(update.get_str("title").unwrap(), "New");
        assert_eq!(update.get_datetime("updatedAt").unwrap().timestamp_millis(), 42);
        assert!(!update.contains_key("owner"));
        assert!(!update.contains_key("description"));
    }

    #[test]
    fn test_progress_update_document() {
        let change = ProgressChange {
            progress: 100.0,
            status: EnrollmentStatus::Completed,
            completed_lessons: None,
            last_accessed: 7,
        };
        let update = progress_update_document(&change);

        assert_eq!(update.get_str("status").unwrap(), "completed");
        assert_eq!(update.get_f64("progress").unwrap(), 100.0);
        assert!(!update.contains_key("completedLessons"));
        assert_eq!(update.get_datetime("lastAccessed").unwrap().timestamp_millis(), 7);
    }
}
