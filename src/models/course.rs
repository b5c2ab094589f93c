use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::timestamp;
use crate::utils::AppError;

/// Snapshot of the creator taken when the course is created
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Instructor {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo: String,
}

/// Course (stored in MongoDB `courses`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub level: Option<String>,
    #[serde(default)]
    pub is_featured: bool,

    pub instructor: Instructor,

    /// uid of the creator, never changes after insert
    pub owner: String,

    #[serde(default)]
    pub students: i64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub lessons: i64,

    #[serde(with = "crate::models::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::models::timestamp")]
    pub updated_at: i64,
}

/// Body of `POST /api/courses`
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub level: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidRequest("Course title is required".into()));
        }
        validate_price(self.price)
    }
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub level: Option<String>,
    pub is_featured: Option<bool>,
    pub lessons: Option<i64>,
}

impl UpdateCourseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(AppError::InvalidRequest("Course title cannot be empty".into()));
            }
        }
        if let Some(lessons) = self.lessons {
            if lessons < 0 {
                return Err(AppError::InvalidRequest("Lessons cannot be negative".into()));
            }
        }
        validate_price(self.price)
    }

    /// Applies the present fields onto an existing course.
    pub fn apply_to(&self, course: &mut Course) {
        if let Some(title) = &self.title { course.title = title.trim().to_string(); }
        if let Some(description) = &self.description { course.description = description.clone(); }
        if let Some(category) = &self.category { course.category = category.clone(); }
        if let Some(image) = &self.image { course.image = Some(image.clone()); }
        if let Some(duration) = &self.duration { course.duration = Some(duration.clone()); }
        if let Some(price) = self.price { course.price = Some(price); }
        if let Some(level) = &self.level { course.level = Some(level.clone()); }
        if let Some(is_featured) = self.is_featured { course.is_featured = is_featured; }
        if let Some(lessons) = self.lessons { course.lessons = lessons; }
    }
}

fn validate_price(price: Option<f64>) -> Result<(), AppError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(AppError::InvalidRequest("Price must be a non-negative number".into()))
        }
        _ => Ok(()),
    }
}

/// Listing filter, shared by every store implementation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub featured_only: bool,
    pub search: Option<String>,
}

impl CourseFilter {
    /// In-process equivalent of the store query: exact category,
    /// featured flag, case-insensitive substring over title/description/instructor.
    pub fn matches(&self, course: &Course) -> bool {
        if let Some(category) = &self.category {
            if &course.category != category {
                return false;
            }
        }
        if self.featured_only && !course.is_featured {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return [&course.title, &course.description, &course.instructor.name]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }
        true
    }
}

/// Course as returned by the API
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub level: Option<String>,
    pub is_featured: bool,
    pub instructor: Instructor,
    pub owner: String,
    pub students: i64,
    pub rating: f64,
    pub lessons: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: course.title,
            description: course.description,
            category: course.category,
            image: course.image,
            duration: course.duration,
            price: course.price,
            level: course.level,
            is_featured: course.is_featured,
            instructor: course.instructor,
            owner: course.owner,
            students: course.students,
            rating: course.rating,
            lessons: course.lessons,
            created_at: timestamp::to_iso(course.created_at),
            updated_at: timestamp::to_iso(course.updated_at),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseListResponse {
    pub success: bool,
    pub courses: Vec<CourseResponse>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(title: &str, description: &str, instructor: &str) -> Course {
        Course {
            id: None,
            title: title.into(),
            description: description.into(),
            category: "web".into(),
            image: None,
            duration: None,
            price: None,
            level: None,
            is_featured: false,
            instructor: Instructor { name: instructor.into(), email: String::new(), photo: String::new() },
            owner: "owner".into(),
            students: 0,
            rating: 0.0,
            lessons: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_fields() {
        let filter = CourseFilter { search: Some("RuSt".into()), ..Default::default() };
        assert!(filter.matches(&course("Intro to Rust", "", "Ana")));
        assert!(filter.matches(&course("Systems", "learn rust the hard way", "Ana")));
        assert!(filter.matches(&course("Systems", "", "Rusty Ryan")));
        assert!(!filter.matches(&course("Python", "scripting", "Ana")));
    }

    #[test]
    fn test_category_and_featured_filters() {
        let mut c = course("A", "", "B");
        let by_category = CourseFilter { category: Some("design".into()), ..Default::default() };
        assert!(!by_category.matches(&c));

        let featured = CourseFilter { featured_only: true, ..Default::default() };
        assert!(!featured.matches(&c));
        c.is_featured = true;
        assert!(featured.matches(&c));
    }

    #[test]
    fn test_create_validation() {
        let mut req = CreateCourseRequest {
            title: "   ".into(),
            description: String::new(),
            category: String::new(),
            image: None,
            duration: None,
            price: None,
            level: None,
            is_featured: false,
        };
        assert!(req.validate().is_err());
        req.title = "Rust".into();
        assert!(req.validate().is_ok());
        req.price = Some(-1.0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut c = course("Old", "desc", "Ana");
        let update = UpdateCourseRequest { title: Some("New".into()), lessons: Some(12), ..Default::default() };
        assert!(update.validate().is_ok());
        update.apply_to(&mut c);
        assert_eq!(c.title, "New");
        assert_eq!(c.description, "desc");
        assert_eq!(c.lessons, 12);
        assert_eq!(c.owner, "owner");

        let negative = UpdateCourseRequest { lessons: Some(-3), ..Default::default() };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_stored_dates_and_iso_response() {
        let mut c = course("A", "", "B");
        c.created_at = 1_714_564_800_000;
        c.updated_at = 1_714_564_800_123;

        let document = mongodb::bson::to_document(&c).unwrap();
        assert!(document.get_datetime("createdAt").is_ok());
        assert!(document.get_datetime("updatedAt").is_ok());

        let stored: Course = mongodb::bson::from_document(document).unwrap();
        assert_eq!(stored.created_at, c.created_at);

        let response = CourseResponse::from(stored);
        assert_eq!(response.created_at, "2024-05-01T12:00:00.000Z");
        assert_eq!(response.updated_at, "2024-05-01T12:00:00.123Z");
    }
}
