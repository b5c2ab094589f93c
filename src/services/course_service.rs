use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::database::Store;
use crate::models::{
    Course, CourseFilter, CourseListResponse, CourseResponse, CreateCourseRequest, Instructor,
    UpdateCourseRequest,
};
use crate::services::auth_service::Identity;
use crate::utils::AppError;

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Query string of `GET /api/courses`
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseListQuery {
    /// Exact category; `all` disables the filter
    pub category: Option<String>,
    /// Only `true` filters on featured courses
    pub featured: Option<String>,
    /// Case-insensitive text matched against title, description and instructor name
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub page: Option<u64>,
}

impl CourseListQuery {
    pub fn filter(&self) -> CourseFilter {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        CourseFilter {
            category: non_empty(&self.category).filter(|c| c != "all"),
            featured_only: self.featured.as_deref() == Some("true"),
            search: non_empty(&self.search),
        }
    }

    /// (page, limit), page starting at 1
    pub fn pagination(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

pub fn page_count(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit)
}

/// Parses a 24-hex identifier, rejecting anything else as a 400.
pub fn parse_object_id(id: &str, entity: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid {} ID format", entity)))
}

pub async fn list_courses(store: &Store, query: &CourseListQuery) -> Result<CourseListResponse, AppError> {
    let filter = query.filter();
    let (page, limit) = query.pagination();
    let skip = (page - 1).saturating_mul(limit);

    let courses = store.courses.list(&filter, skip, limit as i64).await?;
    let total = store.courses.count(&filter).await?;

    Ok(CourseListResponse {
        success: true,
        courses: courses.into_iter().map(CourseResponse::from).collect(),
        total,
        page,
        pages: page_count(total, limit),
    })
}

pub async fn get_course(store: &Store, course_id: &str) -> Result<Course, AppError> {
    let object_id = parse_object_id(course_id, "course")?;

    store
        .courses
        .find_by_id(object_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

pub async fn create_course(store: &Store, user: &Identity, request: CreateCourseRequest) -> Result<Course, AppError> {
    request.validate()?;

    let now = chrono::Utc::now().timestamp_millis();
    let course = Course {
        id: None,
        title: request.title.trim().to_string(),
        description: request.description,
        category: request.category,
        image: request.image,
        duration: request.duration,
        price: request.price,
        level: request.level,
        is_featured: request.is_featured,
        instructor: Instructor {
            name: user.display_name.clone(),
            email: user.email.clone(),
            photo: user.photo_url.clone(),
        },
        owner: user.uid.clone(),
        students: 0,
        rating: 0.0,
        lessons: 0,
        created_at: now,
        updated_at: now,
    };

    store.courses.insert(course).await
}

/// Owner-only update; last write wins.
pub async fn update_course(
    store: &Store,
    user: &Identity,
    course_id: &str,
    request: UpdateCourseRequest,
) -> Result<Course, AppError> {
    let object_id = parse_object_id(course_id, "course")?;

    let existing = store
        .courses
        .find_by_id(object_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))?;

    if existing.owner != user.uid {
        return Err(AppError::Forbidden("Not authorized to update this course".into()));
    }

    request.validate()?;

    let now = chrono::Utc::now().timestamp_millis();
    store
        .courses
        .update(object_id, &user.uid, &request, now)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}
