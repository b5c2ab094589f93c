use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Instructor,
}

/// User record (stored in MongoDB `users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// External identity, as issued by the token gate
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: i64,
    #[serde(with = "crate::models::timestamp")]
    pub updated_at: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            role: user.role,
            created_at: timestamp::to_iso(user.created_at),
            updated_at: timestamp::to_iso(user.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_student() {
        assert_eq!(UserRole::default(), UserRole::Student);

        let stored = mongodb::bson::doc! {
            "uid": "u1",
            "email": "a@b.c",
            "displayName": "A",
            "createdAt": mongodb::bson::DateTime::from_millis(0),
            "updatedAt": mongodb::bson::DateTime::from_millis(0),
        };
        let user: User = mongodb::bson::from_document(stored).unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.photo_url, "");
        assert_eq!(UserResponse::from(user).created_at, "1970-01-01T00:00:00.000Z");
    }
}
