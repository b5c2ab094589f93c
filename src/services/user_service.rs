use crate::database::Store;
use crate::models::{User, UserRole};
use crate::services::auth_service::Identity;
use crate::utils::AppError;

/// Returns the stored user for this identity, creating it as a student on first use.
pub async fn get_or_create(store: &Store, identity: &Identity) -> Result<User, AppError> {
    if let Some(user) = store.users.find_by_uid(&identity.uid).await? {
        return Ok(user);
    }

    let now = chrono::Utc::now().timestamp_millis();
    let user = store
        .users
        .insert(User {
            id: None,
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
            role: UserRole::Student,
            created_at: now,
            updated_at: now,
        })
        .await?;

    log::info!("👤 Created user {}", user.uid);
    Ok(user)
}
