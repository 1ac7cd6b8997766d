use crate::{
    db::MusicStore,
    error::{AppError, AppResult},
    models::{normalize_name, User, MAX_NAME_LEN},
};

/// Returns the user with this name, registering it on first use
pub async fn get_or_create_user(store: &dyn MusicStore, name: &str) -> AppResult<User> {
    let name = normalize_name(name).ok_or_else(|| {
        AppError::Validation(format!("name must be 1 to {} characters", MAX_NAME_LEN))
    })?;

    let user = store.get_or_create_user(name).await?;
    tracing::info!(user_id = user.id, "User signed in");
    Ok(user)
}

/// Loads a user or fails with `NotFound`
pub async fn require_user(store: &dyn MusicStore, user_id: i64) -> AppResult<User> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
