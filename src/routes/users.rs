use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::User,
    routes::{AppJson, AppPath, AppState},
    services::users,
};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
}

/// Signs a user in by name, creating the account on first use
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CreateUserRequest>,
) -> AppResult<Json<User>> {
    let name = request
        .name
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

    let user = users::get_or_create_user(state.store.as_ref(), &name).await?;
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<User>> {
    let user = users::require_user(state.store.as_ref(), user_id).await?;
    Ok(Json(user))
}
