use axum::{extract::State, Extension, Json};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::Song,
    routes::{AppJson, AppState},
    services::quiz,
};

pub const DEFAULT_QUIZ_SIZE: i64 = 10;
pub const MAX_QUIZ_SIZE: i64 = 50;

fn default_quiz_size() -> i64 {
    DEFAULT_QUIZ_SIZE
}

#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub user_id: Option<i64>,
    #[serde(default = "default_quiz_size")]
    pub n: i64,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub user_id: Option<i64>,
    pub song_id: Option<i64>,
    pub liked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub status: &'static str,
}

/// Handler returning a round of songs to rate
pub async fn start(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<StartQuizRequest>,
) -> AppResult<Json<Vec<Song>>> {
    let user_id = request
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    if !(1..=MAX_QUIZ_SIZE).contains(&request.n) {
        return Err(AppError::Validation(format!(
            "n must be between 1 and {}",
            MAX_QUIZ_SIZE
        )));
    }

    tracing::debug!(request_id = %request_id, user_id, n = request.n, "Starting quiz");

    let mut rng = StdRng::from_entropy();
    let songs = quiz::start_quiz(state.store.as_ref(), user_id, request.n as usize, &mut rng).await?;
    Ok(Json(songs))
}

/// Handler recording a single like or dislike
pub async fn answer(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<AnswerRequest>,
) -> AppResult<Json<AnswerResponse>> {
    let (Some(user_id), Some(song_id), Some(liked)) = (request.user_id, request.song_id, request.liked)
    else {
        return Err(AppError::Validation(
            "user_id, song_id, and liked are required".to_string(),
        ));
    };

    quiz::record_feedback(state.store.as_ref(), user_id, song_id, liked).await?;
    Ok(Json(AnswerResponse { status: "success" }))
}
