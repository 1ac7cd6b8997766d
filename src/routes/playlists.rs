use axum::{extract::State, http::StatusCode, Extension, Json};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{PlaylistDetail, PlaylistSummary, Song},
    routes::{AppJson, AppPath, AppQuery, AppState},
    services::playlists::{self, GenerateOptions},
};

pub const DEFAULT_PLAYLIST_SIZE: i64 = 20;
pub const MAX_PLAYLIST_SIZE: i64 = 100;

fn default_playlist_size() -> i64 {
    DEFAULT_PLAYLIST_SIZE
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_id: Option<i64>,
    #[serde(default = "default_playlist_size")]
    pub count: i64,
    pub genre: Option<String>,
    pub seed_song_id: Option<i64>,
    pub seed_song_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub song_ids: Option<Vec<i64>>,
}

#[derive(Debug, Serialize)]
pub struct CreatePlaylistResponse {
    pub playlist_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<i64>,
}

/// Handler previewing a playlist built from the user's ratings
///
/// Only requests that pass validation are counted in the generation metric.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<GenerateRequest>,
) -> AppResult<Json<Vec<Song>>> {
    let user_id = request
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    if !(1..=MAX_PLAYLIST_SIZE).contains(&request.count) {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {}",
            MAX_PLAYLIST_SIZE
        )));
    }

    tracing::info!(
        request_id = %request_id,
        user_id,
        count = request.count,
        "Processing playlist generation request"
    );

    let options = GenerateOptions {
        count: request.count as usize,
        genre: request.genre,
        seed_song_id: request.seed_song_id,
        seed_song_name: request.seed_song_name,
    };

    let mut rng = StdRng::from_entropy();
    let result = playlists::generate_for_user(
        state.store.as_ref(),
        &state.scoring,
        user_id,
        &options,
        &mut rng,
    )
    .await;

    let genre = options.genre.as_deref().map(str::trim).filter(|g| !g.is_empty());
    state.metrics.record_playlist_generation(result.is_ok(), genre);

    result.map(Json)
}

/// Handler saving a named playlist
pub async fn create(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CreatePlaylistRequest>,
) -> AppResult<(StatusCode, Json<CreatePlaylistResponse>)> {
    let (Some(user_id), Some(name), Some(song_ids)) = (request.user_id, request.name, request.song_ids)
    else {
        return Err(AppError::Validation(
            "user_id, name, and song_ids are required".to_string(),
        ));
    };

    let playlist_id = playlists::create_playlist(state.store.as_ref(), user_id, &name, &song_ids).await?;
    Ok((StatusCode::CREATED, Json(CreatePlaylistResponse { playlist_id })))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<PlaylistSummary>>> {
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;

    let summaries = playlists::user_playlists(state.store.as_ref(), user_id).await?;
    Ok(Json(summaries))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    AppPath(playlist_id): AppPath<i64>,
) -> AppResult<Json<PlaylistDetail>> {
    let detail = playlists::playlist_detail(state.store.as_ref(), playlist_id).await?;
    Ok(Json(detail))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    AppPath(playlist_id): AppPath<i64>,
) -> AppResult<StatusCode> {
    playlists::delete_playlist(state.store.as_ref(), playlist_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
