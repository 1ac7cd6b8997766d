use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Song, SongFilter},
    routes::{AppPath, AppQuery, AppState},
    services::songs::{self, SongListing},
};

#[derive(Debug, Deserialize)]
pub struct SongQuery {
    search: Option<String>,
    genre: Option<String>,
    titles_only: Option<String>,
}

impl SongQuery {
    fn titles_only(&self) -> bool {
        self.titles_only
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }
}

/// Handler for catalog browsing
pub async fn list_songs(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SongQuery>,
) -> AppResult<Json<SongListing>> {
    let titles_only = params.titles_only();
    let filter = SongFilter {
        search: params.search.filter(|s| !s.trim().is_empty()),
        genre: params.genre.filter(|g| !g.trim().is_empty()),
    };

    let listing = songs::search_songs(state.store.as_ref(), &filter, titles_only).await?;
    Ok(Json(listing))
}

pub async fn get_song(
    State(state): State<Arc<AppState>>,
    AppPath(song_id): AppPath<i64>,
) -> AppResult<Json<Song>> {
    let song = songs::get_song(state.store.as_ref(), song_id).await?;
    Ok(Json(song))
}
