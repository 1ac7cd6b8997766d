use serde::Serialize;

use crate::{
    db::MusicStore,
    error::{AppError, AppResult},
    models::{Song, SongFilter, SongTitle},
};

/// Result of a catalog query, either full songs or just titles
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SongListing {
    Songs(Vec<Song>),
    Titles(Vec<SongTitle>),
}

/// Service function for catalog browsing
///
/// `titles_only` lists every song's id, title and artist ordered by title and
/// ignores the filter.
pub async fn search_songs(
    store: &dyn MusicStore,
    filter: &SongFilter,
    titles_only: bool,
) -> AppResult<SongListing> {
    if titles_only {
        return Ok(SongListing::Titles(store.song_titles().await?));
    }

    Ok(SongListing::Songs(store.search_songs(filter).await?))
}

pub async fn get_song(store: &dyn MusicStore, song_id: i64) -> AppResult<Song> {
    store
        .get_song(song_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Song not found".to_string()))
}
