//! Persistence abstraction for songs, users, feedback and playlists.
//!
//! Services talk to the catalog exclusively through this trait so the SQLite
//! implementation can be swapped for mocks in tests.
use crate::{
    error::AppResult,
    models::{PlaylistDetail, PlaylistSummary, RatedSong, Song, SongFilter, SongTitle, User},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MusicStore: Send + Sync {
    /// Returns the user with this name, creating it when missing
    async fn get_or_create_user(&self, name: &str) -> AppResult<User>;

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Every song in the catalog, ordered by id
    async fn all_songs(&self) -> AppResult<Vec<Song>>;

    /// Songs matching the filter, ordered by id
    async fn search_songs(&self, filter: &SongFilter) -> AppResult<Vec<Song>>;

    /// Id, title and artist of every song, ordered by title
    async fn song_titles(&self) -> AppResult<Vec<SongTitle>>;

    async fn get_song(&self, song_id: i64) -> AppResult<Option<Song>>;

    /// First song (by id) whose title contains the fragment, ignoring case
    async fn find_song_by_name_fragment(&self, fragment: &str) -> AppResult<Option<Song>>;

    /// The user's quiz answers, each resolved to its song
    async fn user_feedback(&self, user_id: i64) -> AppResult<Vec<RatedSong>>;

    /// Inserts the rating or overwrites the existing one for this (user, song)
    async fn upsert_feedback(&self, user_id: i64, song_id: i64, liked: bool) -> AppResult<()>;

    /// Saves a playlist with songs at positions 1..=N in the given order
    async fn create_playlist(&self, user_id: i64, name: &str, song_ids: &[i64]) -> AppResult<i64>;

    /// The user's playlists, newest first
    async fn user_playlists(&self, user_id: i64) -> AppResult<Vec<PlaylistSummary>>;

    async fn playlist_detail(&self, playlist_id: i64) -> AppResult<Option<PlaylistDetail>>;

    /// Removes the playlist and its entries; false when it did not exist
    async fn delete_playlist(&self, playlist_id: i64) -> AppResult<bool>;

    /// Cheap round trip used by the health check
    async fn ping(&self) -> AppResult<()>;
}
