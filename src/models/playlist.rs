use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Song;

/// A saved playlist with the number of songs it holds
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PlaylistSummary {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub song_count: i64,
}

/// One slot of a saved playlist; positions start at 1
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PlaylistEntry {
    pub position: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub song: Song,
}

/// A saved playlist with its songs in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistDetail {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub songs: Vec<PlaylistEntry>,
}
