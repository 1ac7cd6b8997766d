use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Separator used when tags are persisted as a single string
pub const TAG_SEPARATOR: char = ';';

/// A song in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub subgenre: String,
    pub year: i32,
    /// `;`-delimited labels, e.g. "vocal;piano;classic"
    pub tags: String,
    pub bpm: Option<i32>,
}

impl Song {
    /// Returns the song's tags as a set
    ///
    /// Blank entries are dropped, so an empty tag string yields an empty set.
    pub fn tag_set(&self) -> HashSet<&str> {
        parse_tags(&self.tags)
    }
}

/// Splits a delimited tag string into a set of trimmed, non-empty labels
pub fn parse_tags(tags: &str) -> HashSet<&str> {
    tags.split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Song fields supplied when adding to the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub subgenre: String,
    pub year: i32,
    #[serde(default)]
    pub tags: String,
    pub bpm: Option<i32>,
}

/// Compact listing used by song pickers
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SongTitle {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

/// Filters for browsing the catalog
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    /// Case-insensitive substring of title or artist
    pub search: Option<String>,
    /// Exact subgenre
    pub genre: Option<String>,
}

/// A song resolved from a user's quiz answer
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RatedSong {
    pub liked: bool,
    #[sqlx(flatten)]
    pub song: Song,
}

/// Splits a rating history into (liked, disliked) songs
pub fn split_by_feedback(rated: Vec<RatedSong>) -> (Vec<Song>, Vec<Song>) {
    let (liked, disliked): (Vec<_>, Vec<_>) = rated.into_iter().partition(|r| r.liked);
    (
        liked.into_iter().map(|r| r.song).collect(),
        disliked.into_iter().map(|r| r.song).collect(),
    )
}
