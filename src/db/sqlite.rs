use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    QueryBuilder, Sqlite, SqlitePool,
};

use super::MusicStore;
use crate::{
    error::AppResult,
    models::{
        NewSong, PlaylistDetail, PlaylistEntry, PlaylistSummary, RatedSong, Song, SongFilter,
        SongTitle, User,
    },
};

const SONG_COLUMNS: &str = "id, title, artist, subgenre, year, tags, bpm";

/// Creates a SQLite connection pool
///
/// The database file is created when missing. In-memory databases live only
/// as long as their connection, so they get a single connection that is never
/// recycled.
pub async fn create_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Builds a LIKE pattern matching `fragment` anywhere, with wildcards escaped
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(sqlx::FromRow)]
struct PlaylistRow {
    id: i64,
    user_id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

/// `MusicStore` backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Adds songs to the catalog in one transaction, returning their ids
    pub async fn insert_songs(&self, songs: &[NewSong]) -> AppResult<Vec<i64>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(songs.len());

        for song in songs {
            let result = sqlx::query(
                "INSERT INTO songs (title, artist, subgenre, year, tags, bpm) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&song.title)
            .bind(&song.artist)
            .bind(&song.subgenre)
            .bind(song.year)
            .bind(&song.tags)
            .bind(song.bpm)
            .execute(&mut *tx)
            .await?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit().await?;
        Ok(ids)
    }

    pub async fn song_count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl MusicStore for SqliteStore {
    async fn get_or_create_user(&self, name: &str) -> AppResult<User> {
        sqlx::query("INSERT INTO users (name, created_at) VALUES (?, ?) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let user = sqlx::query_as::<_, User>("SELECT id, name, created_at FROM users WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn all_songs(&self) -> AppResult<Vec<Song>> {
        let songs = sqlx::query_as::<_, Song>(&format!("SELECT {SONG_COLUMNS} FROM songs ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(songs)
    }

    async fn search_songs(&self, filter: &SongFilter) -> AppResult<Vec<Song>> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {SONG_COLUMNS} FROM songs WHERE 1 = 1"));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(search);
            query
                .push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR artist LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if let Some(genre) = filter.genre.as_deref().filter(|g| !g.is_empty()) {
            query.push(" AND subgenre = ").push_bind(genre.to_string());
        }

        query.push(" ORDER BY id");

        let songs = query.build_query_as::<Song>().fetch_all(&self.pool).await?;
        Ok(songs)
    }

    async fn song_titles(&self) -> AppResult<Vec<SongTitle>> {
        let titles = sqlx::query_as::<_, SongTitle>(
            "SELECT id, title, artist FROM songs ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(titles)
    }

    async fn get_song(&self, song_id: i64) -> AppResult<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(&format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?"))
            .bind(song_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(song)
    }

    async fn find_song_by_name_fragment(&self, fragment: &str) -> AppResult<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs WHERE title LIKE ? ESCAPE '\\' ORDER BY id LIMIT 1"
        ))
        .bind(contains_pattern(fragment))
        .fetch_optional(&self.pool)
        .await?;
        Ok(song)
    }

    async fn user_feedback(&self, user_id: i64) -> AppResult<Vec<RatedSong>> {
        let rated = sqlx::query_as::<_, RatedSong>(
            r#"
            SELECT f.liked, s.id, s.title, s.artist, s.subgenre, s.year, s.tags, s.bpm
            FROM user_song_feedback f
            JOIN songs s ON s.id = f.song_id
            WHERE f.user_id = ?
            ORDER BY f.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rated)
    }

    async fn upsert_feedback(&self, user_id: i64, song_id: i64, liked: bool) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_song_feedback (user_id, song_id, liked, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, song_id) DO UPDATE SET liked = excluded.liked
            "#,
        )
        .bind(user_id)
        .bind(song_id)
        .bind(liked)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_playlist(&self, user_id: i64, name: &str, song_ids: &[i64]) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        let playlist_id =
            sqlx::query("INSERT INTO playlists (user_id, name, created_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(name)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();

        for (index, song_id) in song_ids.iter().enumerate() {
            sqlx::query("INSERT INTO playlist_songs (playlist_id, song_id, position) VALUES (?, ?, ?)")
                .bind(playlist_id)
                .bind(*song_id)
                .bind(index as i64 + 1)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(playlist_id)
    }

    async fn user_playlists(&self, user_id: i64) -> AppResult<Vec<PlaylistSummary>> {
        let playlists = sqlx::query_as::<_, PlaylistSummary>(
            r#"
            SELECT p.id, p.user_id, p.name, p.created_at, COUNT(ps.id) AS song_count
            FROM playlists p
            LEFT JOIN playlist_songs ps ON ps.playlist_id = p.id
            WHERE p.user_id = ?
            GROUP BY p.id
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(playlists)
    }

    async fn playlist_detail(&self, playlist_id: i64) -> AppResult<Option<PlaylistDetail>> {
        let Some(playlist) = sqlx::query_as::<_, PlaylistRow>(
            "SELECT id, user_id, name, created_at FROM playlists WHERE id = ?",
        )
        .bind(playlist_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let songs = sqlx::query_as::<_, PlaylistEntry>(
            r#"
            SELECT ps.position, s.id, s.title, s.artist, s.subgenre, s.year, s.tags, s.bpm
            FROM playlist_songs ps
            JOIN songs s ON s.id = ps.song_id
            WHERE ps.playlist_id = ?
            ORDER BY ps.position
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PlaylistDetail {
            id: playlist.id,
            user_id: playlist.user_id,
            name: playlist.name,
            created_at: playlist.created_at,
            songs,
        }))
    }

    async fn delete_playlist(&self, playlist_id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ?")
            .bind(playlist_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(playlist_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
