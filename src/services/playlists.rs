use rand::Rng;

use crate::{
    config::ScoringConfig,
    db::MusicStore,
    error::{AppError, AppResult},
    models::{split_by_feedback, PlaylistDetail, PlaylistSummary, Song},
};

use super::{
    recommendations::{PlaylistRequest, Recommender},
    users::require_user,
};

/// Parameters of a playlist generation request
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub count: usize,
    pub genre: Option<String>,
    /// Seed song by id; takes precedence over `seed_song_name`
    pub seed_song_id: Option<i64>,
    /// Seed song by case-insensitive title fragment
    pub seed_song_name: Option<String>,
}

/// Generates a playlist preview from the user's rating history
pub async fn generate_for_user<R: Rng + Send + ?Sized>(
    store: &dyn MusicStore,
    config: &ScoringConfig,
    user_id: i64,
    options: &GenerateOptions,
    rng: &mut R,
) -> AppResult<Vec<Song>> {
    require_user(store, user_id).await?;
    let seed = resolve_seed(store, options).await?;

    let songs = store.all_songs().await?;
    let (liked, disliked) = split_by_feedback(store.user_feedback(user_id).await?);

    let genre = options.genre.as_deref().map(str::trim).filter(|g| !g.is_empty());
    let request = PlaylistRequest {
        count: options.count,
        genre,
        seed: seed.as_ref(),
    };

    let playlist = Recommender::new(&songs, config).generate(&liked, &disliked, &request, rng);

    tracing::info!(
        user_id,
        liked = liked.len(),
        disliked = disliked.len(),
        genre = ?genre,
        seed_song_id = seed.as_ref().map(|s| s.id),
        returned = playlist.len(),
        "Playlist generated"
    );

    Ok(playlist)
}

async fn resolve_seed(store: &dyn MusicStore, options: &GenerateOptions) -> AppResult<Option<Song>> {
    if let Some(song_id) = options.seed_song_id {
        return store
            .get_song(song_id)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::NotFound("Seed song not found".to_string()));
    }

    match options.seed_song_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => store
            .find_song_by_name_fragment(name)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::NotFound(format!("No song found matching '{}'", name))),
        _ => Ok(None),
    }
}

/// Saves a playlist after checking the owner and every song exist
pub async fn create_playlist(
    store: &dyn MusicStore,
    user_id: i64,
    name: &str,
    song_ids: &[i64],
) -> AppResult<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if song_ids.is_empty() {
        return Err(AppError::Validation("song_ids must not be empty".to_string()));
    }

    require_user(store, user_id).await?;

    for &song_id in song_ids {
        if store.get_song(song_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Song {} not found", song_id)));
        }
    }

    let playlist_id = store.create_playlist(user_id, name, song_ids).await?;
    tracing::info!(user_id, playlist_id, songs = song_ids.len(), "Playlist saved");

    Ok(playlist_id)
}

pub async fn user_playlists(store: &dyn MusicStore, user_id: i64) -> AppResult<Vec<PlaylistSummary>> {
    require_user(store, user_id).await?;
    store.user_playlists(user_id).await
}

pub async fn playlist_detail(store: &dyn MusicStore, playlist_id: i64) -> AppResult<PlaylistDetail> {
    store
        .playlist_detail(playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))
}

pub async fn delete_playlist(store: &dyn MusicStore, playlist_id: i64) -> AppResult<()> {
    if !store.delete_playlist(playlist_id).await? {
        return Err(AppError::NotFound("Playlist not found".to_string()));
    }

    tracing::info!(playlist_id, "Playlist deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockMusicStore;
    use crate::models::{RatedSong, User};
    use chrono::Utc;
    use mockall::predicate::eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn song(id: i64, artist: &str) -> Song {
        Song {
            id,
            title: format!("Track {}", id),
            artist: artist.to_string(),
            subgenre: "house".to_string(),
            year: 1990,
            tags: String::new(),
            bpm: None,
        }
    }

    fn catalog() -> Vec<Song> {
        (1..=10).map(|id| song(id, &format!("Artist {}", id))).collect()
    }

    fn store_with_user() -> MockMusicStore {
        let mut store = MockMusicStore::new();
        store.expect_get_user().returning(|id| {
            Ok(Some(User {
                id,
                name: "Listener".to_string(),
                created_at: Utc::now(),
            }))
        });
        store
    }

    #[tokio::test]
    async fn test_generate_unknown_user() {
        let mut store = MockMusicStore::new();
        store.expect_get_user().returning(|_| Ok(None));
        store.expect_all_songs().never();

        let options = GenerateOptions { count: 5, ..Default::default() };
        let result = generate_for_user(
            &store,
            &ScoringConfig::default(),
            1,
            &options,
            &mut StdRng::seed_from_u64(1),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_generate_unknown_seed_name() {
        let mut store = store_with_user();
        store
            .expect_find_song_by_name_fragment()
            .times(1)
            .returning(|_| Ok(None));
        store.expect_all_songs().never();

        let options = GenerateOptions {
            count: 5,
            seed_song_name: Some("nonexistent".to_string()),
            ..Default::default()
        };
        let result = generate_for_user(
            &store,
            &ScoringConfig::default(),
            1,
            &options,
            &mut StdRng::seed_from_u64(2),
        )
        .await;

        match result {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("nonexistent")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_unknown_seed_id() {
        let mut store = store_with_user();
        store.expect_get_song().with(eq(77i64)).returning(|_| Ok(None));

        let options = GenerateOptions {
            count: 5,
            seed_song_id: Some(77),
            ..Default::default()
        };
        let result = generate_for_user(
            &store,
            &ScoringConfig::default(),
            1,
            &options,
            &mut StdRng::seed_from_u64(3),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_generate_cold_start() {
        let mut store = store_with_user();
        store.expect_all_songs().returning(|| Ok(catalog()));
        store.expect_user_feedback().returning(|_| Ok(vec![]));

        let options = GenerateOptions { count: 5, ..Default::default() };
        let playlist = tokio_test::assert_ok!(
            generate_for_user(
                &store,
                &ScoringConfig::default(),
                1,
                &options,
                &mut StdRng::seed_from_u64(4),
            )
            .await
        );
        assert_eq!(playlist.len(), 5);
    }

    #[tokio::test]
    async fn test_generate_uses_feedback() {
        let mut store = store_with_user();
        store.expect_all_songs().returning(|| {
            let mut songs = catalog();
            songs[8].artist = "A".to_string();
            songs[9].artist = "A".to_string();
            Ok(songs)
        });
        store.expect_user_feedback().returning(|_| {
            Ok(vec![
                RatedSong { liked: true, song: song(100, "A") },
                RatedSong { liked: false, song: song(3, "Artist 3") },
            ])
        });

        let options = GenerateOptions {
            count: 4,
            genre: Some("   ".to_string()),
            ..Default::default()
        };
        let playlist = generate_for_user(
            &store,
            &ScoringConfig::default(),
            1,
            &options,
            &mut StdRng::seed_from_u64(5),
        )
        .await
        .unwrap();

        assert_eq!(playlist.len(), 4);
        let mut top_two: Vec<i64> = playlist[..2].iter().map(|s| s.id).collect();
        top_two.sort();
        assert_eq!(top_two, vec![9, 10]);
        assert!(playlist.iter().all(|s| s.id != 3));
    }

    #[tokio::test]
    async fn test_create_playlist_validation() {
        let store = MockMusicStore::new();

        let empty_name = create_playlist(&store, 1, "  ", &[1, 2]).await;
        assert!(matches!(empty_name, Err(AppError::Validation(_))));

        let no_songs = create_playlist(&store, 1, "Mix", &[]).await;
        assert!(matches!(no_songs, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_playlist_unknown_song() {
        let mut store = store_with_user();
        store
            .expect_get_song()
            .returning(|id| Ok((id != 4).then(|| song(id, "X"))));
        store.expect_create_playlist().never();

        let result = create_playlist(&store, 1, "Mix", &[1, 4, 2]).await;
        match result {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Song 4 not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_playlist_saves_trimmed_name() {
        let mut store = store_with_user();
        store.expect_get_song().returning(|id| Ok(Some(song(id, "X"))));
        store
            .expect_create_playlist()
            .times(1)
            .returning(|user_id, name, song_ids| {
                assert_eq!(user_id, 1);
                assert_eq!(name, "Friday");
                assert_eq!(song_ids.to_vec(), vec![3, 1]);
                Ok(12)
            });

        let playlist_id = tokio_test::assert_ok!(create_playlist(&store, 1, " Friday ", &[3, 1]).await);
        assert_eq!(playlist_id, 12);
    }

    #[tokio::test]
    async fn test_delete_missing_playlist() {
        let mut store = MockMusicStore::new();
        store.expect_delete_playlist().returning(|_| Ok(false));

        let result = delete_playlist(&store, 5).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
