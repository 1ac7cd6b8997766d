use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};

use crate::{
    db::MusicStore,
    error::{AppError, AppResult},
    models::Song,
};

use super::users::require_user;

/// Picks `n` songs for a quiz round, preferring songs the user has not rated
///
/// Unrated songs are sampled first; when there are fewer than `n` of them the
/// round is topped up with a random sample of already rated songs.
pub fn select_quiz_songs<R: Rng + ?Sized>(
    songs: &[Song],
    rated_ids: &HashSet<i64>,
    n: usize,
    rng: &mut R,
) -> AppResult<Vec<Song>> {
    if songs.len() < n {
        return Err(AppError::InsufficientData(format!(
            "Not enough songs in database: requested {}, available {}",
            n,
            songs.len()
        )));
    }

    let (mut unrated, rated): (Vec<&Song>, Vec<&Song>) =
        songs.iter().partition(|s| !rated_ids.contains(&s.id));

    if unrated.len() >= n {
        return Ok(unrated.choose_multiple(rng, n).map(|s| (*s).clone()).collect());
    }

    unrated.shuffle(rng);
    let needed = n - unrated.len();

    Ok(unrated
        .into_iter()
        .chain(rated.choose_multiple(rng, needed).copied())
        .cloned()
        .collect())
}

/// Starts a quiz round for an existing user
pub async fn start_quiz<R: Rng + Send + ?Sized>(
    store: &dyn MusicStore,
    user_id: i64,
    n: usize,
    rng: &mut R,
) -> AppResult<Vec<Song>> {
    require_user(store, user_id).await?;

    let songs = store.all_songs().await?;
    let rated_ids: HashSet<i64> = store
        .user_feedback(user_id)
        .await?
        .into_iter()
        .map(|rated| rated.song.id)
        .collect();

    let selected = select_quiz_songs(&songs, &rated_ids, n, rng)?;
    tracing::info!(
        user_id,
        requested = n,
        previously_rated = rated_ids.len(),
        "Quiz round started"
    );

    Ok(selected)
}

/// Records a like or dislike, replacing any earlier answer for the same song
pub async fn record_feedback(
    store: &dyn MusicStore,
    user_id: i64,
    song_id: i64,
    liked: bool,
) -> AppResult<()> {
    require_user(store, user_id).await?;

    if store.get_song(song_id).await?.is_none() {
        return Err(AppError::NotFound("Song not found".to_string()));
    }

    store.upsert_feedback(user_id, song_id, liked).await?;
    tracing::debug!(user_id, song_id, liked, "Feedback recorded");

    Ok(())
}
