use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};

use crate::{config::ScoringConfig, models::Song};

use super::scoring::TasteProfile;

/// A candidate song with its score for one recommendation call
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub song: &'a Song,
    pub score: f64,
}

/// What the caller asks the engine for
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaylistRequest<'a> {
    /// Maximum number of songs to return
    pub count: usize,
    /// Preferred subgenre
    pub genre: Option<&'a str>,
    /// Extra similarity anchor, independent of the rating history
    pub seed: Option<&'a Song>,
}

/// Playlist recommendation engine over an in-memory song catalog
pub struct Recommender<'a> {
    songs: &'a [Song],
    config: &'a ScoringConfig,
}

impl<'a> Recommender<'a> {
    /// Creates a recommender choosing among `songs`
    pub fn new(songs: &'a [Song], config: &'a ScoringConfig) -> Self {
        Self { songs, config }
    }

    /// Builds a playlist of at most `request.count` distinct songs
    ///
    /// Without any rating history the playlist is a random sample, biased to
    /// the requested genre. Otherwise every song the user did not dislike is
    /// scored against the taste profile and the best ones are returned in
    /// descending score order. Never fails: scarce data yields a shorter list.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        liked: &[Song],
        disliked: &[Song],
        request: &PlaylistRequest<'_>,
        rng: &mut R,
    ) -> Vec<Song> {
        let profile = TasteProfile::new(liked, disliked);

        if profile.is_empty() {
            tracing::debug!(count = request.count, genre = ?request.genre, "Cold start playlist");
            return self.cold_start(request.count, request.genre, rng);
        }

        let ranked = self.rank_candidates(&profile, disliked, request, rng);
        tracing::debug!(
            candidates = ranked.len(),
            count = request.count,
            genre = ?request.genre,
            "Ranked playlist candidates"
        );

        ranked
            .into_iter()
            .take(request.count)
            .map(|candidate| candidate.song.clone())
            .collect()
    }

    /// Scores every eligible song and sorts by descending score
    ///
    /// Disliked songs are excluded. Songs of the requested genre are scored
    /// first and receive the genre bonus; every other remaining song is still
    /// scored so a sparse genre never shrinks the pool.
    pub fn rank_candidates<R: Rng + ?Sized>(
        &self,
        profile: &TasteProfile<'_>,
        disliked: &[Song],
        request: &PlaylistRequest<'_>,
        rng: &mut R,
    ) -> Vec<ScoredCandidate<'a>> {
        let disliked_ids: HashSet<i64> = disliked.iter().map(|s| s.id).collect();
        let mut scored_ids: HashSet<i64> = HashSet::new();
        let mut scored = Vec::with_capacity(self.songs.len());

        if let Some(genre) = request.genre {
            for song in self.songs.iter().filter(|s| s.subgenre == genre) {
                if disliked_ids.contains(&song.id) || !scored_ids.insert(song.id) {
                    continue;
                }
                let score = profile.score(song, request.seed, self.config, rng) + self.config.genre_bonus;
                scored.push(ScoredCandidate { song, score });
            }
        }

        for song in self.songs {
            if disliked_ids.contains(&song.id) || !scored_ids.insert(song.id) {
                continue;
            }
            let score = profile.score(song, request.seed, self.config, rng);
            scored.push(ScoredCandidate { song, score });
        }

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    /// Random playlist for users without feedback
    fn cold_start<R: Rng + ?Sized>(&self, count: usize, genre: Option<&str>, rng: &mut R) -> Vec<Song> {
        let unique = self.unique_songs();

        let Some(genre) = genre else {
            return unique.choose_multiple(rng, count).map(|s| (*s).clone()).collect();
        };

        let (mut preferred, others): (Vec<&Song>, Vec<&Song>) =
            unique.into_iter().partition(|s| s.subgenre == genre);

        if preferred.len() >= count {
            return preferred.choose_multiple(rng, count).map(|s| (*s).clone()).collect();
        }

        preferred.shuffle(rng);
        let needed = count - preferred.len();

        preferred
            .into_iter()
            .chain(others.choose_multiple(rng, needed).copied())
            .cloned()
            .collect()
    }

    fn unique_songs(&self) -> Vec<&'a Song> {
        let mut seen = HashSet::new();
        self.songs.iter().filter(|s| seen.insert(s.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn song(id: i64, artist: &str, subgenre: &str) -> Song {
        Song {
            id,
            title: format!("Track {}", id),
            artist: artist.to_string(),
            subgenre: subgenre.to_string(),
            year: 1990,
            tags: String::new(),
            bpm: None,
        }
    }

    /// Ten songs by distinct artists, ids 1..=10
    fn catalog() -> Vec<Song> {
        (1..=10)
            .map(|id| song(id, &format!("Artist {}", id), "house"))
            .collect()
    }

    fn ids(songs: &[Song]) -> Vec<i64> {
        songs.iter().map(|s| s.id).collect()
    }

    fn assert_distinct(songs: &[Song]) {
        let unique: HashSet<i64> = songs.iter().map(|s| s.id).collect();
        assert_eq!(unique.len(), songs.len(), "playlist contains duplicates");
    }

    #[test]
    fn test_cold_start_samples_requested_count() {
        let songs = catalog();
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let mut rng = StdRng::seed_from_u64(1);

        let request = PlaylistRequest { count: 5, ..Default::default() };
        let playlist = recommender.generate(&[], &[], &request, &mut rng);

        assert_eq!(playlist.len(), 5);
        assert_distinct(&playlist);
    }

    #[test]
    fn test_cold_start_returns_all_when_catalog_is_small() {
        let songs = catalog();
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let mut rng = StdRng::seed_from_u64(2);

        let request = PlaylistRequest { count: 25, ..Default::default() };
        let playlist = recommender.generate(&[], &[], &request, &mut rng);

        assert_eq!(playlist.len(), 10);
        assert_distinct(&playlist);
    }

    #[test]
    fn test_cold_start_prefers_genre_then_fills() {
        let mut songs = catalog();
        for song in songs.iter_mut().take(3) {
            song.subgenre = "deep-house".to_string();
        }
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let mut rng = StdRng::seed_from_u64(3);

        let request = PlaylistRequest {
            count: 5,
            genre: Some("deep-house"),
            seed: None,
        };
        let playlist = recommender.generate(&[], &[], &request, &mut rng);

        assert_eq!(playlist.len(), 5);
        assert_distinct(&playlist);
        let playlist_ids = ids(&playlist);
        for id in 1..=3 {
            assert!(playlist_ids.contains(&id), "genre song {} missing", id);
        }
    }

    #[test]
    fn test_cold_start_with_abundant_genre_stays_in_genre() {
        let mut songs = catalog();
        for song in songs.iter_mut().take(6) {
            song.subgenre = "deep-house".to_string();
        }
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let mut rng = StdRng::seed_from_u64(4);

        let request = PlaylistRequest {
            count: 4,
            genre: Some("deep-house"),
            seed: None,
        };
        let playlist = recommender.generate(&[], &[], &request, &mut rng);

        assert_eq!(playlist.len(), 4);
        assert!(playlist.iter().all(|s| s.subgenre == "deep-house"));
    }

    #[test]
    fn test_warm_path_excludes_disliked() {
        let songs = catalog();
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let disliked = vec![songs[0].clone(), songs[4].clone()];
        let liked = vec![songs[1].clone()];

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let request = PlaylistRequest { count: 10, ..Default::default() };
            let playlist = recommender.generate(&liked, &disliked, &request, &mut rng);

            // Ten songs minus two disliked
            assert_eq!(playlist.len(), 8);
            assert_distinct(&playlist);
            assert!(!ids(&playlist).contains(&1));
            assert!(!ids(&playlist).contains(&5));
        }
    }

    #[test]
    fn test_warm_path_truncates_to_count() {
        let songs = catalog();
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let liked = vec![songs[2].clone()];
        let mut rng = StdRng::seed_from_u64(5);

        let request = PlaylistRequest { count: 3, ..Default::default() };
        let playlist = recommender.generate(&liked, &[], &request, &mut rng);
        assert_eq!(playlist.len(), 3);
    }

    #[test]
    fn test_liked_artist_ranks_first() {
        let mut songs: Vec<Song> = (1..=8)
            .map(|id| song(id, &format!("Other {}", id), &format!("genre-{}", id)))
            .collect();
        songs.push(song(9, "A", "genre-a"));
        songs.push(song(10, "A", "genre-b"));
        for (i, s) in songs.iter_mut().enumerate() {
            // Spread years so era proximity never applies
            s.year = 1900 + (i as i32) * 20;
        }

        let liked = vec![Song {
            id: 100,
            year: 1700,
            ..song(100, "A", "liked-genre")
        }];

        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let request = PlaylistRequest { count: 10, ..Default::default() };
            let playlist = recommender.generate(&liked, &[], &request, &mut rng);

            let mut top_two = ids(&playlist[..2]);
            top_two.sort();
            assert_eq!(top_two, vec![9, 10]);
        }
    }

    #[test]
    fn test_genre_bonus_separates_equal_songs() {
        let songs = vec![song(1, "Same", "deep-house"), song(2, "Same", "tech-house")];
        let disliked = vec![song(50, "Someone Else", "trance")];
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let profile = TasteProfile::new(&[], &disliked);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let request = PlaylistRequest {
                count: 2,
                genre: Some("deep-house"),
                seed: None,
            };
            let ranked = recommender.rank_candidates(&profile, &disliked, &request, &mut rng);

            assert_eq!(ranked.len(), 2);
            assert_eq!(ranked[0].song.id, 1);
            assert!(ranked[0].score - ranked[1].score >= config.genre_bonus - 0.1);
        }
    }

    #[test]
    fn test_sparse_genre_is_filled_with_other_songs() {
        let mut songs = catalog();
        songs[7].subgenre = "acid-house".to_string();
        let disliked = vec![songs[0].clone()];
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let mut rng = StdRng::seed_from_u64(6);

        let request = PlaylistRequest {
            count: 5,
            genre: Some("acid-house"),
            seed: None,
        };
        let playlist = recommender.generate(&[], &disliked, &request, &mut rng);

        assert_eq!(playlist.len(), 5);
        assert_eq!(playlist[0].id, 8);
        assert_distinct(&playlist);
    }

    #[test]
    fn test_seed_song_pulls_similar_songs_up() {
        let mut songs = catalog();
        songs[5].artist = "Seed Artist".to_string();
        let seed = song(99, "Seed Artist", "garage");
        let disliked = vec![song(98, "Nobody", "trance")];
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let mut rng = StdRng::seed_from_u64(8);

        let request = PlaylistRequest {
            count: 3,
            genre: None,
            seed: Some(&seed),
        };
        let playlist = recommender.generate(&[], &disliked, &request, &mut rng);

        assert_eq!(playlist[0].id, 6);
    }

    #[test]
    fn test_same_seed_same_playlist() {
        let songs = catalog();
        let config = ScoringConfig::default();
        let recommender = Recommender::new(&songs, &config);
        let liked = vec![songs[3].clone()];
        let request = PlaylistRequest { count: 6, ..Default::default() };

        let first = recommender.generate(&liked, &[], &request, &mut StdRng::seed_from_u64(9));
        let second = recommender.generate(&liked, &[], &request, &mut StdRng::seed_from_u64(9));
        assert_eq!(ids(&first), ids(&second));

        let cold_first = recommender.generate(&[], &[], &request, &mut StdRng::seed_from_u64(10));
        let cold_second = recommender.generate(&[], &[], &request, &mut StdRng::seed_from_u64(10));
        assert_eq!(ids(&cold_first), ids(&cold_second));
    }
}
