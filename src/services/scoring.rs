use std::collections::HashSet;

use rand::Rng;

use crate::{config::ScoringConfig, models::Song};

/// Exclusive upper bound of the tie-breaking jitter added to every score
pub const JITTER_MAX: f64 = 0.1;

/// A user's rating history prepared for scoring many candidates
///
/// Tag sets and the liked songs' mean BPM and year are computed once here
/// instead of once per candidate.
pub struct TasteProfile<'a> {
    liked: &'a [Song],
    disliked: &'a [Song],
    liked_tags: Vec<HashSet<&'a str>>,
    mean_bpm: Option<f64>,
    mean_year: Option<f64>,
}

impl<'a> TasteProfile<'a> {
    pub fn new(liked: &'a [Song], disliked: &'a [Song]) -> Self {
        let liked_tags = liked.iter().map(Song::tag_set).collect();

        let bpms: Vec<f64> = liked.iter().filter_map(|s| s.bpm).map(f64::from).collect();
        let years: Vec<f64> = liked.iter().map(|s| f64::from(s.year)).collect();

        Self {
            liked,
            disliked,
            liked_tags,
            mean_bpm: mean(&bpms),
            mean_year: mean(&years),
        }
    }

    /// True when the user has not rated anything
    pub fn is_empty(&self) -> bool {
        self.liked.is_empty() && self.disliked.is_empty()
    }

    /// Affinity of `candidate` without the random jitter
    pub fn base_score(&self, candidate: &Song, seed: Option<&Song>, config: &ScoringConfig) -> f64 {
        let mut score = 0.0;

        for liked in self.liked {
            if liked.artist == candidate.artist {
                score += config.artist_weight;
            }
            if liked.subgenre == candidate.subgenre {
                score += config.subgenre_weight;
            }
        }

        for disliked in self.disliked {
            if disliked.artist == candidate.artist {
                score -= config.artist_weight;
            }
            if disliked.subgenre == candidate.subgenre {
                score -= config.subgenre_weight;
            }
        }

        let candidate_tags = candidate.tag_set();
        let shared_tags: usize = self
            .liked_tags
            .iter()
            .map(|tags| tags.intersection(&candidate_tags).count())
            .sum();
        score += shared_tags as f64 * config.tag_weight;

        if let (Some(bpm), Some(mean_bpm)) = (candidate.bpm, self.mean_bpm) {
            if within(f64::from(bpm), mean_bpm, config.bpm_tolerance) {
                score += config.bpm_weight;
            }
        }

        if let Some(mean_year) = self.mean_year {
            if within(f64::from(candidate.year), mean_year, config.year_tolerance) {
                score += config.era_weight;
            }
        }

        if let Some(seed) = seed {
            score += seed_similarity(candidate, &candidate_tags, seed, config);
        }

        score
    }

    /// Affinity of `candidate` plus jitter in `[0, JITTER_MAX)`
    pub fn score<R: Rng + ?Sized>(
        &self,
        candidate: &Song,
        seed: Option<&Song>,
        config: &ScoringConfig,
        rng: &mut R,
    ) -> f64 {
        self.base_score(candidate, seed, config) + jitter(rng)
    }
}

/// Scores one candidate against the user's liked and disliked songs
pub fn score_song<R: Rng + ?Sized>(
    candidate: &Song,
    liked: &[Song],
    disliked: &[Song],
    seed: Option<&Song>,
    config: &ScoringConfig,
    rng: &mut R,
) -> f64 {
    TasteProfile::new(liked, disliked).score(candidate, seed, config, rng)
}

/// Uniform random value in `[0, JITTER_MAX)`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..JITTER_MAX)
}

fn seed_similarity(
    candidate: &Song,
    candidate_tags: &HashSet<&str>,
    seed: &Song,
    config: &ScoringConfig,
) -> f64 {
    let mut score = 0.0;

    if candidate.artist == seed.artist {
        score += config.seed_artist_weight;
    }
    if candidate.subgenre == seed.subgenre {
        score += config.seed_subgenre_weight;
    }

    let shared_tags = seed.tag_set().intersection(candidate_tags).count();
    score += shared_tags as f64 * config.seed_tag_weight;

    if let (Some(bpm), Some(seed_bpm)) = (candidate.bpm, seed.bpm) {
        if within(f64::from(bpm), f64::from(seed_bpm), config.bpm_tolerance) {
            score += config.seed_bpm_weight;
        }
    }

    score
}

fn within(value: f64, target: f64, tolerance: i32) -> bool {
    (value - target).abs() <= f64::from(tolerance)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
