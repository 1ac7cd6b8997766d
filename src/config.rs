use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Version reported by the health and metrics endpoints
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// CSV file used to populate an empty song catalog
    #[serde(default = "default_seed_file")]
    pub seed_file: String,
}

fn default_database_url() -> String {
    "sqlite://playlister.db".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_seed_file() -> String {
    "seed/house_tracks.csv".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Weights and tolerances of the recommendation heuristic
///
/// Every field can be overridden through the environment variable of the
/// same name in upper case (`ARTIST_WEIGHT`, `GENRE_BONUS`, ...).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Per liked (or, negated, disliked) song by the same artist
    pub artist_weight: f64,
    /// Per liked (or, negated, disliked) song in the same subgenre
    pub subgenre_weight: f64,
    /// Per tag shared with a liked song
    pub tag_weight: f64,
    /// Candidate BPM close to the liked songs' mean BPM
    pub bpm_weight: f64,
    /// Candidate year close to the liked songs' mean year
    pub era_weight: f64,
    pub seed_artist_weight: f64,
    pub seed_subgenre_weight: f64,
    pub seed_tag_weight: f64,
    pub seed_bpm_weight: f64,
    /// Added to candidates matching the requested genre
    pub genre_bonus: f64,
    pub bpm_tolerance: i32,
    pub year_tolerance: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            artist_weight: 2.0,
            subgenre_weight: 1.0,
            tag_weight: 0.5,
            bpm_weight: 0.3,
            era_weight: 0.2,
            seed_artist_weight: 1.0,
            seed_subgenre_weight: 1.0,
            seed_tag_weight: 1.0,
            seed_bpm_weight: 0.3,
            genre_bonus: 5.0,
            bpm_tolerance: 8,
            year_tolerance: 5,
        }
    }
}

impl ScoringConfig {
    /// Load scoring weights from environment variables, keeping defaults for unset ones
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<ScoringConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load scoring config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(config.database_url, "sqlite://playlister.db");
        assert_eq!(config.port, 8000);
        assert_eq!(config.seed_file, "seed/house_tracks.csv");
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_config_overrides() {
        let config: Config =
            envy::from_iter(vars(&[("PORT", "9100"), ("HOST", "127.0.0.1")])).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9100");
    }

    #[test]
    fn test_scoring_config_defaults() {
        let scoring: ScoringConfig = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(scoring, ScoringConfig::default());
        assert_eq!(scoring.genre_bonus, 5.0);
        assert_eq!(scoring.bpm_tolerance, 8);
    }

    #[test]
    fn test_scoring_config_partial_override() {
        let scoring: ScoringConfig = envy::from_iter(vars(&[
            ("ARTIST_WEIGHT", "3.5"),
            ("YEAR_TOLERANCE", "10"),
        ]))
        .unwrap();
        assert_eq!(scoring.artist_weight, 3.5);
        assert_eq!(scoring.year_tolerance, 10);
        assert_eq!(scoring.subgenre_weight, 1.0);
    }
}
