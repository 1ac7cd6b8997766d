pub mod playlists;
pub mod quiz;
pub mod recommendations;
pub mod scoring;
pub mod songs;
pub mod users;

pub use recommendations::{PlaylistRequest, Recommender, ScoredCandidate};
pub use scoring::{score_song, TasteProfile, JITTER_MAX};
