use std::{io::Read, path::Path};

use anyhow::Context;

use super::SqliteStore;
use crate::models::NewSong;

/// Parses song rows from CSV with a `title,artist,subgenre,year,tags,bpm` header
///
/// An empty `bpm` cell becomes `None`.
pub fn read_songs<R: Read>(reader: R) -> anyhow::Result<Vec<NewSong>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut songs = Vec::new();
    for (index, record) in csv_reader.deserialize::<NewSong>().enumerate() {
        // Header is line 1
        let song = record.with_context(|| format!("Invalid seed row at line {}", index + 2))?;
        songs.push(song);
    }

    Ok(songs)
}

/// Populates an empty catalog from the seed CSV
///
/// Returns the number of imported songs. Nothing is imported when the catalog
/// already holds songs or when the seed file does not exist.
pub async fn seed_if_empty(store: &SqliteStore, seed_file: &Path) -> anyhow::Result<usize> {
    let existing = store.song_count().await?;
    if existing > 0 {
        tracing::debug!(existing, "Song catalog already populated, skipping seed");
        return Ok(0);
    }

    if !seed_file.exists() {
        tracing::warn!(path = %seed_file.display(), "Seed file not found, song catalog is empty");
        return Ok(0);
    }

    let file = std::fs::File::open(seed_file)
        .with_context(|| format!("Failed to open seed file {}", seed_file.display()))?;
    let songs = read_songs(file)?;
    store.insert_songs(&songs).await?;

    tracing::info!(count = songs.len(), path = %seed_file.display(), "Seeded song catalog");

    Ok(songs.len())
}
