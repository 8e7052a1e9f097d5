//! The streak engine pipeline
//!
//! Three stages, run strictly in order: normalize raw rows into admissible
//! match records, sequence them per player pair, then extract maximal
//! upset streaks.

pub mod extractor;
pub mod normalizer;
pub mod report;
pub mod sequencer;

pub use extractor::{StreakMatch, StreakRecord};
pub use normalizer::Normalized;
pub use sequencer::PairSequence;

use crate::data::Database;
use crate::Result;

/// Run the full pipeline against a match database
pub fn run(db: &Database, min_streak: usize, parallel: bool) -> Result<Vec<StreakRecord>> {
    let rows = db.load_raw_matches()?;
    log::info!("Loaded {} match rows", rows.len());

    let normalized = normalizer::normalize(rows);
    log::info!(
        "{} admissible matches across {} players",
        normalized.records.len(),
        normalized.players.len()
    );

    let sequences = sequencer::sequence(normalized.records);
    log::info!("{} player pairs with at least one match", sequences.len());

    let streaks = extractor::extract(&sequences, min_streak, &normalized.players, parallel);
    log::info!("{} streaks of length >= {}", streaks.len(), min_streak);

    Ok(streaks)
}
