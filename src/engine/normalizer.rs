//! Match normalization
//!
//! Filters raw rows down to the admissible set: both players named, both
//! ranks present and positive, a fully specified valid date, and no
//! walkover. Inadmissible rows are dropped silently; this is a data-quality
//! filter, not validation.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::data::RawMatchRow;
use crate::{MatchRecord, PlayerRegistry};

/// First-set score text that marks a match awarded without play
pub const WALKOVER: &str = "W/O";

/// Output of normalization: admissible records plus the name registry
/// built while interning
#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<MatchRecord>,
    pub players: PlayerRegistry,
}

/// Normalize raw rows into admissible, deduplicated match records
pub fn normalize(rows: Vec<RawMatchRow>) -> Normalized {
    let total = rows.len();
    let mut players = PlayerRegistry::new();
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut walkovers = 0usize;
    let mut duplicates = 0usize;

    for row in &rows {
        if is_walkover(row) {
            walkovers += 1;
            continue;
        }
        let Some(parts) = admissible_parts(row) else {
            continue;
        };
        if !seen.insert(dedup_key(&parts)) {
            duplicates += 1;
            continue;
        }

        let winner = players.intern(parts.winner_name);
        let loser = players.intern(parts.loser_name);
        records.push(MatchRecord {
            date: parts.date,
            tournament: parts.tournament.to_string(),
            round: parts.round.to_string(),
            winner,
            loser,
            winner_rank: parts.winner_rank,
            loser_rank: parts.loser_rank,
        });
    }

    log::debug!(
        "Normalized {} of {} rows ({} walkovers, {} duplicates, {} inadmissible)",
        records.len(),
        total,
        walkovers,
        duplicates,
        total - records.len() - walkovers - duplicates
    );

    Normalized { records, players }
}

/// Admissible fields of one row, borrowed before interning
struct AdmissibleParts<'a> {
    date: NaiveDate,
    tournament: &'a str,
    round: &'a str,
    winner_name: &'a str,
    loser_name: &'a str,
    winner_rank: f64,
    loser_rank: f64,
}

fn is_walkover(row: &RawMatchRow) -> bool {
    row.set1
        .as_deref()
        .is_some_and(|s| s.trim() == WALKOVER)
}

fn admissible_parts(row: &RawMatchRow) -> Option<AdmissibleParts<'_>> {
    let winner_name = row.winner_name.as_deref()?;
    let loser_name = row.loser_name.as_deref()?;
    let winner_rank = row.winner_rank?;
    let loser_rank = row.loser_rank?;
    if winner_rank <= 0.0 || loser_rank <= 0.0 {
        return None;
    }

    let year = row.year?;
    let month = u32::try_from(row.month?).ok()?;
    let day = u32::try_from(row.day?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    Some(AdmissibleParts {
        date,
        tournament: row.tournament.as_deref().unwrap_or(""),
        round: row.round.as_deref().unwrap_or(""),
        winner_name,
        loser_name,
        winner_rank,
        loser_rank,
    })
}

/// Projection the source applies DISTINCT over, with ranks hashed by bits
fn dedup_key(parts: &AdmissibleParts<'_>) -> (NaiveDate, String, String, String, String, u64, u64) {
    (
        parts.date,
        parts.tournament.to_string(),
        parts.round.to_string(),
        parts.winner_name.to_string(),
        parts.loser_name.to_string(),
        parts.winner_rank.to_bits(),
        parts.loser_rank.to_bits(),
    )
}
