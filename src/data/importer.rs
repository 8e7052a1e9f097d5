//! CSV match source import
//!
//! Reads a source CSV into `RawMatchRow`s, preserving missing fields as
//! nulls so the normalizer can apply the admissibility policy later.
//! Unparseable numeric cells are logged and stored as nulls too; only a
//! structurally broken file (missing columns, malformed CSV) aborts the
//! import.

use std::path::Path;

use csv::StringRecord;

use crate::data::RawMatchRow;
use crate::{Result, StreakError};

/// Expected header columns, in order
const COLUMNS: [&str; 10] = [
    "tournament",
    "round",
    "year",
    "month",
    "day",
    "winner_name",
    "loser_name",
    "winner_rank",
    "loser_rank",
    "set1",
];

/// Read a source CSV into raw match rows
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawMatchRow>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let positions = column_positions(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(row_from_record(&record, &positions));
    }

    log::debug!("Read {} rows from source CSV", rows.len());
    Ok(rows)
}

/// Map each expected column to its position in the header row
fn column_positions(headers: &StringRecord) -> Result<[usize; 10]> {
    let mut positions = [0usize; 10];
    for (i, column) in COLUMNS.iter().enumerate() {
        positions[i] = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or_else(|| {
                StreakError::Parse(format!("Source CSV is missing column '{}'", column))
            })?;
    }
    Ok(positions)
}

fn row_from_record(record: &StringRecord, positions: &[usize; 10]) -> RawMatchRow {
    RawMatchRow {
        tournament: text_field(record, positions[0]),
        round: text_field(record, positions[1]),
        year: parse_field(record, positions[2], "year"),
        month: parse_field(record, positions[3], "month"),
        day: parse_field(record, positions[4], "day"),
        winner_name: text_field(record, positions[5]),
        loser_name: text_field(record, positions[6]),
        winner_rank: parse_field(record, positions[7], "winner_rank"),
        loser_rank: parse_field(record, positions[8], "loser_rank"),
        set1: text_field(record, positions[9]),
    }
}

/// Empty or whitespace-only fields become None
fn text_field(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Unparseable numeric cells degrade to None, like any other missing field
fn parse_field<T: std::str::FromStr>(record: &StringRecord, idx: usize, column: &str) -> Option<T> {
    let s = text_field(record, idx)?;
    match s.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparseable value '{}' in column '{}'", s, column);
            None
        }
    }
}
