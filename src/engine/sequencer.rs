//! Pair sequencing
//!
//! Partitions admissible matches by unordered player pair and orders each
//! pair's history chronologically, assigning 1-based contiguous sequence
//! indices. The ordering decides which matches count as consecutive, so it
//! must be deterministic.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{MatchRecord, PairKey};

/// A match with its position in one pair's chronological history
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedMatch {
    /// 1-based index, contiguous within the pair
    pub seq_idx: u32,
    pub record: MatchRecord,
}

/// The ordered match history of one player pair
#[derive(Debug, Clone, PartialEq)]
pub struct PairSequence {
    pub key: PairKey,
    pub matches: Vec<SequencedMatch>,
}

/// Group matches by pair and assign sequence indices
pub fn sequence(records: Vec<MatchRecord>) -> Vec<PairSequence> {
    let mut by_pair: HashMap<PairKey, Vec<MatchRecord>> = HashMap::new();
    for record in records {
        by_pair.entry(record.pair_key()).or_default().push(record);
    }

    let mut sequences: Vec<PairSequence> = by_pair
        .into_iter()
        .map(|(key, mut matches)| {
            matches.sort_by(compare_matches);
            let matches = matches
                .into_iter()
                .zip(1u32..)
                .map(|(record, seq_idx)| SequencedMatch { seq_idx, record })
                .collect();
            PairSequence { key, matches }
        })
        .collect();

    // Deterministic pair order so downstream output is reproducible
    sequences.sort_by_key(|s| s.key);
    sequences
}

/// Sort key: date, then tournament, then round.
///
/// Same-date, same-tournament matches order by tournament stage rather
/// than by the raw round label; labels we do not recognize sort after
/// every known stage, lexicographically among themselves.
fn compare_matches(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.tournament.cmp(&b.tournament))
        .then_with(|| compare_rounds(&a.round, &b.round))
}

/// Position of a round label in tournament progression, earliest first
fn round_stage(label: &str) -> Option<u8> {
    match label.trim() {
        "Q1" => Some(0),
        "Q2" => Some(1),
        "Q3" => Some(2),
        "RR" => Some(3),
        "R128" => Some(4),
        "R64" => Some(5),
        "R32" => Some(6),
        "R16" => Some(7),
        "QF" => Some(8),
        "SF" => Some(9),
        "BR" => Some(10),
        "F" => Some(11),
        _ => None,
    }
}

/// Total-order key for round labels: known stages first (by stage, label
/// text as residual), unknown labels after, lexicographically
fn round_sort_key(label: &str) -> (bool, u8, &str) {
    match round_stage(label) {
        Some(stage) => (false, stage, label),
        None => (true, 0, label),
    }
}

fn compare_rounds(a: &str, b: &str) -> Ordering {
    round_sort_key(a).cmp(&round_sort_key(b))
}
