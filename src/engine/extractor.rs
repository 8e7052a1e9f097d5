//! Streak extraction, the core of the engine
//!
//! Scans each pair sequence once, left to right, tracking the current run
//! of consecutive upsets by the same winner. A match that is not an upset,
//! or an upset won by the other player, ends the run; runs of at least
//! `min_streak` matches are emitted.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::engine::sequencer::PairSequence;
use crate::{PlayerId, PlayerRegistry};

/// Per-match detail carried by a streak, in chronological order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakMatch {
    pub winner_rank: f64,
    pub loser_rank: f64,
    pub tournament: String,
    pub round: String,
}

/// One maximal run of consecutive upsets by the same player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakRecord {
    pub winner: PlayerId,
    pub opponent: PlayerId,
    pub winner_name: String,
    pub opponent_name: String,
    pub streak_length: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub matches: Vec<StreakMatch>,
}

/// Extract streaks from every pair sequence and sort the combined result
/// by length descending, then start date descending
pub fn extract(
    sequences: &[PairSequence],
    min_streak: usize,
    players: &PlayerRegistry,
    parallel: bool,
) -> Vec<StreakRecord> {
    let mut streaks: Vec<StreakRecord> = if parallel {
        sequences
            .par_iter()
            .flat_map_iter(|seq| extract_pair(seq, min_streak, players))
            .collect()
    } else {
        sequences
            .iter()
            .flat_map(|seq| extract_pair(seq, min_streak, players))
            .collect()
    };

    // Residual keys keep repeated runs byte-identical
    streaks.sort_by(|a, b| {
        b.streak_length
            .cmp(&a.streak_length)
            .then_with(|| b.start_date.cmp(&a.start_date))
            .then_with(|| a.winner.cmp(&b.winner))
            .then_with(|| a.opponent.cmp(&b.opponent))
    });
    streaks
}

/// Scan state: either between runs, or inside a tentative run started at
/// `start` (index into the pair's match list) and won by `winner`
enum ScanState {
    NoActiveRun,
    ActiveRun { winner: PlayerId, start: usize },
}

/// Extract all qualifying streaks from one pair's sequence
pub fn extract_pair(
    seq: &PairSequence,
    min_streak: usize,
    players: &PlayerRegistry,
) -> Vec<StreakRecord> {
    let mut streaks = Vec::new();
    let mut state = ScanState::NoActiveRun;

    for (i, sequenced) in seq.matches.iter().enumerate() {
        let record = &sequenced.record;
        let upset = record.is_upset();

        state = match state {
            ScanState::NoActiveRun if upset => ScanState::ActiveRun {
                winner: record.winner,
                start: i,
            },
            ScanState::NoActiveRun => ScanState::NoActiveRun,
            ScanState::ActiveRun { winner, start } if upset && record.winner == winner => {
                ScanState::ActiveRun { winner, start }
            }
            ScanState::ActiveRun { winner, start } => {
                // Run broken: by a non-upset, or by an upset from the other
                // player (which immediately starts a new run of length 1)
                emit_run(seq, winner, start, i, min_streak, players, &mut streaks);
                if upset {
                    ScanState::ActiveRun {
                        winner: record.winner,
                        start: i,
                    }
                } else {
                    ScanState::NoActiveRun
                }
            }
        };
    }

    // Flush a still-open run at the end of the sequence
    if let ScanState::ActiveRun { winner, start } = state {
        let end = seq.matches.len();
        emit_run(seq, winner, start, end, min_streak, players, &mut streaks);
    }

    streaks
}

fn emit_run(
    seq: &PairSequence,
    winner: PlayerId,
    start: usize,
    end: usize,
    min_streak: usize,
    players: &PlayerRegistry,
    streaks: &mut Vec<StreakRecord>,
) {
    let length = end - start;
    if length < min_streak {
        return;
    }

    let run = &seq.matches[start..end];
    let opponent = if winner == seq.key.a { seq.key.b } else { seq.key.a };

    let matches = run
        .iter()
        .map(|m| StreakMatch {
            winner_rank: m.record.winner_rank,
            loser_rank: m.record.loser_rank,
            tournament: m.record.tournament.clone(),
            round: m.record.round.clone(),
        })
        .collect();

    streaks.push(StreakRecord {
        winner,
        opponent,
        winner_name: players.name(winner).to_string(),
        opponent_name: players.name(opponent).to_string(),
        streak_length: length,
        start_date: run[0].record.date,
        end_date: run[length - 1].record.date,
        matches,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sequencer;
    use crate::MatchRecord;

    struct Fixture {
        players: PlayerRegistry,
        records: Vec<MatchRecord>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                players: PlayerRegistry::new(),
                records: Vec::new(),
            }
        }

        /// Add a match on day `day` of March 2020
        fn add(&mut self, day: u32, winner: &str, loser: &str, winner_rank: f64, loser_rank: f64) {
            let winner = self.players.intern(winner);
            let loser = self.players.intern(loser);
            self.records.push(MatchRecord {
                date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
                tournament: "Tour Event".to_string(),
                round: "R32".to_string(),
                winner,
                loser,
                winner_rank,
                loser_rank,
            });
        }

        fn extract(&self, min_streak: usize) -> Vec<StreakRecord> {
            let sequences = sequencer::sequence(self.records.clone());
            extract(&sequences, min_streak, &self.players, false)
        }
    }

    #[test]
    fn test_six_upsets_after_a_non_upset() {
        let mut fx = Fixture::new();
        // seq_idx 1: not an upset; seq_idx 2-7: upsets won by B
        fx.add(1, "A", "B", 5.0, 40.0);
        for day in 2..=7 {
            fx.add(day, "B", "A", 40.0, 5.0);
        }

        let streaks = fx.extract(6);
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].winner_name, "B");
        assert_eq!(streaks[0].opponent_name, "A");
        assert_eq!(streaks[0].streak_length, 6);
        assert_eq!(streaks[0].start_date, NaiveDate::from_ymd_opt(2020, 3, 2).unwrap());
        assert_eq!(streaks[0].end_date, NaiveDate::from_ymd_opt(2020, 3, 7).unwrap());
    }

    #[test]
    fn test_opposing_upset_breaks_the_run() {
        let mut fx = Fixture::new();
        fx.add(1, "A", "B", 5.0, 40.0);
        for day in 2..=7 {
            if day == 5 {
                // An upset the other way: both sub-runs fall below 6
                fx.add(day, "A", "B", 40.0, 5.0);
            } else {
                fx.add(day, "B", "A", 40.0, 5.0);
            }
        }

        assert!(fx.extract(6).is_empty());
    }

    #[test]
    fn test_run_at_end_of_sequence_is_flushed() {
        let mut fx = Fixture::new();
        for day in 1..=6 {
            fx.add(day, "B", "A", 40.0, 5.0);
        }

        let streaks = fx.extract(6);
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].streak_length, 6);
    }

    #[test]
    fn test_shorter_runs_are_never_partially_reported() {
        let mut fx = Fixture::new();
        for day in 1..=5 {
            fx.add(day, "B", "A", 40.0, 5.0);
        }

        assert!(fx.extract(6).is_empty());
        assert_eq!(fx.extract(5).len(), 1);
    }

    #[test]
    fn test_separate_runs_do_not_overlap() {
        let mut fx = Fixture::new();
        for day in 1..=2 {
            fx.add(day, "B", "A", 40.0, 5.0);
        }
        fx.add(3, "A", "B", 5.0, 40.0); // break
        for day in 4..=6 {
            fx.add(day, "B", "A", 40.0, 5.0);
        }

        let streaks = fx.extract(2);
        assert_eq!(streaks.len(), 2);
        let lengths: Vec<usize> = streaks.iter().map(|s| s.streak_length).collect();
        assert_eq!(lengths, vec![3, 2]);
        // Covered dates never overlap
        assert!(streaks[1].end_date < streaks[0].start_date);
    }

    #[test]
    fn test_winner_alternation_starts_a_new_run() {
        let mut fx = Fixture::new();
        // B upsets twice, then A upsets three times
        fx.add(1, "B", "A", 40.0, 5.0);
        fx.add(2, "B", "A", 40.0, 5.0);
        fx.add(3, "A", "B", 50.0, 30.0);
        fx.add(4, "A", "B", 50.0, 30.0);
        fx.add(5, "A", "B", 50.0, 30.0);

        let streaks = fx.extract(2);
        assert_eq!(streaks.len(), 2);
        // Longest first
        assert_eq!(streaks[0].winner_name, "A");
        assert_eq!(streaks[0].streak_length, 3);
        assert_eq!(streaks[1].winner_name, "B");
        assert_eq!(streaks[1].streak_length, 2);
    }

    #[test]
    fn test_emitted_streaks_are_maximal() {
        let mut fx = Fixture::new();
        fx.add(1, "A", "B", 5.0, 40.0); // non-upset before
        for day in 2..=8 {
            fx.add(day, "B", "A", 40.0, 5.0);
        }
        fx.add(9, "A", "B", 5.0, 40.0); // non-upset after

        let streaks = fx.extract(6);
        assert_eq!(streaks.len(), 1);
        // The full 7-match run is reported, not a 6-match prefix
        assert_eq!(streaks[0].streak_length, 7);
    }

    #[test]
    fn test_detail_list_is_chronological() {
        let mut fx = Fixture::new();
        for (day, rank) in (1..=6).zip([60.0, 55.0, 50.0, 45.0, 40.0, 35.0]) {
            fx.add(day, "B", "A", rank, 5.0);
        }

        let streaks = fx.extract(6);
        let ranks: Vec<f64> = streaks[0].matches.iter().map(|m| m.winner_rank).collect();
        assert_eq!(ranks, vec![60.0, 55.0, 50.0, 45.0, 40.0, 35.0]);
    }

    #[test]
    fn test_global_sort_order() {
        let mut fx = Fixture::new();
        // Pair A/B: streak of 3 starting day 1
        for day in 1..=3 {
            fx.add(day, "B", "A", 40.0, 5.0);
        }
        // Pair C/D: streak of 3 starting day 2, and pair E/F: streak of 4
        for day in 2..=4 {
            fx.add(day, "C", "D", 40.0, 5.0);
        }
        for day in 1..=4 {
            fx.add(day, "E", "F", 40.0, 5.0);
        }

        let streaks = fx.extract(3);
        assert_eq!(streaks.len(), 3);
        assert_eq!(streaks[0].winner_name, "E"); // longest first
        assert_eq!(streaks[1].winner_name, "C"); // then later start date
        assert_eq!(streaks[2].winner_name, "B");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let mut fx = Fixture::new();
        for pair in 0..8 {
            let winner = format!("W{}", pair);
            let loser = format!("L{}", pair);
            for day in 1..=6 {
                fx.add(day, &winner, &loser, 40.0, 5.0);
            }
        }

        let first = fx.extract(6);
        let second = fx.extract(6);
        assert_eq!(first, second);
    }
}
