//! Streak report output
//!
//! Writes the CSV report and renders the console summary. Per-match detail
//! columns hold `|`-delimited lists, one entry per match in chronological
//! order.

use std::io::Write;
use std::path::Path;

use crate::engine::extractor::StreakRecord;
use crate::Result;

const DETAIL_SEPARATOR: &str = "|";

/// Write the CSV report to any writer
pub fn write_csv<W: Write>(streaks: &[StreakRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "winner",
        "opponent",
        "streak_length",
        "start_date",
        "end_date",
        "winner_ranks",
        "loser_ranks",
        "tournaments",
        "rounds",
    ])?;

    for streak in streaks {
        let row = [
            streak.winner_name.clone(),
            streak.opponent_name.clone(),
            streak.streak_length.to_string(),
            streak.start_date.format("%Y-%m-%d").to_string(),
            streak.end_date.format("%Y-%m-%d").to_string(),
            join_detail(streak, |m| m.winner_rank.to_string()),
            join_detail(streak, |m| m.loser_rank.to_string()),
            join_detail(streak, |m| m.tournament.clone()),
            join_detail(streak, |m| m.round.clone()),
        ];
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the CSV report to a file
pub fn write_csv_file<P: AsRef<Path>>(streaks: &[StreakRecord], path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(streaks, file)
}

fn join_detail<F>(streak: &StreakRecord, field: F) -> String
where
    F: Fn(&crate::engine::extractor::StreakMatch) -> String,
{
    streak
        .matches
        .iter()
        .map(field)
        .collect::<Vec<_>>()
        .join(DETAIL_SEPARATOR)
}

/// Print the console summary table
pub fn print_table(streaks: &[StreakRecord]) {
    if streaks.is_empty() {
        println!("no streaks found");
        return;
    }

    println!(
        "{:<24} {:<24} {:>7} {:>12} {:>12}",
        "Winner", "Opponent", "Length", "Start", "End"
    );
    println!("{}", "-".repeat(84));
    for streak in streaks {
        println!(
            "{:<24} {:<24} {:>7} {:>12} {:>12}",
            streak.winner_name,
            streak.opponent_name,
            streak.streak_length,
            streak.start_date.format("%Y-%m-%d"),
            streak.end_date.format("%Y-%m-%d"),
        );
    }
    println!("\n{} streak(s) found", streaks.len());
}
