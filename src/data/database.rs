//! SQLite database management for match data

use crate::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// One row of the `matches` table as stored.
///
/// The source data is of uneven quality; every analytic field is nullable
/// and rows are filtered for admissibility downstream, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMatchRow {
    pub tournament: Option<String>,
    pub round: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub winner_name: Option<String>,
    pub loser_name: Option<String>,
    pub winner_rank: Option<f64>,
    pub loser_rank: Option<f64>,
    /// First-set score text; the literal "W/O" marks a walkover
    pub set1: Option<String>,
}

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tournament TEXT,
                round TEXT,
                year INTEGER,
                month INTEGER,
                day INTEGER,
                winner_name TEXT,
                loser_name TEXT,
                winner_rank REAL,
                loser_rank REAL,
                set1 TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_matches_players
                ON matches(winner_name, loser_name);
            CREATE INDEX IF NOT EXISTS idx_matches_date
                ON matches(year, month, day);
            "#,
        )?;
        Ok(())
    }

    /// Insert a match row as-is, nulls included
    pub fn insert_match(&self, row: &RawMatchRow) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO matches (tournament, round, year, month, day,
                                 winner_name, loser_name, winner_rank, loser_rank, set1)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                row.tournament,
                row.round,
                row.year,
                row.month,
                row.day,
                row.winner_name,
                row.loser_name,
                row.winner_rank,
                row.loser_rank,
                row.set1,
            ],
        )?;
        Ok(())
    }

    /// Insert multiple match rows inside one transaction
    pub fn insert_matches(&mut self, rows: &[RawMatchRow]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO matches (tournament, round, year, month, day,
                                     winner_name, loser_name, winner_rank, loser_rank, set1)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )?;
            for row in rows {
                stmt.execute(params![
                    row.tournament,
                    row.round,
                    row.year,
                    row.month,
                    row.day,
                    row.winner_name,
                    row.loser_name,
                    row.winner_rank,
                    row.loser_rank,
                    row.set1,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Load every stored match row.
    ///
    /// No filtering or ordering happens here; the normalizer owns the
    /// admissibility policy and the sequencer owns the sort.
    pub fn load_raw_matches(&self) -> Result<Vec<RawMatchRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT tournament, round, year, month, day,
                    winner_name, loser_name, winner_rank, loser_rank, set1
             FROM matches",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawMatchRow {
                    tournament: row.get(0)?,
                    round: row.get(1)?,
                    year: row.get(2)?,
                    month: row.get(3)?,
                    day: row.get(4)?,
                    winner_name: row.get(5)?,
                    loser_name: row.get(6)?,
                    winner_rank: row.get(7)?,
                    loser_rank: row.get(8)?,
                    set1: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let match_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;

        let player_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM (
                 SELECT winner_name AS name FROM matches WHERE winner_name IS NOT NULL
                 UNION
                 SELECT loser_name FROM matches WHERE loser_name IS NOT NULL
             )",
            [],
            |row| row.get(0),
        )?;

        let min_date: Option<String> = self
            .conn
            .query_row(
                "SELECT MIN(printf('%04d-%02d-%02d', year, month, day)) FROM matches
                 WHERE year IS NOT NULL AND month IS NOT NULL AND day IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        let max_date: Option<String> = self
            .conn
            .query_row(
                "SELECT MAX(printf('%04d-%02d-%02d', year, month, day)) FROM matches
                 WHERE year IS NOT NULL AND month IS NOT NULL AND day IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        Ok(DatabaseStats {
            match_count: match_count as usize,
            player_count: player_count as usize,
            earliest_match: min_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            latest_match: max_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub match_count: usize,
    pub player_count: usize,
    pub earliest_match: Option<NaiveDate>,
    pub latest_match: Option<NaiveDate>,
}
