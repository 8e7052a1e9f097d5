//! Consecutive upset-streak detection for tennis match history
//!
//! Scans the head-to-head record of every player pair and reports maximal
//! runs of matches won by the same lower-ranked player.

pub mod data;
pub mod engine;

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a player
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

/// Interns player names into surrogate ids.
///
/// The source data identifies players by printed name only, so two distinct
/// players sharing a name collapse to one id. Everything downstream keys on
/// the id; the name is display-only.
#[derive(Debug, Default, Clone)]
pub struct PlayerRegistry {
    names: Vec<String>,
    index: HashMap<String, PlayerId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the id for a name, assigning a new one on first sight
    pub fn intern(&mut self, name: &str) -> PlayerId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = PlayerId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: PlayerId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// An unordered player pair, canonicalized with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub a: PlayerId,
    pub b: PlayerId,
}

impl PairKey {
    pub fn new(x: PlayerId, y: PlayerId) -> Self {
        if x <= y {
            PairKey { a: x, b: y }
        } else {
            PairKey { a: y, b: x }
        }
    }
}

/// A single admissible match between two players
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub tournament: String,
    pub round: String,
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub winner_rank: f64,
    pub loser_rank: f64,
}

impl MatchRecord {
    /// An upset: the winner's rank value is strictly worse (greater).
    /// Equal ranks are not an upset.
    pub fn is_upset(&self) -> bool {
        self.winner_rank > self.loser_rank
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.winner, self.loser)
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum StreakError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, StreakError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum run length for a streak to be reported
    pub min_streak: usize,
    /// Fan out per-pair extraction across worker threads
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/matches.db".to_string(),
                output_path: "streaks.csv".to_string(),
            },
            engine: EngineConfig {
                min_streak: 6,
                parallel: false,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StreakError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| StreakError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StreakError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
