//! Data ingestion and storage
//!
//! CSV source import and SQLite database management.

pub mod database;
pub mod importer;

pub use database::{Database, RawMatchRow};
