//! Tennis upset-streak CLI
//!
//! Finds maximal runs of consecutive head-to-head matches won by the same
//! lower-ranked player.

use clap::{Parser, Subcommand};
use tennis_streaks::{Config, Result};

#[derive(Parser)]
#[command(name = "tennis-streaks")]
#[command(about = "Consecutive upset-streak detection over a tennis match database", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Find upset streaks and write the CSV report
    Streaks {
        /// Minimum run length to report (overrides config)
        #[arg(long)]
        min_streak: Option<usize>,
        /// Report output path (overrides config)
        #[arg(long)]
        output: Option<String>,
        /// Console output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
        /// Process player pairs on a thread pool
        #[arg(long)]
        parallel: bool,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import matches from a source CSV file
    Import {
        /// Path to the source CSV
        path: String,
    },
    /// Show database status
    Status,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Import { path } => commands::data_import(&config, &path),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Streaks {
            min_streak,
            output,
            format,
            parallel,
        } => commands::streaks(&config, min_streak, output, format, parallel),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use tennis_streaks::data::{importer, Database};
    use tennis_streaks::engine;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        println!("Created data/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'tennis-streaks data import <matches.csv>' to load match data");
        println!("  3. Run 'tennis-streaks streaks' to find upset streaks");

        Ok(())
    }

    pub fn data_import(config: &Config, path: &str) -> Result<()> {
        let mut db = Database::open(&config.data.database_path)?;

        println!("Importing matches from {}...", path);
        let rows = importer::read_csv(path)?;
        println!("Read {} rows", rows.len());

        if rows.is_empty() {
            println!("No rows found. Check the source file.");
            return Ok(());
        }

        let count = db.insert_matches(&rows)?;
        println!("Stored {} matches in database", count);

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.database_path);
        println!("  Matches:  {}", stats.match_count);
        println!("  Players:  {}", stats.player_count);
        if let (Some(earliest), Some(latest)) = (stats.earliest_match, stats.latest_match) {
            println!("  Range:    {} to {}", earliest, latest);
        }

        Ok(())
    }

    pub fn streaks(
        config: &Config,
        min_streak: Option<usize>,
        output: Option<String>,
        format: OutputFormat,
        parallel: bool,
    ) -> Result<()> {
        let min_streak = min_streak.unwrap_or(config.engine.min_streak);
        let output = output.unwrap_or_else(|| config.data.output_path.clone());
        let parallel = parallel || config.engine.parallel;

        let db = Database::open(&config.data.database_path)?;
        let streaks = engine::run(&db, min_streak, parallel)?;

        engine::report::write_csv_file(&streaks, &output)?;
        println!("Wrote {} streak(s) to {}\n", streaks.len(), output);

        match format {
            OutputFormat::Table => engine::report::print_table(&streaks),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&streaks)
                    .map_err(|e| tennis_streaks::StreakError::Parse(e.to_string()))?;
                println!("{}", json);
            }
        }

        Ok(())
    }
}
