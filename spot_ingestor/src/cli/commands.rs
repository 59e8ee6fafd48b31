use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the settings file (spot_ingestor.toml); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a historical window and merge it into the archive
    Backfill {
        /// Start datetime in UTC (ISO8601, e.g. "2023-01-01T00:00:00Z")
        #[arg(long)]
        start: String,

        /// End datetime in UTC; defaults to now
        #[arg(long)]
        end: Option<String>,

        /// Zone code of the price area (e.g. "SE3")
        #[arg(long)]
        price_area: String,
    },

    /// Fetch the rolling day-ahead window and refresh the latest partition
    DayAhead {
        /// Number of days to fetch ahead of today's date
        #[arg(long, default_value_t = 2)]
        days_ahead: i64,

        /// Number of days to fetch behind today's date
        #[arg(long, default_value_t = 4)]
        days_behind: i64,

        /// Zone code of the price area (e.g. "SE3")
        #[arg(long)]
        price_area: String,
    },

    /// Recompute day statistics from the archived day partition
    Stats {
        /// Day to summarize (YYYY-MM-DD)
        #[arg(long)]
        day: String,

        /// Zone code of the price area (e.g. "SE3")
        #[arg(long)]
        price_area: String,
    },
}
