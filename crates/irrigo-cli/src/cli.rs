//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use irrigo_types::{Grouping, SensorType, Severity, Summary};
use time::{Date, PrimitiveDateTime};

use crate::util::{parse_date, parse_datetime};

#[derive(Parser)]
#[command(name = "irrigo")]
#[command(author, version, about = "Irrigation controller log engine", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write query output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file to use instead of the default
    #[arg(long, global = true, env = "IRRIGO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log root directory (overrides config)
    #[arg(long, global = true, env = "IRRIGO_LOG_ROOT")]
    pub log_root: Option<PathBuf>,

    /// Controller time to record with (YYYY-MM-DD HH:MM[:SS]), for replaying logs
    #[arg(long, global = true, value_parser = parse_datetime)]
    pub now: Option<PrimitiveDateTime>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the log directory tree and a default configuration
    Init,

    /// Record a completed watering run
    Watering {
        /// Zone number, starting at 1
        #[arg(short, long)]
        zone: u8,

        /// Run time in minutes
        #[arg(short, long)]
        duration: u16,

        /// Start of the run (YYYY-MM-DD HH:MM); defaults to now
        #[arg(long, value_parser = parse_datetime)]
        start: Option<PrimitiveDateTime>,

        /// Schedule that triggered the run
        #[arg(long, default_value = "0")]
        schedule: u16,

        /// Seasonal adjustment in percent
        #[arg(long, default_value = "100", allow_negative_numbers = true)]
        seasonal: i32,

        /// Weather adjustment in percent
        #[arg(long, default_value = "100", allow_negative_numbers = true)]
        weather: i32,
    },

    /// Record a sensor reading
    Sensor {
        /// Sensor type: code (1-4) or name (temperature, pressure, humidity, waterflow)
        #[arg(value_parser = parse_sensor_code)]
        sensor_type: u8,

        /// Sensor id
        id: u16,

        /// Raw reading
        #[arg(allow_negative_numbers = true)]
        reading: i32,
    },

    /// Record a system event
    Event {
        /// Severity (crit, error, warning, notice, info, verbose)
        #[arg(short, long, default_value = "info")]
        severity: Severity,

        /// Event message
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Mean watering duration per zone, binned by hour, weekday or month
    Graph {
        #[command(flatten)]
        range: RangeArgs,

        /// Bin grouping (hourly, daily, monthly)
        #[arg(short, long, default_value = "hourly")]
        grouping: Grouping,
    },

    /// Every watering run per zone
    Table {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Sensor readings as a chart series
    Series {
        /// Sensor type: code (1-4) or name
        #[arg(value_parser = parse_sensor_type)]
        sensor_type: SensorType,

        /// Sensor id
        id: u16,

        #[command(flatten)]
        range: RangeArgs,

        /// Summary bucket (raw, hour, day, month)
        #[arg(short, long, default_value = "raw")]
        summary: Summary,
    },

    /// Show the running water counters
    Counters,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Query date range arguments
#[derive(Debug, Clone, clap::Args)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Date,

    /// Last day (YYYY-MM-DD); defaults to the first day
    #[arg(long, value_parser = parse_date)]
    pub to: Option<Date>,
}

impl RangeArgs {
    pub fn bounds(&self) -> (Date, Date) {
        (self.from, self.to.unwrap_or(self.from))
    }
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Set the number of zones
    Zones {
        /// Zone count (1-8)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
        count: u8,
    },

    /// Set the flow rate of a zone
    Flow {
        /// Zone number, starting at 1
        #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
        zone: u8,

        /// Flow rate in flow units per hour
        rate: u16,
    },
}

/// Parse a sensor type given as a raw code or a name into its code.
/// Unknown numeric codes pass through so the engine can reject them.
fn parse_sensor_code(s: &str) -> Result<u8, String> {
    if let Ok(code) = s.parse::<u8>() {
        return Ok(code);
    }
    s.parse::<SensorType>()
        .map(|sensor| sensor as u8)
        .map_err(|e| e.to_string())
}

fn parse_sensor_type(s: &str) -> Result<SensorType, String> {
    match s.parse::<u8>() {
        Ok(code) => SensorType::try_from(code).map_err(|e| e.to_string()),
        Err(_) => s.parse().map_err(|e: irrigo_types::ParseError| e.to_string()),
    }
}
