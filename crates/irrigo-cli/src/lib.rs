//! Command-line interface for the irrigo irrigation log engine.
//!
//! The `irrigo` binary drives the log engine from the shell: it records
//! watering runs, sensor readings and system events into a log tree, and
//! answers chart and table queries over that tree as JSON.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Create the log tree and a default configuration |
//! | `watering` | Record a completed watering run |
//! | `sensor` | Record a sensor reading |
//! | `event` | Record a system event |
//! | `graph` | Binned mean watering durations per zone |
//! | `table` | Every watering run per zone |
//! | `series` | Summarized sensor series |
//! | `counters` | Show the running water counters |
//! | `config` | Show or change the configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The CLI stores configuration in `~/.config/irrigo/config.toml` (or
//! platform equivalent), overridable with `--config` or `IRRIGO_CONFIG`:
//!
//! - `log_root`: root of the log tree
//! - `event_chunk_size`, `max_event_payload`: system event delivery limits
//! - `[station]`: zone count, flow rates and the running water counters
//!
//! # Examples
//!
//! Record a 20 minute run on zone 2:
//! ```bash
//! irrigo watering --zone 2 --duration 20
//! ```
//!
//! Hourly means for May:
//! ```bash
//! irrigo graph --from 2024-05-01 --to 2024-05-31 --grouping hourly
//! ```
//!
//! Daily humidity averages from sensor 1:
//! ```bash
//! irrigo series humidity 1 --from 2024-05-01 --to 2024-05-31 --summary day
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod util;

// Re-export the engine crates for convenience
pub use irrigo_store;
pub use irrigo_types;
