use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use irrigo_cli::cli::{Cli, Commands};
use irrigo_cli::commands::{self, Context, WateringArgs};
use irrigo_cli::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "irrigo", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::path);
    let config = Config::load_from(&config_path)?;
    let log_root = config.resolve_log_root(cli.log_root.as_deref());
    tracing::debug!("Using log root {}", log_root.display());

    let mut ctx = Context {
        config,
        config_path,
        log_root,
        now: cli.now,
        output: cli.output,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Init => commands::cmd_init(&mut ctx),
        Commands::Watering {
            zone,
            duration,
            start,
            schedule,
            seasonal,
            weather,
        } => commands::cmd_watering(
            &mut ctx,
            WateringArgs {
                zone,
                duration,
                start,
                schedule,
                seasonal,
                weather,
            },
        ),
        Commands::Sensor {
            sensor_type,
            id,
            reading,
        } => commands::cmd_sensor(&ctx, sensor_type, id, reading),
        Commands::Event { severity, message } => commands::cmd_event(&ctx, severity, &message),
        Commands::Graph { range, grouping } => commands::cmd_graph(&ctx, range.bounds(), grouping),
        Commands::Table { range } => commands::cmd_table(&ctx, range.bounds()),
        Commands::Series {
            sensor_type,
            id,
            range,
            summary,
        } => commands::cmd_series(&ctx, sensor_type, id, range.bounds(), summary),
        Commands::Counters => commands::cmd_counters(&ctx),
        Commands::Config { action } => commands::cmd_config(&mut ctx, action),
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }
}
