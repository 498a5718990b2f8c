//! Station settings and counter commands.

use anyhow::{Context as _, Result};
use irrigo_store::{ControllerSettings, RunningWaterCounter};

use super::Context;
use crate::cli::ConfigAction;

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Print the running water counters.
pub fn cmd_counters(ctx: &Context) -> Result<()> {
    let counters = RunningWaterCounter::load(&ctx.config.station);

    println!("Running water counters (1/100 flow-unit-minutes):\n");
    for (name, value) in WEEKDAYS.iter().zip(counters.weekday) {
        println!("  {:<10} {:>10}", name, value);
    }
    println!("  {:<10} {:>10}", "Week", counters.week_total());
    println!();
    println!("Lifetime total: {} flow-unit-minutes", counters.lifetime);
    match counters.updated_at {
        Some(at) => println!("Last rollover:  {}", at),
        None => println!("Last rollover:  never"),
    }
    Ok(())
}

/// Show or change the configuration.
pub fn cmd_config(ctx: &mut Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content =
                toml::to_string_pretty(&ctx.config).context("Failed to serialize config")?;
            print!("{}", content);
        }
        ConfigAction::Path => {
            println!("{}", ctx.config_path.display());
        }
        ConfigAction::Zones { count } => {
            ctx.config.station.zones = count;
            ctx.config.save_to(&ctx.config_path)?;
            if !ctx.quiet {
                eprintln!("Zones set to {}", ctx.config.station.number_of_zones());
            }
        }
        ConfigAction::Flow { zone, rate } => {
            let flow_rates = &mut ctx.config.station.flow_rates;
            let index = usize::from(zone - 1);
            if flow_rates.len() <= index {
                flow_rates.resize(index + 1, 0);
            }
            flow_rates[index] = rate;
            ctx.config.save_to(&ctx.config_path)?;
            if !ctx.quiet {
                eprintln!("Zone {} flow rate set to {}", zone, rate);
            }
        }
    }
    Ok(())
}
