//! Init and record commands.

use anyhow::{Context as _, Result};
use irrigo_types::{Severity, WateringRecord};
use tracing::warn;

use super::Context;

/// Create the log tree and write a config file if none exists yet.
pub fn cmd_init(ctx: &mut Context) -> Result<()> {
    let mut logger = ctx.logger();
    logger
        .begin()
        .with_context(|| format!("Failed to set up log tree at {}", ctx.log_root.display()))?;

    if !ctx.config_path.exists() {
        ctx.config.log_root = Some(ctx.log_root.clone());
        ctx.config.save_to(&ctx.config_path)?;
        if !ctx.quiet {
            eprintln!("Wrote configuration to {}", ctx.config_path.display());
        }
    }

    if !ctx.quiet {
        eprintln!("Log tree ready at {}", ctx.log_root.display());
    }
    Ok(())
}

/// Arguments of the watering command.
pub struct WateringArgs {
    pub zone: u8,
    pub duration: u16,
    pub start: Option<time::PrimitiveDateTime>,
    pub schedule: u16,
    pub seasonal: i32,
    pub weather: i32,
}

/// Record a watering run. The running counters are saved to the config
/// even when the run cannot be written.
pub fn cmd_watering(ctx: &mut Context, args: WateringArgs) -> Result<()> {
    let mut logger = ctx.logger();
    if let Err(e) = logger.begin() {
        warn!("{}", e);
    }

    let record = WateringRecord {
        start: args.start.unwrap_or_else(|| logger.now()),
        zone: args.zone,
        duration: args.duration,
        schedule: args.schedule,
        seasonal_adjustment: args.seasonal,
        weather_adjustment: args.weather,
    };
    let result = logger.record_watering(&record);

    ctx.absorb(logger)?;
    result.context("Failed to record watering run")
}

/// Record a sensor reading for a raw sensor type code.
pub fn cmd_sensor(ctx: &Context, sensor_type: u8, id: u16, reading: i32) -> Result<()> {
    let mut logger = ctx.logger();
    if let Err(e) = logger.begin() {
        warn!("{}", e);
    }
    logger
        .record_sensor(sensor_type, id, reading)
        .context("Failed to record sensor reading")
}

/// Record a system event.
pub fn cmd_event(ctx: &Context, severity: Severity, message: &[String]) -> Result<()> {
    let mut logger = ctx.logger();
    if let Err(e) = logger.begin() {
        warn!("{}", e);
    }
    logger
        .record_system_event(severity, &message.join(" "))
        .context("Failed to record system event")
}
