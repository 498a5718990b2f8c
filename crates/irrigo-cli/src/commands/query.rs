//! Query commands writing JSON.

use anyhow::Result;
use irrigo_store::{ControllerSettings, QueryEngine, QueryRange};
use irrigo_types::{Grouping, SensorType, Summary};
use time::Date;
use tracing::warn;

use super::Context;
use crate::util::write_query;

fn engine(ctx: &Context) -> QueryEngine {
    QueryEngine::new(&ctx.log_root, ctx.config.station.number_of_zones())
}

fn range(ctx: &Context, (start, end): (Date, Date)) -> QueryRange {
    let range = QueryRange::new(start, end);
    if range.is_truncated() && !ctx.quiet {
        warn!(
            "Queries cannot span years; results end at {}",
            range.end()
        );
    }
    range
}

/// Binned mean watering durations.
pub fn cmd_graph(ctx: &Context, bounds: (Date, Date), grouping: Grouping) -> Result<()> {
    let engine = engine(ctx);
    let range = range(ctx, bounds);
    write_query(ctx.output(), |out| engine.write_binned(out, &range, grouping))
}

/// Watering runs per zone.
pub fn cmd_table(ctx: &Context, bounds: (Date, Date)) -> Result<()> {
    let engine = engine(ctx);
    let range = range(ctx, bounds);
    write_query(ctx.output(), |out| engine.write_table(out, &range))
}

/// Summarized sensor series.
pub fn cmd_series(
    ctx: &Context,
    sensor: SensorType,
    id: u16,
    bounds: (Date, Date),
    summary: Summary,
) -> Result<()> {
    let engine = engine(ctx);
    let range = range(ctx, bounds);
    write_query(ctx.output(), |out| {
        engine.write_sensor_series(out, sensor, id, &range, summary)
    })
}
