//! Utility functions for CLI operations.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD", s))
}

/// Parse `YYYY-MM-DD HH:MM`, with optional seconds. A `T` separator is
/// accepted as well.
pub fn parse_datetime(s: &str) -> Result<PrimitiveDateTime, String> {
    let normalized = s.trim().replacen('T', " ", 1);
    PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        )
    })
    .map_err(|_| format!("Invalid date/time '{}'. Use YYYY-MM-DD HH:MM[:SS]", s))
}

/// Open the query output: a file when a path is given, stdout otherwise.
pub fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Run a query writer against the selected output and terminate it with a newline.
pub fn write_query<F>(output: Option<&Path>, query: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> irrigo_store::Result<()>,
{
    let mut out = open_output(output)?;
    query(&mut out).context("Query failed")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
