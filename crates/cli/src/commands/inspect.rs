use anyhow::{Context, Result};
use std::io::Write;

use super::open_cache;
use crate::cli::Cli;
use crate::display::format_inspection;

pub fn inspect_command<O: Write>(cli: &Cli, mut out: O) -> Result<i32> {
    let cache = open_cache(cli)?;
    let inspection = cache
        .inspect(&cli.descriptor())
        .context("Failed to compute cache key")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&inspection)
            .context("Failed to serialize dry-run report")?;
        writeln!(out, "{json}")?;
    } else {
        writeln!(out, "{}", format_inspection(&inspection))?;
    }
    out.flush()?;

    Ok(0)
}
