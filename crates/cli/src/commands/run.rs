use anyhow::{Context, Result};
use cmd_cache_core::fingerprint::command_line;
use std::io::Write;
use tracing::{debug, info};

use super::open_cache;
use crate::cli::Cli;

pub fn run_command<O, E>(cli: &Cli, out: O, err: E) -> Result<i32>
where
    O: Write + Send,
    E: Write + Send,
{
    let cache = open_cache(cli)?;
    let descriptor = cli.descriptor();

    let outcome = cache
        .execute(&descriptor, out, err)
        .with_context(|| format!("Failed to run `{}` through the cache", command_line(&cli.command)))?;

    if outcome.replayed {
        info!("Replayed {} (exit status {})", outcome.key, outcome.exit_status);
    } else {
        debug!("Recorded {} (exit status {})", outcome.key, outcome.exit_status);
    }

    Ok(outcome.exit_status)
}
