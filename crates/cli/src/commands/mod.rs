pub mod inspect;
pub mod run;

pub use inspect::inspect_command;
pub use run::run_command;

use anyhow::{Context, Result};
use cmd_cache_core::{CommandCache, Settings};
use std::path::Path;
use tracing::debug;

use crate::cli::Cli;

/// Build the cache from the flags and the settings file nearest the working directory
pub(crate) fn open_cache(cli: &Cli) -> Result<CommandCache> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    open_cache_from(cli, &cwd)
}

/// Flags take precedence over settings discovered from `start`, which take
/// precedence over the defaults.
pub(crate) fn open_cache_from(cli: &Cli, start: &Path) -> Result<CommandCache> {
    let settings = Settings::discover(start).context("Failed to load settings")?;
    let cache_dir = settings.resolve_cache_dir(cli.cache_directory.as_deref());
    let algorithm = settings.resolve_algorithm(cli.algorithm);
    debug!(
        "Using cache directory {} with {} keys",
        cache_dir.display(),
        algorithm
    );
    Ok(CommandCache::new(cache_dir).with_algorithm(algorithm))
}
