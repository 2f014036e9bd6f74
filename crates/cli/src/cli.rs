use anyhow::Result;
use clap::Parser;
use cmd_cache_core::{CommandDescriptor, HashAlgorithm};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use crate::commands::{inspect_command, run_command};

/// Cache the stdout, stderr and exit status of a command
#[derive(Parser, Debug)]
#[command(name = "cmd-cache")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Cache directory (default: `cache_dir` from .cmd-cache.json, else .cmd_cache)
    #[arg(long = "cache-directory", value_name = "DIRECTORY")]
    pub cache_directory: Option<PathBuf>,

    /// Depending file (e.g. prog.h); may be repeated
    #[arg(long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Depending environment variable (e.g. LD_LIBRARY_PATH); may be repeated
    #[arg(long = "env", value_name = "ENV")]
    pub envs: Vec<OsString>,

    /// Text affecting the command; may be repeated
    #[arg(long = "text", value_name = "TEXT", allow_hyphen_values = true)]
    pub texts: Vec<OsString>,

    /// Digest used for cache keys: sha1 or sha256 (default: `algorithm` from .cmd-cache.json, else sha1)
    #[arg(long = "algorithm", value_name = "ALGORITHM")]
    pub algorithm: Option<HashAlgorithm>,

    /// Show the cache key and entry state without running or replaying
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// Print the dry-run report as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// The real command and its arguments (after --)
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<OsString>,
}

impl Cli {
    pub fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            command: self.command.clone(),
            texts: self.texts.clone(),
            env_names: self.envs.clone(),
            file_paths: self.files.clone(),
        }
    }

    /// Execute the invocation and return the exit status to terminate with
    pub fn execute<O, E>(self, out: O, err: E) -> Result<i32>
    where
        O: Write + Send,
        E: Write + Send,
    {
        if self.dry_run {
            inspect_command(&self, out)
        } else {
            run_command(&self, out, err)
        }
    }
}
