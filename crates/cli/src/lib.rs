//! cmd-cache command-line interface
//!
//! The binary is a thin wrapper around [`run`]; the final exit status is
//! handed to an injectable termination callback so the whole invocation can
//! be driven from tests without exiting the test process.
pub mod cli;
pub mod commands;
pub mod display;

// Re-export commonly used items
pub use cli::Cli;

use clap::Parser;
use std::ffi::OsString;
use std::io::{self, Write};

/// Parse `args`, run or replay the command, and pass the exit status to `terminate`
pub fn run<I, T, F>(args: I, terminate: F)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(i32),
{
    run_with(args, io::stdout(), io::stderr(), terminate)
}

/// Like [`run`], with explicit output streams
pub fn run_with<I, T, O, E, F>(args: I, mut out: O, mut err: E, terminate: F)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    O: Write + Send,
    E: Write + Send,
    F: FnOnce(i32),
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here, with exit code 0
            let rendered = e.render().to_string();
            let stream: &mut dyn Write = if e.use_stderr() { &mut err } else { &mut out };
            let _ = stream.write_all(rendered.as_bytes());
            let _ = stream.flush();
            terminate(e.exit_code());
            return;
        }
    };

    match cli.execute(&mut out, &mut err) {
        Ok(status) => terminate(status),
        Err(e) => {
            let _ = writeln!(err, "Error: {e:#}");
            let _ = err.flush();
            terminate(1);
        }
    }
}
