use crate::error::{Error, Result};
use crate::fingerprint::command_line;
use crate::tee::Tee;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

/// How much of an entry is present on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// All three artifacts exist and the status parses.
    Complete,
    /// Some artifacts exist but the entry cannot be replayed.
    Partial,
    /// No artifact exists for the key.
    Absent,
}

impl EntryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Complete => "complete",
            EntryState::Partial => "partial",
            EntryState::Absent => "absent",
        }
    }
}

/// The three artifacts recording one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub status_path: PathBuf,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
}

struct ReplaySource {
    status: i32,
    stdout: File,
    stderr: File,
}

impl CacheEntry {
    pub fn new(status_path: PathBuf, stdout_path: PathBuf, stderr_path: PathBuf) -> Self {
        Self {
            status_path,
            stdout_path,
            stderr_path,
        }
    }

    /// Replay the recorded output into `out` and `err`.
    ///
    /// Returns `Ok(None)` when any artifact is missing or the status does not
    /// parse; nothing is written in that case. Errors are only returned when
    /// writing to the caller's streams fails.
    pub fn try_replay<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> Result<Option<i32>> {
        let Some(mut source) = self.open_for_replay() else {
            return Ok(None);
        };

        io::copy(&mut source.stdout, out)?;
        out.flush()?;
        io::copy(&mut source.stderr, err)?;
        err.flush()?;

        debug!(
            "Replayed {} with status {}",
            self.status_path.display(),
            source.status
        );
        Ok(Some(source.status))
    }

    /// Run `command`, forwarding its output live while recording it.
    ///
    /// The status artifact is written only after both output artifacts have
    /// been fully written and synced.
    pub fn run_and_cache<O, E>(&self, command: &[OsString], out: O, err: E) -> Result<i32>
    where
        O: Write + Send,
        E: Write + Send,
    {
        let (program, args) = command.split_first().ok_or(Error::EmptyCommand)?;

        if let Some(dir) = self.status_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| Error::artifact(dir, e))?;
            }
        }
        match fs::remove_file(&self.status_path) {
            Ok(()) => debug!("Removed stale status {}", self.status_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::artifact(&self.status_path, e)),
        }

        let stdout_file = create_artifact(&self.stdout_path)?;
        let stderr_file = create_artifact(&self.stderr_path)?;

        info!("Running: {}", command_line(command));
        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;

        let (child_stdout, child_stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                return Err(Error::Spawn {
                    program: program.to_string_lossy().into_owned(),
                    source: io::Error::other("child output was not captured"),
                });
            }
        };

        // Both pipes are drained while waiting, so a child filling one pipe
        // cannot stall on the other.
        let (status, stdout_file, stderr_file) = thread::scope(|scope| -> Result<_> {
            let stdout_forwarder = scope.spawn(move || forward(child_stdout, stdout_file, out));
            let stderr_forwarder = scope.spawn(move || forward(child_stderr, stderr_file, err));

            let status = child.wait();
            let stdout_file = join_forwarder(stdout_forwarder)?;
            let stderr_file = join_forwarder(stderr_forwarder)?;
            Ok((status?, stdout_file, stderr_file))
        })?;

        stdout_file
            .sync_all()
            .map_err(|e| Error::artifact(&self.stdout_path, e))?;
        stderr_file
            .sync_all()
            .map_err(|e| Error::artifact(&self.stderr_path, e))?;

        let exit_status = match status.code() {
            Some(code) => code,
            None => {
                warn!("`{}` terminated without an exit code ({}), recording 0", program.to_string_lossy(), status);
                0
            }
        };

        fs::write(&self.status_path, exit_status.to_string())
            .map_err(|e| Error::artifact(&self.status_path, e))?;
        debug!(
            "Recorded {} with status {}",
            self.status_path.display(),
            exit_status
        );

        Ok(exit_status)
    }

    /// Inspect the artifacts without replaying them.
    pub fn state(&self) -> EntryState {
        if read_status(&self.status_path).is_some()
            && self.stdout_path.is_file()
            && self.stderr_path.is_file()
        {
            return EntryState::Complete;
        }

        let any_present = [&self.status_path, &self.stdout_path, &self.stderr_path]
            .iter()
            .any(|path| path.exists());
        if any_present {
            EntryState::Partial
        } else {
            EntryState::Absent
        }
    }

    fn open_for_replay(&self) -> Option<ReplaySource> {
        let stdout = open_artifact(&self.stdout_path)?;
        let stderr = open_artifact(&self.stderr_path)?;
        let status = read_status(&self.status_path)?;
        Some(ReplaySource {
            status,
            stdout,
            stderr,
        })
    }
}

fn open_artifact(path: &Path) -> Option<File> {
    match File::open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            debug!("Cache miss: cannot open {}: {}", path.display(), e);
            None
        }
    }
}

fn read_status(path: &Path) -> Option<i32> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            debug!("Cache miss: cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    match text.trim().parse() {
        Ok(status) => Some(status),
        Err(e) => {
            debug!("Cache miss: invalid status in {}: {}", path.display(), e);
            None
        }
    }
}

fn create_artifact(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::artifact(path, e))
}

// Live output is flushed after every chunk, not every line.
fn forward<R: Read, W: Write>(mut source: R, capture: File, live: W) -> io::Result<File> {
    let mut tee = Tee::new(capture, live);
    let mut buf = [0u8; 8192];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        tee.write_all(&buf[..n])?;
        tee.flush()?;
    }
    let (capture, _) = tee.into_inner();
    Ok(capture)
}

fn join_forwarder(handle: thread::ScopedJoinHandle<'_, io::Result<File>>) -> Result<File> {
    match handle.join() {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::IoError(io::Error::other(
            "output forwarding thread panicked",
        ))),
    }
}
