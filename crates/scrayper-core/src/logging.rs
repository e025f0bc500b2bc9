//! Logging init: console plus a per-run log file, or stdout alone as fallback.
//!
//! The run log is created in the working directory under a timestamped name
//! and moved into the configured log directory when the run ends.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,scrayper_core=debug,scrayper=debug";

/// Timestamp layout of run log names.
pub const LOG_NAME_LAYOUT: &str = "%Y-%m-%d_%H:%M:%S";

/// Writer that is either the run log file or stdout (used when file clone fails).
enum FileOrStdout {
    File(fs::File),
    Stdout,
}

impl io::Write for FileOrStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStdout::File(f) => f.write(buf),
            FileOrStdout::Stdout => io::stdout().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStdout::File(f) => f.flush(),
            FileOrStdout::Stdout => io::stdout().lock().flush(),
        }
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStdout;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStdout::File)
            .unwrap_or(FileOrStdout::Stdout)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Name of the run log for a run started at `started`.
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("{}.log", started.format(LOG_NAME_LAYOUT))
}

/// The log file of the current run.
///
/// Once a destination is set, the file is moved there by [`RunLog::finish`],
/// or on drop if the run ended before reaching it.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    destination: Option<PathBuf>,
    finished: bool,
}

impl RunLog {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            destination: None,
            finished: false,
        }
    }

    /// Current location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the log is moved into at the end of the run.
    pub fn set_destination(&mut self, log_dir: &Path) {
        self.destination = Some(log_dir.to_path_buf());
    }

    /// Move the log into its destination and return the new path.
    /// Without a destination the file stays where it is.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.relocate()
    }

    fn relocate(&mut self) -> Result<PathBuf> {
        self.finished = true;
        let Some(log_dir) = self.destination.as_deref() else {
            return Ok(self.path.clone());
        };
        fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
        let file_name = self
            .path
            .file_name()
            .context("run log path has no file name")?;
        let target = log_dir.join(file_name);
        fs::rename(&self.path, &target).with_context(|| {
            format!(
                "failed to move log {} to {}",
                self.path.display(),
                target.display()
            )
        })?;
        self.path = target.clone();
        tracing::info!("[OK] finished writing logs to {}", target.display());
        Ok(target)
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.relocate() {
                tracing::warn!("could not relocate run log: {:#}", e);
            }
        }
    }
}

/// Install console and run-log-file logging. The file is created in `dir`
/// as `{timestamp}.log`.
/// On failure (e.g. dir unwritable), returns Err so the caller can fall back to stdout.
pub fn init_run_logging(dir: &Path) -> Result<RunLog> {
    let path = dir.join(log_file_name(Local::now()));
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to create run log {}", path.display()))?;

    let file_writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stdout))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::debug!("run log at {}", path.display());
    Ok(RunLog::new(path))
}

/// Initialize logging to stdout only (no file). Use when init_run_logging() fails so the CLI doesn't crash.
pub fn init_logging_stdout() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stdout)
        .try_init();
}
