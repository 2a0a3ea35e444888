//! Logging setup.
//!
//! Two sinks: stderr, at a level picked by `-q`/`-v`, and `logs/app.log` under
//! the settings directory at debug level without ANSI colors. Per-file results
//! go to stdout through [`crate::output`], so stderr stays quiet by default.
//!
//! The log file is rotated once at startup, not while running:
//!
//! ```text
//! app.log   → app.log.1 → app.log.2 → app.log.3 → (dropped)
//! ```

use crate::config::LoggingConfig;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "app.log";

/// Stderr filter for the `-q` / `-v` flags.
pub fn stderr_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn backup_path(path: &Path, n: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

/// Shift `path` into numbered backups if it is larger than `max_bytes`.
///
/// Returns whether a rotation happened. With `backups == 0` the file is
/// simply removed.
pub fn rotate_log(path: &Path, max_bytes: u64, backups: usize) -> io::Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size <= max_bytes {
        return Ok(false);
    }

    if backups == 0 {
        fs::remove_file(path)?;
        return Ok(true);
    }

    let oldest = backup_path(path, backups);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..backups).rev() {
        let from = backup_path(path, n);
        if from.exists() {
            fs::rename(&from, backup_path(path, n + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;
    Ok(true)
}

/// Rotate if needed and open `<settings>/logs/app.log` for appending.
pub fn open_log_file(settings_dir: &Path, config: &LoggingConfig) -> io::Result<File> {
    let dir = settings_dir.join(LOG_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE);
    rotate_log(&path, config.max_bytes, config.backups)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(quiet: bool, verbose: u8, log_file: Option<File>) {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(EnvFilter::new(stderr_level(quiet, verbose)));

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(LevelFilter::DEBUG)
    });

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}
