//! User settings module.
//!
//! Handles locating the settings directory and loading, validating, merging,
//! and updating its `settings.toml`. Stock defaults are the base layer; the
//! user file only needs the keys it wants to change.
//!
//! ## Settings Directory
//!
//! ```text
//! $EASYFRAME_HOME, or the platform default:
//!   macOS    ~/Library/Application Support/EasyFrame
//!   Windows  %APPDATA%\EasyFrame
//!   other    ~/.easyframe
//! ├── settings.toml       # This module
//! ├── profiles/           # One JSON file per profile (see `profile`)
//! └── logs/app.log        # Rotated at startup (see `logging`)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! active_profile = "basic_profile"  # Profile used when --profile is not given
//!
//! [mode]
//! priority = "output_size"  # Winner when both size overrides are given: none | border_size | output_size
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [logging]
//! file = true               # Also log to logs/app.log
//! max_bytes = 5242880       # Rotate app.log at startup when larger than this
//! backups = 3               # Rotated files to keep (app.log.1 .. app.log.N)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::mode::ModePriority;
use crate::profile::{self, DEFAULT_PROFILE};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_FILE: &str = "settings.toml";

/// Environment variable that overrides the settings directory.
pub const HOME_ENV: &str = "EASYFRAME_HOME";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Cannot locate a settings directory; set {HOME_ENV} or pass --settings-dir")]
    NoSettingsDir,
}

/// Settings loaded from `settings.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Profile used when none is named on the command line.
    pub active_profile: String,
    /// Mode arbitration.
    pub mode: ModeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Log file settings.
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_profile: DEFAULT_PROFILE.to_string(),
            mode: ModeConfig::default(),
            processing: ProcessingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if profile::validate_name(&self.active_profile).is_err() {
            return Err(ConfigError::Validation(format!(
                "active_profile '{}' is not a valid profile name",
                self.active_profile
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.logging.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "logging.max_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModeConfig {
    /// Which mode wins when both a border size and an output size are given.
    pub priority: ModePriority,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Write `logs/app.log` in addition to stderr.
    pub file: bool,
    /// Size above which the log is rotated at startup.
    pub max_bytes: u64,
    /// Rotated files kept next to the live log.
    pub backups: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            max_bytes: 5 * 1024 * 1024,
            backups: 3,
        }
    }
}

// =========================================================================
// Settings directory
// =========================================================================

/// Platform default settings directory, from environment lookups.
///
/// Takes the lookup as a parameter so tests need not touch the process env.
pub fn settings_dir_from(env: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if let Some(dir) = env(HOME_ENV).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if cfg!(windows) {
        return env("APPDATA").map(|d| PathBuf::from(d).join("EasyFrame"));
    }
    let home = PathBuf::from(env("HOME")?);
    if cfg!(target_os = "macos") {
        Some(home.join("Library/Application Support/EasyFrame"))
    } else {
        Some(home.join(".easyframe"))
    }
}

/// The settings directory: explicit path first, then the environment.
pub fn resolve_settings_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => settings_dir_from(|key| std::env::var_os(key)).ok_or(ConfigError::NoSettingsDir),
    }
}

/// Create the settings directory and a documented `settings.toml` if missing.
pub fn init_settings_dir(dir: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        tracing::info!("writing default settings to {}", path.display());
        fs::write(path, stock_config_toml())?;
    }
    Ok(())
}

// =========================================================================
// Loading
// =========================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `settings.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `settings.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(SETTINGS_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Settings = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load settings from `settings.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<Settings, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Record `name` as the active profile, keeping every other user key.
///
/// Comments in an existing file are not preserved.
pub fn set_active_profile(dir: &Path, name: &str) -> Result<(), ConfigError> {
    let mut value = load_raw_config(dir)?.unwrap_or_else(|| toml::Value::Table(Default::default()));
    let toml::Value::Table(table) = &mut value else {
        return Err(ConfigError::Validation(format!("{SETTINGS_FILE} is not a table")));
    };
    table.insert(
        "active_profile".to_string(),
        toml::Value::String(name.to_string()),
    );

    // Validate before writing so a bad name never reaches disk
    resolve_config(stock_defaults_value(), Some(value.clone()))?;
    fs::create_dir_all(dir)?;
    fs::write(dir.join(SETTINGS_FILE), toml::to_string(&value)?)?;
    tracing::info!("active profile is now {name}");
    Ok(())
}

/// Returns a fully-commented stock `settings.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command and to seed a new settings directory.
pub fn stock_config_toml() -> &'static str {
    r##"# EasyFrame Settings
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Profile used when --profile is not given.
# Profiles live in the profiles/ directory next to this file.
active_profile = "basic_profile"

# ---------------------------------------------------------------------------
# Mode selection
# ---------------------------------------------------------------------------
[mode]
# Which mode wins when both --border-size and --output-size are given:
#   "output_size"  fit into the output size, border fills the rest
#   "border_size"  add the given border
#   "none"         refuse and report the conflict
priority = "output_size"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# Also write logs/app.log (debug level) in addition to stderr.
file = true

# Rotate app.log at startup once it is larger than this many bytes.
max_bytes = 5242880

# Rotated logs to keep: app.log.1 is the newest.
backups = 3
"##
}
