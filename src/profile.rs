//! Named framing profiles.
//!
//! A profile is one JSON file under `<settings>/profiles/`, holding everything
//! needed to frame a batch: the mode, the size setting for that mode, the
//! border color, and how output files are named.
//!
//! ```json
//! {
//!   "mode": "output_size",
//!   "border_color": [255, 255, 255],
//!   "output_size": [1080, 1350],
//!   "min_border": 16,
//!   "output_pattern": "{filename}_insta.{ext}",
//!   "overwrite": false
//! }
//! ```
//!
//! Size settings are accepted in the loose shapes people write by hand
//! (`20`, `"5%"`, `"10,5%"`, `["10", "5%"]`, `[1080, 1350]`) and turned into
//! typed layout values by [`Profile::frame_mode`]. Missing optional keys fall
//! back to defaults; the size key the chosen mode needs does not.

use crate::imaging::{BorderColor, Quality};
use crate::layout::{BorderSpec, CanvasTarget, FitToCanvas, FixedBorder, LayoutError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Profile used when nothing else is selected. Always present on disk.
pub const DEFAULT_PROFILE: &str = "basic_profile";

pub const DEFAULT_OUTPUT_PATTERN: &str = "{filename}_processed.{ext}";

const PROFILES_DIR: &str = "profiles";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Profile '{name}' is not valid JSON: {source}")]
    Parse {
        name: String,
        source: serde_json::Error,
    },
    #[error("Failed to serialize profile: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Profile '{0}' not found")]
    NotFound(String),
    #[error("Profile '{0}' already exists")]
    AlreadyExists(String),
    #[error("Invalid profile name '{0}'")]
    InvalidName(String),
    #[error("The default profile '{0}' cannot be deleted")]
    DeleteDefault(String),
    #[error("Mode {mode} requires '{key}' in the profile")]
    MissingKey { mode: Mode, key: &'static str },
    #[error("Profile '{name}' has quality {quality}, expected 1-100")]
    InvalidQuality { name: String, quality: u8 },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Which of the two layout modes a profile uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    BorderSize,
    OutputSize,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::BorderSize => write!(f, "border_size"),
            Mode::OutputSize => write!(f, "output_size"),
        }
    }
}

/// A size setting as written in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSetting {
    /// `20`
    Pixels(u32),
    /// `"5%"`, `"10,5%"`, `"1080,1350"`
    Text(String),
    /// `["10", "5%"]`, `[1080, 1350]`
    List(Vec<SizeToken>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeToken {
    Pixels(u32),
    Text(String),
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeToken::Pixels(px) => write!(f, "{px}"),
            SizeToken::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

impl SizeSetting {
    /// Normalised comma-separated form, e.g. `"10,5%"`.
    pub fn to_spec_string(&self) -> String {
        match self {
            SizeSetting::Pixels(px) => px.to_string(),
            SizeSetting::Text(s) => s.trim().to_string(),
            SizeSetting::List(tokens) => tokens
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn to_fixed_border(&self) -> Result<FixedBorder, LayoutError> {
        self.to_spec_string().parse()
    }

    pub fn to_canvas_target(&self) -> Result<CanvasTarget, LayoutError> {
        self.to_spec_string().parse()
    }
}

impl fmt::Display for SizeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_spec_string())
    }
}

fn default_pattern() -> String {
    DEFAULT_OUTPUT_PATTERN.to_string()
}

fn default_quality() -> u8 {
    Quality::default().value()
}

/// One profile file. Unknown keys are rejected to catch typos early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub border_color: BorderColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_size: Option<SizeSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_size: Option<SizeSetting>,
    /// Minimum border for `output_size` mode with a canvas target.
    #[serde(default)]
    pub min_border: u32,
    #[serde(default = "default_pattern")]
    pub output_pattern: String,
    #[serde(default, alias = "allow_overwrite")]
    pub overwrite: bool,
    /// JPEG quality (1-100).
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            mode: Mode::BorderSize,
            border_color: BorderColor::WHITE,
            border_size: Some(SizeSetting::Text("5%".into())),
            output_size: Some(SizeSetting::List(vec![
                SizeToken::Pixels(1080),
                SizeToken::Pixels(1080),
            ])),
            min_border: 0,
            output_pattern: default_pattern(),
            overwrite: false,
            quality: default_quality(),
        }
    }
}

impl Profile {
    /// Validate the settings for the selected mode into a layout spec.
    pub fn frame_mode(&self) -> Result<BorderSpec, ProfileError> {
        match self.mode {
            Mode::BorderSize => {
                let size = self.border_size.as_ref().ok_or(ProfileError::MissingKey {
                    mode: self.mode,
                    key: "border_size",
                })?;
                Ok(BorderSpec::Fixed(size.to_fixed_border()?))
            }
            Mode::OutputSize => {
                let size = self.output_size.as_ref().ok_or(ProfileError::MissingKey {
                    mode: self.mode,
                    key: "output_size",
                })?;
                Ok(BorderSpec::FitToCanvas(FitToCanvas::new(
                    size.to_canvas_target()?,
                    self.min_border,
                )))
            }
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Names become file names, so keep them to one plain path component.
pub fn validate_name(name: &str) -> Result<(), ProfileError> {
    let bad = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', ':'])
        || name.chars().any(char::is_control);
    if bad {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Profiles stored as `<dir>/profiles/<name>.json`.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Open the store under `settings_dir`, creating the directory and the
    /// default profile if they are missing.
    pub fn open(settings_dir: &Path) -> Result<Self, ProfileError> {
        let store = Self {
            dir: settings_dir.join(PROFILES_DIR),
        };
        fs::create_dir_all(&store.dir)?;
        if !store.exists(DEFAULT_PROFILE) {
            tracing::info!("creating default profile in {}", store.dir.display());
            store.save(DEFAULT_PROFILE, &Profile::default())?;
        }
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Profile names, sorted.
    pub fn list(&self) -> Result<Vec<String>, ProfileError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<Profile, ProfileError> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        let profile: Profile =
            serde_json::from_str(&content).map_err(|source| ProfileError::Parse {
                name: name.to_string(),
                source,
            })?;
        if !(1..=100).contains(&profile.quality) {
            return Err(ProfileError::InvalidQuality {
                name: name.to_string(),
                quality: profile.quality,
            });
        }
        Ok(profile)
    }

    /// Write (or replace) a profile.
    pub fn save(&self, name: &str, profile: &Profile) -> Result<(), ProfileError> {
        validate_name(name)?;
        let json = serde_json::to_string_pretty(profile)?;
        fs::write(self.path_for(name), json + "\n")?;
        Ok(())
    }

    /// Create a new profile, from `template` or from the defaults.
    pub fn create(&self, name: &str, template: Option<Profile>) -> Result<Profile, ProfileError> {
        validate_name(name)?;
        if self.exists(name) {
            return Err(ProfileError::AlreadyExists(name.to_string()));
        }
        let profile = template.unwrap_or_default();
        self.save(name, &profile)?;
        tracing::info!("created profile {name}");
        Ok(profile)
    }

    pub fn delete(&self, name: &str) -> Result<(), ProfileError> {
        validate_name(name)?;
        if name == DEFAULT_PROFILE {
            return Err(ProfileError::DeleteDefault(name.to_string()));
        }
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        tracing::info!("deleted profile {name}");
        Ok(())
    }
}
