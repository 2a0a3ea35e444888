//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides how each image is framed) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`BorderColor`]: solid RGB fill for the border.
//! - [`FrameParams`]: everything needed for one framed output: source, output,
//!   optional resize, border widths, color, quality.

use crate::layout::{BorderWidths, Dimensions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Border fill color, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BorderColor(pub [u8; 3]);

impl BorderColor {
    pub const WHITE: Self = Self([255, 255, 255]);
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{r},{g},{b}")
    }
}

impl FromStr for BorderColor {
    type Err = String;

    /// `"R,G,B"` with 0–255 components, or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(format!("invalid hex color '{s}'"));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid hex color '{s}'"))
            };
            return Ok(Self([channel(0)?, channel(2)?, channel(4)?]));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(format!("color must be R,G,B, got '{s}'"));
        };
        let channel =
            |c: &str| c.parse::<u8>().map_err(|_| format!("color component '{c}' is not 0-255"));
        Ok(Self([channel(r)?, channel(g)?, channel(b)?]))
    }
}

/// Parameters for a frame operation: optional resize, then pad, then encode.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Resize the decoded image to exactly this size before padding.
    pub resize: Option<Dimensions>,
    pub borders: BorderWidths,
    pub color: BorderColor,
    pub quality: Quality,
}
