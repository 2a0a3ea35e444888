//! Border-size and canvas-size tokens.
//!
//! Size settings arrive as loosely formatted text (`"20"`, `"5%"`,
//! `"10,5%"`, `"1080,1350"`). They are parsed here exactly once into typed
//! values; nothing downstream looks at the strings again.

use super::{Dimensions, LayoutError};
use std::fmt;
use std::str::FromStr;

/// Largest pixel length accepted from a token or a resolved percentage.
///
/// Keeps every later `round_up_to_even` and border sum inside `u32`.
pub const MAX_LENGTH: u32 = i32::MAX as u32;

/// A single border length: absolute pixels or a percentage of a reference axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthValue {
    /// Exact pixel count.
    Absolute(u32),
    /// Percentage of the reference dimension, e.g. `5.0` for `"5%"`.
    Percentage(f64),
}

impl LengthValue {
    /// Resolve to pixels against `reference`, truncating fractional pixels.
    ///
    /// Multiplies before dividing by 100, so a whole percentage of a pixel
    /// count floors exactly (29% of 100 is 29; `0.29 * 100.0` would give 28).
    /// Fractional percentages still go through `f64` and can land a pixel low.
    ///
    /// The result is *not* even-rounded; that happens in the engine.
    pub fn resolve(self, reference: u32) -> Result<u32, LayoutError> {
        match self {
            LengthValue::Absolute(px) => Ok(px),
            LengthValue::Percentage(pct) => {
                let px = (pct * reference as f64 / 100.0).floor();
                if px > MAX_LENGTH as f64 {
                    return Err(LayoutError::InvalidBorderSpec(format!(
                        "{self} of {reference}px is too large"
                    )));
                }
                Ok(px as u32)
            }
        }
    }
}

impl fmt::Display for LengthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthValue::Absolute(px) => write!(f, "{px}"),
            LengthValue::Percentage(pct) => write!(f, "{pct}%"),
        }
    }
}

impl FromStr for LengthValue {
    type Err = LayoutError;

    /// Accepts `"<digits>"` or `"<decimal>%"`, surrounding whitespace ignored.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let invalid = || LayoutError::InvalidBorderSpec(format!("invalid border value '{token}'"));

        if let Some(number) = token.strip_suffix('%') {
            if !is_plain_decimal(number) {
                return Err(invalid());
            }
            let pct: f64 = number.parse().map_err(|_| invalid())?;
            return Ok(LengthValue::Percentage(pct));
        }

        Ok(LengthValue::Absolute(parse_pixels(token).ok_or_else(invalid)?))
    }
}

/// `digits` or `digits.digits` (either side may be empty, not both).
/// Rejects signs, exponents, `inf` and `NaN`, which `f64::from_str` would accept.
fn is_plain_decimal(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    !(int.is_empty() && frac.is_empty()) && all_digits(int) && all_digits(frac)
}

/// Parse a non-negative integer pixel count no larger than [`MAX_LENGTH`].
fn parse_pixels(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().filter(|&px| px <= MAX_LENGTH)
}

/// Split a comma-separated border spec into length tokens.
///
/// Token *count* is not checked here: `compute_fixed_border` owns that rule so
/// specs built from arrays are validated the same way.
pub fn parse_border_tokens(spec: &str) -> Result<Vec<LengthValue>, LayoutError> {
    if spec.trim().is_empty() {
        return Err(LayoutError::InvalidBorderSpec("empty border size".into()));
    }
    spec.split(',').map(LengthValue::from_str).collect()
}

/// Target of fit-to-canvas mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasTarget {
    /// Scale so the longer image side becomes this many pixels. No border.
    LongerSide(u32),
    /// Fixed output canvas; the border fills whatever the image does not.
    Canvas(Dimensions),
}

impl fmt::Display for CanvasTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasTarget::LongerSide(side) => write!(f, "{side}"),
            CanvasTarget::Canvas(dims) => write!(f, "{dims}"),
        }
    }
}

impl FromStr for CanvasTarget {
    type Err = LayoutError;

    /// `"1080"` is a longer-side target; `"1080,1350"` and `"1080x1350"` are canvases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LayoutError::InvalidLayoutTarget(format!("invalid output size '{s}'"));
        let parts: Vec<&str> = s.split([',', 'x', 'X']).map(str::trim).collect();
        match parts.as_slice() {
            [side] => Ok(CanvasTarget::LongerSide(parse_pixels(side).ok_or_else(invalid)?)),
            [w, h] => Ok(CanvasTarget::Canvas(Dimensions::new(
                parse_pixels(w).ok_or_else(invalid)?,
                parse_pixels(h).ok_or_else(invalid)?,
            ))),
            _ => Err(invalid()),
        }
    }
}
