//! Border layout engine: pure geometry, no pixels.
//!
//! Given an image's dimensions and a [`BorderSpec`], the engine works out the
//! four border widths and, in fit-to-canvas mode, the size the image must be
//! resized to first. It performs no I/O and holds no state, so it can be
//! called from any number of worker threads at once.
//!
//! | Mode | Input | Output |
//! |---|---|---|
//! | **Fixed border** | 1, 2 or 4 [`LengthValue`]s | [`BorderWidths`] |
//! | **Fit to canvas** | [`CanvasTarget`] + minimum border | resize [`Dimensions`] + optional [`BorderWidths`] |
//!
//! Every computed length passes through [`round_up_to_even`]; canvas targets
//! are even-rounded before anything else happens.
//!
//! The module is split into:
//! - **Length**: token parsing (`"20"`, `"5%"`, `"1080,1350"`)
//! - **Calculations**: the arithmetic, unit tested without images

mod calculations;
mod length;

pub use calculations::{
    compute_fit_to_canvas, compute_fixed_border, compute_frame_plan, round_up_to_even,
};
pub use length::{CanvasTarget, LengthValue, MAX_LENGTH, parse_border_tokens};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid border size: {0}")]
    InvalidBorderSpec(String),
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },
    #[error("Invalid output size: {0}")]
    InvalidLayoutTarget(String),
    #[error("Both a border size and an output size are set and no mode priority is configured")]
    AmbiguousMode,
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longer_side(self) -> u32 {
        self.width.max(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Border widths in pixels, in CSS order: left, top, right, bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderWidths {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BorderWidths {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(width: u32) -> Self {
        Self::new(width, width, width, width)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Size of `image` once these borders are added, or `None` on overflow.
    pub fn framed_size(&self, image: Dimensions) -> Option<Dimensions> {
        Some(Dimensions::new(
            image.width.checked_add(self.left)?.checked_add(self.right)?,
            image.height.checked_add(self.top)?.checked_add(self.bottom)?,
        ))
    }
}

impl fmt::Display for BorderWidths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Fixed-border mode: border lengths given directly.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBorder {
    /// 1, 2 or 4 values. Parsing checks the count; [`FixedBorder::from_values`]
    /// leaves it to [`compute_fixed_border`].
    pub tokens: Vec<LengthValue>,
}

impl FixedBorder {
    pub fn from_values(tokens: Vec<LengthValue>) -> Self {
        Self { tokens }
    }

    /// Parse each string as one token (`["10", "5%"]`).
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, LayoutError> {
        let tokens = tokens
            .iter()
            .map(|t| t.as_ref().parse::<LengthValue>())
            .collect::<Result<_, _>>()?;
        Ok(Self { tokens })
    }
}

impl FromStr for FixedBorder {
    type Err = LayoutError;

    /// Comma-separated tokens: `"20"`, `"10,5%"`, `"10%,20%,30%,40%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = parse_border_tokens(s)?;
        if !matches!(tokens.len(), 1 | 2 | 4) {
            return Err(LayoutError::InvalidBorderSpec(format!(
                "border size needs 1, 2 or 4 values, got {}",
                tokens.len()
            )));
        }
        Ok(Self { tokens })
    }
}

impl fmt::Display for FixedBorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.tokens.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Fit-to-canvas mode: resize into a target, border fills the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitToCanvas {
    pub target: CanvasTarget,
    /// Minimum border on every side. Ignored for [`CanvasTarget::LongerSide`].
    pub min_border: u32,
}

impl FitToCanvas {
    pub fn new(target: CanvasTarget, min_border: u32) -> Self {
        Self { target, min_border }
    }
}

/// Exactly one border mode per invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum BorderSpec {
    Fixed(FixedBorder),
    FitToCanvas(FitToCanvas),
}

impl fmt::Display for BorderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorderSpec::Fixed(fixed) => write!(f, "border {fixed}"),
            BorderSpec::FitToCanvas(fit) => match fit.target {
                CanvasTarget::Canvas(_) => {
                    write!(f, "fit {} (min border {})", fit.target, fit.min_border)
                }
                CanvasTarget::LongerSide(_) => write!(f, "longer side {}", fit.target),
            },
        }
    }
}

/// What to do to one image: optional resize, then pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePlan {
    pub resize: Option<Dimensions>,
    pub borders: BorderWidths,
}

impl FramePlan {
    /// Dimensions of the finished image.
    ///
    /// Plans come out of the engine already checked against overflow.
    pub fn final_dimensions(&self, original: Dimensions) -> Dimensions {
        let base = self.resize.unwrap_or(original);
        Dimensions::new(
            base.width + self.borders.left + self.borders.right,
            base.height + self.borders.top + self.borders.bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(1080, 1350).to_string(), "1080x1350");
    }

    #[test]
    fn longer_side_picks_max() {
        assert_eq!(Dimensions::new(600, 900).longer_side(), 900);
        assert_eq!(Dimensions::new(900, 600).longer_side(), 900);
    }

    #[test]
    fn framed_size_adds_borders() {
        let b = BorderWidths::new(1, 2, 3, 4);
        assert_eq!(
            b.framed_size(Dimensions::new(10, 10)),
            Some(Dimensions::new(14, 16))
        );
    }

    #[test]
    fn framed_size_detects_overflow() {
        let b = BorderWidths::uniform(u32::MAX / 2 + 1);
        assert_eq!(b.framed_size(Dimensions::new(1, 1)), None);
    }

    #[test]
    fn fixed_border_from_token_list() {
        let spec = FixedBorder::from_tokens(&["10", "5%"]).unwrap();
        assert_eq!(spec.to_string(), "10,5%");
        assert!(FixedBorder::from_tokens(&["10", "x"]).is_err());
    }

    #[test]
    fn fixed_border_parse_checks_count() {
        assert!("1,2,3".parse::<FixedBorder>().is_err());
        assert!("1,2,3,4,5".parse::<FixedBorder>().is_err());
        assert_eq!("1,2,3,4".parse::<FixedBorder>().unwrap().tokens.len(), 4);
    }

    #[test]
    fn border_spec_display() {
        let fixed = BorderSpec::Fixed("5%".parse().unwrap());
        assert_eq!(fixed.to_string(), "border 5%");
        let fit = BorderSpec::FitToCanvas(FitToCanvas::new(
            CanvasTarget::Canvas(Dimensions::new(1080, 1080)),
            8,
        ));
        assert_eq!(fit.to_string(), "fit 1080x1080 (min border 8)");
    }

    #[test]
    fn layout_error_messages() {
        let err = LayoutError::InvalidImageDimensions {
            width: 0,
            height: 5,
        };
        assert_eq!(err.to_string(), "Invalid image dimensions: 0x5");
        assert!(LayoutError::AmbiguousMode.to_string().contains("priority"));
    }
}
