//! Picking the layout mode for one invocation.
//!
//! The profile names a mode, but command-line overrides can ask for either
//! mode on top of it. Exactly one [`BorderSpec`] reaches the engine:
//!
//! | Overrides given | Result |
//! |---|---|
//! | none | the profile's own mode |
//! | border size only | fixed border |
//! | output size only | fit to canvas (min border from override, else profile) |
//! | both | whichever [`ModePriority`] names, else [`LayoutError::AmbiguousMode`] |

use crate::layout::{BorderSpec, CanvasTarget, FitToCanvas, FixedBorder, LayoutError};
use crate::profile::{Profile, ProfileError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which mode wins when both size overrides are given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePriority {
    /// Refuse to guess.
    None,
    BorderSize,
    #[default]
    OutputSize,
}

impl fmt::Display for ModePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModePriority::None => write!(f, "none"),
            ModePriority::BorderSize => write!(f, "border_size"),
            ModePriority::OutputSize => write!(f, "output_size"),
        }
    }
}

/// Size settings supplied for this run only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeOverrides {
    pub border_size: Option<FixedBorder>,
    pub output_size: Option<CanvasTarget>,
    pub min_border: Option<u32>,
}

impl ModeOverrides {
    pub fn is_empty(&self) -> bool {
        self.border_size.is_none() && self.output_size.is_none() && self.min_border.is_none()
    }
}

/// Decide between the two size overrides alone.
///
/// Returns `Ok(None)` when neither is set. `fallback_min_border` is used when
/// an output size is chosen without its own minimum border.
pub fn arbitrate(
    overrides: &ModeOverrides,
    priority: ModePriority,
    fallback_min_border: u32,
) -> Result<Option<BorderSpec>, LayoutError> {
    let fixed = || overrides.border_size.clone().map(BorderSpec::Fixed);
    let fit = || {
        overrides.output_size.map(|target| {
            BorderSpec::FitToCanvas(FitToCanvas::new(
                target,
                overrides.min_border.unwrap_or(fallback_min_border),
            ))
        })
    };

    match (&overrides.border_size, &overrides.output_size) {
        (Some(_), Some(_)) => match priority {
            ModePriority::BorderSize => Ok(fixed()),
            ModePriority::OutputSize => Ok(fit()),
            ModePriority::None => Err(LayoutError::AmbiguousMode),
        },
        (Some(_), None) => Ok(fixed()),
        (None, Some(_)) => Ok(fit()),
        (None, None) => Ok(None),
    }
}

/// The border spec for this run: overrides first, then the profile.
///
/// A lone `min_border` override adjusts a profile that is already in
/// output-size mode and is ignored otherwise.
pub fn resolve(
    overrides: &ModeOverrides,
    profile: &Profile,
    priority: ModePriority,
) -> Result<BorderSpec, ProfileError> {
    if let Some(spec) = arbitrate(overrides, priority, profile.min_border)? {
        tracing::debug!("mode from overrides: {spec}");
        return Ok(spec);
    }

    let spec = match (profile.frame_mode()?, overrides.min_border) {
        (BorderSpec::FitToCanvas(fit), Some(min_border)) => {
            BorderSpec::FitToCanvas(FitToCanvas::new(fit.target, min_border))
        }
        (spec, _) => spec,
    };
    tracing::debug!("mode from profile: {spec}");
    Ok(spec)
}
