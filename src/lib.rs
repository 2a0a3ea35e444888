//! # EasyFrame
//!
//! Batch-add solid borders to photos. A photo is framed either by a fixed
//! border size (pixels or percentages per side) or by fitting it into an
//! output canvas with a minimum margin, then saved next to the original.
//!
//! # Architecture
//!
//! ```text
//! inputs ─▶ collect_inputs ─▶ plan (layout) ─▶ derive output path ─▶ frame (imaging)
//!                                  ▲
//!             profile + overrides ─┘ mode::resolve
//! ```
//!
//! The geometry lives in [`layout`], which is pure arithmetic on dimensions and
//! never touches pixels. [`imaging`] applies a finished plan through the
//! [`imaging::ImageBackend`] trait, so every higher layer can be tested with a
//! mock backend that records operations instead of decoding images.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`layout`] | Border arithmetic: fixed borders, fit-to-canvas, size spec parsing |
//! | [`imaging`] | Decode, resize, pad and encode through a swappable backend |
//! | [`profile`] | Named frame settings stored as JSON, validated into a layout spec |
//! | [`mode`] | Chooses between command-line overrides and the profile |
//! | [`naming`] | Output file names from patterns, with collision suffixes |
//! | [`process`] | Input collection and the parallel batch driver |
//! | [`config`] | `settings.toml`: active profile, mode priority, workers, logging |
//! | [`logging`] | `tracing` subscriber for stderr and the rotated log file |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Even Borders
//!
//! Fixed borders are rounded up to even numbers so a framed image keeps even
//! dimensions, which chroma-subsampled encoders prefer. In fit-to-canvas mode
//! the canvas and the resized photo are both even and the leftover is split
//! equally between opposite sides, so one side may still be odd: a 1062px
//! photo on a 1080px canvas gets 9px on each side.
//!
//! ## Percentages
//!
//! A lone `5%` means five percent of the image's longer side on every border,
//! so a portrait and a landscape shot of the same size get the same frame.
//! With two or four values, left/right resolve against the width and
//! top/bottom against the height.
//!
//! ## Never Destroy a Source
//!
//! Output names are derived from a pattern next to the source. An existing
//! file gets a numbered suffix instead of being replaced, unless overwriting
//! is explicitly enabled.

pub mod config;
pub mod imaging;
pub mod layout;
pub mod logging;
pub mod mode;
pub mod naming;
pub mod output;
pub mod process;
pub mod profile;

#[cfg(test)]
pub(crate) mod test_helpers;
