//! Shared test utilities for the easyframe test suite.
//!
//! Synthetic images written straight to disk, plus a settings directory
//! seeded the same way the CLI seeds a fresh one.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_settings_dir();
//! let photo = tmp.path().join("photo.jpg");
//! create_test_jpeg(&photo, 1000, 500);
//! ```

use image::{ImageEncoder, RgbImage, Rgba, RgbaImage};
use std::path::Path;
use tempfile::TempDir;

use crate::config;
use crate::profile::{Profile, ProfileStore};

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a small valid JPEG with a gradient so encoders have something to chew on.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a fully transparent RGBA PNG.
pub fn create_test_png_with_alpha(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 0]));
    img.save(path).unwrap();
}

// =========================================================================
// Settings directory
// =========================================================================

/// Fresh settings directory with `settings.toml` and the default profile.
pub fn setup_settings_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    config::init_settings_dir(tmp.path()).unwrap();
    ProfileStore::open(tmp.path()).unwrap();
    tmp
}

/// Parse a profile from inline JSON. Panics with the serde message on error.
pub fn profile_from_json(json: &str) -> Profile {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("bad test profile {json}: {e}"))
}
