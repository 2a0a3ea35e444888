//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Identify | `image::image_dimensions` (header only) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Pad | `imageops::overlay` onto a solid canvas |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → PNG, TIFF, WebP | `DynamicImage::write_to` (lossless) |
//!
//! Output is encoded in memory and moved into place through a temporary file
//! in the same directory, so a failed encode never leaves a truncated file
//! behind, even when the output replaces the source.

use super::backend::{BackendError, ImageBackend};
use super::params::{BorderColor, FrameParams};
use crate::layout::Dimensions;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::LazyLock;
use tempfile::NamedTempFile;

/// Largest canvas the backend will allocate, in pixels (2 GiB as RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 29;

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Largest width or height the encoder for `format` accepts.
fn max_side(format: ImageFormat) -> u32 {
    match format {
        ImageFormat::Jpeg => u32::from(u16::MAX),
        ImageFormat::WebP => 16383,
        _ => u32::MAX,
    }
}

/// Reject a canvas that the encoder cannot write or that would not fit in
/// memory.
fn check_canvas(canvas: Dimensions, format: ImageFormat, path: &Path) -> Result<(), BackendError> {
    let too_large = |reason: String| BackendError::TooLarge {
        path: path.display().to_string(),
        reason,
    };
    let limit = max_side(format);
    if canvas.longer_side() > limit {
        return Err(too_large(format!(
            "{canvas} exceeds the {format:?} limit of {limit}px per side"
        )));
    }
    match u64::from(canvas.width).checked_mul(u64::from(canvas.height)) {
        Some(pixels) if pixels <= MAX_CANVAS_PIXELS => Ok(()),
        _ => Err(too_large(format!(
            "{canvas} exceeds {MAX_CANVAS_PIXELS} pixels"
        ))),
    }
}

/// Output format for a path, chosen from its extension (case-insensitive).
pub fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    PHOTO_CANDIDATES
        .iter()
        .find(|(candidate, fmt)| *candidate == ext && fmt.writing_enabled())
        .map(|(_, fmt)| *fmt)
        .ok_or(BackendError::UnsupportedFormat(ext))
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Place `img` on a canvas of `canvas` size filled with `color`, top-left at
/// (`left`, `top`). Transparent source pixels blend into the border color.
fn pad(img: &DynamicImage, canvas: Dimensions, left: u32, top: u32, color: BorderColor) -> DynamicImage {
    let [r, g, b] = color.0;
    let mut background = RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([r, g, b, 255]));
    imageops::overlay(&mut background, &img.to_rgba8(), i64::from(left), i64::from(top));
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(background).to_rgb8())
}

/// Encode `img` to `path`, format from the extension.
///
/// The file at `path` is only replaced once the encode has succeeded.
fn save_image(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let format = output_format(path)?;
    let encode_err = |e: image::ImageError| BackendError::Encode {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            img.write_with_encoder(encoder).map_err(encode_err)?;
        }
        other => img.write_to(&mut buf, other).map_err(encode_err)?,
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(buf.get_ref())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn frame(&self, params: &FrameParams) -> Result<(), BackendError> {
        // Fail on a bad extension or an impossible canvas before paying for
        // the decode
        let format = output_format(&params.output)?;
        let inner = match params.resize {
            Some(size) => size,
            None => self.identify(&params.source)?,
        };
        let canvas = params
            .borders
            .framed_size(inner)
            .ok_or_else(|| BackendError::TooLarge {
                path: params.output.display().to_string(),
                reason: format!("{inner} plus borders {} overflows", params.borders),
            })?;
        check_canvas(canvas, format, &params.output)?;

        let img = load_image(&params.source)?;
        let img = match params.resize {
            Some(size) => img.resize_exact(size.width, size.height, FilterType::Lanczos3),
            None => img,
        };

        let framed = pad(&img, canvas, params.borders.left, params.borders.top, params.color);
        save_image(&framed, &params.output, params.quality.value())
    }
}
