//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the framing pipeline
//! needs from a codec: identify (dimensions without a full decode) and frame
//! (decode, optionally resize, pad, encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::params::FrameParams;
use crate::layout::Dimensions;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Output too large for {path}: {reason}")]
    TooLarge { path: String, reason: String },
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared by every rayon worker.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode `params.source`, resize if asked, pad with the border color,
    /// and encode to `params.output`.
    fn frame(&self, params: &FrameParams) -> Result<(), BackendError>;
}
