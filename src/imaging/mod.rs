//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | Lanczos3 `resize_exact` |
//! | **Pad** | solid canvas + `imageops::overlay` |
//! | **Encode** | JPEG with quality, PNG/TIFF/WebP lossless |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining the layout engine + backend
//!
//! The geometry itself lives in [`crate::layout`].

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{FrameError, frame_image, plan_frame};
pub use params::{BorderColor, FrameParams, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
