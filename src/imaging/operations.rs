//! High-level image operations.
//!
//! These functions combine the layout engine with backend execution:
//! identify the image, compute its [`FramePlan`], and hand the backend
//! a complete [`FrameParams`].

use super::backend::{BackendError, ImageBackend};
use super::params::{BorderColor, FrameParams, Quality};
use crate::layout::{self, BorderSpec, Dimensions, FramePlan, LayoutError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Identify `source` and compute its plan without touching any pixels.
pub fn plan_frame(
    backend: &impl ImageBackend,
    source: &Path,
    spec: &BorderSpec,
) -> Result<(Dimensions, FramePlan)> {
    let original = backend.identify(source)?;
    let plan = layout::compute_frame_plan(original, spec)?;
    Ok((original, plan))
}

/// Build backend parameters for an already computed plan.
pub fn frame_params(
    source: &Path,
    output: &Path,
    plan: &FramePlan,
    color: BorderColor,
    quality: Quality,
) -> FrameParams {
    FrameParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        resize: plan.resize,
        borders: plan.borders,
        color,
        quality,
    }
}

/// Plan and render one framed image.
pub fn frame_image(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    spec: &BorderSpec,
    color: BorderColor,
    quality: Quality,
) -> Result<(Dimensions, FramePlan)> {
    let (original, plan) = plan_frame(backend, source, spec)?;
    backend.frame(&frame_params(source, output, &plan, color, quality))?;
    Ok((original, plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::layout::{BorderWidths, CanvasTarget, FitToCanvas};

    fn fit(w: u32, h: u32, min_border: u32) -> BorderSpec {
        BorderSpec::FitToCanvas(FitToCanvas::new(
            CanvasTarget::Canvas(Dimensions::new(w, h)),
            min_border,
        ))
    }

    #[test]
    fn plan_frame_identifies_then_plans() {
        let backend = MockBackend::with_dimensions(&[("photo.jpg", 600, 400)]);
        let spec = BorderSpec::Fixed("5%".parse().unwrap());

        let (original, plan) = plan_frame(&backend, Path::new("/in/photo.jpg"), &spec).unwrap();

        assert_eq!(original, Dimensions::new(600, 400));
        assert_eq!(plan.resize, None);
        assert_eq!(plan.borders, BorderWidths::uniform(30));
        // Planning never renders
        assert!(backend.frame_ops().is_empty());
    }

    #[test]
    fn frame_image_passes_plan_to_backend() {
        let backend = MockBackend::with_dimensions(&[("wide.jpg", 1000, 500)]);

        frame_image(
            &backend,
            Path::new("/in/wide.jpg"),
            Path::new("/in/wide_processed.jpg"),
            &fit(1080, 1080, 8),
            BorderColor::WHITE,
            Quality::new(90),
        )
        .unwrap();

        let ops = backend.frame_ops();
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0],
            RecordedOp::Frame {
                source: "/in/wide.jpg".into(),
                output: "/in/wide_processed.jpg".into(),
                resize: Some(Dimensions::new(1064, 532)),
                borders: BorderWidths::new(8, 274, 8, 274),
                color: [255, 255, 255],
                quality: 90,
            }
        );
    }

    #[test]
    fn frame_image_stops_on_layout_error() {
        let backend = MockBackend::with_dimensions(&[("bad.jpg", 0, 100)]);
        let spec = BorderSpec::Fixed("10".parse().unwrap());

        let result = frame_image(
            &backend,
            Path::new("/bad.jpg"),
            Path::new("/bad_out.jpg"),
            &spec,
            BorderColor::WHITE,
            Quality::default(),
        );

        assert!(matches!(
            result,
            Err(FrameError::Layout(LayoutError::InvalidImageDimensions { .. }))
        ));
        assert!(backend.frame_ops().is_empty());
    }

    #[test]
    fn frame_image_reports_backend_error() {
        let backend = MockBackend::new();
        let spec = BorderSpec::Fixed("10".parse().unwrap());

        let result = frame_image(
            &backend,
            Path::new("/unknown.jpg"),
            Path::new("/out.jpg"),
            &spec,
            BorderColor::WHITE,
            Quality::default(),
        );
        assert!(matches!(result, Err(FrameError::Backend(_))));
    }
}
