//! Pure border and resize arithmetic.
//!
//! All functions here are pure and testable without any I/O or images.
//! Scale factors are kept as exact fractions so `floor(size * scale)` never
//! lands one pixel short because of float rounding.

use super::length::MAX_LENGTH;
use super::{BorderSpec, BorderWidths, CanvasTarget, Dimensions, FitToCanvas, FixedBorder};
use super::{FramePlan, LayoutError, LengthValue};

/// Round up to the nearest even integer: `n` if even, else `n + 1`.
///
/// Applied at every rounding point so final canvases stay even-sized, which
/// chroma-subsampled encoders prefer. The engine only calls it with values up
/// to [`MAX_LENGTH`], so the result always fits in `u32`.
///
/// # Examples
/// ```
/// # use easyframe::layout::round_up_to_even;
/// assert_eq!(round_up_to_even(10), 10);
/// assert_eq!(round_up_to_even(11), 12);
/// assert_eq!(round_up_to_even(0), 0);
/// ```
pub const fn round_up_to_even(n: u32) -> u32 {
    n + (n & 1)
}

fn ensure_positive(image: Dimensions) -> Result<(), LayoutError> {
    if image.width == 0 || image.height == 0 {
        return Err(LayoutError::InvalidImageDimensions {
            width: image.width,
            height: image.height,
        });
    }
    Ok(())
}

/// Compute fixed border widths from 1, 2, or 4 length tokens.
///
/// - 1 token: all sides, percentages against the longer image side
/// - 2 tokens: `[left/right, top/bottom]`, against width and height
/// - 4 tokens: `[left, top, right, bottom]`, left/right against width,
///   top/bottom against height
///
/// Every side is rounded up to even after resolving.
///
/// # Examples
/// ```
/// # use easyframe::layout::{compute_fixed_border, BorderWidths, Dimensions, FixedBorder};
/// let spec: FixedBorder = "10,5%".parse().unwrap();
/// let borders = compute_fixed_border(Dimensions::new(800, 600), &spec).unwrap();
/// assert_eq!(borders, BorderWidths::new(10, 30, 10, 30));
/// ```
pub fn compute_fixed_border(
    image: Dimensions,
    spec: &FixedBorder,
) -> Result<BorderWidths, LayoutError> {
    ensure_positive(image)?;
    let Dimensions { width, height } = image;
    let even = |value: LengthValue, reference: u32| {
        let px = value.resolve(reference)?;
        if px > MAX_LENGTH {
            return Err(LayoutError::InvalidBorderSpec(format!(
                "border {px} exceeds the maximum of {MAX_LENGTH}px"
            )));
        }
        Ok(round_up_to_even(px))
    };

    let borders = match spec.tokens.as_slice() {
        [all] => BorderWidths::uniform(even(*all, image.longer_side())?),
        [horizontal, vertical] => {
            let x = even(*horizontal, width)?;
            let y = even(*vertical, height)?;
            BorderWidths::new(x, y, x, y)
        }
        [left, top, right, bottom] => BorderWidths::new(
            even(*left, width)?,
            even(*top, height)?,
            even(*right, width)?,
            even(*bottom, height)?,
        ),
        other => {
            return Err(LayoutError::InvalidBorderSpec(format!(
                "border size needs 1, 2 or 4 values, got {}",
                other.len()
            )));
        }
    };

    if borders.framed_size(image).is_none() {
        return Err(LayoutError::InvalidBorderSpec(format!(
            "border {borders} is too large for a {image} image"
        )));
    }
    Ok(borders)
}

/// Exact non-negative scale factor `num / den`.
#[derive(Debug, Clone, Copy)]
struct Scale {
    num: u64,
    den: u64,
}

impl Scale {
    fn is_positive(self) -> bool {
        self.num > 0
    }

    fn min(self, other: Scale) -> Scale {
        // a/b <= c/d  <=>  a*d <= c*b (denominators are positive)
        if self.num as u128 * other.den as u128 <= other.num as u128 * self.den as u128 {
            self
        } else {
            other
        }
    }

    /// `floor(value * scale)`.
    fn apply_floor(self, value: u32) -> u64 {
        (value as u128 * self.num as u128 / self.den as u128) as u64
    }
}

/// Compute the resize (and, for canvas targets, the centering borders) that
/// fits an image into a fit-to-canvas target.
///
/// Canvas targets are rounded up to even first. The scale is the smaller of
/// the two per-axis scales that leave `min_border` on both sides, so neither
/// axis overflows. Resized sides are truncated, then rounded up to even.
///
/// Longer-side targets produce no borders: there is no canvas to center in.
///
/// # Examples
/// ```
/// # use easyframe::layout::*;
/// let spec = FitToCanvas::new(CanvasTarget::Canvas(Dimensions::new(1080, 1080)), 8);
/// let (resize, borders) = compute_fit_to_canvas(Dimensions::new(1000, 500), &spec).unwrap();
/// assert_eq!(resize, Dimensions::new(1064, 532));
/// assert_eq!(borders, Some(BorderWidths::new(8, 274, 8, 274)));
/// ```
pub fn compute_fit_to_canvas(
    image: Dimensions,
    spec: &FitToCanvas,
) -> Result<(Dimensions, Option<BorderWidths>), LayoutError> {
    ensure_positive(image)?;
    ensure_target_in_range(spec.target)?;

    match spec.target {
        CanvasTarget::LongerSide(side) => {
            let scale = Scale {
                num: side as u64,
                den: image.longer_side() as u64,
            };
            if !scale.is_positive() {
                return Err(LayoutError::InvalidLayoutTarget(format!(
                    "longer side {side} leaves no room for the image"
                )));
            }
            let resized = scaled_even(image, scale)?;
            Ok((resized, None))
        }
        CanvasTarget::Canvas(target) => {
            let canvas = Dimensions::new(
                round_up_to_even(target.width),
                round_up_to_even(target.height),
            );
            let margin = 2 * spec.min_border as u64;
            let room_w = (canvas.width as u64).saturating_sub(margin);
            let room_h = (canvas.height as u64).saturating_sub(margin);
            let scale = Scale {
                num: room_w,
                den: image.width as u64,
            }
            .min(Scale {
                num: room_h,
                den: image.height as u64,
            });
            if !scale.is_positive() {
                return Err(LayoutError::InvalidLayoutTarget(format!(
                    "minimum border {} leaves no room inside {canvas}",
                    spec.min_border
                )));
            }

            let resized = scaled_even(image, scale)?;
            if resized.width > canvas.width || resized.height > canvas.height {
                return Err(LayoutError::InvalidLayoutTarget(format!(
                    "resized image {resized} does not fit inside {canvas}"
                )));
            }
            Ok((resized, Some(center_in_canvas(resized, canvas))))
        }
    }
}

fn ensure_target_in_range(target: CanvasTarget) -> Result<(), LayoutError> {
    let longest = match target {
        CanvasTarget::LongerSide(side) => side,
        CanvasTarget::Canvas(canvas) => canvas.longer_side(),
    };
    if longest > MAX_LENGTH {
        return Err(LayoutError::InvalidLayoutTarget(format!(
            "output size {target} exceeds the maximum of {MAX_LENGTH}px"
        )));
    }
    Ok(())
}

/// Scale both sides, truncate, then round each up to even.
fn scaled_even(image: Dimensions, scale: Scale) -> Result<Dimensions, LayoutError> {
    let w = scale.apply_floor(image.width);
    let h = scale.apply_floor(image.height);
    if w == 0 || h == 0 {
        return Err(LayoutError::InvalidLayoutTarget(format!(
            "{image} scales down to nothing ({w}x{h})"
        )));
    }
    if w > MAX_LENGTH as u64 || h > MAX_LENGTH as u64 {
        return Err(LayoutError::InvalidLayoutTarget(format!(
            "{image} scales up past the supported size ({w}x{h})"
        )));
    }
    Ok(Dimensions::new(
        round_up_to_even(w as u32),
        round_up_to_even(h as u32),
    ))
}

/// Split the leftover canvas on each axis; the trailing side takes any odd pixel.
fn center_in_canvas(image: Dimensions, canvas: Dimensions) -> BorderWidths {
    let left = (canvas.width - image.width) / 2;
    let top = (canvas.height - image.height) / 2;
    BorderWidths::new(
        left,
        top,
        canvas.width - image.width - left,
        canvas.height - image.height - top,
    )
}

/// Dispatch a [`BorderSpec`] to the matching computation.
pub fn compute_frame_plan(image: Dimensions, spec: &BorderSpec) -> Result<FramePlan, LayoutError> {
    match spec {
        BorderSpec::Fixed(fixed) => Ok(FramePlan {
            resize: None,
            borders: compute_fixed_border(image, fixed)?,
        }),
        BorderSpec::FitToCanvas(fit) => {
            let (resize, borders) = compute_fit_to_canvas(image, fit)?;
            Ok(FramePlan {
                resize: Some(resize),
                borders: borders.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h)
    }

    fn fixed(spec: &str) -> FixedBorder {
        spec.parse().unwrap()
    }

    fn canvas(w: u32, h: u32, min_border: u32) -> FitToCanvas {
        FitToCanvas::new(CanvasTarget::Canvas(dims(w, h)), min_border)
    }

    // =========================================================================
    // round_up_to_even
    // =========================================================================

    #[test]
    fn even_values_unchanged() {
        for n in [0, 2, 10, 1080] {
            assert_eq!(round_up_to_even(n), n);
        }
    }

    #[test]
    fn odd_values_bumped() {
        assert_eq!(round_up_to_even(1), 2);
        assert_eq!(round_up_to_even(1079), 1080);
    }

    // =========================================================================
    // compute_fixed_border
    // =========================================================================

    #[test]
    fn fixed_single_absolute() {
        let b = compute_fixed_border(dims(800, 600), &fixed("20")).unwrap();
        assert_eq!(b, BorderWidths::uniform(20));
    }

    #[test]
    fn fixed_single_odd_absolute_rounds_up() {
        let b = compute_fixed_border(dims(800, 600), &fixed("7")).unwrap();
        assert_eq!(b, BorderWidths::uniform(8));
    }

    #[test]
    fn fixed_single_percentage_uses_longer_side() {
        // 5% of max(800, 600) = 40
        let b = compute_fixed_border(dims(800, 600), &fixed("5%")).unwrap();
        assert_eq!(b, BorderWidths::uniform(40));
        // Portrait: 5% of 900 = 45 → 46
        let b = compute_fixed_border(dims(600, 900), &fixed("5%")).unwrap();
        assert_eq!(b, BorderWidths::uniform(46));
    }

    #[test]
    fn fixed_two_tokens_mixed_units() {
        let b = compute_fixed_border(dims(800, 600), &fixed("10,5%")).unwrap();
        assert_eq!(b, BorderWidths::new(10, 30, 10, 30));
    }

    #[test]
    fn fixed_four_percentages() {
        let b = compute_fixed_border(dims(800, 600), &fixed("10%,20%,30%,40%")).unwrap();
        assert_eq!(b, BorderWidths::new(80, 120, 240, 240));
    }

    #[test]
    fn fixed_four_tokens_round_each_side() {
        let b = compute_fixed_border(dims(800, 600), &fixed("1,2,3,4")).unwrap();
        assert_eq!(b, BorderWidths::new(2, 2, 4, 4));
    }

    #[test]
    fn fixed_zero_border_allowed() {
        let b = compute_fixed_border(dims(800, 600), &fixed("0")).unwrap();
        assert_eq!(b, BorderWidths::default());
    }

    #[test]
    fn fixed_three_tokens_rejected() {
        let spec = FixedBorder::from_values(vec![LengthValue::Absolute(1); 3]);
        let err = compute_fixed_border(dims(800, 600), &spec).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidBorderSpec(_)));
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn fixed_absolute_above_max_length_rejected() {
        for px in [MAX_LENGTH + 1, u32::MAX] {
            let spec = FixedBorder::from_values(vec![LengthValue::Absolute(px)]);
            let result = compute_fixed_border(dims(800, 600), &spec);
            assert!(
                matches!(result, Err(LayoutError::InvalidBorderSpec(_))),
                "{px} gave {result:?}"
            );
        }
    }

    #[test]
    fn fixed_empty_and_five_tokens_rejected() {
        for n in [0, 3, 5] {
            let spec = FixedBorder::from_values(vec![LengthValue::Absolute(2); n]);
            assert!(compute_fixed_border(dims(10, 10), &spec).is_err(), "{n} tokens");
        }
    }

    #[test]
    fn fixed_malformed_token_rejected() {
        assert!(matches!(
            "abc".parse::<FixedBorder>(),
            Err(LayoutError::InvalidBorderSpec(_))
        ));
        assert!("10,abc".parse::<FixedBorder>().is_err());
    }

    #[test]
    fn fixed_zero_dimension_rejected() {
        let err = compute_fixed_border(dims(0, 600), &fixed("10")).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidImageDimensions {
                width: 0,
                height: 600
            }
        );
    }

    #[test]
    fn fixed_border_overflowing_u32_rejected() {
        let spec = fixed(&format!("{}", MAX_LENGTH - 1));
        let result = compute_fixed_border(dims(10, 10), &spec);
        assert!(matches!(result, Err(LayoutError::InvalidBorderSpec(_))));
    }

    #[test]
    fn fixed_single_percentage_property() {
        for (w, h) in [(1, 1), (800, 600), (601, 333), (4000, 6000), (17, 3)] {
            for p in [0u32, 1, 3, 5, 10, 33, 50, 99, 100, 250] {
                let spec = fixed(&format!("{p}%"));
                let b = compute_fixed_border(dims(w, h), &spec).unwrap();
                let expected = round_up_to_even(p * w.max(h) / 100);
                assert_eq!(b, BorderWidths::uniform(expected), "{w}x{h} {p}%");
            }
        }
    }

    #[test]
    fn fixed_results_always_even() {
        for spec in ["3", "1,1", "7%,13%", "1,3,5,7", "11%,1,9%,3"] {
            let b = compute_fixed_border(dims(1001, 777), &fixed(spec)).unwrap();
            for side in [b.left, b.top, b.right, b.bottom] {
                assert_eq!(side % 2, 0, "{spec} produced {b}");
            }
        }
    }

    #[test]
    fn fixed_is_idempotent() {
        let spec = fixed("10%,3,7%,5");
        let a = compute_fixed_border(dims(1234, 987), &spec).unwrap();
        let b = compute_fixed_border(dims(1234, 987), &spec).unwrap();
        assert_eq!(a, b);
    }

    // =========================================================================
    // compute_fit_to_canvas
    // =========================================================================

    #[test]
    fn fit_landscape_into_square() {
        let (resize, borders) = compute_fit_to_canvas(dims(1000, 500), &canvas(1080, 1080, 8)).unwrap();
        assert_eq!(resize, dims(1064, 532));
        assert_eq!(borders, Some(BorderWidths::new(8, 274, 8, 274)));
    }

    #[test]
    fn fit_portrait_into_square() {
        let (resize, borders) = compute_fit_to_canvas(dims(500, 1000), &canvas(1080, 1080, 8)).unwrap();
        assert_eq!(resize, dims(532, 1064));
        assert_eq!(borders, Some(BorderWidths::new(274, 8, 274, 8)));
    }

    #[test]
    fn fit_odd_target_rounded_up_first() {
        // 1079x1079 becomes 1080x1080 before anything else
        let (resize, borders) = compute_fit_to_canvas(dims(1000, 500), &canvas(1079, 1079, 8)).unwrap();
        assert_eq!(resize, dims(1064, 532));
        let b = borders.unwrap();
        assert_eq!(resize.width + b.left + b.right, 1080);
        assert_eq!(resize.height + b.top + b.bottom, 1080);
    }

    #[test]
    fn fit_truncates_then_rounds_to_even() {
        // 3x2 into 1000x1000: scale = min(1000/3, 1000/2) = 1000/3
        // width = 1000 exactly, height = floor(666.67) = 666
        let (resize, borders) = compute_fit_to_canvas(dims(3, 2), &canvas(1000, 1000, 0)).unwrap();
        assert_eq!(resize, dims(1000, 666));
        assert_eq!(borders, Some(BorderWidths::new(0, 167, 0, 167)));
    }

    #[test]
    fn fit_aspect_shift_is_at_most_one_pixel_per_axis() {
        let image = dims(3001, 2001);
        let (resize, _) = compute_fit_to_canvas(image, &canvas(1080, 1080, 0)).unwrap();
        let exact_h = 2001.0 * 1080.0 / 3001.0;
        assert!((resize.height as f64 - exact_h).abs() <= 1.0 + f64::EPSILON);
        assert_eq!(resize.width, 1080);
    }

    #[test]
    fn fit_upscales_small_images() {
        let (resize, borders) = compute_fit_to_canvas(dims(100, 50), &canvas(1000, 1000, 0)).unwrap();
        assert_eq!(resize, dims(1000, 500));
        assert_eq!(borders, Some(BorderWidths::new(0, 250, 0, 250)));
    }

    #[test]
    fn fit_canvas_invariant_holds() {
        let images = [(1000, 500), (500, 1000), (333, 777), (1, 1), (4032, 3024), (17, 9001)];
        let targets = [(1080, 1080), (1080, 1350), (1920, 1080), (10, 10), (2000, 3)];
        let mut checked = 0;
        for &(w, h) in &images {
            for &(tw, th) in &targets {
                for min_border in [0, 1, 4, 50] {
                    let Ok((resize, Some(b))) =
                        compute_fit_to_canvas(dims(w, h), &canvas(tw, th, min_border))
                    else {
                        continue;
                    };
                    let (cw, ch) = (round_up_to_even(tw), round_up_to_even(th));
                    assert_eq!(resize.width + b.left + b.right, cw);
                    assert_eq!(resize.height + b.top + b.bottom, ch);
                    assert!(b.left <= b.right && b.right - b.left <= 1);
                    assert!(b.top <= b.bottom && b.bottom - b.top <= 1);
                    assert_eq!(b.left, (cw - resize.width) / 2);
                    assert_eq!(b.top, (ch - resize.height) / 2);
                    checked += 1;
                }
            }
        }
        // The first three targets fit every image at every min border
        assert!(checked >= images.len() * 3 * 4, "only {checked} cases checked");
    }

    #[test]
    fn fit_min_border_consuming_canvas_rejected() {
        let result = compute_fit_to_canvas(dims(1000, 500), &canvas(1080, 1080, 540));
        assert!(matches!(result, Err(LayoutError::InvalidLayoutTarget(_))));
        let result = compute_fit_to_canvas(dims(1000, 500), &canvas(1080, 2000, 600));
        assert!(matches!(result, Err(LayoutError::InvalidLayoutTarget(_))));
    }

    #[test]
    fn fit_target_above_max_length_rejected() {
        let huge = FitToCanvas::new(CanvasTarget::Canvas(dims(u32::MAX, u32::MAX)), 0);
        let result = compute_fit_to_canvas(dims(100, 100), &huge);
        assert!(matches!(result, Err(LayoutError::InvalidLayoutTarget(_))));

        let huge = FitToCanvas::new(CanvasTarget::LongerSide(u32::MAX), 0);
        let result = compute_fit_to_canvas(dims(100, 100), &huge);
        assert!(matches!(result, Err(LayoutError::InvalidLayoutTarget(_))));
    }

    #[test]
    fn fit_zero_target_rejected() {
        let result = compute_fit_to_canvas(dims(1000, 500), &canvas(0, 1080, 0));
        assert!(matches!(result, Err(LayoutError::InvalidLayoutTarget(_))));
        let spec = FitToCanvas::new(CanvasTarget::LongerSide(0), 0);
        let result = compute_fit_to_canvas(dims(1000, 500), &spec);
        assert!(matches!(result, Err(LayoutError::InvalidLayoutTarget(_))));
    }

    #[test]
    fn fit_collapsing_axis_rejected() {
        // 10000x1 into 100x100: height floors to 0
        let result = compute_fit_to_canvas(dims(10000, 1), &canvas(100, 100, 0));
        assert!(matches!(result, Err(LayoutError::InvalidLayoutTarget(_))));
    }

    #[test]
    fn fit_zero_image_rejected() {
        let result = compute_fit_to_canvas(dims(1000, 0), &canvas(1080, 1080, 0));
        assert!(matches!(
            result,
            Err(LayoutError::InvalidImageDimensions { .. })
        ));
    }

    #[test]
    fn fit_longer_side_resizes_without_border() {
        let spec = FitToCanvas::new(CanvasTarget::LongerSide(1080), 20);
        let (resize, borders) = compute_fit_to_canvas(dims(4000, 3000), &spec).unwrap();
        assert_eq!(resize, dims(1080, 810));
        assert_eq!(borders, None);
    }

    #[test]
    fn fit_longer_side_rounds_to_even() {
        // 999x333 → scale 1000/999: width 1000, height floor(333.33) = 333 → 334
        let spec = FitToCanvas::new(CanvasTarget::LongerSide(1000), 0);
        let (resize, _) = compute_fit_to_canvas(dims(999, 333), &spec).unwrap();
        assert_eq!(resize, dims(1000, 334));
    }

    // =========================================================================
    // compute_frame_plan
    // =========================================================================

    #[test]
    fn plan_fixed_has_no_resize() {
        let plan = compute_frame_plan(dims(800, 600), &BorderSpec::Fixed(fixed("10"))).unwrap();
        assert_eq!(plan.resize, None);
        assert_eq!(plan.final_dimensions(dims(800, 600)), dims(820, 620));
    }

    #[test]
    fn plan_canvas_final_dimensions_match_target() {
        let spec = BorderSpec::FitToCanvas(canvas(1080, 1350, 30));
        let plan = compute_frame_plan(dims(6000, 4000), &spec).unwrap();
        assert_eq!(plan.final_dimensions(dims(6000, 4000)), dims(1080, 1350));
    }

    #[test]
    fn plan_longer_side_has_zero_borders() {
        let spec = BorderSpec::FitToCanvas(FitToCanvas::new(CanvasTarget::LongerSide(500), 0));
        let plan = compute_frame_plan(dims(1000, 800), &spec).unwrap();
        assert_eq!(plan.resize, Some(dims(500, 400)));
        assert!(plan.borders.is_zero());
    }
}
