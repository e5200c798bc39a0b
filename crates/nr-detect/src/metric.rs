//! Reconstruction error between an image and its round-tripped copy.

use nr_core::{Error, ImageView};

/// Samples excluded on each side, where resampling border handling dominates.
pub const BORDER_MARGIN: usize = 5;

/// Per-sample differences at or below this (on the `[0, 1]` scale) count as
/// zero, so a lossless round trip scores exactly `0.0`.
pub const NOISE_THRESHOLD: f64 = 0.015;

/// Score reported for candidates that could not be evaluated.
pub const WORST_SCORE: f64 = f64::INFINITY;

/// Border-cropped, noise-clamped mean absolute difference.
///
/// Fails with [`Error::DimensionMismatch`] when the inputs differ in size and
/// with [`Error::ImageTooSmall`] when no interior remains inside the margin.
pub fn reconstruction_error(a: &ImageView<'_, f32>, b: &ImageView<'_, f32>) -> Result<f64, Error> {
    if a.dims() != b.dims() {
        return Err(Error::DimensionMismatch {
            expected: a.dims(),
            actual: b.dims(),
        });
    }

    let (w, h) = a.dims();
    if w <= 2 * BORDER_MARGIN || h <= 2 * BORDER_MARGIN {
        return Err(Error::ImageTooSmall {
            width: w,
            height: h,
            margin: BORDER_MARGIN,
        });
    }

    let mut sum = 0.0f64;
    for y in BORDER_MARGIN..h - BORDER_MARGIN {
        let ra = &a.row(y)[BORDER_MARGIN..w - BORDER_MARGIN];
        let rb = &b.row(y)[BORDER_MARGIN..w - BORDER_MARGIN];
        for (&va, &vb) in ra.iter().zip(rb) {
            let d = (va as f64 - vb as f64).abs();
            if d > NOISE_THRESHOLD {
                sum += d;
            }
        }
    }

    let interior = (w - 2 * BORDER_MARGIN) * (h - 2 * BORDER_MARGIN);
    Ok(sum / interior as f64)
}
