use nr_core::{BorderMode, Error, FilterKind, Image, ImageView};

use crate::weights::{WeightRow, scaling_weights};

/// Separable forward resize: horizontal pass into a `width x src.height()`
/// intermediate, then a vertical pass.
///
/// The same weight rows drive [`crate::descale_f32`], so a resize followed by
/// a descale with identical parameters reconstructs the input.
pub fn resize_f32(
    src: &ImageView<'_, f32>,
    width: usize,
    height: usize,
    kind: FilterKind,
    border: BorderMode,
) -> Result<Image<f32>, Error> {
    if src.width() == 0 || src.height() == 0 || width == 0 || height == 0 {
        return Err(Error::InvalidDimensions {
            src: src.dims(),
            dst: (width, height),
        });
    }

    let h_rows = scaling_weights(kind, border, src.width(), width)?;
    let v_rows = scaling_weights(kind, border, src.height(), height)?;

    let mut temp = Image::new_fill(width, src.height(), 0.0f32);
    {
        let mut temp_view = temp.as_view_mut();
        for y in 0..src.height() {
            resample_line(src.row(y), temp_view.row_mut(y), &h_rows);
        }
    }

    let mut dst = Image::new_fill(width, height, 0.0f32);
    let temp_view = temp.as_view();
    let mut dst_view = dst.as_view_mut();
    let mut acc = vec![0.0f64; width];
    for (y, row) in v_rows.iter().enumerate() {
        acc.fill(0.0);
        for (k, &w) in row.weights.iter().enumerate() {
            for (a, &v) in acc.iter_mut().zip(temp_view.row(row.left + k)) {
                *a += w * v as f64;
            }
        }
        for (out, &a) in dst_view.row_mut(y).iter_mut().zip(&acc) {
            *out = a as f32;
        }
    }

    Ok(dst)
}

fn resample_line(src: &[f32], dst: &mut [f32], rows: &[WeightRow]) {
    debug_assert_eq!(dst.len(), rows.len());
    for (out, row) in dst.iter_mut().zip(rows) {
        let taps = &src[row.left..row.left + row.weights.len()];
        let sum: f64 = taps
            .iter()
            .zip(&row.weights)
            .map(|(&v, &w)| v as f64 * w)
            .sum();
        *out = sum as f32;
    }
}
