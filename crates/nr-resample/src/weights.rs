use nr_core::{BorderMode, Error, FilterKind, map_index};

use crate::kernel;

const WEIGHT_EPSILON: f64 = 1e-12;

/// Contribution of a contiguous span of input samples to one output sample.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRow {
    pub left: usize,
    pub weights: Vec<f64>,
}

/// Builds the sparse resampling matrix taking `in_dim` samples to `out_dim`.
///
/// - Output sample `i` is centered at input coordinate
///   `(i + 0.5) * in_dim / out_dim - 0.5`.
/// - When shrinking, the kernel is stretched by `in_dim / out_dim` so that it
///   also acts as the anti-aliasing filter.
/// - Taps outside `[0, in_dim)` are folded back through `border`.
/// - Each row is normalized to unit sum and trimmed to its nonzero span.
pub fn scaling_weights(
    kind: FilterKind,
    border: BorderMode,
    in_dim: usize,
    out_dim: usize,
) -> Result<Vec<WeightRow>, Error> {
    if in_dim == 0 || out_dim == 0 {
        return Err(Error::InvalidDimensions {
            src: (in_dim, 1),
            dst: (out_dim, 1),
        });
    }

    let scale = in_dim as f64 / out_dim as f64;
    let filter_scale = scale.max(1.0);
    let radius = kernel::support(kind) * filter_scale;

    let mut taps: Vec<(usize, f64)> = Vec::new();
    let mut rows = Vec::with_capacity(out_dim);
    for i in 0..out_dim {
        let pos = (i as f64 + 0.5) * scale - 0.5;
        let first = (pos - radius).floor() as isize;
        let last = (pos + radius).ceil() as isize;

        taps.clear();
        for j in first..=last {
            let w = kernel::evaluate(kind, (j as f64 - pos) / filter_scale);
            // Windowed sinc leaves ~1e-17 residue at integer offsets.
            if w.abs() < WEIGHT_EPSILON {
                continue;
            }
            if let Some(idx) = map_index(j, in_dim, border) {
                taps.push((idx, w));
            }
        }

        rows.push(fold_taps(&taps).ok_or(Error::InvalidDimensions {
            src: (in_dim, 1),
            dst: (out_dim, 1),
        })?);
    }

    Ok(rows)
}

fn fold_taps(taps: &[(usize, f64)]) -> Option<WeightRow> {
    let left = taps.iter().map(|&(idx, _)| idx).min()?;
    let right = taps.iter().map(|&(idx, _)| idx).max()?;

    let mut weights = vec![0.0f64; right - left + 1];
    for &(idx, w) in taps {
        weights[idx - left] += w;
    }

    let sum: f64 = weights.iter().sum();
    if sum.abs() <= f64::EPSILON {
        return None;
    }
    for w in &mut weights {
        *w /= sum;
    }

    // Border folding can cancel taps exactly at the ends of the span.
    let lead = weights.iter().take_while(|w| **w == 0.0).count();
    let trail = weights.iter().rev().take_while(|w| **w == 0.0).count();
    weights.truncate(weights.len() - trail);
    weights.drain(..lead);

    Some(WeightRow {
        left: left + lead,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use nr_core::{BorderMode, FilterMode};

    use super::scaling_weights;

    #[test]
    fn rows_are_normalized_and_in_range() {
        for mode in FilterMode::ALL {
            for (n_in, n_out) in [(10, 17), (17, 10), (8, 8), (1, 5)] {
                let rows = scaling_weights(mode.kind(), BorderMode::Repeat, n_in, n_out)
                    .expect("valid weights");
                assert_eq!(rows.len(), n_out);
                for row in &rows {
                    let sum: f64 = row.weights.iter().sum();
                    assert!((sum - 1.0).abs() < 1e-9, "{mode} {n_in}->{n_out}");
                    assert!(row.left + row.weights.len() <= n_in);
                }
            }
        }
    }

    #[test]
    fn same_size_interpolating_kernel_is_identity() {
        let rows = scaling_weights(FilterMode::Lanczos3.kind(), BorderMode::Repeat, 6, 6)
            .expect("valid weights");
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.left, i);
            assert_eq!(row.weights.len(), 1);
            assert!((row.weights[0] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn shrinking_widens_the_footprint() {
        let up = scaling_weights(FilterMode::Bilinear.kind(), BorderMode::Repeat, 10, 20)
            .expect("valid weights");
        let down = scaling_weights(FilterMode::Bilinear.kind(), BorderMode::Repeat, 20, 5)
            .expect("valid weights");

        assert!(up.iter().all(|r| r.weights.len() <= 2));
        assert!(down[2].weights.len() >= 7);
    }

    #[test]
    fn point_selects_a_single_tap() {
        let rows = scaling_weights(FilterMode::Point.kind(), BorderMode::Repeat, 4, 8)
            .expect("valid weights");
        let picks: Vec<usize> = rows.iter().map(|r| r.left).collect();
        assert_eq!(picks, vec![0, 0, 1, 1, 2, 2, 3, 3]);
        assert!(rows.iter().all(|r| r.weights == vec![1.0]));
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        assert!(scaling_weights(FilterMode::Bilinear.kind(), BorderMode::Repeat, 0, 4).is_err());
        assert!(scaling_weights(FilterMode::Bilinear.kind(), BorderMode::Repeat, 4, 0).is_err());
    }
}
