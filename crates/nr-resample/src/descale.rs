use nr_core::{BorderMode, Error, FilterKind, Image, ImageView};

use crate::weights::{WeightRow, scaling_weights};

/// Least-squares inverse of a 1D upscale from `dst_dim` to `src_dim`.
///
/// With `A` the `src_dim x dst_dim` upscale matrix, a line `y` is descaled
/// by solving `(AᵀA) x = Aᵀ y`. `AᵀA` is symmetric positive definite and
/// banded, so it is factored once here (banded Cholesky, `AᵀA = UᵀU`) and
/// every line costs two triangular sweeps.
#[derive(Debug, Clone)]
pub struct DescaleCore {
    src_dim: usize,
    dst_dim: usize,
    upscale: Vec<WeightRow>,
    bandwidth: usize,
    // Row-major upper band of U: `factor[i * (bandwidth + 1) + k] = U[i][i + k]`.
    factor: Vec<f64>,
}

impl DescaleCore {
    pub fn new(
        kind: FilterKind,
        border: BorderMode,
        src_dim: usize,
        dst_dim: usize,
    ) -> Result<Self, Error> {
        if dst_dim == 0 || dst_dim > src_dim {
            return Err(Error::InvalidDimensions {
                src: (src_dim, 1),
                dst: (dst_dim, 1),
            });
        }

        let upscale = scaling_weights(kind, border, dst_dim, src_dim)?;
        let bandwidth = upscale
            .iter()
            .map(|row| row.weights.len().saturating_sub(1))
            .max()
            .unwrap_or(0);
        let stride = bandwidth + 1;

        let mut factor = vec![0.0f64; dst_dim * stride];
        for row in &upscale {
            for (p, &wp) in row.weights.iter().enumerate() {
                let base = (row.left + p) * stride;
                for (q, &wq) in row.weights.iter().enumerate().skip(p) {
                    factor[base + (q - p)] += wp * wq;
                }
            }
        }

        cholesky_banded(&mut factor, dst_dim, bandwidth)?;

        Ok(Self {
            src_dim,
            dst_dim,
            upscale,
            bandwidth,
            factor,
        })
    }

    pub fn src_dim(&self) -> usize {
        self.src_dim
    }

    pub fn dst_dim(&self) -> usize {
        self.dst_dim
    }

    /// Descales one line. `scratch` is resized as needed and may be reused
    /// across calls.
    pub fn process_line(&self, src: &[f32], dst: &mut [f32], scratch: &mut Vec<f64>) {
        debug_assert_eq!(src.len(), self.src_dim);
        debug_assert_eq!(dst.len(), self.dst_dim);

        let n = self.dst_dim;
        let b = self.bandwidth;
        let stride = b + 1;
        let u = &self.factor;

        scratch.clear();
        scratch.resize(n, 0.0);
        let x = scratch.as_mut_slice();

        // Aᵀ y
        for (row, &y) in self.upscale.iter().zip(src) {
            for (p, &w) in row.weights.iter().enumerate() {
                x[row.left + p] += w * y as f64;
            }
        }

        // Uᵀ z = Aᵀ y
        for i in 0..n {
            let mut sum = x[i];
            for m in i.saturating_sub(b)..i {
                sum -= u[m * stride + (i - m)] * x[m];
            }
            x[i] = sum / u[i * stride];
        }

        // U x = z
        for i in (0..n).rev() {
            let mut sum = x[i];
            for k in 1..=b.min(n - 1 - i) {
                sum -= u[i * stride + k] * x[i + k];
            }
            x[i] = sum / u[i * stride];
        }

        for (out, &v) in dst.iter_mut().zip(x.iter()) {
            *out = v as f32;
        }
    }
}

fn cholesky_banded(band: &mut [f64], n: usize, bandwidth: usize) -> Result<(), Error> {
    let stride = bandwidth + 1;
    for i in 0..n {
        for k in 0..=bandwidth {
            let j = i + k;
            if j >= n {
                break;
            }
            let mut sum = band[i * stride + k];
            for m in j.saturating_sub(bandwidth)..i {
                sum -= band[m * stride + (i - m)] * band[m * stride + (j - m)];
            }
            if k == 0 {
                if sum <= 0.0 || !sum.is_finite() {
                    return Err(Error::NotPositiveDefinite);
                }
                band[i * stride] = sum.sqrt();
            } else {
                band[i * stride + k] = sum / band[i * stride];
            }
        }
    }
    Ok(())
}

/// Separable descale of `src` to `width x height`: rows first, then columns.
pub fn descale_f32(
    src: &ImageView<'_, f32>,
    width: usize,
    height: usize,
    kind: FilterKind,
    border: BorderMode,
) -> Result<Image<f32>, Error> {
    if width == 0 || height == 0 || width > src.width() || height > src.height() {
        return Err(Error::InvalidDimensions {
            src: src.dims(),
            dst: (width, height),
        });
    }

    let h_core = DescaleCore::new(kind, border, src.width(), width)?;
    let v_core = DescaleCore::new(kind, border, src.height(), height)?;
    let mut scratch = Vec::new();

    let mut temp = Image::new_fill(width, src.height(), 0.0f32);
    {
        let mut temp_view = temp.as_view_mut();
        for y in 0..src.height() {
            h_core.process_line(src.row(y), temp_view.row_mut(y), &mut scratch);
        }
    }

    let mut dst = Image::new_fill(width, height, 0.0f32);
    let temp_view = temp.as_view();
    let mut dst_view = dst.as_view_mut();
    let mut column = vec![0.0f32; src.height()];
    let mut solved = vec![0.0f32; height];
    for x in 0..width {
        for (y, c) in column.iter_mut().enumerate() {
            *c = temp_view.row(y)[x];
        }
        v_core.process_line(&column, &mut solved, &mut scratch);
        for (y, &v) in solved.iter().enumerate() {
            dst_view.row_mut(y)[x] = v;
        }
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use nr_core::{BorderMode, Error, FilterMode, Image};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{DescaleCore, descale_f32};
    use crate::resize_f32;

    fn noise(width: usize, height: usize, seed: u64) -> Image<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        Image::from_fn(width, height, |_, _| rng.random::<f32>())
    }

    #[test]
    fn descale_inverts_upscale_for_every_mode() {
        let small = noise(20, 16, 7);
        for mode in FilterMode::ALL {
            let big = resize_f32(&small.as_view(), 31, 25, mode.kind(), BorderMode::Repeat)
                .expect("valid upscale");
            let back = descale_f32(&big.as_view(), 20, 16, mode.kind(), BorderMode::Repeat)
                .expect("valid descale");

            let max_err = small
                .data()
                .iter()
                .zip(back.data())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0f32, f32::max);
            assert!(max_err < 1e-3, "{mode}: max error {max_err}");
        }
    }

    #[test]
    fn same_size_descale_is_identity_for_interpolating_kernels() {
        let img = noise(9, 6, 3);
        let out = descale_f32(
            &img.as_view(),
            9,
            6,
            FilterMode::Spline36.kind(),
            BorderMode::Repeat,
        )
        .expect("valid descale");
        for (a, b) in img.data().iter().zip(out.data()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn core_reports_dimensions() {
        let core = DescaleCore::new(FilterMode::Bilinear.kind(), BorderMode::Repeat, 10, 7)
            .expect("valid core");
        assert_eq!(core.src_dim(), 10);
        assert_eq!(core.dst_dim(), 7);
    }

    #[test]
    fn growing_or_empty_targets_are_rejected() {
        let img = noise(8, 8, 1);
        let kind = FilterMode::Bilinear.kind();
        assert_eq!(
            descale_f32(&img.as_view(), 9, 8, kind, BorderMode::Repeat).unwrap_err(),
            Error::InvalidDimensions {
                src: (8, 8),
                dst: (9, 8)
            }
        );
        assert!(descale_f32(&img.as_view(), 8, 0, kind, BorderMode::Repeat).is_err());
        assert!(DescaleCore::new(kind, BorderMode::Repeat, 5, 6).is_err());
    }
}
