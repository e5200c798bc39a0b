//! Concrete resampling operators for native-resolution detection.
//!
//! `nr-resample` implements [`nr_core::Resampler`] with separable kernels.
//!
//! Forward resize:
//! - Output sample `i` maps to input coordinate `(i + 0.5) * in / out - 0.5`.
//! - Shrinking stretches the kernel by `in / out`.
//! - Out-of-range taps follow the configured [`nr_core::BorderMode`].
//!
//! Descale:
//! - The inverse of an upscale by the same kernel, solved per line in the
//!   least-squares sense against the upscale's own weight matrix.
//! - Only shrinking targets are accepted (`1 <= dst <= src` on both axes).

mod descale;
mod kernel;
mod resampler;
mod resize;
mod weights;

pub use descale::{DescaleCore, descale_f32};
pub use kernel::{evaluate as kernel_value, support as kernel_support};
pub use resampler::KernelResampler;
pub use resize::resize_f32;
pub use weights::{WeightRow, scaling_weights};
