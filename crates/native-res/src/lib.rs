//! Umbrella crate for the `native-res` workspace.
//!
//! Re-exports the image container ([`nr_core`]), the kernel resampler
//! ([`nr_resample`]) and the detection engine ([`nr_detect`]) so a caller can
//! go from frames to a `(width, height, mode)` verdict with one dependency.

pub use nr_core::*;
pub use nr_detect::*;
pub use nr_resample::*;
