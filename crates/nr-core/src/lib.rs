//! Foundational primitives for native-resolution detection.
//!
//! ## Image Views and Stride
//! Images use element stride (not byte stride). `stride` is the distance, in
//! elements, between adjacent row starts and may be greater than `width`.
//! This allows borrowed views over padded buffers and subviews.
//!
//! ## Sample Scale
//! Detection works on single-channel `f32` planes normalized to `[0, 1]`.
//! [`to_unit_f32`] and [`to_u8_saturating`] convert at the 8-bit boundary.
//!
//! ## Filters and Resamplers
//! [`FilterMode`] names a resampling kernel family and [`FilterKind`] carries
//! its parameters. [`Resampler`] is the contract for the forward (upscale)
//! and inverse (descale) operators; concrete kernels live outside this crate.

mod border;
mod error;
mod filter;
mod image;
mod resampler;

pub use border::{BorderMode, map_index};
pub use error::Error;
pub use filter::{FilterKind, FilterMode};
pub use image::{Image, ImageView, ImageViewMut, to_u8_saturating, to_unit_f32};
pub use resampler::Resampler;
