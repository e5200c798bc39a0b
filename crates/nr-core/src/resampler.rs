use crate::{FilterMode, Image, ImageView};

/// Resampling operators the detection engine drives as black boxes.
///
/// Both operations are pure and deterministic: the same input, target size
/// and mode always produce the same buffer. `downscale` is the inverse
/// (descale) operator, reconstructing the smaller source most consistent
/// with an upscale by `mode`; `upscale` is the forward resize.
pub trait Resampler: Sync {
    fn downscale(
        &self,
        src: &ImageView<'_, f32>,
        width: usize,
        height: usize,
        mode: FilterMode,
    ) -> Result<Image<f32>, crate::Error>;

    fn upscale(
        &self,
        src: &ImageView<'_, f32>,
        width: usize,
        height: usize,
        mode: FilterMode,
    ) -> Result<Image<f32>, crate::Error>;
}
