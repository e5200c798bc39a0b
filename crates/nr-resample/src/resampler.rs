use nr_core::{BorderMode, Error, FilterMode, Image, ImageView, Resampler};

use crate::{descale_f32, resize_f32};

/// [`Resampler`] backed by the kernels in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelResampler {
    border: BorderMode,
}

impl KernelResampler {
    pub fn new(border: BorderMode) -> Self {
        Self { border }
    }

    pub fn border(&self) -> BorderMode {
        self.border
    }
}

impl Resampler for KernelResampler {
    fn downscale(
        &self,
        src: &ImageView<'_, f32>,
        width: usize,
        height: usize,
        mode: FilterMode,
    ) -> Result<Image<f32>, Error> {
        descale_f32(src, width, height, mode.kind(), self.border)
    }

    fn upscale(
        &self,
        src: &ImageView<'_, f32>,
        width: usize,
        height: usize,
        mode: FilterMode,
    ) -> Result<Image<f32>, Error> {
        resize_f32(src, width, height, mode.kind(), self.border)
    }
}
