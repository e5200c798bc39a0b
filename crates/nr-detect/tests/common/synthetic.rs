use nr_core::{BorderMode, FilterMode, Image};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Uniform `[0, 1)` noise; every frequency is present, so a round trip
/// through the wrong size or kernel always leaves a residue.
pub fn noise(width: usize, height: usize, seed: u64) -> Image<f32> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut rng = StdRng::seed_from_u64(seed);
    Image::from_fn(width, height, |_, _| rng.random::<f32>())
}

/// Noise rendered at `native` and upscaled to `target` with `mode`.
pub fn upscaled_noise(
    native: (usize, usize),
    target: (usize, usize),
    mode: FilterMode,
    seed: u64,
) -> Image<f32> {
    let src = noise(native.0, native.1, seed);
    nr_resample::resize_f32(&src.as_view(), target.0, target.1, mode.kind(), BorderMode::Repeat)
        .expect("valid upscale")
}
