use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nr_core::{FilterMode, Image, Resampler};

use crate::config::DetectConfig;
use crate::search::CandidateSearch;
use crate::types::{
    BatchReport, BatchResult, HeightRange, SampleResult, SampledImage, companion_width,
};
use crate::vote::most_frequent;
use crate::DetectError;

/// An indexed batch of frames that can be decoded on demand.
///
/// Only the sampled indices are ever loaded.
pub trait SampleSource {
    fn total(&self) -> usize;

    /// Human-readable name of the frame at `index`, for logs.
    fn describe(&self, index: usize) -> String {
        format!("#{index}")
    }

    /// Decodes frame `index` as a single-channel `[0, 1]` image.
    fn load(&self, index: usize) -> Result<Image<f32>, DetectError>;
}

impl SampleSource for [Image<f32>] {
    fn total(&self) -> usize {
        self.len()
    }

    fn load(&self, index: usize) -> Result<Image<f32>, DetectError> {
        self.get(index).cloned().ok_or_else(|| DetectError::Load {
            index,
            reason: "index out of range".into(),
        })
    }
}

/// Number of frames sampled from a batch of `total`: one per chunk, at least
/// one, with a trailing partial chunk counted when it is at least half full.
pub fn sample_count(total: usize, chunk_size: usize) -> usize {
    ((total as f64 / chunk_size as f64).round() as usize).max(1)
}

/// Random frame index inside chunk `chunk`, clamped to the last frame.
pub fn draw_index<G: Rng + ?Sized>(
    chunk: usize,
    chunk_size: usize,
    total: usize,
    rng: &mut G,
) -> usize {
    let offset = rng.random_range(0..chunk_size);
    (chunk * chunk_size + offset).min(total.saturating_sub(1))
}

/// Merges per-sample answers into the batch answer.
///
/// The smallest sampled height wins; the mode is the plurality vote with ties
/// to the earliest sample. Width follows from the first sample's aspect ratio,
/// given as `source`.
pub fn combine(results: &[SampleResult], source: (usize, usize)) -> Option<BatchResult> {
    let height = results.iter().map(|r| r.height).min()?;
    let modes: Vec<FilterMode> = results.iter().map(|r| r.mode).collect();
    let (mode, votes) = most_frequent(&modes)?;
    debug!("mode {mode} carried {votes} of {} samples", results.len());
    Some(BatchResult {
        width: companion_width(height, source.0, source.1),
        height,
        mode,
    })
}

/// Samples a batch of frames, runs [`CandidateSearch`] on each and combines
/// the per-sample answers.
pub struct Aggregator<'a, R: Resampler + ?Sized> {
    resampler: &'a R,
    range: HeightRange,
    modes: Vec<FilterMode>,
    chunk_size: usize,
    seed: Option<u64>,
    pool: Option<rayon::ThreadPool>,
}

impl<'a, R: Resampler + ?Sized> Aggregator<'a, R> {
    pub fn new(resampler: &'a R, config: &DetectConfig) -> Result<Self, DetectError> {
        config.validate()?;
        let pool = match config.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| DetectError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };
        Ok(Self {
            resampler,
            range: config.height_range()?,
            modes: config.modes.clone(),
            chunk_size: config.chunk_size,
            seed: config.seed,
            pool,
        })
    }

    /// Runs `op` on the dedicated worker pool when a thread count was
    /// configured, otherwise on the current rayon pool.
    pub fn install<OP, T>(&self, op: OP) -> T
    where
        OP: FnOnce() -> T + Send,
        T: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Runs detection over `source`.
    ///
    /// Samples are processed one after another; a frame that fails to load
    /// aborts the whole run with no partial answer.
    pub fn run<S: SampleSource + ?Sized>(&self, source: &S) -> Result<BatchReport, DetectError> {
        let total = source.total();
        if total == 0 {
            return Err(DetectError::EmptyBatch);
        }

        let seed = self.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let search = CandidateSearch::new(self.resampler, self.range, &self.modes)?;
        let count = sample_count(total, self.chunk_size);
        info!("total images: {total}, sampling {count} (seed {seed})");

        let mut samples = Vec::with_capacity(count);
        let mut source_dims = None;
        for chunk in 0..count {
            let index = draw_index(chunk, self.chunk_size, total, &mut rng);
            info!("image for testing: {}", source.describe(index));

            let image = source.load(index)?;
            let dims = *source_dims.get_or_insert(image.dims());
            if image.dims() != dims {
                debug!(
                    "sample {index} is {}x{}, batch source is {}x{}",
                    image.width(),
                    image.height(),
                    dims.0,
                    dims.1
                );
            }

            let view = image.as_view();
            let report = self.install(|| search.run(&view))?;
            info!(
                "best guess for this one: {}x{}, mode: {}",
                report.result.width, report.result.height, report.result.mode
            );
            samples.push(SampledImage { index, report });
        }

        let (source_width, source_height) = source_dims.ok_or(DetectError::EmptyBatch)?;
        let results: Vec<SampleResult> = samples.iter().map(|s| s.report.result).collect();
        let result =
            combine(&results, (source_width, source_height)).ok_or(DetectError::EmptyBatch)?;
        info!(
            "final guess: {}x{}, mode: {}",
            result.width, result.height, result.mode
        );

        Ok(BatchReport {
            total_images: total,
            source_width,
            source_height,
            seed,
            samples,
            result,
        })
    }
}
