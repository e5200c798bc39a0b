use serde::Serialize;

use nr_core::FilterMode;

use crate::DetectError;

/// Half-open range `[lo, hi)` of candidate source heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeightRange {
    lo: usize,
    hi: usize,
}

impl HeightRange {
    pub fn new(lo: usize, hi: usize) -> Result<Self, DetectError> {
        if lo == 0 || hi <= lo {
            return Err(DetectError::InvalidRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> usize {
        self.lo
    }

    pub fn hi(&self) -> usize {
        self.hi
    }

    /// Number of candidate heights; never zero.
    pub fn count(&self) -> usize {
        self.hi - self.lo
    }

    pub fn contains(&self, height: usize) -> bool {
        (self.lo..self.hi).contains(&height)
    }

    pub fn heights(&self) -> core::ops::Range<usize> {
        self.lo..self.hi
    }
}

/// Width matching `height` at the aspect ratio of a `src_w x src_h` source,
/// rounded half up.
pub fn companion_width(height: usize, src_w: usize, src_h: usize) -> usize {
    let aspect = src_w as f64 / src_h as f64;
    ((height as f64 * aspect + 0.5) as usize).max(1)
}

/// Change point of one error curve: offset from the range start and the
/// improvement ratio observed there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateGuess {
    pub offset: usize,
    pub ratio: f64,
}

/// Per-mode verdict for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeGuess {
    pub mode: FilterMode,
    pub height: usize,
    /// Reconstruction error at `height`.
    pub error: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleResult {
    pub width: usize,
    pub height: usize,
    pub mode: FilterMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleReport {
    pub result: SampleResult,
    pub guesses: Vec<ModeGuess>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub width: usize,
    pub height: usize,
    pub mode: FilterMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledImage {
    pub index: usize,
    pub report: SampleReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub total_images: usize,
    pub source_width: usize,
    pub source_height: usize,
    pub seed: u64,
    pub samples: Vec<SampledImage>,
    pub result: BatchResult,
}
