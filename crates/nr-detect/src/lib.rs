//! Native resolution and resampling filter detection.
//!
//! Given frames that were upscaled from an unknown native height with an
//! unknown kernel, `nr-detect` recovers both:
//!
//! - For every candidate height in a [`HeightRange`] and every
//!   [`FilterMode`](nr_core::FilterMode), the frame is descaled and upscaled
//!   back through a [`Resampler`](nr_core::Resampler).
//! - The [`reconstruction_error`] of each round trip forms one error curve
//!   per mode ([`ErrorCurves`]).
//! - The sharpest drop along each curve ([`best_guess`]) marks that mode's
//!   native height; the modes then vote ([`select_height`], [`select_mode`]).
//! - Across a batch, [`Aggregator`] samples one frame per chunk and keeps the
//!   smallest height and the most common mode ([`combine`]).
//!
//! The resampling operator is injected, so this crate carries no kernel code
//! of its own.

mod aggregate;
mod change_point;
mod config;
mod curves;
mod error;
mod metric;
mod search;
mod types;
mod vote;

pub use aggregate::{Aggregator, SampleSource, combine, draw_index, sample_count};
pub use change_point::best_guess;
pub use config::DetectConfig;
pub use curves::ErrorCurves;
pub use error::DetectError;
pub use metric::{BORDER_MARGIN, NOISE_THRESHOLD, WORST_SCORE, reconstruction_error};
pub use search::{CandidateSearch, select_height, select_mode};
pub use types::{
    BatchReport, BatchResult, CandidateGuess, HeightRange, ModeGuess, SampleReport,
    SampleResult, SampledImage, companion_width,
};
pub use vote::{median_pick, most_frequent};
