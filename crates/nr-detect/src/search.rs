use log::{debug, info};
use rayon::prelude::*;

use nr_core::{FilterMode, ImageView, Resampler};

use crate::change_point::best_guess;
use crate::curves::ErrorCurves;
use crate::metric::{BORDER_MARGIN, WORST_SCORE, reconstruction_error};
use crate::types::{HeightRange, ModeGuess, SampleReport, SampleResult, companion_width};
use crate::vote::{median_pick, most_frequent};
use crate::DetectError;

/// Sweeps every candidate height for one image and settles on a single
/// `(width, height, mode)` answer.
///
/// Heights are evaluated in parallel on the current rayon pool; modes within
/// a height run sequentially. Each height task owns its row of errors, so the
/// curves are assembled without locking.
pub struct CandidateSearch<'a, R: Resampler + ?Sized> {
    resampler: &'a R,
    range: HeightRange,
    modes: &'a [FilterMode],
}

impl<'a, R: Resampler + ?Sized> CandidateSearch<'a, R> {
    pub fn new(
        resampler: &'a R,
        range: HeightRange,
        modes: &'a [FilterMode],
    ) -> Result<Self, DetectError> {
        ErrorCurves::validate_modes(modes)?;
        Ok(Self {
            resampler,
            range,
            modes,
        })
    }

    pub fn range(&self) -> HeightRange {
        self.range
    }

    /// Round-trip error of every `(height, mode)` pair.
    pub fn error_curves(&self, image: &ImageView<'_, f32>) -> Result<ErrorCurves, DetectError> {
        let rows: Vec<Vec<f64>> = self
            .range
            .heights()
            .into_par_iter()
            .map(|height| self.evaluate_height(image, height))
            .collect();
        ErrorCurves::from_height_rows(self.modes, &rows)
    }

    pub fn run(&self, image: &ImageView<'_, f32>) -> Result<SampleReport, DetectError> {
        let (src_w, src_h) = image.dims();
        if src_w == 0 || src_h == 0 {
            return Err(DetectError::Core(nr_core::Error::ImageTooSmall {
                width: src_w,
                height: src_h,
                margin: BORDER_MARGIN,
            }));
        }

        let curves = self.error_curves(image)?;

        let guesses: Vec<ModeGuess> = curves
            .iter()
            .map(|(mode, curve)| {
                let guess = best_guess(curve);
                let height = self.range.lo() + guess.offset;
                info!(
                    "mode: {mode:<20} height: {height}, diff: {:.6}, relative_diff: {:.6}",
                    curve[guess.offset], guess.ratio
                );
                ModeGuess {
                    mode,
                    height,
                    error: curve[guess.offset],
                    ratio: guess.ratio,
                }
            })
            .collect();

        let heights: Vec<usize> = guesses.iter().map(|g| g.height).collect();
        let height = select_height(&heights).ok_or(DetectError::EmptyModes)?;
        let mode = select_mode(&curves, height - self.range.lo()).ok_or(DetectError::EmptyModes)?;

        Ok(SampleReport {
            result: SampleResult {
                width: companion_width(height, src_w, src_h),
                height,
                mode,
            },
            guesses,
        })
    }

    fn evaluate_height(&self, image: &ImageView<'_, f32>, height: usize) -> Vec<f64> {
        let (src_w, src_h) = image.dims();
        let width = companion_width(height, src_w, src_h);
        self.modes
            .iter()
            .map(|&mode| self.round_trip_error(image, width, height, mode))
            .collect()
    }

    fn round_trip_error(
        &self,
        image: &ImageView<'_, f32>,
        width: usize,
        height: usize,
        mode: FilterMode,
    ) -> f64 {
        let (src_w, src_h) = image.dims();
        let scored = self
            .resampler
            .downscale(image, width, height, mode)
            .and_then(|small| {
                self.resampler
                    .upscale(&small.as_view(), src_w, src_h, mode)
            })
            .and_then(|rebuilt| reconstruction_error(image, &rebuilt.as_view()));

        match scored {
            Ok(err) => err,
            Err(err) => {
                debug!("candidate {width}x{height} {mode} unscored: {err}");
                WORST_SCORE
            }
        }
    }
}

/// Height agreed on by the per-mode guesses.
///
/// A height proposed by more than one mode wins outright (plurality, ties to
/// the first proposed); otherwise the positional median
/// [`median_pick`] of the proposals is taken.
pub fn select_height(heights: &[usize]) -> Option<usize> {
    let (height, count) = most_frequent(heights)?;
    if count > 1 {
        Some(height)
    } else {
        median_pick(heights)
    }
}

/// Mode with the lowest error at `offset`; ties go to the earlier mode.
pub fn select_mode(curves: &ErrorCurves, offset: usize) -> Option<FilterMode> {
    let mut best: Option<(FilterMode, f64)> = None;
    for (mode, curve) in curves.iter() {
        let err = *curve.get(offset)?;
        if best.is_none_or(|(_, top)| err < top) {
            best = Some((mode, err));
        }
    }
    best.map(|(mode, _)| mode)
}

#[cfg(test)]
mod tests {
    use nr_core::{Error, FilterMode, Image, ImageView, Resampler};

    use super::{CandidateSearch, select_height, select_mode};
    use crate::curves::ErrorCurves;
    use crate::metric::{BORDER_MARGIN, WORST_SCORE};
    use crate::types::HeightRange;
    use crate::DetectError;

    /// Replays a fixed reference on upscale, offset by the value the
    /// downscale stage wrote. Only `lossless` at `native` height offsets by 0.
    struct Scripted {
        reference: Image<f32>,
        native: usize,
        lossless: FilterMode,
    }

    impl Resampler for Scripted {
        fn downscale(
            &self,
            _src: &ImageView<'_, f32>,
            width: usize,
            height: usize,
            mode: FilterMode,
        ) -> Result<Image<f32>, Error> {
            let offset = if height < self.native {
                0.3
            } else if height == self.native && mode == self.lossless {
                0.0
            } else {
                0.02
            };
            Ok(Image::new_fill(width, height, offset))
        }

        fn upscale(
            &self,
            src: &ImageView<'_, f32>,
            width: usize,
            height: usize,
            _mode: FilterMode,
        ) -> Result<Image<f32>, Error> {
            let offset = src.get(0, 0).copied().unwrap_or(0.0);
            let reference = self.reference.as_view();
            Ok(Image::from_fn(width, height, |x, y| {
                reference.get(x, y).copied().unwrap_or(0.0) + offset
            }))
        }
    }

    struct Failing;

    impl Resampler for Failing {
        fn downscale(
            &self,
            src: &ImageView<'_, f32>,
            width: usize,
            height: usize,
            _mode: FilterMode,
        ) -> Result<Image<f32>, Error> {
            Err(Error::InvalidDimensions {
                src: src.dims(),
                dst: (width, height),
            })
        }

        fn upscale(
            &self,
            src: &ImageView<'_, f32>,
            width: usize,
            height: usize,
            _mode: FilterMode,
        ) -> Result<Image<f32>, Error> {
            Ok(Image::new_fill(width, height, src.get(0, 0).copied().unwrap_or(0.0)))
        }
    }

    #[test]
    fn unanimous_heights_short_circuit() {
        assert_eq!(select_height(&[810, 810, 810]), Some(810));
    }

    #[test]
    fn repeated_height_beats_median() {
        assert_eq!(select_height(&[700, 990, 990, 720, 850]), Some(990));
        // Two pairs: the first proposed pair wins.
        assert_eq!(select_height(&[720, 900, 900, 720]), Some(720));
    }

    #[test]
    fn distinct_heights_fall_back_to_positional_median() {
        assert_eq!(select_height(&[900, 720, 810]), Some(810));
        assert_eq!(select_height(&[900, 720, 810, 700]), Some(810));
        assert_eq!(select_height(&[]), None);
    }

    #[test]
    fn lowest_error_mode_wins_ties_to_first() {
        let modes = [
            FilterMode::Bilinear,
            FilterMode::CatmullRom,
            FilterMode::Lanczos3,
        ];
        let rows = vec![vec![0.2, 0.1, 0.1], vec![0.0, 0.3, 0.0]];
        let curves = ErrorCurves::from_height_rows(&modes, &rows).expect("valid curves");

        assert_eq!(select_mode(&curves, 0), Some(FilterMode::CatmullRom));
        assert_eq!(select_mode(&curves, 1), Some(FilterMode::Bilinear));
        assert_eq!(select_mode(&curves, 2), None);

        let unscored = vec![vec![WORST_SCORE, WORST_SCORE, WORST_SCORE]];
        let curves = ErrorCurves::from_height_rows(&modes, &unscored).expect("valid curves");
        assert_eq!(select_mode(&curves, 0), Some(FilterMode::Bilinear));
    }

    #[test]
    fn search_finds_the_lossless_height_and_mode() {
        let image = Image::from_fn(40, 30, |x, y| ((x * 5 + y * 3) % 11) as f32 / 20.0);
        let resampler = Scripted {
            reference: image.clone(),
            native: 24,
            lossless: FilterMode::Lanczos3,
        };
        let modes = [FilterMode::Bilinear, FilterMode::Lanczos3, FilterMode::Spline36];
        let range = HeightRange::new(16, 30).expect("valid range");
        let search = CandidateSearch::new(&resampler, range, &modes).expect("valid search");

        let curves = search.error_curves(&image.as_view()).expect("curves");
        assert_eq!(curves.len(), 14);
        assert_eq!(
            curves.curve(FilterMode::Lanczos3).expect("curve")[24 - 16],
            0.0
        );

        let report = search.run(&image.as_view()).expect("report");
        assert_eq!(report.guesses.len(), 3);
        assert_eq!(report.result.height, 24);
        assert_eq!(report.result.width, 32);
        assert_eq!(report.result.mode, FilterMode::Lanczos3);
    }

    #[test]
    fn unscored_candidates_still_yield_an_answer() {
        let image = Image::new_fill(32, 32, 0.5f32);
        let modes = [FilterMode::Spline16, FilterMode::Bilinear];
        let range = HeightRange::new(20, 28).expect("valid range");
        let search = CandidateSearch::new(&Failing, range, &modes).expect("valid search");

        let curves = search.error_curves(&image.as_view()).expect("curves");
        assert!(curves.iter().all(|(_, c)| c.iter().all(|e| *e == WORST_SCORE)));

        let report = search.run(&image.as_view()).expect("report");
        assert_eq!(report.result.height, 20);
        assert_eq!(report.result.mode, FilterMode::Spline16);
    }

    #[test]
    fn too_small_images_score_worst_everywhere() {
        let image = Image::new_fill(8, 8, 0.5f32);
        let resampler = Scripted {
            reference: image.clone(),
            native: 6,
            lossless: FilterMode::Bilinear,
        };
        let modes = [FilterMode::Bilinear];
        let range = HeightRange::new(4, 8).expect("valid range");
        let search = CandidateSearch::new(&resampler, range, &modes).expect("valid search");

        let report = search.run(&image.as_view()).expect("report");
        assert!(range.contains(report.result.height));
        assert_eq!(report.guesses[0].error, WORST_SCORE);
    }

    #[test]
    fn empty_images_are_reported_as_too_small() {
        let image = Image::<f32>::from_fn(0, 5, |_, _| 0.0);
        let modes = [FilterMode::Bilinear];
        let range = HeightRange::new(2, 4).expect("valid range");
        let search = CandidateSearch::new(&Failing, range, &modes).expect("valid search");

        assert_eq!(
            search.run(&image.as_view()),
            Err(DetectError::Core(Error::ImageTooSmall {
                width: 0,
                height: 5,
                margin: BORDER_MARGIN,
            }))
        );
    }

    #[test]
    fn duplicate_modes_are_rejected_up_front() {
        let modes = [FilterMode::Bilinear, FilterMode::Bilinear];
        let range = HeightRange::new(4, 8).expect("valid range");
        assert!(CandidateSearch::new(&Failing, range, &modes).is_err());
    }
}
