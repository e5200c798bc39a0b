use crate::CandidateGuess;

/// Finds where an error curve improves most sharply.
///
/// For each `i >= 1` the improvement ratio is `curve[i - 1] / curve[i]`, with
/// the numerator floored at `f64::EPSILON` so an already-vanished error does
/// not manufacture a spurious transition one step early. The first maximum
/// wins. Index 0 has no predecessor and scores 0, so a single-entry curve
/// yields `(0, 0.0)`. Ratios that are not numbers (`inf / inf` from two
/// unevaluable candidates) never win.
pub fn best_guess(curve: &[f64]) -> CandidateGuess {
    let mut best = CandidateGuess {
        offset: 0,
        ratio: 0.0,
    };

    for (i, pair) in curve.windows(2).enumerate() {
        let prev = pair[0].max(f64::EPSILON);
        let ratio = prev / pair[1];
        if ratio > best.ratio {
            best = CandidateGuess {
                offset: i + 1,
                ratio,
            };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::best_guess;
    use crate::CandidateGuess;

    #[test]
    fn single_entry_curve_has_no_change_point() {
        assert_eq!(
            best_guess(&[0.3]),
            CandidateGuess {
                offset: 0,
                ratio: 0.0
            }
        );
    }

    #[test]
    fn sharpest_drop_wins_over_lowest_value() {
        // 0.4 -> 0.1 is a 4x drop; 0.1 -> 0.05 only halves.
        let curve = [0.5, 0.45, 0.4, 0.1, 0.08, 0.05];
        let guess = best_guess(&curve);
        assert_eq!(guess.offset, 3);
        assert!((guess.ratio - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ties_resolve_to_the_lowest_index() {
        let curve = [0.8, 0.4, 0.2, 0.1];
        assert_eq!(best_guess(&curve).offset, 1);
    }

    #[test]
    fn exact_zero_after_nonzero_is_infinite_improvement() {
        let curve = [0.3, 0.2, 0.0, 0.0, 0.0];
        let guess = best_guess(&curve);
        assert_eq!(guess.offset, 2);
        assert!(guess.ratio.is_infinite());
    }

    #[test]
    fn numerator_is_floored_at_epsilon() {
        // The jump at index 1 would be 0/0; with the floor it is eps/1e-20.
        let curve = [0.0, 1e-20, 1.0];
        let guess = best_guess(&curve);
        assert_eq!(guess.offset, 1);
        assert!((guess.ratio - f64::EPSILON / 1e-20).abs() / guess.ratio < 1e-12);
    }

    #[test]
    fn unevaluable_candidates_never_win() {
        let inf = f64::INFINITY;
        assert_eq!(best_guess(&[inf, inf, inf]).offset, 0);
        assert_eq!(best_guess(&[inf, inf, 0.2, 0.1]).offset, 2);
    }

    #[test]
    fn reported_ratio_is_the_true_maximum() {
        let curve = [0.9, 0.7, 0.72, 0.3, 0.31, 0.29, 0.1, 0.11];
        let guess = best_guess(&curve);

        let expected = (1..curve.len())
            .map(|i| curve[i - 1].max(f64::EPSILON) / curve[i])
            .fold(0.0f64, f64::max);
        assert_eq!(guess.ratio, expected);
        assert!(guess.offset < curve.len());
        assert_eq!(
            curve[guess.offset - 1] / curve[guess.offset],
            expected
        );
    }
}
