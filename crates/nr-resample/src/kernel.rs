//! 1D resampling kernels.
//!
//! Conventions:
//! - Kernels are even functions of the tap offset `x`, measured in source
//!   samples at unit filter scale.
//! - `support(kind)` is the radius beyond which the kernel is zero.

use std::f64::consts::PI;

use nr_core::FilterKind;

pub fn support(kind: FilterKind) -> f64 {
    match kind {
        FilterKind::Point => 0.5,
        FilterKind::Bilinear => 1.0,
        FilterKind::Bicubic { .. } | FilterKind::Spline16 => 2.0,
        FilterKind::Lanczos { taps } => taps as f64,
        FilterKind::Spline36 => 3.0,
        FilterKind::Spline64 => 4.0,
    }
}

pub fn evaluate(kind: FilterKind, x: f64) -> f64 {
    match kind {
        // Half-open so that exactly one tap is selected per position.
        FilterKind::Point => {
            if (-0.5..0.5).contains(&x) {
                1.0
            } else {
                0.0
            }
        }
        FilterKind::Bilinear => (1.0 - x.abs()).max(0.0),
        FilterKind::Bicubic { b, c } => bicubic(x.abs(), b, c),
        FilterKind::Lanczos { taps } => lanczos(x.abs(), taps as f64),
        FilterKind::Spline16 => spline16(x.abs()),
        FilterKind::Spline36 => spline36(x.abs()),
        FilterKind::Spline64 => spline64(x.abs()),
    }
}

fn bicubic(x: f64, b: f64, c: f64) -> f64 {
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x
            + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x
            + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

fn lanczos(x: f64, taps: f64) -> f64 {
    if x < taps {
        sinc(x) * sinc(x / taps)
    } else {
        0.0
    }
}

fn spline16(x: f64) -> f64 {
    if x < 1.0 {
        ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
    } else if x < 2.0 {
        let x = x - 1.0;
        ((-1.0 / 3.0 * x + 4.0 / 5.0) * x - 7.0 / 15.0) * x
    } else {
        0.0
    }
}

fn spline36(x: f64) -> f64 {
    if x < 1.0 {
        ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
    } else if x < 2.0 {
        let x = x - 1.0;
        ((-6.0 / 11.0 * x + 270.0 / 209.0) * x - 156.0 / 209.0) * x
    } else if x < 3.0 {
        let x = x - 2.0;
        ((1.0 / 11.0 * x - 45.0 / 209.0) * x + 26.0 / 209.0) * x
    } else {
        0.0
    }
}

fn spline64(x: f64) -> f64 {
    if x < 1.0 {
        ((49.0 / 41.0 * x - 6387.0 / 2911.0) * x - 3.0 / 2911.0) * x + 1.0
    } else if x < 2.0 {
        let x = x - 1.0;
        ((-24.0 / 41.0 * x + 4032.0 / 2911.0) * x - 2328.0 / 2911.0) * x
    } else if x < 3.0 {
        let x = x - 2.0;
        ((6.0 / 41.0 * x - 1008.0 / 2911.0) * x + 582.0 / 2911.0) * x
    } else if x < 4.0 {
        let x = x - 3.0;
        ((-1.0 / 41.0 * x + 168.0 / 2911.0) * x - 97.0 / 2911.0) * x
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use nr_core::{FilterKind, FilterMode};

    use super::{evaluate, support};

    fn is_interpolating(kind: FilterKind) -> bool {
        match kind {
            FilterKind::Bicubic { b, .. } => b == 0.0,
            FilterKind::Point => false,
            _ => true,
        }
    }

    #[test]
    fn interpolating_kernels_vanish_on_nonzero_integers() {
        for mode in FilterMode::ALL {
            let kind = mode.kind();
            if !is_interpolating(kind) {
                continue;
            }
            assert!((evaluate(kind, 0.0) - 1.0).abs() < 1e-12, "{mode}");
            let mut i = 1.0;
            while i <= support(kind) {
                assert!(evaluate(kind, i).abs() < 1e-12, "{mode} at {i}");
                assert!(evaluate(kind, -i).abs() < 1e-12, "{mode} at -{i}");
                i += 1.0;
            }
        }
    }

    #[test]
    fn kernels_are_zero_outside_support() {
        for mode in FilterMode::ALL {
            let kind = mode.kind();
            let r = support(kind);
            assert_eq!(evaluate(kind, r + 1e-9), 0.0, "{mode}");
            assert_eq!(evaluate(kind, -r - 1e-9), 0.0, "{mode}");
        }
    }

    #[test]
    fn unit_spaced_taps_sum_to_one() {
        // Partition of unity at an arbitrary phase, before normalization.
        let phase = 0.3;
        for mode in [
            FilterMode::Bilinear,
            FilterMode::MitchellNetravali,
            FilterMode::SoftCubic100,
            FilterMode::CatmullRom,
        ] {
            let kind = mode.kind();
            let sum: f64 = (-5..=5).map(|k| evaluate(kind, k as f64 - phase)).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{mode}: {sum}");
        }
    }

    #[test]
    fn mitchell_center_value() {
        let k = FilterMode::MitchellNetravali.kind();
        assert!((evaluate(k, 0.0) - 8.0 / 9.0).abs() < 1e-12);
        assert!((evaluate(k, 1.0) - 1.0 / 18.0).abs() < 1e-12);
    }
}
