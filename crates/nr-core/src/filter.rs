use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Resampling filter families a prior upscale may have used.
///
/// The display label doubles as the serde and CLI spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    #[serde(rename = "POINT")]
    Point,
    #[serde(rename = "BILINEAR")]
    Bilinear,
    #[serde(rename = "CATMULL_ROM")]
    CatmullRom,
    #[serde(rename = "MITCHELL_NETRAVALI")]
    MitchellNetravali,
    #[serde(rename = "BICUBIC_0_60")]
    Bicubic060,
    #[serde(rename = "BICUBIC_0_75")]
    Bicubic075,
    #[serde(rename = "BICUBIC_0_100")]
    Bicubic100,
    #[serde(rename = "BICUBIC_20_50")]
    Bicubic2050,
    #[serde(rename = "SOFTCUBIC50")]
    SoftCubic50,
    #[serde(rename = "SOFTCUBIC75")]
    SoftCubic75,
    #[serde(rename = "SOFTCUBIC100")]
    SoftCubic100,
    #[serde(rename = "LANCZOS2")]
    Lanczos2,
    #[serde(rename = "LANCZOS3")]
    Lanczos3,
    #[serde(rename = "LANCZOS4")]
    Lanczos4,
    #[serde(rename = "SPLINE16")]
    Spline16,
    #[serde(rename = "SPLINE36")]
    Spline36,
    #[serde(rename = "SPLINE64")]
    Spline64,
}

/// Kernel parameterization behind a [`FilterMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    Point,
    Bilinear,
    /// Mitchell-Netravali cubic with parameters `b` and `c`.
    Bicubic { b: f64, c: f64 },
    Lanczos { taps: usize },
    Spline16,
    Spline36,
    Spline64,
}

impl FilterMode {
    pub const ALL: [FilterMode; 17] = [
        FilterMode::Point,
        FilterMode::Bilinear,
        FilterMode::CatmullRom,
        FilterMode::MitchellNetravali,
        FilterMode::Bicubic060,
        FilterMode::Bicubic075,
        FilterMode::Bicubic100,
        FilterMode::Bicubic2050,
        FilterMode::SoftCubic50,
        FilterMode::SoftCubic75,
        FilterMode::SoftCubic100,
        FilterMode::Lanczos2,
        FilterMode::Lanczos3,
        FilterMode::Lanczos4,
        FilterMode::Spline16,
        FilterMode::Spline36,
        FilterMode::Spline64,
    ];

    /// Modes swept during detection. Point sampling is left out because its
    /// error curves are too unstable to carry a change point.
    pub const DETECTION_DEFAULT: [FilterMode; 11] = [
        FilterMode::CatmullRom,
        FilterMode::MitchellNetravali,
        FilterMode::Bicubic075,
        FilterMode::Bicubic100,
        FilterMode::Bicubic2050,
        FilterMode::SoftCubic50,
        FilterMode::Lanczos2,
        FilterMode::Lanczos3,
        FilterMode::Spline16,
        FilterMode::Spline36,
        FilterMode::Bilinear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::Bilinear => "BILINEAR",
            Self::CatmullRom => "CATMULL_ROM",
            Self::MitchellNetravali => "MITCHELL_NETRAVALI",
            Self::Bicubic060 => "BICUBIC_0_60",
            Self::Bicubic075 => "BICUBIC_0_75",
            Self::Bicubic100 => "BICUBIC_0_100",
            Self::Bicubic2050 => "BICUBIC_20_50",
            Self::SoftCubic50 => "SOFTCUBIC50",
            Self::SoftCubic75 => "SOFTCUBIC75",
            Self::SoftCubic100 => "SOFTCUBIC100",
            Self::Lanczos2 => "LANCZOS2",
            Self::Lanczos3 => "LANCZOS3",
            Self::Lanczos4 => "LANCZOS4",
            Self::Spline16 => "SPLINE16",
            Self::Spline36 => "SPLINE36",
            Self::Spline64 => "SPLINE64",
        }
    }

    pub fn kind(self) -> FilterKind {
        match self {
            Self::Point => FilterKind::Point,
            Self::Bilinear => FilterKind::Bilinear,
            Self::CatmullRom => FilterKind::Bicubic { b: 0.0, c: 0.5 },
            Self::MitchellNetravali => FilterKind::Bicubic {
                b: 1.0 / 3.0,
                c: 1.0 / 3.0,
            },
            Self::Bicubic060 => FilterKind::Bicubic { b: 0.0, c: 0.6 },
            Self::Bicubic075 => FilterKind::Bicubic { b: 0.0, c: 0.75 },
            Self::Bicubic100 => FilterKind::Bicubic { b: 0.0, c: 1.0 },
            Self::Bicubic2050 => FilterKind::Bicubic { b: 0.2, c: 0.5 },
            Self::SoftCubic50 => FilterKind::Bicubic { b: 0.5, c: 0.5 },
            Self::SoftCubic75 => FilterKind::Bicubic { b: 0.75, c: 0.25 },
            Self::SoftCubic100 => FilterKind::Bicubic { b: 1.0, c: 0.0 },
            Self::Lanczos2 => FilterKind::Lanczos { taps: 2 },
            Self::Lanczos3 => FilterKind::Lanczos { taps: 3 },
            Self::Lanczos4 => FilterKind::Lanczos { taps: 4 },
            Self::Spline16 => FilterKind::Spline16,
            Self::Spline36 => FilterKind::Spline36,
            Self::Spline64 => FilterKind::Spline64,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for FilterMode {
    type Err = Error;

    /// Accepts the display label in any case, with `-` in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| Error::UnknownFilter(s.to_string()))
    }
}
