use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    OutOfBounds,
    InvalidStride,
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    InvalidDimensions {
        src: (usize, usize),
        dst: (usize, usize),
    },
    ImageTooSmall {
        width: usize,
        height: usize,
        margin: usize,
    },
    NotPositiveDefinite,
    UnknownFilter(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::InvalidDimensions { src, dst } => write!(
                f,
                "invalid resample dimensions: {}x{} -> {}x{}",
                src.0, src.1, dst.0, dst.1
            ),
            Self::ImageTooSmall {
                width,
                height,
                margin,
            } => write!(
                f,
                "image {width}x{height} has no interior inside a {margin}px border"
            ),
            Self::NotPositiveDefinite => write!(f, "normal matrix is not positive definite"),
            Self::UnknownFilter(name) => write!(f, "unknown filter mode '{name}'"),
        }
    }
}

impl std::error::Error for Error {}
