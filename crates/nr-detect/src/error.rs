use core::fmt;

use nr_core::FilterMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    Core(nr_core::Error),
    InvalidRange { lo: usize, hi: usize },
    EmptyModes,
    DuplicateMode(FilterMode),
    InvalidChunkSize,
    EmptyBatch,
    Load { index: usize, reason: String },
    Config(String),
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(err) => write!(f, "{err}"),
            Self::InvalidRange { lo, hi } => {
                write!(f, "invalid height range [{lo}, {hi}): need 1 <= lo < hi")
            }
            Self::EmptyModes => write!(f, "no filter modes to test"),
            Self::DuplicateMode(mode) => write!(f, "filter mode {mode} listed twice"),
            Self::InvalidChunkSize => write!(f, "chunk size must be at least 1"),
            Self::EmptyBatch => write!(f, "no input images"),
            Self::Load { index, reason } => {
                write!(f, "failed to load sample #{index}: {reason}")
            }
            Self::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for DetectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<nr_core::Error> for DetectError {
    fn from(err: nr_core::Error) -> Self {
        Self::Core(err)
    }
}
