use serde::{Deserialize, Serialize};

/// How kernel taps that fall outside `[0, len)` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Repeat the edge sample.
    #[default]
    Repeat,
    /// Mirror around the edge sample without repeating it (reflect-101).
    Mirror,
    /// Drop the tap; the remaining weights are renormalized by the caller.
    Zero,
}

pub fn map_index(i: isize, len: usize, mode: BorderMode) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }

    match mode {
        BorderMode::Zero => None,
        BorderMode::Repeat => {
            if i < 0 {
                Some(0)
            } else {
                Some(len - 1)
            }
        }
        BorderMode::Mirror => {
            if len == 1 {
                return Some(0);
            }

            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len {
                Some(r)
            } else {
                Some((2 * len - 2) - r)
            }
        }
    }
}
