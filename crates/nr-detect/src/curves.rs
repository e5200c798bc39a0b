use nr_core::FilterMode;

use crate::DetectError;

/// One error curve per filter mode, in the order the modes were listed.
///
/// Every curve has the same length, one entry per candidate height.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCurves {
    modes: Vec<FilterMode>,
    curves: Vec<Vec<f64>>,
    len: usize,
}

impl ErrorCurves {
    /// Checks that `modes` is non-empty and free of repeats.
    pub fn validate_modes(modes: &[FilterMode]) -> Result<(), DetectError> {
        if modes.is_empty() {
            return Err(DetectError::EmptyModes);
        }
        for (i, mode) in modes.iter().enumerate() {
            if modes[..i].contains(mode) {
                return Err(DetectError::DuplicateMode(*mode));
            }
        }
        Ok(())
    }

    /// Transposes per-height rows (`rows[h][m]` is the error of mode `m` at
    /// the `h`-th height) into per-mode curves.
    pub fn from_height_rows(
        modes: &[FilterMode],
        rows: &[Vec<f64>],
    ) -> Result<Self, DetectError> {
        Self::validate_modes(modes)?;

        let len = rows.len();
        let mut curves = vec![Vec::with_capacity(len); modes.len()];
        for row in rows {
            if row.len() != modes.len() {
                return Err(DetectError::Core(nr_core::Error::SizeMismatch {
                    expected: modes.len(),
                    actual: row.len(),
                }));
            }
            for (curve, &err) in curves.iter_mut().zip(row) {
                curve.push(err);
            }
        }

        Ok(Self {
            modes: modes.to_vec(),
            curves,
            len,
        })
    }

    pub fn modes(&self) -> &[FilterMode] {
        &self.modes
    }

    /// Number of candidate heights per curve.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn curve(&self, mode: FilterMode) -> Option<&[f64]> {
        let idx = self.modes.iter().position(|&m| m == mode)?;
        Some(&self.curves[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterMode, &[f64])> + '_ {
        self.modes
            .iter()
            .copied()
            .zip(self.curves.iter().map(Vec::as_slice))
    }
}
