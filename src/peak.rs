use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arrayops::PeakSequence;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A single position with an associated non-negative intensity, e.g. a centroided
/// spectral peak.
pub struct Peak {
    pub position: f64,
    pub intensity: f64,
}

impl Peak {
    pub fn new(position: f64, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

impl From<(f64, f64)> for Peak {
    fn from((position, intensity): (f64, f64)) -> Self {
        Self::new(position, intensity)
    }
}

impl From<Peak> for (f64, f64) {
    fn from(peak: Peak) -> Self {
        (peak.position, peak.intensity)
    }
}

impl fmt::Display for Peak {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Peak({}, {})", self.position, self.intensity)
    }
}

/// How a nested `[[..], [..], ...]` peak list is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// `[[x1, x2, ...], [y1, y2, ...]]`
    Columns,
    /// `[[x1, y1], [x2, y2], ...]`
    Pairs,
}

impl InputLayout {
    /// Decide the layout of `rows`.
    ///
    /// An outer list of exactly two rows is always read as [`InputLayout::Columns`], even
    /// when the caller meant two `[x, y]` pairs. Downstream consumers rely on this, so a
    /// two peak list of pairs must be passed as a [`PeakSequence`] instead.
    pub fn detect<R: AsRef<[f64]>>(rows: &[R]) -> InputLayout {
        if rows.len() == 2 {
            InputLayout::Columns
        } else {
            InputLayout::Pairs
        }
    }
}

/// Anything a [`Comparator`](crate::Comparator) will accept as a peak list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum PeakInput {
    /// Nested rows whose layout is found with [`InputLayout::detect`]
    Nested(Vec<Vec<f64>>),
    /// Already in parallel-array form
    Sequence(PeakSequence),
}

impl PeakInput {
    /// Resolve the input into a [`PeakSequence`], returning `None` if nested rows are malformed.
    pub fn into_sequence(self) -> Option<PeakSequence> {
        match self {
            PeakInput::Sequence(seq) => Some(seq),
            PeakInput::Nested(rows) => PeakSequence::from_nested(&rows),
        }
    }
}

impl From<PeakSequence> for PeakInput {
    fn from(value: PeakSequence) -> Self {
        Self::Sequence(value)
    }
}

impl From<&PeakSequence> for PeakInput {
    fn from(value: &PeakSequence) -> Self {
        Self::Sequence(value.clone())
    }
}

impl From<Vec<Vec<f64>>> for PeakInput {
    fn from(value: Vec<Vec<f64>>) -> Self {
        Self::Nested(value)
    }
}

impl<const N: usize, const M: usize> From<[[f64; M]; N]> for PeakInput {
    fn from(value: [[f64; M]; N]) -> Self {
        Self::Nested(value.iter().map(|row| row.to_vec()).collect())
    }
}

impl From<Vec<Peak>> for PeakInput {
    fn from(value: Vec<Peak>) -> Self {
        Self::Sequence(value.into_iter().collect())
    }
}

impl From<Vec<(f64, f64)>> for PeakInput {
    fn from(value: Vec<(f64, f64)>) -> Self {
        Self::Sequence(value.into())
    }
}
