//! Paired position and intensity arrays.
//!
use std::iter::FromIterator;

use num_traits::Float;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::peak::{InputLayout, Peak};

/// Check if the values in `it` are monotonically ascending or flat
pub fn is_increasing<F: Float>(it: &[F]) -> bool {
    it.windows(2).all(|w| w[0] <= w[1])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PeakSequenceError {
    #[error("Position and intensity arrays differ in length ({positions} != {intensities})")]
    LengthMismatch { positions: usize, intensities: usize },
}

/// An ordered peak list stored as two parallel arrays.
///
/// Every algorithm in this crate assumes `positions` is sorted ascending. This is
/// not enforced, see [`PeakSequence::is_sorted`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeakSequence {
    pub positions: Vec<f64>,
    pub intensities: Vec<f64>,
}

impl PeakSequence {
    pub fn new(positions: Vec<f64>, intensities: Vec<f64>) -> Result<Self, PeakSequenceError> {
        if positions.len() != intensities.len() {
            return Err(PeakSequenceError::LengthMismatch {
                positions: positions.len(),
                intensities: intensities.len(),
            });
        }
        Ok(Self {
            positions,
            intensities,
        })
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            intensities: Vec::with_capacity(capacity),
        }
    }

    /// Read nested rows in either layout, deciding between them with
    /// [`InputLayout::detect`].
    ///
    /// Returns `None` when the rows are malformed: columns of unequal length, or
    /// pair rows holding fewer than two values.
    pub fn from_nested<R: AsRef<[f64]>>(rows: &[R]) -> Option<Self> {
        match InputLayout::detect(rows) {
            InputLayout::Columns => {
                let positions = rows[0].as_ref().to_vec();
                let intensities = rows[1].as_ref().to_vec();
                Self::new(positions, intensities).ok()
            }
            InputLayout::Pairs => {
                let mut seq = Self::with_capacity(rows.len());
                for row in rows {
                    match row.as_ref() {
                        [x, y, ..] => seq.push(*x, *y),
                        _ => return None,
                    }
                }
                Some(seq)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Peak> {
        let position = *self.positions.get(index)?;
        let intensity = *self.intensities.get(index)?;
        Some(Peak::new(position, intensity))
    }

    pub fn push(&mut self, position: f64, intensity: f64) {
        self.positions.push(position);
        self.intensities.push(intensity);
    }

    pub fn iter(&self) -> impl Iterator<Item = Peak> + '_ {
        self.positions
            .iter()
            .zip(self.intensities.iter())
            .map(|(x, y)| Peak::new(*x, *y))
    }

    pub fn is_sorted(&self) -> bool {
        is_increasing(&self.positions)
    }

}

impl FromIterator<Peak> for PeakSequence {
    fn from_iter<T: IntoIterator<Item = Peak>>(iter: T) -> Self {
        let mut seq = Self::default();
        for peak in iter {
            seq.push(peak.position, peak.intensity);
        }
        seq
    }
}

impl From<Vec<(f64, f64)>> for PeakSequence {
    fn from(value: Vec<(f64, f64)>) -> Self {
        value.into_iter().map(Peak::from).collect()
    }
}

impl From<&[(f64, f64)]> for PeakSequence {
    fn from(value: &[(f64, f64)]) -> Self {
        value.iter().copied().map(Peak::from).collect()
    }
}

impl TryFrom<(Vec<f64>, Vec<f64>)> for PeakSequence {
    type Error = PeakSequenceError;

    fn try_from((positions, intensities): (Vec<f64>, Vec<f64>)) -> Result<Self, Self::Error> {
        Self::new(positions, intensities)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let err = PeakSequence::new(vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            PeakSequenceError::LengthMismatch {
                positions: 2,
                intensities: 1
            }
        );
        assert!(PeakSequence::try_from((vec![1.0], vec![3.0])).is_ok());
    }

    #[test]
    fn test_from_nested_pairs() {
        let seq = PeakSequence::from_nested(&[[1.0, 2.0], [2.0, 3.0], [4.0, 1.0]]).unwrap();
        assert_eq!(seq.positions, vec![1.0, 2.0, 4.0]);
        assert_eq!(seq.intensities, vec![2.0, 3.0, 1.0]);
        assert_eq!(seq.get(2), Some(Peak::new(4.0, 1.0)));
        assert_eq!(seq.get(3), None);
    }

    #[test]
    fn test_from_nested_single_pair() {
        let seq = PeakSequence::from_nested(&[[1.0, 4.0]]).unwrap();
        assert_eq!(seq.positions, vec![1.0]);
        assert_eq!(seq.intensities, vec![4.0]);

        let empty: [[f64; 2]; 0] = [];
        assert!(PeakSequence::from_nested(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_sorted() {
        let seq: PeakSequence = vec![(1.0, 1.0), (2.0, 2.0), (2.0, 3.0)].into();
        assert!(seq.is_sorted());
        let seq: PeakSequence = vec![(3.0, 1.0), (2.0, 2.0)].into();
        assert!(!seq.is_sorted());
    }
}
