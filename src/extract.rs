//! Bring peak lists into the canonical form compared by the diff sweep: restricted to a
//! position range, optionally reduced to the peaks shared with another list, and scaled
//! so the intensities sum to 1.
//!
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arrayops::PeakSequence;
use crate::statistics::{minmax, sum};

/// An inclusive position window. A missing bound leaves that side open.
///
/// A bound of `0.0` is a real bound, not an absent one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PositionRange {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl PositionRange {
    pub fn new(from: Option<f64>, to: Option<f64>) -> Self {
        Self { from, to }
    }

    pub fn between(from: f64, to: f64) -> Self {
        Self::new(Some(from), Some(to))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        self.from.map_or(true, |from| position >= from) && self.to.map_or(true, |to| position <= to)
    }
}

impl fmt::Display for PositionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from, self.to) {
            (Some(from), Some(to)) => write!(f, "[{from}, {to}]"),
            (Some(from), None) => write!(f, "[{from}, ..)"),
            (None, Some(to)) => write!(f, "(.., {to}]"),
            (None, None) => write!(f, "(.., ..)"),
        }
    }
}

/// Intensity statistics of an extracted peak list, taken before it was rescaled.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractInfo {
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl ExtractInfo {
    /// Collect statistics over `intensities`, `None` if there are none
    pub fn from_intensities(intensities: &[f64]) -> Option<Self> {
        let (min, max) = minmax(intensities)?;
        Some(Self {
            sum: sum(intensities),
            min,
            max,
        })
    }
}

/// A range-restricted, normalized peak list together with its pre-scaling statistics.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extract {
    pub data: PeakSequence,
    /// `None` when `data` is empty
    pub info: Option<ExtractInfo>,
}

/// Which side of a comparison is reduced to the peaks it shares with the other side.
///
/// The names follow the reference the peaks must be common *with*:
/// [`CommonMode::First`] keeps only the peaks of the second list that have a neighbor
/// in the first, [`CommonMode::Second`] keeps only the peaks of the first list that have
/// a neighbor in the second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommonMode {
    #[default]
    None,
    First,
    Second,
    Both,
}

impl CommonMode {
    /// Whether the first peak list is filtered against the second
    pub fn restricts_first(&self) -> bool {
        matches!(self, Self::Second | Self::Both)
    }

    /// Whether the second peak list is filtered against the first
    pub fn restricts_second(&self) -> bool {
        matches!(self, Self::First | Self::Both)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<&str> for CommonMode {
    /// Unrecognized names mean no filtering
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "first" => Self::First,
            "second" => Self::Second,
            "both" => Self::Both,
            _ => Self::None,
        }
    }
}

impl From<bool> for CommonMode {
    fn from(value: bool) -> Self {
        if value {
            Self::Both
        } else {
            Self::None
        }
    }
}

/// Copy the peaks of `seq` whose position lies in `range`, preserving order
pub fn extract(seq: &PeakSequence, range: &PositionRange) -> PeakSequence {
    seq.iter().filter(|p| range.contains(p.position)).collect()
}

/// Divide every intensity in `seq` by their sum, returning the statistics from
/// before the division.
///
/// A list whose intensities sum to exactly zero is left unscaled.
pub fn normalize(seq: &mut PeakSequence) -> Option<ExtractInfo> {
    let info = ExtractInfo::from_intensities(&seq.intensities)?;
    if info.sum != 0.0 {
        seq.intensities.iter_mut().for_each(|y| *y /= info.sum);
    } else {
        log::warn!(
            "Peak list of {} peaks has a total intensity of zero, it will not be normalized",
            seq.len()
        );
    }
    Some(info)
}

pub fn extract_and_normalize(seq: &PeakSequence, range: &PositionRange) -> Extract {
    let mut data = extract(seq, range);
    let info = normalize(&mut data);
    Extract { data, info }
}

/// Select the peaks of `seq` that have a peak of `reference` within `width / 2`.
///
/// Both lists are walked once in ascending order. The cursor into `reference` only
/// moves forward, skipping reference peaks more than `width / 2` below the current peak,
/// so the window test is made against the first reference peak that is not too low.
pub fn common_peaks(seq: &PeakSequence, reference: &PeakSequence, width: f64) -> PeakSequence {
    let half_width = width / 2.0;
    let n = reference.len();
    let mut acc = PeakSequence::with_capacity(seq.len());
    let mut cursor = 0;
    for peak in seq.iter() {
        while cursor < n && peak.position > reference.positions[cursor] + half_width {
            cursor += 1;
        }
        if cursor < n && peak.position > reference.positions[cursor] - half_width {
            acc.push(peak.position, peak.intensity);
        }
    }
    acc
}

/// Extract both peak lists over `range`, filter each according to `mode` using a
/// tolerance window of `width`, then normalize each result.
///
/// The common peak filter always sees the un-filtered extract of the other side.
pub fn common_extract_and_normalize(
    first: &PeakSequence,
    second: &PeakSequence,
    width: f64,
    range: &PositionRange,
    mode: CommonMode,
) -> (Extract, Extract) {
    let extract1 = extract(first, range);
    let extract2 = extract(second, range);
    let (n1, n2) = (extract1.len(), extract2.len());

    let mut data1 = if mode.restricts_first() {
        common_peaks(&extract1, &extract2, width)
    } else {
        extract1.clone()
    };
    let mut data2 = if mode.restricts_second() {
        common_peaks(&extract2, &extract1, width)
    } else {
        extract2
    };

    log::debug!(
        "Common peak filtering ({mode:?}) kept {}/{n1} and {}/{n2} peaks",
        data1.len(),
        data2.len(),
    );

    let info1 = normalize(&mut data1);
    let info2 = normalize(&mut data2);
    (
        Extract {
            data: data1,
            info: info1,
        },
        Extract {
            data: data2,
            info: info2,
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::isclose;
    use crate::test_data;
    use rstest::rstest;

    fn seq(positions: &[f64], intensities: &[f64]) -> PeakSequence {
        PeakSequence::new(positions.to_vec(), intensities.to_vec()).unwrap()
    }

    #[test]
    fn test_normalize_columns() {
        let extract =
            extract_and_normalize(&seq(&[1.0, 2.0], &[2.0, 3.0]), &PositionRange::default());
        assert_eq!(extract.data, seq(&[1.0, 2.0], &[0.4, 0.6]));
        let info = extract.info.unwrap();
        assert_eq!(info.sum, 5.0);
        assert_eq!(info.min, 2.0);
        assert_eq!(info.max, 3.0);

        let extract = extract_and_normalize(
            &seq(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]),
            &PositionRange::default(),
        );
        assert_eq!(extract.data, seq(&[1.0, 2.0, 3.0], &[0.125, 0.25, 0.625]));
    }

    #[test]
    fn test_range_restriction() {
        let range = PositionRange::between(1.0, 2.0);
        let extract = extract_and_normalize(&seq(&[1.0, 2.0, 3.0], &[2.0, 2.0, 5.0]), &range);
        assert_eq!(extract.data, seq(&[1.0, 2.0], &[0.5, 0.5]));

        let extract = extract_and_normalize(&seq(&[2.0, 3.0, 4.0], &[2.0, 4.0, 2.0]), &range);
        assert_eq!(extract.data, seq(&[2.0], &[1.0]));
    }

    #[test]
    fn test_zero_is_a_bound() {
        let data = seq(&[-1.0, 0.0, 1.0], &[1.0, 1.0, 2.0]);
        let kept = extract(&data, &PositionRange::new(Some(0.0), None));
        assert_eq!(kept.positions, vec![0.0, 1.0]);
        let kept = extract(&data, &PositionRange::new(None, Some(0.0)));
        assert_eq!(kept.positions, vec![-1.0, 0.0]);
    }

    #[rstest]
    #[case(PositionRange::between(1.0, 2.0))]
    #[case(PositionRange::new(Some(150.0), None))]
    #[case(PositionRange::new(None, Some(0.5)))]
    #[case(PositionRange::unbounded())]
    fn test_range_idempotent(#[case] range: PositionRange) {
        let data = test_data::reference_spectrum();
        let once = extract(&data, &range);
        let twice = extract(&once, &range);
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case(test_data::reference_spectrum())]
    #[case(test_data::shifted_spectrum())]
    #[case(seq(&[1.0], &[1e-12]))]
    #[case(seq(&[1.0, 2.0, 3.0], &[1e9, 3.0, 0.0]))]
    fn test_normalized_sum_is_one(#[case] data: PeakSequence) {
        let extract = extract_and_normalize(&data, &PositionRange::default());
        assert!(isclose(sum(&extract.data.intensities), 1.0));
    }

    #[test]
    fn test_zero_sum_left_unscaled() {
        let extract =
            extract_and_normalize(&seq(&[1.0, 2.0], &[0.0, 0.0]), &PositionRange::default());
        assert_eq!(extract.data.intensities, vec![0.0, 0.0]);
        assert_eq!(extract.info.unwrap().sum, 0.0);
    }

    #[test]
    fn test_empty_has_no_info() {
        let extract = extract_and_normalize(&PeakSequence::default(), &PositionRange::default());
        assert!(extract.data.is_empty());
        assert!(extract.info.is_none());

        let extract = extract_and_normalize(
            &seq(&[1.0, 2.0], &[1.0, 1.0]),
            &PositionRange::between(5.0, 6.0),
        );
        assert!(extract.data.is_empty());
        assert!(extract.info.is_none());
    }

    #[test]
    fn test_common_peaks() {
        let a = seq(&[1.0, 2.0, 5.0, 9.0], &[1.0, 2.0, 3.0, 4.0]);
        let b = seq(&[1.4, 5.9, 20.0], &[1.0, 1.0, 1.0]);
        let common = common_peaks(&a, &b, 2.0);
        assert_eq!(common, seq(&[1.0, 2.0, 5.0], &[1.0, 2.0, 3.0]));

        assert!(common_peaks(&a, &PeakSequence::default(), 2.0).is_empty());
        assert!(common_peaks(&PeakSequence::default(), &b, 2.0).is_empty());
    }

    #[test]
    fn test_common_peaks_window_edges() {
        let reference = seq(&[10.0], &[1.0]);
        // Exactly `width / 2` above the reference is kept, exactly below is not
        let kept = common_peaks(&seq(&[9.0, 11.0], &[1.0, 1.0]), &reference, 2.0);
        assert_eq!(kept.positions, vec![11.0]);
    }

    #[rstest]
    #[case(CommonMode::None, 3, 3)]
    #[case(CommonMode::First, 3, 2)]
    #[case(CommonMode::Second, 2, 3)]
    #[case(CommonMode::Both, 2, 2)]
    fn test_common_extract_modes(
        #[case] mode: CommonMode,
        #[case] n1: usize,
        #[case] n2: usize,
    ) {
        let a = seq(&[1.0, 2.0, 8.0], &[1.0, 1.0, 2.0]);
        let b = seq(&[1.2, 5.0, 8.3], &[1.0, 1.0, 1.0]);
        let (e1, e2) = common_extract_and_normalize(&a, &b, 1.0, &PositionRange::default(), mode);
        assert_eq!(e1.data.len(), n1);
        assert_eq!(e2.data.len(), n2);
        assert!(isclose(sum(&e1.data.intensities), 1.0));
        assert!(isclose(sum(&e2.data.intensities), 1.0));
        // Statistics describe the filtered, unscaled peaks
        if mode.restricts_first() {
            assert_eq!(e1.info.unwrap().sum, 3.0);
        } else {
            assert_eq!(e1.info.unwrap().sum, 4.0);
        }
    }

    #[test]
    fn test_common_mode_parsing() {
        assert_eq!(CommonMode::from("first"), CommonMode::First);
        assert_eq!(CommonMode::from("SECOND"), CommonMode::Second);
        assert_eq!(CommonMode::from("Both"), CommonMode::Both);
        assert_eq!(CommonMode::from(""), CommonMode::None);
        assert_eq!(CommonMode::from("nonsense"), CommonMode::None);
        assert_eq!(CommonMode::from(true), CommonMode::Both);
        assert_eq!(CommonMode::from(false), CommonMode::None);
    }

    #[test]
    fn test_range_display() {
        assert_eq!(PositionRange::between(1.0, 2.5).to_string(), "[1, 2.5]");
        assert_eq!(PositionRange::unbounded().to_string(), "(.., ..)");
    }
}
