use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arrayops::PeakSequence;
use crate::extract::ExtractInfo;

/// Reduce the residual of the second peak list to a score.
///
/// The second list's intensities summed to 1 before the sweep, so this is the
/// fraction of its intensity that was matched. An empty residual scores 0.
pub fn similarity_from_residual(residual: &PeakSequence) -> f64 {
    if residual.is_empty() {
        return 0.0;
    }
    let unmatched: f64 = residual.intensities.iter().map(|y| y.abs()).sum();
    1.0 - unmatched
}

/// The outcome of comparing two peak lists, with the intermediate
/// extracts used to produce it.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimilarityResult {
    /// The residual intensity of the second peak list
    pub diff: PeakSequence,
    pub extract1: PeakSequence,
    pub extract2: PeakSequence,
    pub extract_info1: Option<ExtractInfo>,
    pub extract_info2: Option<ExtractInfo>,
    pub similarity: f64,
    pub width_bottom: f64,
    pub width_top: f64,
}

impl fmt::Display for SimilarityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SimilarityResult({}, {} vs {} peaks, {}, {})",
            self.similarity,
            self.extract1.len(),
            self.extract2.len(),
            self.width_bottom,
            self.width_top
        )
    }
}
