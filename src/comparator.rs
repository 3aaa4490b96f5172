//! A stateful facade over the extraction, sweep and scoring steps.
//!
//! A [`Comparator`] owns the two peak lists being compared and the options that shape
//! the comparison. Whenever a peak list, the position range or the common peak mode
//! changes, the normalized extracts are derived again from the stored peak lists, so
//! [`Comparator::similarity`] only has to run the sweep.
//!
//! # Example
//! ```
//! use peaksim::{Comparator, ComparatorOptions};
//!
//! let mut comparator = ComparatorOptions::default()
//!     .width_bottom(2.0)
//!     .width_top(2.0)
//!     .build()
//!     .unwrap();
//! let result = comparator
//!     .compare([[1.0, 2.0], [1.0, 1.0]], [[1.0, 3.0], [1.0, 1.0]])
//!     .unwrap();
//! assert_eq!(result.similarity, 1.0);
//! ```
use std::fmt;

use thiserror::Error;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arrayops::PeakSequence;
use crate::extract::{
    common_extract_and_normalize, common_peaks, extract, extract_and_normalize, normalize,
    CommonMode, Extract, ExtractInfo, PositionRange,
};
use crate::overlap::{Kernel, OverlapError, OverlapMode, TrapezoidShape};
use crate::peak::PeakInput;
use crate::similarity::{similarity_from_residual, SimilarityResult};
use crate::sweep::compute_residual;

/// Identifies one of the two peak lists held by a [`Comparator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeakSlot {
    First,
    Second,
}

impl fmt::Display for PeakSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakSlot::First => f.write_str("first"),
            PeakSlot::Second => f.write_str("second"),
        }
    }
}

/// All the ways a comparison can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparatorError {
    #[error(transparent)]
    Overlap(#[from] OverlapError),
    #[error("The {0} peak list is missing or malformed")]
    MissingPeaks(PeakSlot),
}

/// The `common` option accepts either a flag or the name of a [`CommonMode`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum CommonOption {
    Flag(bool),
    Named(String),
}

impl Default for CommonOption {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl From<&CommonOption> for CommonMode {
    fn from(value: &CommonOption) -> Self {
        match value {
            CommonOption::Flag(flag) => CommonMode::from(*flag),
            CommonOption::Named(name) => CommonMode::from(name.as_str()),
        }
    }
}

impl From<bool> for CommonOption {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for CommonOption {
    fn from(value: &str) -> Self {
        Self::Named(value.to_string())
    }
}

impl From<CommonMode> for CommonOption {
    fn from(value: CommonMode) -> Self {
        match value {
            CommonMode::None => Self::Flag(false),
            CommonMode::First => Self::Named("first".into()),
            CommonMode::Second => Self::Named("second".into()),
            CommonMode::Both => Self::Flag(true),
        }
    }
}

/// Configuration for a [`Comparator`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ComparatorOptions {
    /// Which peak lists to reduce to the peaks they share, see [`CommonMode`]
    pub common: CommonOption,
    /// Kept for configuration compatibility. The common peak tolerance window is
    /// `width_bottom`.
    pub common_factor: f64,
    /// The width of the base of each peak's trapezoid
    pub width_bottom: f64,
    /// The width of the flat top of each peak's trapezoid
    pub width_top: f64,
    /// The lowest position to compare
    pub from: Option<f64>,
    /// The highest position to compare
    pub to: Option<f64>,
    /// Use the [`TrapezoidOverlap`](crate::overlap::TrapezoidOverlap) kernel instead of
    /// [`SimpleOverlap`](crate::overlap::SimpleOverlap)
    pub trapezoid: bool,
}

impl Default for ComparatorOptions {
    fn default() -> Self {
        Self {
            common: CommonOption::default(),
            common_factor: 4.0,
            width_bottom: 2.0,
            width_top: 1.0,
            from: None,
            to: None,
            trapezoid: false,
        }
    }
}

impl ComparatorOptions {
    pub fn common<C: Into<CommonOption>>(mut self, common: C) -> Self {
        self.common = common.into();
        self
    }

    pub fn common_factor(mut self, common_factor: f64) -> Self {
        self.common_factor = common_factor;
        self
    }

    pub fn width_bottom(mut self, width_bottom: f64) -> Self {
        self.width_bottom = width_bottom;
        self
    }

    pub fn width_top(mut self, width_top: f64) -> Self {
        self.width_top = width_top;
        self
    }

    pub fn from(mut self, from: f64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: f64) -> Self {
        self.to = Some(to);
        self
    }

    pub fn trapezoid(mut self, trapezoid: bool) -> Self {
        self.trapezoid = trapezoid;
        self
    }

    pub fn common_mode(&self) -> CommonMode {
        CommonMode::from(&self.common)
    }

    pub fn range(&self) -> PositionRange {
        PositionRange::new(self.from, self.to)
    }

    pub fn overlap_mode(&self) -> OverlapMode {
        if self.trapezoid {
            OverlapMode::Trapezoid
        } else {
            OverlapMode::Simple
        }
    }

    pub fn shape(&self) -> Result<TrapezoidShape, OverlapError> {
        TrapezoidShape::new(self.width_bottom, self.width_top)
    }

    pub fn build(self) -> Result<Comparator, ComparatorError> {
        Comparator::new(self)
    }
}

/// Derive both extracts from the stored peak lists. A missing peak list leaves its
/// extract missing, and in common mode a missing side leaves both missing.
fn derive_extracts(
    peaks1: Option<&PeakSequence>,
    peaks2: Option<&PeakSequence>,
    width: f64,
    range: &PositionRange,
    common: CommonMode,
) -> (Option<Extract>, Option<Extract>) {
    if common.is_none() {
        (
            peaks1.map(|p| extract_and_normalize(p, range)),
            peaks2.map(|p| extract_and_normalize(p, range)),
        )
    } else {
        match (peaks1, peaks2) {
            (Some(p1), Some(p2)) => {
                let (e1, e2) = common_extract_and_normalize(p1, p2, width, range, common);
                (Some(e1), Some(e2))
            }
            _ => (None, None),
        }
    }
}

/// Compare two peak lists under a set of options.
///
/// Similarity is the fraction of the *second* peak list's normalized intensity that could
/// be matched against the first.
#[derive(Debug, Clone)]
pub struct Comparator {
    peaks1: Option<PeakSequence>,
    peaks2: Option<PeakSequence>,
    extract1: Option<Extract>,
    extract2: Option<Extract>,
    range: PositionRange,
    shape: TrapezoidShape,
    common: CommonMode,
    common_factor: f64,
    overlap_mode: OverlapMode,
}

impl Default for Comparator {
    fn default() -> Self {
        let options = ComparatorOptions::default();
        let mut inst = Self {
            peaks1: Some(PeakSequence::default()),
            peaks2: Some(PeakSequence::default()),
            extract1: None,
            extract2: None,
            range: options.range(),
            shape: TrapezoidShape::default(),
            common: options.common_mode(),
            common_factor: options.common_factor,
            overlap_mode: options.overlap_mode(),
        };
        inst.refresh();
        inst
    }
}

impl Comparator {
    /// Create a comparator with no peaks, failing if the trapezoid widths are invalid
    pub fn new(options: ComparatorOptions) -> Result<Self, ComparatorError> {
        let mut inst = Self::default();
        inst.set_options(options)?;
        Ok(inst)
    }

    /// Replace every option at once. The stored peak lists are kept and their extracts
    /// are derived again. Nothing changes if the trapezoid widths are invalid.
    pub fn set_options(&mut self, options: ComparatorOptions) -> Result<(), ComparatorError> {
        self.shape = options.shape()?;
        self.common = options.common_mode();
        self.common_factor = options.common_factor;
        self.overlap_mode = options.overlap_mode();
        self.range = options.range();
        self.refresh();
        Ok(())
    }

    /// The options this comparator currently runs with
    pub fn options(&self) -> ComparatorOptions {
        ComparatorOptions {
            common: self.common.into(),
            common_factor: self.common_factor,
            width_bottom: self.shape.width_bottom(),
            width_top: self.shape.width_top(),
            from: self.range.from,
            to: self.range.to,
            trapezoid: matches!(self.overlap_mode, OverlapMode::Trapezoid),
        }
    }

    fn refresh(&mut self) {
        let (extract1, extract2) = derive_extracts(
            self.peaks1.as_ref(),
            self.peaks2.as_ref(),
            self.shape.width_bottom(),
            &self.range,
            self.common,
        );
        log::debug!(
            "Derived extracts of {:?} and {:?} peaks over {} ({:?})",
            extract1.as_ref().map(|e| e.data.len()),
            extract2.as_ref().map(|e| e.data.len()),
            self.range,
            self.common,
        );
        self.extract1 = extract1;
        self.extract2 = extract2;
    }

    fn store(input: PeakInput, slot: PeakSlot) -> Option<PeakSequence> {
        let seq = input.into_sequence();
        match &seq {
            Some(seq) if !seq.is_sorted() => {
                log::warn!("The {slot} peak list is not sorted by position")
            }
            None => log::warn!("The {slot} peak list is malformed and will not be compared"),
            _ => {}
        }
        seq
    }

    pub fn set_peaks1<P: Into<PeakInput>>(&mut self, peaks: P) {
        self.peaks1 = Self::store(peaks.into(), PeakSlot::First);
        self.refresh();
    }

    pub fn set_peaks2<P: Into<PeakInput>>(&mut self, peaks: P) {
        self.peaks2 = Self::store(peaks.into(), PeakSlot::Second);
        self.refresh();
    }

    /// Restrict both peak lists to `range`. Does nothing if the range is unchanged.
    pub fn set_range(&mut self, range: PositionRange) {
        if range == self.range {
            return;
        }
        self.range = range;
        self.refresh();
    }

    pub fn set_from_to(&mut self, from: Option<f64>, to: Option<f64>) {
        self.set_range(PositionRange::new(from, to))
    }

    /// Change the peak footprint. The extracts are not derived again, even in common mode.
    pub fn set_trapezoid(
        &mut self,
        width_bottom: f64,
        width_top: f64,
    ) -> Result<(), ComparatorError> {
        self.shape = TrapezoidShape::new(width_bottom, width_top)?;
        Ok(())
    }

    pub fn set_common(&mut self, common: CommonMode) {
        if common == self.common {
            return;
        }
        self.common = common;
        self.refresh();
    }

    pub fn set_overlap_mode(&mut self, overlap_mode: OverlapMode) {
        self.overlap_mode = overlap_mode;
    }

    pub fn peaks1(&self) -> Option<&PeakSequence> {
        self.peaks1.as_ref()
    }

    pub fn peaks2(&self) -> Option<&PeakSequence> {
        self.peaks2.as_ref()
    }

    /// The range-restricted, normalized first peak list, `None` if its input was malformed
    pub fn extract1(&self) -> Option<&PeakSequence> {
        self.extract1.as_ref().map(|e| &e.data)
    }

    /// The range-restricted, normalized second peak list, `None` if its input was malformed
    pub fn extract2(&self) -> Option<&PeakSequence> {
        self.extract2.as_ref().map(|e| &e.data)
    }

    pub fn extract_info1(&self) -> Option<&ExtractInfo> {
        self.extract1.as_ref().and_then(|e| e.info.as_ref())
    }

    pub fn extract_info2(&self) -> Option<&ExtractInfo> {
        self.extract2.as_ref().and_then(|e| e.info.as_ref())
    }

    pub fn range(&self) -> &PositionRange {
        &self.range
    }

    pub fn shape(&self) -> &TrapezoidShape {
        &self.shape
    }

    pub fn common_mode(&self) -> CommonMode {
        self.common
    }

    pub fn common_factor(&self) -> f64 {
        self.common_factor
    }

    pub fn overlap_mode(&self) -> OverlapMode {
        self.overlap_mode
    }

    /// The kernel selected by the current overlap mode and trapezoid shape
    pub fn kernel(&self) -> Kernel {
        Kernel::new(self.overlap_mode, self.shape)
    }

    /// Select the peaks of `seq` within `width_bottom / 2` of a peak of `reference`
    pub fn common_peaks(&self, seq: &PeakSequence, reference: &PeakSequence) -> PeakSequence {
        common_peaks(seq, reference, self.shape.width_bottom())
    }

    /// Score the stored peak lists against each other
    pub fn similarity(&self) -> Result<SimilarityResult, ComparatorError> {
        let extract1 = self
            .extract1
            .as_ref()
            .ok_or(ComparatorError::MissingPeaks(PeakSlot::First))?;
        let extract2 = self
            .extract2
            .as_ref()
            .ok_or(ComparatorError::MissingPeaks(PeakSlot::Second))?;

        let kernel = self.kernel();
        let diff = compute_residual(&extract1.data, &extract2.data, &kernel)?;
        let similarity = similarity_from_residual(&diff);
        log::debug!(
            "Similarity {similarity:0.4} between {} and {} peaks with {} ({:?})",
            extract1.data.len(),
            extract2.data.len(),
            self.shape,
            self.overlap_mode
        );

        Ok(SimilarityResult {
            diff,
            extract1: extract1.data.clone(),
            extract2: extract2.data.clone(),
            extract_info1: extract1.info,
            extract_info2: extract2.info,
            similarity,
            width_bottom: self.shape.width_bottom(),
            width_top: self.shape.width_top(),
        })
    }

    /// Replace both peak lists, then score them
    pub fn compare<A: Into<PeakInput>, B: Into<PeakInput>>(
        &mut self,
        peaks1: A,
        peaks2: B,
    ) -> Result<SimilarityResult, ComparatorError> {
        self.peaks1 = Self::store(peaks1.into(), PeakSlot::First);
        self.peaks2 = Self::store(peaks2.into(), PeakSlot::Second);
        self.refresh();
        self.similarity()
    }

    fn reference_extract(&self, range: &PositionRange) -> Result<PeakSequence, ComparatorError> {
        let peaks1 = self
            .peaks1
            .as_ref()
            .ok_or(ComparatorError::MissingPeaks(PeakSlot::First))?;
        Ok(extract(peaks1, range))
    }

    fn score_against(
        &self,
        reference: &PeakSequence,
        normalized2: &PeakSequence,
        kernel: &Kernel,
    ) -> Result<f64, ComparatorError> {
        let mut extract1 = if self.common.restricts_first() {
            common_peaks(reference, normalized2, self.shape.width_bottom())
        } else {
            reference.clone()
        };
        normalize(&mut extract1);
        let residual = compute_residual(&extract1, normalized2, kernel)?;
        Ok(similarity_from_residual(&residual))
    }

    /// Score an already normalized second peak list against the stored first peak list
    /// restricted to `range`.
    ///
    /// `normalized2` is used as given, its intensities should already sum to 1. Neither
    /// stored peak list nor the stored extracts are changed.
    pub fn fast_similarity(
        &self,
        normalized2: &PeakSequence,
        range: &PositionRange,
    ) -> Result<f64, ComparatorError> {
        let reference = self.reference_extract(range)?;
        self.score_against(&reference, normalized2, &self.kernel())
    }

    /// [`Comparator::fast_similarity`] over many candidates, in parallel when the
    /// `parallelism` feature is enabled
    pub fn fast_similarity_batch(
        &self,
        candidates: &[PeakSequence],
        range: &PositionRange,
    ) -> Result<Vec<f64>, ComparatorError> {
        let reference = self.reference_extract(range)?;
        score_batch(self, &reference, candidates, &self.kernel())
    }
}

// Can't inline cfg-if
cfg_if::cfg_if! {
    if #[cfg(feature = "parallelism")] {
        fn score_batch(
            comparator: &Comparator,
            reference: &PeakSequence,
            candidates: &[PeakSequence],
            kernel: &Kernel,
        ) -> Result<Vec<f64>, ComparatorError> {
            candidates
                .par_iter()
                .map(|candidate| comparator.score_against(reference, candidate, kernel))
                .collect()
        }
    } else {
        fn score_batch(
            comparator: &Comparator,
            reference: &PeakSequence,
            candidates: &[PeakSequence],
            kernel: &Kernel,
        ) -> Result<Vec<f64>, ComparatorError> {
            candidates
                .iter()
                .map(|candidate| comparator.score_against(reference, candidate, kernel))
                .collect()
        }
    }
}
