//! `peaksim` scores how similar two peak lists are, for example two centroided
//! mass spectra.
//!
//! Both lists are restricted to a position range and normalized to a total intensity
//! of 1. Each peak is then modeled as a trapezoid shaped pulse, and a single sweep over
//! both lists removes the intensity their pulses share. The fraction of the second
//! list's intensity that was matched is the similarity, from 0 for nothing in common to
//! 1 for identical lists.
//!
//! The [`Comparator`] holds the two lists and the options and is the usual entry point.
//! The individual steps are also exposed in [`extract`], [`overlap`], [`sweep`] and
//! [`similarity`].
//!
//! # Usage
//! ```
//! use peaksim::{Comparator, ComparatorOptions, PeakSequence};
//!
//! let mut comparator = ComparatorOptions::default()
//!     .width_bottom(4.0)
//!     .width_top(2.0)
//!     .trapezoid(true)
//!     .build()
//!     .unwrap();
//!
//! // An outer array of two rows is read as positions and intensities
//! comparator.set_peaks1([[1.0, 2.0], [1.0, 1.0]]);
//! // Anything else is read as position, intensity pairs
//! comparator.set_peaks2(vec![(1.0, 1.0)]);
//!
//! let result = comparator.similarity().unwrap();
//! assert!((result.similarity - 5.0 / 6.0).abs() < 1e-12);
//!
//! // Score many normalized candidates against the first list
//! let candidates = vec![
//!     PeakSequence::from(vec![(1.0, 1.0)]),
//!     PeakSequence::from(vec![(40.0, 1.0)]),
//! ];
//! let scores = comparator
//!     .fast_similarity_batch(&candidates, comparator.range())
//!     .unwrap();
//! assert_eq!(scores[1], 0.0);
//! ```
//!
//! ## Features
//! - `parallelism` (default) scores batches in parallel with `rayon`
//! - `serde` derives `Serialize` and `Deserialize` for the options and results
pub mod arrayops;
pub mod comparator;
pub mod extract;
pub mod overlap;
pub mod peak;
pub mod prelude;
pub mod similarity;
pub mod statistics;
pub mod sweep;
pub mod text;

#[cfg(test)]
mod test_data;

pub use crate::arrayops::{PeakSequence, PeakSequenceError};
pub use crate::comparator::{
    CommonOption, Comparator, ComparatorError, ComparatorOptions, PeakSlot,
};
pub use crate::extract::{
    common_peaks, extract, extract_and_normalize, normalize, CommonMode, Extract, ExtractInfo,
    PositionRange,
};
pub use crate::overlap::{
    Kernel, OverlapError, OverlapKernel, OverlapMode, SimpleOverlap, TrapezoidOverlap,
    TrapezoidShape,
};
pub use crate::peak::{InputLayout, Peak, PeakInput};
pub use crate::similarity::{similarity_from_residual, SimilarityResult};
pub use crate::sweep::{compute_residual, compute_residuals, Residuals};
