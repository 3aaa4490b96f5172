//! Traits and types needed to use a [`Comparator`] or call the kernels directly
pub use crate::arrayops::PeakSequence;
pub use crate::comparator::{Comparator, ComparatorOptions};
pub use crate::extract::{CommonMode, PositionRange};
pub use crate::overlap::{OverlapKernel, OverlapMode, TrapezoidShape};
pub use crate::peak::{Peak, PeakInput};
