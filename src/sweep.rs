//! A single pass alignment of two normalized peak lists that consumes the intensity
//! they share, leaving behind what could not be matched.
//!
//! This is a deterministic heuristic, not an optimal assignment. A cursor walks the first
//! list, and for each of its peaks a second cursor scans forward through the second
//! list from a bookmark, applying the [`OverlapKernel`] to every pair closer than the
//! kernel's reach. The bookmark only advances past peaks of the second list that lie
//! too far below the current peak of the first list.
//!
use crate::arrayops::PeakSequence;
use crate::overlap::{OverlapError, OverlapKernel};

/// What remains of both peak lists after their shared intensity was removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Residuals {
    pub first: PeakSequence,
    pub second: PeakSequence,
}

/// Run the sweep over working copies of `first` and `second`, returning both residuals.
///
/// Intensities are decreased by the overlap the kernel reports and are not clamped.
pub fn compute_residuals<K: OverlapKernel>(
    first: &PeakSequence,
    second: &PeakSequence,
    kernel: &K,
) -> Result<Residuals, OverlapError> {
    let mut residuals = Residuals {
        first: first.clone(),
        second: second.clone(),
    };

    let n1 = first.len();
    let n2 = second.len();
    if n1 == 0 || n2 == 0 {
        return Ok(residuals);
    }

    let reach = kernel.reach();
    let trace = log::log_enabled!(log::Level::Trace);

    let x1 = &residuals.first.positions;
    let y1 = &mut residuals.first.intensities;
    let x2 = &residuals.second.positions;
    let y2 = &mut residuals.second.intensities;

    let mut pos1 = 0;
    let mut pos2 = 0;
    let mut previous2 = 0;

    while pos1 < n1 {
        let diff = x1[pos1] - x2[pos2];
        if diff.abs() < reach {
            let overlap = kernel.overlap(x1[pos1], y1[pos1], x2[pos2], y2[pos2])?;
            if trace {
                log::trace!(
                    "{pos1}:{pos2} at {:0.4}/{:0.4} shares {overlap:0.6}",
                    x1[pos1],
                    x2[pos2]
                );
            }
            y1[pos1] -= overlap;
            y2[pos2] -= overlap;

            if pos2 < n2 - 1 {
                pos2 += 1;
            } else {
                pos1 += 1;
                pos2 = previous2;
            }
        } else if diff > 0.0 && pos2 < n2 - 1 {
            pos2 += 1;
            previous2 = pos2;
        } else {
            pos1 += 1;
            pos2 = previous2;
        }
    }

    Ok(residuals)
}

/// Run the sweep and keep only the residual of `second`.
///
/// Similarity is defined as the matched fraction of the second list, so the first list's
/// leftover intensity is not reported.
pub fn compute_residual<K: OverlapKernel>(
    first: &PeakSequence,
    second: &PeakSequence,
    kernel: &K,
) -> Result<PeakSequence, OverlapError> {
    compute_residuals(first, second, kernel).map(|r| r.second)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::comparator::ComparatorError;
    use crate::overlap::{SimpleOverlap, TrapezoidOverlap, TrapezoidShape};
    use crate::test_data::isclose;

    /// Only overlaps peaks at identical positions and fails for any other pair
    struct ExactOnly {
        shape: TrapezoidShape,
    }

    impl OverlapKernel for ExactOnly {
        fn shape(&self) -> &TrapezoidShape {
            &self.shape
        }

        fn overlap(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<f64, OverlapError> {
            if x1 == x2 {
                Ok(y1.min(y2))
            } else {
                Err(OverlapError::NoIntersection {
                    distance: (x1 - x2).abs(),
                    small: y1.min(y2),
                    big: y1.max(y2),
                })
            }
        }
    }

    fn seq(positions: &[f64], intensities: &[f64]) -> PeakSequence {
        PeakSequence::new(positions.to_vec(), intensities.to_vec()).unwrap()
    }

    fn simple(width_bottom: f64, width_top: f64) -> SimpleOverlap {
        SimpleOverlap::new(TrapezoidShape::new(width_bottom, width_top).unwrap())
    }

    #[test_log::test]
    fn test_full_consumption() {
        let a = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let b = seq(&[1.0, 3.0], &[0.5, 0.5]);
        let residuals = compute_residuals(&a, &b, &simple(2.0, 2.0)).unwrap();
        assert_eq!(residuals.second.intensities, vec![0.0, 0.0]);
        assert_eq!(residuals.first.intensities, vec![0.0, 0.0]);
        // Positions are untouched
        assert_eq!(residuals.second.positions, b.positions);
    }

    #[test_log::test]
    fn test_partial_consumption() {
        let a = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let b = seq(&[3.0, 4.0], &[0.5, 0.5]);
        let residual = compute_residual(&a, &b, &simple(2.0, 2.0)).unwrap();
        assert_eq!(residual.intensities, vec![0.0, 0.5]);
    }

    #[test]
    fn test_inputs_untouched() {
        let a = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let b = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let residual = compute_residual(&a, &b, &simple(0.2, 0.2)).unwrap();
        assert_eq!(residual.intensities, vec![0.0, 0.0]);
        assert_eq!(a.intensities, vec![0.5, 0.5]);
        assert_eq!(b.intensities, vec![0.5, 0.5]);
    }

    #[test]
    fn test_bookmark_rewind() {
        // Both peaks of the first list get a chance at the wide second peak
        let a = seq(&[1.0, 1.1], &[0.5, 0.5]);
        let b = seq(&[1.05], &[1.0]);
        let residual = compute_residual(&a, &b, &simple(1.0, 1.0)).unwrap();
        assert!(isclose(residual.intensities[0], 0.0));
    }

    #[test]
    fn test_empty_sides() {
        let a = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let empty = PeakSequence::default();
        let kernel = simple(2.0, 1.0);
        assert!(compute_residual(&a, &empty, &kernel).unwrap().is_empty());
        assert_eq!(compute_residual(&empty, &a, &kernel).unwrap(), a);
        let residuals = compute_residuals(&a, &empty, &kernel).unwrap();
        assert_eq!(residuals.first, a);
    }

    #[test]
    fn test_trapezoid_kernel() {
        let kernel = TrapezoidOverlap::new(TrapezoidShape::new(4.0, 2.0).unwrap());
        let a = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let b = seq(&[1.0], &[1.0]);
        let residual = compute_residual(&a, &b, &kernel).unwrap();
        assert!(isclose(residual.intensities[0], 1.0 / 6.0));
    }

    #[test]
    fn test_kernel_error_propagates() {
        let kernel = ExactOnly {
            shape: TrapezoidShape::default(),
        };
        let a = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let b = seq(&[1.0, 2.5], &[0.25, 0.75]);
        let err = compute_residuals(&a, &b, &kernel).unwrap_err();
        assert_eq!(
            err,
            OverlapError::NoIntersection {
                distance: 1.5,
                small: 0.25,
                big: 0.75
            }
        );
        assert!(compute_residual(&a, &b, &kernel).is_err());

        let err: ComparatorError = err.into();
        assert!(matches!(
            err,
            ComparatorError::Overlap(OverlapError::NoIntersection { .. })
        ));

        // Pairs out of reach never reach the kernel
        let far = seq(&[10.0, 20.0], &[0.5, 0.5]);
        assert_eq!(compute_residual(&a, &far, &kernel).unwrap(), far);
    }

    #[test]
    fn test_far_apart() {
        let a = seq(&[1.0, 2.0], &[0.5, 0.5]);
        let b = seq(&[10.0, 20.0], &[0.5, 0.5]);
        let residual = compute_residual(&a, &b, &simple(2.0, 1.0)).unwrap();
        assert_eq!(residual, b);
    }
}
