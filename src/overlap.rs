//! Pairwise overlap kernels.
//!
//! Each peak is treated as a symmetric pulse with a trapezoidal footprint rather than a
//! point, so two peaks at slightly different positions still share some of their
//! intensity. An [`OverlapKernel`] reports how much intensity two peaks share, which
//! the diff sweep then removes from both of them.
//!
//! Two kernels are provided:
//! - [`SimpleOverlap`] interpolates linearly between full and no overlap
//! - [`TrapezoidOverlap`] computes the exact intersecting area of two trapezoids
//!
use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All the ways an overlap computation can fail
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OverlapError {
    #[error("widthBottom ({width_bottom}) has to be larger than widthTop ({width_top})")]
    InvalidShape { width_bottom: f64, width_top: f64 },
    #[error("Trapezoid widths must be finite and non-negative, got ({width_bottom}, {width_top})")]
    InvalidWidth { width_bottom: f64, width_top: f64 },
    #[error("No edge intersection at distance {distance} for heights {small} and {big}")]
    NoIntersection { distance: f64, small: f64, big: f64 },
}

/// The footprint of the pulse used to represent a single peak.
///
/// `width_bottom` is the full width at the base and `width_top` the width of the
/// flat top, with `width_bottom >= width_top >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrapezoidShape {
    width_bottom: f64,
    width_top: f64,
}

impl Default for TrapezoidShape {
    fn default() -> Self {
        Self {
            width_bottom: 2.0,
            width_top: 1.0,
        }
    }
}

impl TrapezoidShape {
    pub fn new(width_bottom: f64, width_top: f64) -> Result<Self, OverlapError> {
        if !(width_bottom.is_finite() && width_top.is_finite()) || width_top < 0.0 {
            return Err(OverlapError::InvalidWidth {
                width_bottom,
                width_top,
            });
        }
        if width_bottom < width_top {
            return Err(OverlapError::InvalidShape {
                width_bottom,
                width_top,
            });
        }
        Ok(Self {
            width_bottom,
            width_top,
        })
    }

    #[inline]
    pub fn width_bottom(&self) -> f64 {
        self.width_bottom
    }

    #[inline]
    pub fn width_top(&self) -> f64 {
        self.width_top
    }

    /// The horizontal extent of one sloped side
    #[inline]
    pub fn width_slope(&self) -> f64 {
        (self.width_bottom - self.width_top) / 2.0
    }

    /// The scaling that gives a unit height trapezoid an area of 1
    #[inline]
    pub fn area_factor(&self) -> f64 {
        2.0 / (self.width_top + self.width_bottom)
    }
}

impl fmt::Display for TrapezoidShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trapezoid({}, {})", self.width_bottom, self.width_top)
    }
}

/// How far outside `[0, 1]` a segment parameter may fall and still count as a crossing.
/// A crossing on the joint of two consecutive segments must be found on at least one
/// of them.
pub const PARAMETER_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Find the point where this segment crosses `other`.
    ///
    /// Solves `start + t * (end - start) == other.start + s * (other.end - other.start)`
    /// and accepts the solution when both `s` and `t` lie in `[0, 1]`, give or take
    /// [`PARAMETER_TOLERANCE`]. Parallel or collinear segments report no intersection.
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        let s1_x = self.end.x - self.start.x;
        let s1_y = self.end.y - self.start.y;
        let s2_x = other.end.x - other.start.x;
        let s2_y = other.end.y - other.start.y;

        let denominator = -s2_x * s1_y + s1_x * s2_y;
        if denominator == 0.0 {
            return None;
        }

        let dx = self.start.x - other.start.x;
        let dy = self.start.y - other.start.y;
        let s = (-s1_y * dx + s1_x * dy) / denominator;
        let t = (s2_x * dy - s2_y * dx) / denominator;

        let bounds = -PARAMETER_TOLERANCE..=1.0 + PARAMETER_TOLERANCE;
        if bounds.contains(&s) && bounds.contains(&t) {
            let t = t.clamp(0.0, 1.0);
            Some(Point::new(self.start.x + t * s1_x, self.start.y + t * s1_y))
        } else {
            None
        }
    }
}

/// A way to measure the intensity shared between two peaks
pub trait OverlapKernel {
    /// The footprint each peak is modeled with
    fn shape(&self) -> &TrapezoidShape;

    /// The intensity shared by a peak at `x1` with intensity `y1` and a peak at `x2`
    /// with intensity `y2`. Never negative and never more than `min(y1, y2)`.
    fn overlap(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<f64, OverlapError>;

    /// The largest separation at which two peaks may still overlap
    #[inline]
    fn reach(&self) -> f64 {
        self.shape().width_bottom()
    }
}

impl<K: OverlapKernel + ?Sized> OverlapKernel for &K {
    fn shape(&self) -> &TrapezoidShape {
        (**self).shape()
    }

    fn overlap(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<f64, OverlapError> {
        (**self).overlap(x1, y1, x2, y2)
    }
}

/// Linear interpolation between full overlap and no overlap.
///
/// Note that the peak separation is doubled before it is compared against the
/// configured widths.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimpleOverlap {
    pub shape: TrapezoidShape,
}

impl SimpleOverlap {
    pub fn new(shape: TrapezoidShape) -> Self {
        Self { shape }
    }
}

impl OverlapKernel for SimpleOverlap {
    fn shape(&self) -> &TrapezoidShape {
        &self.shape
    }

    fn overlap(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<f64, OverlapError> {
        if y1 == 0.0 || y2 == 0.0 {
            return Ok(0.0);
        }
        let width_bottom = self.shape.width_bottom;
        let width_top = self.shape.width_top;

        let diff = (x1 - x2).abs() * 2.0;
        if diff > width_bottom {
            return Ok(0.0);
        }
        if diff <= width_top {
            return Ok(y1.min(y2));
        }
        let max_value = y1.max(y2) * (width_bottom - diff) / (width_bottom - width_top);
        Ok(y1.min(y2).min(max_value))
    }
}

/// The exact area shared by two trapezoid pulses, scaled so that a unit height
/// pulse has an area of 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrapezoidOverlap {
    pub shape: TrapezoidShape,
}

impl TrapezoidOverlap {
    pub fn new(shape: TrapezoidShape) -> Self {
        Self { shape }
    }

    fn equal_heights(&self, diff: f64, height: f64) -> f64 {
        let width_bottom = self.shape.width_bottom;
        let width_top = self.shape.width_top;
        let factor = self.shape.area_factor();
        if diff <= width_top {
            ((width_top + width_bottom) / 2.0 - diff) * height * factor
        } else {
            (width_bottom - diff) * height / 2.0 * (diff - width_top) / (width_bottom - width_top)
                * factor
        }
    }

    /// The lower pulse is laid out from the origin as three segments and the facing
    /// edge of the higher pulse is placed `diff` away. Which of the three segments that
    /// edge crosses decides how the shared area is computed.
    fn unequal_heights(
        &self,
        diff: f64,
        small: f64,
        big: f64,
        higher_is_ahead: bool,
    ) -> Result<f64, OverlapError> {
        let width_bottom = self.shape.width_bottom;
        let width_top = self.shape.width_top;
        let width_slope = self.shape.width_slope();
        let factor = self.shape.area_factor();

        let rising = Segment::new(Point::new(0.0, 0.0), Point::new(width_slope, small));
        let top = Segment::new(
            Point::new(width_slope, small),
            Point::new(width_slope + width_top, small),
        );
        let falling = Segment::new(
            Point::new(width_top + width_slope, small),
            Point::new(width_bottom, 0.0),
        );

        let edge = if higher_is_ahead {
            Segment::new(Point::new(diff, 0.0), Point::new(diff + width_slope, big))
        } else {
            Segment::new(Point::new(diff + width_slope, big), Point::new(diff, 0.0))
        };

        if let Some(hit) = rising.intersection(&edge) {
            return Ok(small - diff * hit.y / 2.0 * factor);
        }
        if let Some(hit) = top.intersection(&edge) {
            return Ok((width_slope * small / (2.0 * big) * small
                + (width_top + width_slope - hit.x) * small
                + width_slope * small / 2.0)
                * factor);
        }
        if let Some(hit) = falling.intersection(&edge) {
            return Ok((width_bottom - diff) * hit.y / 2.0 * factor);
        }
        Err(OverlapError::NoIntersection {
            distance: diff,
            small,
            big,
        })
    }
}

impl OverlapKernel for TrapezoidOverlap {
    fn shape(&self) -> &TrapezoidShape {
        &self.shape
    }

    fn overlap(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<f64, OverlapError> {
        if y1 == 0.0 || y2 == 0.0 {
            return Ok(0.0);
        }
        if x1 == x2 {
            return Ok(y1.min(y2));
        }

        let diff = (x1 - x2).abs();
        if diff >= self.shape.width_bottom {
            return Ok(0.0);
        }

        if y1 == y2 {
            Ok(self.equal_heights(diff, y1))
        } else {
            let higher_is_ahead = (x1 > x2 && y1 > y2) || (x1 < x2 && y1 < y2);
            self.unequal_heights(diff, y1.min(y2), y1.max(y2), higher_is_ahead)
        }
    }
}

/// Selects which [`OverlapKernel`] a comparison uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverlapMode {
    #[default]
    Simple,
    Trapezoid,
}

/// One of the provided overlap kernels, dispatched by variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Simple(SimpleOverlap),
    Trapezoid(TrapezoidOverlap),
}

impl Kernel {
    pub fn new(mode: OverlapMode, shape: TrapezoidShape) -> Self {
        match mode {
            OverlapMode::Simple => Self::Simple(SimpleOverlap::new(shape)),
            OverlapMode::Trapezoid => Self::Trapezoid(TrapezoidOverlap::new(shape)),
        }
    }

    pub fn mode(&self) -> OverlapMode {
        match self {
            Self::Simple(_) => OverlapMode::Simple,
            Self::Trapezoid(_) => OverlapMode::Trapezoid,
        }
    }
}

impl OverlapKernel for Kernel {
    fn shape(&self) -> &TrapezoidShape {
        match self {
            Self::Simple(k) => k.shape(),
            Self::Trapezoid(k) => k.shape(),
        }
    }

    #[inline]
    fn overlap(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<f64, OverlapError> {
        match self {
            Self::Simple(k) => k.overlap(x1, y1, x2, y2),
            Self::Trapezoid(k) => k.overlap(x1, y1, x2, y2),
        }
    }
}

impl From<SimpleOverlap> for Kernel {
    fn from(value: SimpleOverlap) -> Self {
        Self::Simple(value)
    }
}

impl From<TrapezoidOverlap> for Kernel {
    fn from(value: TrapezoidOverlap) -> Self {
        Self::Trapezoid(value)
    }
}
