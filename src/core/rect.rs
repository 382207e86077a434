//! Axis-Aligned Rectangles
//!
//! Footprint shared by moving entities and static obstacles.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::point::Point;

/// Rejected rectangle dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RectError {
    /// Width or height is not a positive finite number.
    #[error("invalid rectangle size {width} x {height}")]
    InvalidSize {
        /// Requested width
        width: f64,
        /// Requested height
        height: f64,
    },
}

/// Flat rectangle description, as stored in level files and snapshots.
///
/// Not validated; convert with [`Rect::try_from`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectSpec {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

/// Rectangle anchored at its top-left corner.
///
/// Width and height are always positive. Deserialization goes through
/// [`Rect::try_new`], so decoded rectangles hold the same guarantee.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RectSpec", into = "RectSpec")]
pub struct Rect {
    /// Top-left corner
    pub origin: Point,
    /// Extent along X
    pub width: f64,
    /// Extent along Y
    pub height: f64,
}

impl Rect {
    /// Create a rectangle, validating its size.
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, RectError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) || !x.is_finite() || !y.is_finite() {
            return Err(RectError::InvalidSize { width, height });
        }
        Ok(Self {
            origin: Point::new(x, y),
            width,
            height,
        })
    }

    /// Create a rectangle from known-good literals.
    ///
    /// # Panics
    ///
    /// Panics if width or height is not positive.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        assert!(width > 0.0 && height > 0.0, "rect size must be positive");
        Self {
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    /// Left edge.
    #[inline]
    pub fn left(&self) -> f64 {
        self.origin.x
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.origin.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.origin.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.origin.y + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.origin.x + self.width / 2.0, self.origin.y + self.height / 2.0)
    }

    /// Same size, new top-left corner.
    #[inline]
    pub fn moved_to(self, origin: Point) -> Self {
        Self { origin, ..self }
    }

    /// Same size, shifted by per-axis offsets.
    #[inline]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        self.moved_to(self.origin.offset(dx, dy))
    }

    /// True if `other` lies fully inside this rectangle (edges inclusive).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Clamp `other` so it lies inside this rectangle.
    ///
    /// If `other` is larger than this rectangle on an axis, it is pinned to
    /// the near edge of that axis.
    pub fn clamp_inside(&self, other: Rect) -> Rect {
        let max_x = (self.right() - other.width).max(self.left());
        let max_y = (self.bottom() - other.height).max(self.top());
        other.moved_to(Point::new(
            other.origin.x.max(self.left()).min(max_x),
            other.origin.y.max(self.top()).min(max_y),
        ))
    }
}

impl TryFrom<RectSpec> for Rect {
    type Error = RectError;

    fn try_from(spec: RectSpec) -> Result<Self, Self::Error> {
        Rect::try_new(spec.x, spec.y, spec.width, spec.height)
    }
}

impl From<Rect> for RectSpec {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.origin.x,
            y: rect.origin.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({:.3}, {:.3}, {:.3}x{:.3})",
            self.origin.x, self.origin.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_rejects_bad_size() {
        assert!(Rect::try_new(0.0, 0.0, 0.0, 5.0).is_err());
        assert!(Rect::try_new(0.0, 0.0, 5.0, -1.0).is_err());
        assert!(Rect::try_new(0.0, 0.0, f64::NAN, 5.0).is_err());
        assert!(Rect::try_new(0.0, 0.0, 5.0, 5.0).is_ok());
    }

    #[test]
    fn test_decode_validates_size() {
        let rect: Rect =
            serde_json::from_str(r#"{"x": 1, "y": 2, "width": 3, "height": 4}"#).unwrap();
        assert_eq!(rect, Rect::new(1.0, 2.0, 3.0, 4.0));

        let zero_width = serde_json::from_str::<Rect>(r#"{"x": 1, "y": 2, "width": 0, "height": 4}"#);
        assert!(zero_width.is_err());

        let negative = serde_json::from_str::<Rect>(r#"{"x": 1, "y": 2, "width": 3, "height": -4}"#);
        assert!(negative.is_err());
    }

    #[test]
    fn test_binary_decode_validates_size() {
        let bad = RectSpec { x: 0.0, y: 0.0, width: 0.0, height: 8.0 };
        let bytes = bincode::serialize(&bad).unwrap();
        assert!(bincode::deserialize::<Rect>(&bytes).is_err());

        let good = Rect::new(5.0, 6.0, 7.0, 8.0);
        let bytes = bincode::serialize(&good).unwrap();
        assert_eq!(bincode::deserialize::<Rect>(&bytes).unwrap(), good);
    }

    #[test]
    fn test_clamp_inside() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);

        // Inside - unchanged
        let inside = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(bounds.clamp_inside(inside), inside);

        // Outside - pinned to the edges
        let outside = Rect::new(95.0, -5.0, 10.0, 10.0);
        let clamped = bounds.clamp_inside(outside);
        assert_eq!(clamped.origin, Point::new(90.0, 0.0));
        assert!(bounds.contains_rect(&clamped));
    }
}
