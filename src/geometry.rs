//! Rectangles, points and sizes in document units (pixels).
//!
//! All arithmetic is `f64`. Deltas smaller than an epsilon are treated as
//! zero so that sub-pixel host jitter never turns into a mutation.

use num_traits::Float;

/// Default epsilon below which a delta is treated as zero.
pub const EPSILON: f64 = 1e-3;

/// A position on the canvas.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are within `epsilon` of `other`.
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        Float::abs(self.x - other.x) < epsilon && Float::abs(self.y - other.y) < epsilon
    }
}

/// Width × height in document units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are within `epsilon` of `other`.
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        Float::abs(self.width - other.width) < epsilon
            && Float::abs(self.height - other.height) < epsilon
    }
}

/// Axis-aligned rectangle stored as edges.
///
/// Callers must not build degenerate rectangles (`right < left` or
/// `bottom < top`); width and height are never negative.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Create a rect from its four edges.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rect from a top-left corner and a size.
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + size.width,
            bottom: origin.y + size.height,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Smallest rect containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Union of every rect yielded, or `None` for an empty iterator.
    pub fn union_all<I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Rect>,
    {
        rects.into_iter().reduce(|acc, r| acc.union(&r))
    }

    /// This rect moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Shrink by `(top, right, bottom, left)` insets.
    ///
    /// Insets larger than the rect collapse it to zero size at the
    /// inset top-left corner instead of producing a negative size.
    pub fn inset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Rect {
        let l = self.left + left;
        let t = self.top + top;
        Rect {
            left: l,
            top: t,
            right: (self.right - right).max(l),
            bottom: (self.bottom - bottom).max(t),
        }
    }
}

/// Translation needed to move `from` onto `to`, or `None` when both axes
/// are within `epsilon`.
pub fn delta(from: Point, to: Point, epsilon: f64) -> Option<(f64, f64)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if Float::abs(dx) < epsilon && Float::abs(dy) < epsilon {
        None
    } else {
        Some((dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_and_height_from_edges() {
        let r = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
        assert_eq!(r.origin(), Point::new(10.0, 20.0));
    }

    #[test]
    fn union_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 8.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -5.0, 20.0, 10.0));
    }

    #[test]
    fn union_all_empty_is_none() {
        assert_eq!(Rect::union_all(core::iter::empty()), None);
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(8.0, 8.0, 8.0, 8.0);
        assert_eq!(r.width(), 0.0);
        assert_eq!(r.height(), 0.0);
        assert_eq!(r.origin(), Point::new(8.0, 8.0));
    }

    #[test]
    fn delta_below_epsilon_suppressed() {
        let a = Point::new(10.0, 10.0);
        assert_eq!(delta(a, Point::new(10.0004, 9.9995), EPSILON), None);
        assert_eq!(
            delta(a, Point::new(12.0, 10.0), EPSILON),
            Some((2.0, 0.0))
        );
    }

    #[test]
    fn from_origin_size_roundtrips_size() {
        let r = Rect::from_origin_size(Point::new(3.0, 4.0), Size::new(5.0, 6.0));
        assert!(r.size().approx_eq(Size::new(5.0, 6.0), EPSILON));
        assert_eq!(r.right, 8.0);
        assert_eq!(r.bottom, 10.0);
    }
}
