use crate::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle.
///
/// [`Rectangle::EMPTY`] is the "no rectangle" sentinel used as the starting
/// value of a union accumulator: it contains nothing, overlaps nothing, and
/// uniting anything into it yields a copy of the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const EMPTY: Rectangle = Rectangle {
        x: 0.0,
        y: 0.0,
        width: -1.0,
        height: -1.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn upper_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Corners in clockwise order starting at the upper left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// Edge-inclusive containment
    pub fn contains(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Whether the two rectangles touch or intersect
    pub fn overlap(&self, other: &Rectangle) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && !(other.right() < self.x
                || other.bottom() < self.y
                || other.x > self.right()
                || other.y > self.bottom())
    }

    /// Grow to the bounding union of `self` and `other`
    pub fn unite(&mut self, other: &Rectangle) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }

        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        *self = Rectangle::new(x, y, right - x, bottom - y);
    }

    /// Grow to include `point`
    pub fn swallow(&mut self, point: Point) {
        self.unite(&Rectangle::new(point.x, point.y, 0.0, 0.0));
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::EMPTY
    }
}
