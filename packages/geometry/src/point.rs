use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point (or vector) in surface coordinates. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move this point in place
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Copy of this point moved by `(dx, dy)`
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Length of this point read as a vector
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Vector pointing from `origin` to `self`
    pub fn from(self, origin: Point) -> Point {
        self - origin
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).magnitude()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_difference_and_magnitude() {
        let a = Point::new(4.0, 6.0);
        let b = Point::new(1.0, 2.0);

        let v = a.from(b);
        assert_eq!(v, Point::new(3.0, 4.0));
        assert_eq!(v.magnitude(), 5.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_translate() {
        let mut p = Point::new(1.0, 1.0);
        p.translate(2.0, -1.0);
        assert_eq!(p, Point::new(3.0, 0.0));
        assert_eq!(p.translated(1.0, 1.0), Point::new(4.0, 1.0));
    }
}
