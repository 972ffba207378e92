use crate::{Color, Drawable, Point, Rectangle};
use std::cell::OnceCell;

/// Fill/stroke settings carried by a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub line_width: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: 1.0,
        }
    }
}

/// Closed polygon given as an ordered point list.
///
/// Bounds are computed on first use and cached until the point list changes.
#[derive(Debug, Clone, Default)]
pub struct Path {
    points: Vec<Point>,
    pub style: PathStyle,
    /// Draw the two-tone bevelled edge
    pub bevel: bool,
    bounds: OnceCell<Rectangle>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
        self.bounds = OnceCell::new();
    }

    pub fn unshift(&mut self, point: Point) {
        self.points.insert(0, point);
        self.bounds = OnceCell::new();
    }

    pub fn extend(&mut self, points: impl IntoIterator<Item = Point>) {
        self.points.extend(points);
        self.bounds = OnceCell::new();
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.bounds = OnceCell::new();
    }

    /// Bounding box of all points; [`Rectangle::EMPTY`] for an empty path
    pub fn bounds(&self) -> Rectangle {
        *self.bounds.get_or_init(|| {
            let mut acc = Rectangle::EMPTY;
            for point in &self.points {
                acc.swallow(*point);
            }
            acc
        })
    }

    /// Parity test along a horizontal ray towards a point left of the bounds
    pub fn contains(&self, point: Point) -> bool {
        if self.points.len() < 3 || !self.bounds().contains(point) {
            return false;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if cross_x < point.x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Whether any part of the outline or interior touches `rect`
    pub fn intersects(&self, rect: &Rectangle) -> bool {
        if self.points.is_empty() || !self.bounds().overlap(rect) {
            return false;
        }

        let corners = rect.corners();
        for (a, b) in self.edges() {
            for i in 0..4 {
                if segments_intersect(a, b, corners[i], corners[(i + 1) % 4]) {
                    return true;
                }
            }
        }

        // No edge crossings: one shape is entirely inside the other
        rect.contains(self.points[0]) || self.contains(corners[0])
    }

    /// Consecutive point pairs, closing back to the first point
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    pub fn draw(&self, surface: &mut dyn Drawable) {
        if self.points.len() < 2 {
            return;
        }

        if let Some(fill) = self.style.fill {
            surface.fill_polygon(&self.points, fill);
        }

        if self.bevel {
            self.draw_bevel(surface);
        } else if let Some(stroke) = self.style.stroke {
            surface.stroke_polygon(&self.points, stroke, self.style.line_width);
        }
    }

    /// Two-tone edge: each edge is classified by which way its outward
    /// normal faces, given the winding of the whole polygon
    fn draw_bevel(&self, surface: &mut dyn Drawable) {
        let base = self.style.fill.or(self.style.stroke).unwrap_or(Color::GRAY);
        let on_light_side = base.darken(0.3);
        let on_shadow_side = base.lighten(0.4);
        let clockwise = self.signed_area() > 0.0;

        for (a, b) in self.edges() {
            let d = b - a;
            let normal = if clockwise {
                Point::new(d.y, -d.x)
            } else {
                Point::new(-d.y, d.x)
            };
            let color = if normal.x + normal.y < 0.0 {
                on_light_side
            } else {
                on_shadow_side
            };
            surface.stroke_line(a, b, color, self.style.line_width);
        }
    }

    fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points && self.style == other.style && self.bevel == other.bevel
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrawCommand, RecordingSurface};

    fn square(x: f64, y: f64, size: f64) -> Path {
        Path::from_points(vec![
            Point::new(x, y),
            Point::new(x, y + size),
            Point::new(x + size, y + size),
            Point::new(x + size, y),
        ])
    }

    #[test]
    fn test_bounds_are_cached_and_invalidated() {
        let mut path = square(0.0, 0.0, 10.0);
        assert_eq!(path.bounds(), Rectangle::new(0.0, 0.0, 10.0, 10.0));

        path.push(Point::new(20.0, 5.0));
        assert_eq!(path.bounds(), Rectangle::new(0.0, 0.0, 20.0, 10.0));

        path.unshift(Point::new(0.0, -5.0));
        assert_eq!(path.bounds(), Rectangle::new(0.0, -5.0, 20.0, 15.0));
    }

    #[test]
    fn test_empty_path_bounds() {
        assert!(Path::new().bounds().is_empty());
        assert!(!Path::new().contains(Point::ORIGIN));
    }

    #[test]
    fn test_contains_concave_polygon() {
        // An L shape: the notch at the upper right is outside
        let path = Path::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 20.0),
            Point::new(20.0, 20.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ]);

        assert!(path.contains(Point::new(5.0, 5.0)));
        assert!(path.contains(Point::new(15.0, 15.0)));
        assert!(!path.contains(Point::new(15.0, 5.0)));
        assert!(!path.contains(Point::new(25.0, 15.0)));
    }

    #[test]
    fn test_intersects_rectangle() {
        let path = square(0.0, 0.0, 10.0);

        // Crossing an edge
        assert!(path.intersects(&Rectangle::new(5.0, 5.0, 10.0, 10.0)));
        // Rectangle inside the path
        assert!(path.intersects(&Rectangle::new(2.0, 2.0, 1.0, 1.0)));
        // Path inside the rectangle
        assert!(path.intersects(&Rectangle::new(-5.0, -5.0, 30.0, 30.0)));
        // Disjoint
        assert!(!path.intersects(&Rectangle::new(11.0, 11.0, 3.0, 3.0)));
    }

    #[test]
    fn test_bevel_draws_one_line_per_edge() {
        let mut path = square(0.0, 0.0, 10.0);
        path.style.fill = Some(Color::rgb(0x90, 0xca, 0xf9));
        path.bevel = true;

        let mut surface = RecordingSurface::new();
        path.draw(&mut surface);

        let lines: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::StrokeLine { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 4);

        // Left and top edges share one tone, bottom and right the other
        assert_eq!(lines[0], lines[3]);
        assert_eq!(lines[1], lines[2]);
        assert_ne!(lines[0], lines[1]);
    }
}
