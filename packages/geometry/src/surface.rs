//! Abstract drawing surface and text measurement.

use crate::{Color, Point};

/// A 2D surface the view can draw onto.
///
/// Implementations own rasterization; the view only hands over closed
/// polygons, line segments and text runs.
pub trait Drawable {
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    fn stroke_polygon(&mut self, points: &[Point], color: Color, line_width: f64);

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, line_width: f64);

    /// Draw `text` with its left edge at `origin.x` and its top at `origin.y`
    fn fill_text(&mut self, text: &str, origin: Point, color: Color);
}

/// Text measurement used while computing minimum dimensions
pub trait TextMetrics {
    fn measure_text(&self, text: &str) -> f64;
}

/// Fixed-advance measurement; the default for headless layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub char_width: f64,
}

impl MonospaceMetrics {
    pub fn new(char_width: f64) -> Self {
        Self { char_width }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillPolygon { points: Vec<Point>, color: Color },
    StrokePolygon { points: Vec<Point>, color: Color, line_width: f64 },
    StrokeLine { from: Point, to: Point, color: Color, line_width: f64 },
    FillText { text: String, origin: Point, color: Color },
}

/// Surface that records every call instead of drawing
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text runs in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fill_colors(&self) -> Vec<Color> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::FillPolygon { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Drawable for RecordingSurface {
    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            color,
            line_width,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            line_width,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            origin,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_counts_chars() {
        let metrics = MonospaceMetrics::new(8.0);
        assert_eq!(metrics.measure_text("abc"), 24.0);
        assert_eq!(metrics.measure_text(""), 0.0);
        assert_eq!(metrics.measure_text("é"), 8.0);
    }

    #[test]
    fn test_recording_surface_collects_text() {
        let mut surface = RecordingSurface::new();
        surface.fill_text("x", Point::ORIGIN, Color::BLACK);
        surface.fill_polygon(&[Point::ORIGIN], Color::WHITE);
        surface.fill_text("y", Point::ORIGIN, Color::BLACK);

        assert_eq!(surface.texts(), vec!["x", "y"]);
        assert_eq!(surface.fill_colors(), vec![Color::WHITE]);
    }
}
