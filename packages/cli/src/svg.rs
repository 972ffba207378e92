//! SVG rendering surface for the `layout --format svg` command

use droplet_geometry::{Color, Drawable, Point, Rectangle};
use std::fmt::Write;

#[derive(Debug)]
pub struct SvgSurface {
    elements: Vec<String>,
    font_size: f64,
}

impl SvgSurface {
    pub fn new(font_size: f64) -> Self {
        Self {
            elements: Vec::new(),
            font_size,
        }
    }

    /// Complete document covering `bounds` plus `margin` on every side
    pub fn finish(&self, bounds: Rectangle, margin: f64) -> String {
        let (x, y) = (bounds.x - margin, bounds.y - margin);
        let (width, height) = (bounds.width + 2.0 * margin, bounds.height + 2.0 * margin);

        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x} {y} {width} {height}" width="{width}" height="{height}">"#
        );
        out.push('\n');
        for element in &self.elements {
            out.push_str("  ");
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }
}

fn points_attr(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{},{}", p.x, p.y);
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Drawable for SvgSurface {
    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.elements.push(format!(
            r#"<polygon points="{}" fill="{}"/>"#,
            points_attr(points),
            color.to_hex()
        ));
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Color, line_width: f64) {
        self.elements.push(format!(
            r#"<polygon points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            points_attr(points),
            color.to_hex(),
            line_width
        ));
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, line_width: f64) {
        self.elements.push(format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            color.to_hex(),
            line_width
        ));
    }

    fn fill_text(&mut self, text: &str, origin: Point, color: Color) {
        self.elements.push(format!(
            r#"<text x="{}" y="{}" fill="{}" font-family="monospace" font-size="{}" dominant-baseline="hanging" xml:space="preserve">{}</text>"#,
            origin.x,
            origin.y,
            color.to_hex(),
            self.font_size,
            escape(text)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_and_text_elements() {
        let mut surface = SvgSurface::new(15.0);
        surface.fill_polygon(
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 5.0)],
            Color::WHITE,
        );
        surface.fill_text("a < b", Point::new(1.0, 2.0), Color::BLACK);

        let svg = surface.finish(Rectangle::new(0.0, 0.0, 10.0, 5.0), 2.0);
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="-2 -2 14 9""#));
        assert!(svg.contains(r##"<polygon points="0,0 10,0 10,5" fill="#ffffff"/>"##));
        assert!(svg.contains(">a &lt; b</text>"));
        assert!(svg.ends_with("</svg>\n"));
    }
}
