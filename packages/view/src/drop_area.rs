//! Drop areas: where a dragged block may land relative to each node, and
//! the strip highlighted while it hovers there.

use crate::node::ViewKind;
use crate::outline::{add_tab, add_tab_reverse};
use crate::options::ViewOptions;
use crate::view::View;
use droplet_geometry::{Color, Path, Point};
use droplet_model::{NodeRef, Tree};

/// Horizontal strip `width` wide, centered vertically on `y`, carrying a
/// tab so it reads as a slot for a statement
pub(crate) fn highlight_strip(x: f64, y: f64, width: f64, options: &ViewOptions) -> Path {
    let half = options.highlight_area_height / 2.0;
    let (top, bottom) = (y - half, y + half);
    let right = x + width.max(options.tab_offset + options.tab_width);

    let mut points = vec![Point::new(x, top)];
    add_tab_reverse(&mut points, x, top, options);
    points.push(Point::new(right, top));
    points.push(Point::new(right, bottom));
    add_tab(&mut points, x, bottom, options);
    points.push(Point::new(x, bottom));

    let mut path = Path::from_points(points);
    path.style.fill = Some(Color::SELECTION);
    path
}

impl View {
    /// Step 11
    pub(crate) fn compute_own_drop_area(&mut self, tree: &Tree, node: NodeRef) {
        let Some(view) = self.cache.get(&node) else {
            return;
        };
        let o = &self.options;

        let (highlight, point) = match (view.kind, node) {
            (ViewKind::Block, _) => {
                let last = view.bounds[view.line_length - 1];
                let drop = Point::new(last.x, last.bottom());
                (Some(highlight_strip(last.x, last.bottom(), last.width, o)), Some(drop))
            }
            (ViewKind::Indent, _) => {
                let (x, y, width) = match view.bounds.get(1) {
                    Some(line) => (line.x, line.y, line.width),
                    None => (view.bounds[0].x, view.bounds[0].bottom(), view.bounds[0].width),
                };
                let width = width.max(o.indent_drop_area_min_width);
                (Some(highlight_strip(x, y, width, o)), Some(Point::new(x, y)))
            }
            (ViewKind::Segment, NodeRef::Container(c)) => {
                let accepts = tree
                    .container(c)
                    .as_segment()
                    .is_some_and(|segment| segment.is_root || segment.is_lasso_segment);
                if accepts {
                    let first = view.bounds[0];
                    (
                        Some(highlight_strip(first.x, first.y, first.width, o)),
                        Some(first.upper_left()),
                    )
                } else {
                    (None, None)
                }
            }
            (ViewKind::Socket, NodeRef::Container(c)) if tree.socket_filled_block(c).is_none() => {
                let mut highlight = view.path.clone();
                highlight.style.fill = Some(Color::SELECTION);
                (Some(highlight), Some(view.bounds[0].upper_left()))
            }
            _ => (None, None),
        };

        if let Some(view) = self.cache.get_mut(&node) {
            view.highlight_area = highlight;
            view.drop_point = point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_strip_is_centered() {
        let options = ViewOptions::default();
        let strip = highlight_strip(10.0, 100.0, 200.0, &options);
        let bounds = strip.bounds();

        assert_eq!(bounds.x, 10.0);
        assert_eq!(bounds.right(), 210.0);
        assert_eq!(bounds.y, 100.0 - options.highlight_area_height / 2.0);
        // The nub hangs below the strip
        assert_eq!(
            bounds.bottom(),
            100.0 + options.highlight_area_height / 2.0 + options.tab_height
        );
        assert!(strip.contains(Point::new(150.0, 100.0)));
    }
}
