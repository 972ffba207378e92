//! # Outlines
//!
//! Every block outline is one closed polygon walked clockwise: the top
//! edge left to right, the right side down line by line, the bottom edge
//! right to left, and the left side back up. Blocks holding an indented
//! body route their right side down the body's spine, leaving a C shape.
//!
//! Tabs are the puzzle-piece joints between stacked statements: a notch
//! dips into the top edge and a matching nub hangs below the bottom edge.

use crate::node::{Multiline, PathKey, ViewKind, ViewNode};
use crate::options::ViewOptions;
use crate::view::View;
use droplet_geometry::{Color, Path, PathStyle, Point};
use droplet_model::{NodeRef, Tree};

/// Nub hanging below an edge walked right to left; `x` is the left edge of
/// the line the tab belongs to
pub(crate) fn add_tab(points: &mut Vec<Point>, x: f64, y: f64, options: &ViewOptions) {
    let left = x + options.tab_offset;
    let right = left + options.tab_width;
    let side = options.tab_side();
    let depth = y + options.tab_height;

    points.push(Point::new(right, y));
    points.push(Point::new(right - side, depth));
    points.push(Point::new(left + side, depth));
    points.push(Point::new(left, y));
}

/// Notch dipping into an edge walked left to right
pub(crate) fn add_tab_reverse(points: &mut Vec<Point>, x: f64, y: f64, options: &ViewOptions) {
    let left = x + options.tab_offset;
    let right = left + options.tab_width;
    let side = options.tab_side();
    let depth = y + options.tab_height;

    points.push(Point::new(left, y));
    points.push(Point::new(left + side, depth));
    points.push(Point::new(right - side, depth));
    points.push(Point::new(right, y));
}

/// How the right side passes a line
#[derive(Debug, Clone, Copy, PartialEq)]
enum Route {
    Plain,
    /// An indented body starts below this line at `spine`
    Start { spine: f64 },
    Middle { spine: f64 },
    /// The body ends on this line at `body_bottom`
    End { spine: f64, body_bottom: f64 },
    EndStart { spine: f64, body_bottom: f64, next_spine: f64 },
}

impl View {
    /// Step 9: the node's own outline, memoized on everything it reads
    pub(crate) fn compute_own_path(&mut self, tree: &Tree, node: NodeRef) {
        let version = tree.version(node);
        let Some(view) = self.cache.get(&node) else {
            return;
        };

        let key = PathKey {
            version,
            bounds: view.bounds.clone(),
            glue: view.glue.clone(),
            bevels: view.bevels,
            top_notch: view.top_notch,
            bottom_nub: view.bottom_nub,
        };
        let filled_by = match (view.kind, node) {
            (ViewKind::Socket, NodeRef::Container(c)) => tree.socket_filled_block(c),
            _ => None,
        };
        if filled_by.is_none() && view.path_memo.is_current(&key) {
            return;
        }

        let path = match view.kind {
            ViewKind::Block => {
                let color = match node {
                    NodeRef::Container(c) => tree
                        .container(c)
                        .as_block()
                        .map_or(Color::GRAY, |block| self.options.color_for(&block.color)),
                    NodeRef::Token(_) => Color::GRAY,
                };
                let mut path = Path::from_points(self.line_outline(view, true));
                path.style.fill = Some(color);
                path.bevel = true;
                path
            }
            ViewKind::Socket => match filled_by.and_then(|block| self.cache.get(&NodeRef::Container(block))) {
                Some(block) => {
                    let mut path = block.path.clone();
                    path.style = PathStyle {
                        fill: Some(Color::WHITE),
                        stroke: Some(Color::WHITE),
                        ..PathStyle::default()
                    };
                    path.bevel = false;
                    path
                }
                None => {
                    let mut path = Path::from_points(self.line_outline(view, false));
                    path.style.fill = Some(Color::WHITE);
                    path
                }
            },
            ViewKind::Text => Path::from_points(view.bounds[0].corners().to_vec()),
            ViewKind::Indent | ViewKind::Segment | ViewKind::Cursor => Path::new(),
        };

        let Some(view) = self.cache.get_mut(&node) else {
            return;
        };
        let old = view.path.bounds();
        let new = path.bounds();
        view.path = path;
        view.path_memo.record(key);

        if old != new && view.kind != ViewKind::Cursor {
            self.stats.dirty_region.unite(&old);
            self.stats.dirty_region.unite(&new);
        }
    }

    /// Clockwise polygon around every line of `view`
    pub(crate) fn line_outline(&self, view: &ViewNode, tabs: bool) -> Vec<Point> {
        let o = &self.options;
        let clip = o.bevel_clip;
        let bounds = &view.bounds;
        let last = view.line_length - 1;
        let bottom_of = |line: usize| {
            let glue = &view.glue[line];
            if line < last && glue.draw {
                bounds[line].bottom() + glue.height
            } else {
                bounds[line].bottom()
            }
        };

        let mut points = Vec::new();

        // Top edge
        let first = bounds[0];
        if view.bevels.top_left {
            points.push(Point::new(first.x, first.y + clip));
            points.push(Point::new(first.x + clip, first.y));
        } else {
            points.push(Point::new(first.x, first.y));
        }
        if tabs && view.top_notch {
            add_tab_reverse(&mut points, first.x, first.y, o);
        }
        if view.bevels.top_right {
            points.push(Point::new(first.right() - clip, first.y));
            points.push(Point::new(first.right(), first.y + clip));
        } else {
            points.push(Point::new(first.right(), first.y));
        }

        // Right side
        for line in 0..=last {
            let rect = bounds[line];
            let bottom = bottom_of(line);

            match self.route(view, line) {
                Route::Plain => {
                    if line > 0 {
                        points.push(Point::new(rect.right(), rect.y));
                    }
                    if line < last {
                        points.push(Point::new(rect.right(), bottom));
                    }
                }
                Route::Start { spine } => {
                    if line > 0 {
                        points.push(Point::new(rect.right(), rect.y));
                    }
                    points.push(Point::new(rect.right(), rect.bottom()));
                    if tabs {
                        add_tab(&mut points, spine, rect.bottom(), o);
                    }
                    points.push(Point::new(spine, rect.bottom()));
                    points.push(Point::new(spine, bottom));
                }
                Route::Middle { spine } => {
                    points.push(Point::new(spine, rect.y));
                    points.push(Point::new(spine, bottom));
                }
                Route::End { spine, body_bottom } => {
                    points.push(Point::new(spine, rect.y));
                    points.push(Point::new(spine, body_bottom));
                    if tabs {
                        add_tab_reverse(&mut points, spine, body_bottom, o);
                    }
                    points.push(Point::new(rect.right(), body_bottom));
                    if line < last {
                        points.push(Point::new(rect.right(), bottom));
                    }
                }
                Route::EndStart {
                    spine,
                    body_bottom,
                    next_spine,
                } => {
                    points.push(Point::new(spine, rect.y));
                    points.push(Point::new(spine, body_bottom));
                    if tabs {
                        add_tab_reverse(&mut points, spine, body_bottom, o);
                    }
                    points.push(Point::new(rect.right(), body_bottom));
                    points.push(Point::new(rect.right(), rect.bottom()));
                    if tabs {
                        add_tab(&mut points, next_spine, rect.bottom(), o);
                    }
                    points.push(Point::new(next_spine, rect.bottom()));
                    points.push(Point::new(next_spine, bottom));
                }
            }
        }

        // Bottom edge
        let end = bounds[last];
        if view.bevels.bottom_right {
            points.push(Point::new(end.right(), end.bottom() - clip));
            points.push(Point::new(end.right() - clip, end.bottom()));
        } else {
            points.push(Point::new(end.right(), end.bottom()));
        }
        if tabs && view.bottom_nub {
            add_tab(&mut points, end.x, end.bottom(), o);
        }
        if view.bevels.bottom_left {
            points.push(Point::new(end.x + clip, end.bottom()));
            points.push(Point::new(end.x, end.bottom() - clip));
        } else {
            points.push(Point::new(end.x, end.bottom()));
        }

        // Left side
        for line in (0..=last).rev() {
            let rect = bounds[line];
            if line < last {
                points.push(Point::new(rect.x, bottom_of(line)));
            }
            if line > 0 {
                points.push(Point::new(rect.x, rect.y));
            }
        }

        dedupe(points)
    }

    fn route(&self, view: &ViewNode, line: usize) -> Route {
        let indent_at = |index: Option<usize>| {
            index
                .and_then(|i| view.children.get(i))
                .and_then(|span| self.cache.get(&span.node).map(|child| (span, child)))
                .filter(|(_, child)| child.kind == ViewKind::Indent)
        };

        match view.multiline[line] {
            Multiline::None => Route::Plain,
            Multiline::Start => match indent_at(view.multiline_child[line]) {
                Some((_, child)) if child.line_length > 1 => Route::Start {
                    spine: child.bounds[1].x,
                },
                _ => Route::Plain,
            },
            Multiline::Middle => match indent_at(view.multiline_child[line]) {
                Some((span, child)) => Route::Middle {
                    spine: child.bounds[span.line_in_child(line)].x,
                },
                None => Route::Plain,
            },
            Multiline::End | Multiline::EndStart => {
                let Some((span, child)) = indent_at(view.multiline_child[line]) else {
                    return Route::Plain;
                };
                let body = child.bounds[span.line_in_child(line)];
                let next = view.line_children[line]
                    .iter()
                    .map(|&i| &view.children[i])
                    .find(|s| s.start_line == line && s.is_multiline())
                    .and_then(|s| self.cache.get(&s.node))
                    .filter(|next| next.kind == ViewKind::Indent && next.line_length > 1);

                match (view.multiline[line], next) {
                    (Multiline::EndStart, Some(next)) => Route::EndStart {
                        spine: body.x,
                        body_bottom: body.bottom(),
                        next_spine: next.bounds[1].x,
                    },
                    _ => Route::End {
                        spine: body.x,
                        body_bottom: body.bottom(),
                    },
                }
            }
        }
    }
}

/// Drop consecutive repeats, including a last point equal to the first
fn dedupe(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_mirror_each_other() {
        let options = ViewOptions::default();
        let mut notch = Vec::new();
        add_tab_reverse(&mut notch, 0.0, 0.0, &options);
        let mut nub = Vec::new();
        add_tab(&mut nub, 0.0, 0.0, &options);

        nub.reverse();
        assert_eq!(notch, nub);
        assert_eq!(notch[0], Point::new(options.tab_offset, 0.0));
        assert_eq!(notch[1].y, options.tab_height);
    }

    #[test]
    fn test_dedupe_closes_loop() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(dedupe(vec![a, a, b, b, a]), vec![a, b]);
    }
}
