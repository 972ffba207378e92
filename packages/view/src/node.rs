//! Per-node layout state.

use crate::memo::Memo;
use droplet_geometry::{Path, Point, Rectangle};
use droplet_model::{ContainerKind, NodeRef, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Block,
    Socket,
    Indent,
    Segment,
    Text,
    Cursor,
}

impl ViewKind {
    pub fn of(tree: &Tree, node: NodeRef) -> Self {
        match node {
            NodeRef::Container(c) => match tree.container_kind(c) {
                ContainerKind::Block => ViewKind::Block,
                ContainerKind::Socket => ViewKind::Socket,
                ContainerKind::Indent => ViewKind::Indent,
                ContainerKind::Segment => ViewKind::Segment,
            },
            NodeRef::Token(t) => {
                if tree.token(t).is_cursor() {
                    ViewKind::Cursor
                } else {
                    ViewKind::Text
                }
            }
        }
    }

    pub fn is_container(self) -> bool {
        !matches!(self, ViewKind::Text | ViewKind::Cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Vertical extent around a line's baseline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Distance {
    pub above: f64,
    pub below: f64,
}

impl Distance {
    pub fn height(&self) -> f64 {
        self.above + self.below
    }
}

/// Extra space after a line so it does not collide with the next
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Glue {
    pub height: f64,
    /// Fill the gap in the outline
    pub draw: bool,
}

/// Spacing around a node inside its parent. First, middle and last lines
/// of a multi-line node take different left/right values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub first_left: f64,
    pub first_right: f64,
    pub mid_left: f64,
    pub mid_right: f64,
    pub last_left: f64,
    pub last_right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            bottom: value,
            first_left: value,
            first_right: value,
            mid_left: value,
            mid_right: value,
            last_left: value,
            last_right: value,
        }
    }

    /// Margins for `line` of a node spanning `line_count` lines. Only the
    /// first line gets the top margin and only the last the bottom.
    pub fn for_line(&self, line: usize, line_count: usize) -> LineMargins {
        let last = line_count.saturating_sub(1);
        if line_count <= 1 {
            LineMargins {
                left: self.first_left,
                right: self.last_right,
                top: self.top,
                bottom: self.bottom,
            }
        } else if line == 0 {
            LineMargins {
                left: self.first_left,
                right: self.first_right,
                top: self.top,
                bottom: 0.0,
            }
        } else if line == last {
            LineMargins {
                left: self.last_left,
                right: self.last_right,
                top: 0.0,
                bottom: self.bottom,
            }
        } else {
            LineMargins {
                left: self.mid_left,
                right: self.mid_right,
                top: 0.0,
                bottom: 0.0,
            }
        }
    }
}

/// Which outline corners get chamfered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bevels {
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
}

impl Bevels {
    pub const ALL: Bevels = Bevels {
        top_left: true,
        top_right: true,
        bottom_left: true,
        bottom_right: true,
    };

    pub const BOTTOM: Bevels = Bevels {
        top_left: false,
        top_right: false,
        bottom_left: true,
        bottom_right: true,
    };
}

/// How a line relates to a child spanning several lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiline {
    #[default]
    None,
    Start,
    Middle,
    End,
    /// One multi-line child ends and another starts
    EndStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSpan {
    pub node: NodeRef,
    pub start_line: usize,
    pub end_line: usize,
}

impl ChildSpan {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    pub fn is_multiline(&self) -> bool {
        self.end_line > self.start_line
    }

    /// The child's own line index for the parent's `line`
    pub fn line_in_child(&self, line: usize) -> usize {
        line - self.start_line
    }

    pub fn covers(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// Stretch a parent imposes on a multi-line child so its first line ends
/// flush with the parent's line bottom and its last line starts flush with
/// the parent's line top
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Stretch {
    pub first_below: Option<f64>,
    pub last_above: Option<f64>,
}

/// Everything an outline depends on besides the model
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PathKey {
    pub version: u64,
    pub bounds: Vec<Rectangle>,
    pub glue: Vec<Glue>,
    pub bevels: Bevels,
    pub top_notch: bool,
    pub bottom_nub: bool,
}

#[derive(Debug, Clone)]
pub struct ViewNode {
    pub node: NodeRef,
    pub kind: ViewKind,

    pub line_length: usize,
    pub children: Vec<ChildSpan>,
    /// Indices into `children` touching each line
    pub line_children: Vec<Vec<usize>>,
    pub multiline: Vec<Multiline>,
    /// The multi-line child that shapes each line's right edge
    pub multiline_child: Vec<Option<usize>>,

    pub margins: Margins,
    pub bevels: Bevels,
    /// Statement blocks first on their line get a notch on top
    pub top_notch: bool,
    /// Statement blocks last on their line get a nub below
    pub bottom_nub: bool,
    pub top_line_sticks_to_bottom: bool,
    pub bottom_line_sticks_to_top: bool,

    pub min_dimensions: Vec<Size>,
    pub min_distance_to_base: Vec<Distance>,
    pub dimensions: Vec<Size>,
    pub distance_to_base: Vec<Distance>,
    pub bounds: Vec<Rectangle>,
    pub glue: Vec<Glue>,

    pub path: Path,
    pub total_bounds: Rectangle,
    pub highlight_area: Option<Path>,
    pub drop_point: Option<Point>,

    /// Model version as of the last committed pass
    pub computed_version: Option<u64>,
    pub changed_bounding_box: bool,

    pub(crate) dimension_memo: Memo<(u64, Stretch)>,
    pub(crate) x_memo: Vec<Memo<(u64, f64, f64)>>,
    pub(crate) y_memo: Vec<Memo<(u64, f64, Size, Distance)>>,
    pub(crate) path_memo: Memo<PathKey>,
}

impl ViewNode {
    pub fn new(node: NodeRef, kind: ViewKind) -> Self {
        Self {
            node,
            kind,
            line_length: 1,
            children: Vec::new(),
            line_children: vec![Vec::new()],
            multiline: vec![Multiline::None],
            multiline_child: vec![None],
            margins: Margins::default(),
            bevels: Bevels::ALL,
            top_notch: false,
            bottom_nub: false,
            top_line_sticks_to_bottom: false,
            bottom_line_sticks_to_top: false,
            min_dimensions: vec![Size::default()],
            min_distance_to_base: vec![Distance::default()],
            dimensions: vec![Size::default()],
            distance_to_base: vec![Distance::default()],
            bounds: vec![Rectangle::EMPTY],
            glue: vec![Glue::default()],
            path: Path::new(),
            total_bounds: Rectangle::EMPTY,
            highlight_area: None,
            drop_point: None,
            computed_version: None,
            changed_bounding_box: false,
            dimension_memo: Memo::default(),
            x_memo: vec![Memo::default()],
            y_memo: vec![Memo::default()],
            path_memo: Memo::default(),
        }
    }

    /// Resize every per-line vector after the line count changed
    pub(crate) fn resize_lines(&mut self, lines: usize) {
        self.line_length = lines;
        self.line_children.resize(lines, Vec::new());
        self.multiline.resize(lines, Multiline::None);
        self.multiline_child.resize(lines, None);
        self.min_dimensions.resize(lines, Size::default());
        self.min_distance_to_base.resize(lines, Distance::default());
        self.dimensions.resize(lines, Size::default());
        self.distance_to_base.resize(lines, Distance::default());
        self.bounds.resize(lines, Rectangle::EMPTY);
        self.glue.resize(lines, Glue::default());
        self.x_memo.resize(lines, Memo::default());
        self.y_memo.resize(lines, Memo::default());
    }

    pub fn line_margins(&self, line: usize) -> LineMargins {
        self.margins.for_line(line, self.line_length)
    }

    /// The child spans touching `line`
    pub fn children_on_line(&self, line: usize) -> impl Iterator<Item = &ChildSpan> + '_ {
        self.line_children
            .get(line)
            .into_iter()
            .flatten()
            .map(move |&i| &self.children[i])
    }

    /// Union of the per-line bounds
    pub fn bounds_union(&self) -> Rectangle {
        let mut acc = Rectangle::EMPTY;
        for rect in &self.bounds {
            acc.unite(rect);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margins_by_line_position() {
        let margins = Margins {
            top: 1.0,
            bottom: 2.0,
            first_left: 3.0,
            first_right: 4.0,
            mid_left: 5.0,
            mid_right: 6.0,
            last_left: 7.0,
            last_right: 8.0,
        };

        let single = margins.for_line(0, 1);
        assert_eq!((single.left, single.right, single.top, single.bottom), (3.0, 8.0, 1.0, 2.0));

        let first = margins.for_line(0, 3);
        assert_eq!((first.left, first.right, first.top, first.bottom), (3.0, 4.0, 1.0, 0.0));

        let mid = margins.for_line(1, 3);
        assert_eq!((mid.left, mid.right, mid.top, mid.bottom), (5.0, 6.0, 0.0, 0.0));

        let last = margins.for_line(2, 3);
        assert_eq!((last.left, last.right, last.top, last.bottom), (7.0, 8.0, 0.0, 2.0));
    }

    #[test]
    fn test_child_span_lines() {
        let span = ChildSpan {
            node: NodeRef::Container(Default::default()),
            start_line: 2,
            end_line: 4,
        };
        assert_eq!(span.line_count(), 3);
        assert!(span.is_multiline());
        assert_eq!(span.line_in_child(3), 1);
        assert!(span.covers(4));
        assert!(!span.covers(1));
    }
}
