//! # Layout Pipeline
//!
//! The passes run top-down from the root in a fixed order, each relying on
//! the previous one being fresh:
//!
//! 1. children: line spans and multi-line flags
//! 2. margins, by (parent kind, child kind)
//! 3. bevels and tabs
//! 4. minimum dimensions, bottom-up
//! 5. final dimensions, stretching multi-line children to their parent
//! 6. horizontal placement
//! 7. glue between lines that would otherwise collide
//! 8. vertical placement
//! 9. to 12. outlines, total bounds, drop areas and the version commit
//!
//! A node is dirty while its committed version differs from the model's.
//! Passes 1 to 5 skip clean subtrees outright. Passes 6 and 8 are memoized
//! per line on their positional inputs, and the remaining passes only visit
//! nodes that are dirty or whose bounding box moved.

use crate::node::*;
use crate::view::View;
use droplet_model::{ContainerId, ContainerKind, NodeRef, Tree};

impl View {
    pub(crate) fn is_dirty(&self, tree: &Tree, node: NodeRef) -> bool {
        self.cache
            .get(&node)
            .map_or(true, |view| view.computed_version != Some(tree.version(node)))
    }

    /// Whether the later passes need to visit `node`
    pub(crate) fn needs_geometry(&self, tree: &Tree, node: NodeRef) -> bool {
        self.is_dirty(tree, node) || self.cache.get(&node).is_some_and(|view| view.changed_bounding_box)
    }

    // ---------------------------------------------------------------
    // 1. Children
    // ---------------------------------------------------------------

    /// Measure `node` and everything under it that changed: line spans,
    /// the parent-derived state of each child, and minimum dimensions
    pub(crate) fn compute_children(&mut self, tree: &Tree, node: NodeRef) {
        let version = tree.version(node);
        let view = self
            .cache
            .entry(node)
            .or_insert_with(|| ViewNode::new(node, ViewKind::of(tree, node)));
        if view.computed_version == Some(version) {
            return;
        }
        let kind = view.kind;
        self.stats.nodes_recomputed += 1;

        let NodeRef::Container(container) = node else {
            self.compute_token_dimensions(tree, node, kind);
            return;
        };

        let mut spans = Vec::new();
        let mut line = 0;
        for child in tree.traverse_one_level(container) {
            if let NodeRef::Token(t) = child {
                if tree.token(t).is_newline() {
                    line += 1;
                    continue;
                }
            }

            self.compute_children(tree, child);
            let length = self.cache.get(&child).map_or(1, |v| v.line_length);
            spans.push(ChildSpan {
                node: child,
                start_line: line,
                end_line: line + length - 1,
            });
            line += length - 1;
        }

        let line_length = line + 1;
        let line_children = line_children(&spans, line_length);
        let (multiline, multiline_child) = multiline_flags(&spans, &line_children);

        for span in &spans {
            self.compute_margins(tree, kind, span);
        }

        let (min_dimensions, min_distance_to_base) =
            self.compute_min_dimensions(kind, &spans, &line_children, &multiline, &multiline_child);

        if let Some(view) = self.cache.get_mut(&node) {
            view.resize_lines(line_length);
            view.children = spans;
            view.line_children = line_children;
            view.multiline = multiline;
            view.multiline_child = multiline_child;
            view.min_dimensions = min_dimensions;
            view.min_distance_to_base = min_distance_to_base;
        }
    }

    fn compute_token_dimensions(&mut self, tree: &Tree, node: NodeRef, kind: ViewKind) {
        let (width, above) = match (kind, node) {
            (ViewKind::Text, NodeRef::Token(t)) => (
                self.metrics.measure_text(tree.text(t).unwrap_or_default()),
                self.options.text_height,
            ),
            _ => (0.0, 0.0),
        };

        if let Some(view) = self.cache.get_mut(&node) {
            view.resize_lines(1);
            view.children.clear();
            view.line_children = vec![Vec::new()];
            view.min_dimensions = vec![Size { width, height: above }];
            view.min_distance_to_base = vec![Distance { above, below: 0.0 }];
        }
    }

    // ---------------------------------------------------------------
    // 2-3. Margins, bevels, tabs
    // ---------------------------------------------------------------

    /// Set everything a child's geometry takes from its parent. A change
    /// here marks the child's bounding box as changed so its outline is
    /// rebuilt even when its own content did not move.
    fn compute_margins(&mut self, tree: &Tree, parent_kind: ViewKind, span: &ChildSpan) {
        let child = span.node;
        let Some(child_kind) = self.cache.get(&child).map(|v| v.kind) else {
            return;
        };

        let multiline = span.is_multiline();
        let margins = self.margins_for(tree, parent_kind, child_kind, child, multiline);
        let bevels = match parent_kind {
            ViewKind::Block | ViewKind::Socket => Bevels::BOTTOM,
            _ => Bevels::ALL,
        };
        let statement = child_kind == ViewKind::Block
            && matches!(parent_kind, ViewKind::Indent | ViewKind::Segment);
        let top_notch = statement && tree.is_first_on_line(child);
        let bottom_nub = statement && tree.is_last_on_line(child);

        if let Some(view) = self.cache.get_mut(&child) {
            let changed = view.margins != margins
                || view.bevels != bevels
                || view.top_notch != top_notch
                || view.bottom_nub != bottom_nub;

            view.margins = margins;
            view.bevels = bevels;
            view.top_notch = top_notch;
            view.bottom_nub = bottom_nub;
            view.top_line_sticks_to_bottom = multiline;
            view.bottom_line_sticks_to_top = multiline;
            if changed {
                view.changed_bounding_box = true;
            }
        }
    }

    fn margins_for(
        &self,
        tree: &Tree,
        parent_kind: ViewKind,
        child_kind: ViewKind,
        child: NodeRef,
        multiline: bool,
    ) -> Margins {
        let o = &self.options;
        match (parent_kind, child_kind) {
            (_, ViewKind::Cursor) => Margins::default(),
            (ViewKind::Block, ViewKind::Indent) => Margins {
                bottom: if multiline { o.indent_tongue_height } else { o.padding },
                mid_left: o.indent_width,
                last_left: o.indent_width,
                last_right: o.padding,
                ..Margins::default()
            },
            (ViewKind::Socket, ViewKind::Text) => Margins::uniform(o.text_padding),
            (ViewKind::Block, _) => {
                let first = tree.is_first_on_line(child);
                let last = tree.is_last_on_line(child);
                Margins {
                    top: o.padding,
                    bottom: o.padding,
                    first_left: if first { o.padding } else { 0.0 },
                    first_right: if multiline { o.padding } else { 0.0 },
                    mid_left: o.padding,
                    mid_right: 0.0,
                    last_left: o.padding,
                    last_right: if last { o.padding } else { 0.0 },
                }
            }
            _ => Margins::default(),
        }
    }

    /// Parent-derived state of the root itself, which has no parent to set it
    pub(crate) fn compute_root_state(&mut self, tree: &Tree, root: ContainerId) {
        let node = NodeRef::Container(root);
        let statement = tree.container_kind(root) == ContainerKind::Block && tree.parent(node).is_none();
        let Some(view) = self.cache.get_mut(&node) else {
            return;
        };

        let multiline = view.line_length > 1;
        if view.margins != Margins::default()
            || view.bevels != Bevels::ALL
            || view.top_notch != statement
            || view.bottom_nub != statement
        {
            view.changed_bounding_box = true;
        }
        view.margins = Margins::default();
        view.bevels = Bevels::ALL;
        view.top_notch = statement;
        view.bottom_nub = statement;
        view.top_line_sticks_to_bottom = multiline;
        view.bottom_line_sticks_to_top = multiline;
    }

    // ---------------------------------------------------------------
    // 4. Minimum dimensions
    // ---------------------------------------------------------------

    fn compute_min_dimensions(
        &self,
        kind: ViewKind,
        spans: &[ChildSpan],
        line_children: &[Vec<usize>],
        multiline: &[Multiline],
        multiline_child: &[Option<usize>],
    ) -> (Vec<Size>, Vec<Distance>) {
        let o = &self.options;
        let mut sizes = Vec::with_capacity(line_children.len());
        let mut distances = Vec::with_capacity(line_children.len());

        for (line, on_line) in line_children.iter().enumerate() {
            let mut width = 0.0;
            let mut above: f64 = 0.0;
            let mut below: f64 = 0.0;
            let mut empty = true;

            for &i in on_line {
                let span = &spans[i];
                let Some(child) = self.cache.get(&span.node) else {
                    continue;
                };
                if child.kind != ViewKind::Cursor {
                    empty = false;
                }
                let l = span.line_in_child(line);
                let m = child.line_margins(l);
                width += child.min_dimensions[l].width + m.left + m.right;
                above = above.max(child.min_distance_to_base[l].above + m.top);
                below = below.max(child.min_distance_to_base[l].below + m.bottom);
            }

            if empty {
                match kind {
                    ViewKind::Indent if line == 0 => {}
                    ViewKind::Socket => {}
                    _ => {
                        width = f64::max(width, o.empty_line_width);
                        above = above.max(o.text_height);
                    }
                }
            }

            match kind {
                ViewKind::Socket => {
                    width = f64::max(width, o.min_socket_width);
                    above = above.max(o.text_height);
                }
                ViewKind::Block => {
                    width = f64::max(width, o.tab_offset + o.tab_width);
                    let ends_indent = matches!(multiline[line], Multiline::End | Multiline::EndStart)
                        && multiline_child[line]
                            .and_then(|i| self.cache.get(&spans[i].node))
                            .is_some_and(|child| child.kind == ViewKind::Indent);
                    if ends_indent {
                        width = f64::max(width, o.indent_width + o.min_indent_tongue_width);
                    }
                }
                ViewKind::Indent if line > 0 => {
                    width = f64::max(width, o.tab_offset + o.tab_width);
                }
                _ => {}
            }

            sizes.push(Size {
                width,
                height: above + below,
            });
            distances.push(Distance { above, below });
        }

        (sizes, distances)
    }

    // ---------------------------------------------------------------
    // 5. Dimensions
    // ---------------------------------------------------------------

    pub(crate) fn compute_dimensions(&mut self, tree: &Tree, node: NodeRef, stretch: Stretch) {
        let version = tree.version(node);
        let Some(view) = self.cache.get_mut(&node) else {
            return;
        };
        if !view.dimension_memo.update((version, stretch)) {
            return;
        }

        let mut distances = view.min_distance_to_base.clone();
        let last = distances.len() - 1;
        if let Some(below) = stretch.first_below {
            distances[0].below = distances[0].below.max(below);
        }
        if let Some(above) = stretch.last_above {
            distances[last].above = distances[last].above.max(above);
        }

        view.dimensions = view
            .min_dimensions
            .iter()
            .zip(&distances)
            .map(|(size, distance)| Size {
                width: size.width,
                height: distance.height(),
            })
            .collect();
        view.distance_to_base = distances.clone();
        let spans = view.children.clone();

        for span in spans {
            let Some(child) = self.cache.get(&span.node) else {
                continue;
            };

            let mut child_stretch = Stretch::default();
            if span.is_multiline() {
                let child_last = child.line_length - 1;
                if child.top_line_sticks_to_bottom {
                    let m = child.line_margins(0);
                    child_stretch.first_below = Some(distances[span.start_line].below - m.bottom);
                }
                if child.bottom_line_sticks_to_top {
                    let m = child.line_margins(child_last);
                    child_stretch.last_above = Some(distances[span.end_line].above - m.top);
                }
            }
            self.compute_dimensions(tree, span.node, child_stretch);
        }
    }

    // ---------------------------------------------------------------
    // 6. Horizontal placement
    // ---------------------------------------------------------------

    /// Place every line of `node` at the given left edges. A subtree whose
    /// lines all match their memo is left untouched.
    pub(crate) fn compute_bounding_box_x(&mut self, tree: &Tree, node: NodeRef, lefts: &[f64]) {
        let version = tree.version(node);
        let Some(view) = self.cache.get_mut(&node) else {
            return;
        };

        let mut changed = false;
        for line in 0..view.line_length {
            let left = lefts.get(line).copied().unwrap_or_default();
            let width = view.dimensions[line].width;
            if view.x_memo[line].update((version, left, width)) {
                view.bounds[line].x = left;
                view.bounds[line].width = width;
                changed = true;
            }
        }
        if !changed {
            return;
        }
        view.changed_bounding_box = true;

        let spans = view.children.clone();
        let line_children = view.line_children.clone();
        let mut child_lefts: Vec<Vec<f64>> = spans.iter().map(|s| vec![0.0; s.line_count()]).collect();

        for (line, on_line) in line_children.iter().enumerate() {
            let mut cursor = lefts.get(line).copied().unwrap_or_default();
            for &i in on_line {
                let span = &spans[i];
                let Some(child) = self.cache.get(&span.node) else {
                    continue;
                };
                let l = span.line_in_child(line);
                let m = child.line_margins(l);
                child_lefts[i][l] = cursor + m.left;
                cursor = child_lefts[i][l] + child.dimensions[l].width + m.right;
            }
        }

        for (span, child_left) in spans.iter().zip(&child_lefts) {
            self.compute_bounding_box_x(tree, span.node, child_left);
        }
    }

    // ---------------------------------------------------------------
    // 7. Glue
    // ---------------------------------------------------------------

    /// Glue for `node` and its changed descendants. `force` recomputes a
    /// node even when clean, discarding glue its parent pushed into it.
    pub(crate) fn compute_glue(&mut self, tree: &Tree, node: NodeRef, force: bool) {
        if !force && !self.needs_geometry(tree, node) {
            return;
        }
        let Some(view) = self.cache.get(&node) else {
            return;
        };
        let spans = view.children.clone();

        for span in &spans {
            self.compute_glue(tree, span.node, span.is_multiline());
        }

        let Some(view) = self.cache.get(&node) else {
            return;
        };
        let draws = matches!(view.kind, ViewKind::Block | ViewKind::Socket);
        let mut glue = vec![Glue::default(); view.line_length];

        for line in 0..view.line_length.saturating_sub(1) {
            if view.kind == ViewKind::Indent && line == 0 {
                continue;
            }
            let (a, b) = (view.bounds[line], view.bounds[line + 1]);
            let overlap = a.right().min(b.right()) - a.x.max(b.x);
            let continues = spans
                .iter()
                .any(|s| s.is_multiline() && s.covers(line) && s.covers(line + 1));
            let threshold = if continues { 0.0 } else { self.options.padding };

            if overlap < threshold {
                glue[line] = Glue {
                    height: self.options.padding,
                    draw: draws,
                };
            }
        }

        for span in spans.iter().filter(|s| s.is_multiline()) {
            let Some(child) = self.cache.get(&span.node) else {
                continue;
            };
            for l in 0..child.line_length - 1 {
                let own = &mut glue[span.start_line + l];
                own.height = own.height.max(child.glue[l].height);
                own.draw = own.draw || child.glue[l].draw;
            }
        }

        if let Some(view) = self.cache.get_mut(&node) {
            view.glue = glue.clone();
        }

        // Multi-line children must span the same gaps as their parent
        for span in spans.iter().filter(|s| s.is_multiline()) {
            for line in span.start_line..span.end_line {
                self.push_glue(span.node, line - span.start_line, glue[line].height);
            }
        }
    }

    fn push_glue(&mut self, node: NodeRef, line: usize, height: f64) {
        let Some(view) = self.cache.get_mut(&node) else {
            return;
        };
        if view.glue[line].height == height {
            return;
        }
        view.glue[line].height = height;

        let inner: Vec<ChildSpan> = view
            .children
            .iter()
            .filter(|s| s.covers(line) && s.covers(line + 1))
            .copied()
            .collect();
        for span in inner {
            self.push_glue(span.node, line - span.start_line, height);
        }
    }

    // ---------------------------------------------------------------
    // 8. Vertical placement
    // ---------------------------------------------------------------

    /// Place every line of `node` at the given tops. Children sit on their
    /// line's baseline.
    pub(crate) fn compute_bounding_box_y(&mut self, tree: &Tree, node: NodeRef, tops: &[f64]) {
        let version = tree.version(node);
        let Some(view) = self.cache.get_mut(&node) else {
            return;
        };

        let mut changed = false;
        for line in 0..view.line_length {
            let top = tops.get(line).copied().unwrap_or_default();
            let key = (version, top, view.dimensions[line], view.distance_to_base[line]);
            if view.y_memo[line].update(key) {
                view.bounds[line].y = top;
                view.bounds[line].height = view.dimensions[line].height;
                changed = true;
            }
        }
        if !changed {
            return;
        }
        view.changed_bounding_box = true;

        let spans = view.children.clone();
        let line_children = view.line_children.clone();
        let distances = view.distance_to_base.clone();
        let mut child_tops: Vec<Vec<f64>> = spans.iter().map(|s| vec![0.0; s.line_count()]).collect();

        for (line, on_line) in line_children.iter().enumerate() {
            let top = tops.get(line).copied().unwrap_or_default();
            for &i in on_line {
                let span = &spans[i];
                let Some(child) = self.cache.get(&span.node) else {
                    continue;
                };
                let l = span.line_in_child(line);
                child_tops[i][l] = top + distances[line].above - child.distance_to_base[l].above;
            }
        }

        for (span, child_top) in spans.iter().zip(&child_tops) {
            self.compute_bounding_box_y(tree, span.node, child_top);
        }
    }

    // ---------------------------------------------------------------
    // 9-12. Outlines, total bounds, drop areas, commit
    // ---------------------------------------------------------------

    pub(crate) fn compute_path(&mut self, tree: &Tree, node: NodeRef) {
        if !self.needs_geometry(tree, node) {
            return;
        }
        let children: Vec<NodeRef> = self
            .cache
            .get(&node)
            .map(|view| view.children.iter().map(|s| s.node).collect())
            .unwrap_or_default();

        for child in children {
            self.compute_path(tree, child);
        }

        self.compute_own_path(tree, node);
        self.compute_total_bounds(node);
        self.compute_own_drop_area(tree, node);
        self.compute_new_version_number(tree, node);
    }

    fn compute_total_bounds(&mut self, node: NodeRef) {
        let Some(view) = self.cache.get(&node) else {
            return;
        };

        let mut total = view.path.bounds();
        for span in &view.children {
            if let Some(child) = self.cache.get(&span.node) {
                total.unite(&child.total_bounds);
            }
        }
        if view.bounds.len() > view.children.len() {
            for rect in &view.bounds {
                total.unite(rect);
            }
        }

        if let Some(view) = self.cache.get_mut(&node) {
            view.total_bounds = total;
        }
    }

    fn compute_new_version_number(&mut self, tree: &Tree, node: NodeRef) {
        if let Some(view) = self.cache.get_mut(&node) {
            view.computed_version = Some(tree.version(node));
            view.changed_bounding_box = false;
        }
    }
}

/// Indices of the children touching each line
fn line_children(spans: &[ChildSpan], line_length: usize) -> Vec<Vec<usize>> {
    let mut lines = vec![Vec::new(); line_length];
    for (i, span) in spans.iter().enumerate() {
        for line in span.start_line..=span.end_line {
            lines[line].push(i);
        }
    }
    lines
}

/// Per line: how it relates to a multi-line child, and which child that is.
/// On an `EndStart` line the recorded child is the one ending.
fn multiline_flags(spans: &[ChildSpan], line_children: &[Vec<usize>]) -> (Vec<Multiline>, Vec<Option<usize>>) {
    let mut flags = Vec::with_capacity(line_children.len());
    let mut owners = Vec::with_capacity(line_children.len());

    for (line, on_line) in line_children.iter().enumerate() {
        let mut starting = None;
        let mut ending = None;
        let mut middle = None;

        for &i in on_line {
            let span = &spans[i];
            if !span.is_multiline() {
                continue;
            }
            if span.start_line == line {
                starting = Some(i);
            } else if span.end_line == line {
                ending = Some(i);
            } else {
                middle = Some(i);
            }
        }

        let (flag, owner) = match (middle, ending, starting) {
            (Some(i), _, _) => (Multiline::Middle, Some(i)),
            (None, Some(e), Some(_)) => (Multiline::EndStart, Some(e)),
            (None, Some(e), None) => (Multiline::End, Some(e)),
            (None, None, Some(s)) => (Multiline::Start, Some(s)),
            (None, None, None) => (Multiline::None, None),
        };
        flags.push(flag);
        owners.push(owner);
    }

    (flags, owners)
}
