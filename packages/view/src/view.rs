//! # View
//!
//! Owner of the `{NodeRef -> ViewNode}` cache for one projection of a
//! tree. A view only reads the model; several views over the same tree
//! keep fully independent caches.

use crate::node::{Stretch, ViewNode};
use crate::options::ViewOptions;
use droplet_geometry::{MonospaceMetrics, Point, Rectangle, TextMetrics};
use droplet_model::{ContainerId, NodeRef, Tree};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// What a layout pass did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutStats {
    /// View nodes whose children and minimum dimensions were recomputed
    pub nodes_recomputed: usize,
    /// Union of the old and new outlines of every node whose outline changed
    pub dirty_region: Rectangle,
}

impl Default for LayoutStats {
    fn default() -> Self {
        Self {
            nodes_recomputed: 0,
            dirty_region: Rectangle::EMPTY,
        }
    }
}

pub struct View {
    pub(crate) options: ViewOptions,
    pub(crate) metrics: Box<dyn TextMetrics>,
    pub(crate) cache: HashMap<NodeRef, ViewNode>,
    pub(crate) stats: LayoutStats,
}

impl View {
    /// A view measuring text with a fixed advance of `options.char_width`
    pub fn new(options: ViewOptions) -> Self {
        let metrics = MonospaceMetrics::new(options.char_width);
        Self::with_metrics(options, Box::new(metrics))
    }

    pub fn with_metrics(options: ViewOptions, metrics: Box<dyn TextMetrics>) -> Self {
        Self {
            options,
            metrics,
            cache: HashMap::new(),
            stats: LayoutStats::default(),
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Run the full pipeline over `root`, placing its first line at `origin`.
    ///
    /// Nodes whose model version matches their last committed pass are
    /// skipped wholesale; positional memos make a moved but otherwise
    /// unchanged subtree cheap to re-place.
    pub fn layout(&mut self, tree: &Tree, root: ContainerId, origin: Point) -> LayoutStats {
        self.stats = LayoutStats::default();
        let node = NodeRef::Container(root);

        self.compute_children(tree, node);
        self.compute_root_state(tree, root);
        self.compute_dimensions(tree, node, Stretch::default());

        let line_length = self.cache.get(&node).map_or(1, |view| view.line_length);
        self.compute_bounding_box_x(tree, node, &vec![origin.x; line_length]);
        self.compute_glue(tree, node, false);

        let tops = self.root_line_tops(node, origin.y);
        self.compute_bounding_box_y(tree, node, &tops);

        self.compute_path(tree, node);

        debug!(
            nodes_recomputed = self.stats.nodes_recomputed,
            cached = self.cache.len(),
            "layout pass"
        );
        self.stats
    }

    /// Geometry of a laid-out node
    pub fn get_view_node_for(&self, node: impl Into<NodeRef>) -> Option<&ViewNode> {
        self.cache.get(&node.into())
    }

    /// Drop cached nodes no longer reachable from `root`; returns how many
    /// were removed
    pub fn prune(&mut self, tree: &Tree, root: ContainerId) -> usize {
        let mut live: HashSet<NodeRef> = HashSet::new();
        live.insert(NodeRef::Container(root));
        for container in std::iter::once(root).chain(tree.descendants(root)) {
            live.insert(NodeRef::Container(container));
            for child in tree.traverse_one_level(container) {
                if let NodeRef::Token(t) = child {
                    if !tree.token(t).is_newline() {
                        live.insert(child);
                    }
                }
            }
        }

        let before = self.cache.len();
        self.cache.retain(|node, _| live.contains(node));
        let removed = before - self.cache.len();

        trace!(removed, remaining = self.cache.len(), "pruned view cache");
        removed
    }

    /// Forget every cached node
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Line tops for the root: each line starts where the previous one
    /// ended, plus its glue
    fn root_line_tops(&self, node: NodeRef, origin_y: f64) -> Vec<f64> {
        let Some(view) = self.cache.get(&node) else {
            return vec![origin_y];
        };

        let mut tops = Vec::with_capacity(view.line_length);
        let mut y = origin_y;
        for line in 0..view.line_length {
            tops.push(y);
            y += view.dimensions[line].height + view.glue[line].height;
        }
        tops
    }
}
