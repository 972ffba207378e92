//! # Droplet View
//!
//! Incremental layout for the blocks editor: one [`ViewNode`] per tree
//! node, cached by [`NodeRef`](droplet_model::NodeRef) and recomputed only
//! when the model version it was computed from goes stale.
//!
//! ## Pipeline
//!
//! ```text
//! children → margins → bevels → min dimensions       (bottom-up, skip clean)
//!        → dimensions → x → glue → y                  (top-down, memoized)
//!        → outline → total bounds → drop area → commit
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use droplet_geometry::{Point, RecordingSurface};
//! use droplet_model::{BlockData, SocketLevel, Tree};
//! use droplet_view::{DrawStyle, View, ViewOptions};
//!
//! let mut tree = Tree::new();
//! let root = tree.new_root();
//! let block = tree.new_block(BlockData::new("command", SocketLevel::MostlyBlock));
//! let text = tree.new_text("print 1");
//! tree.push(block, text);
//! tree.push_container(root, block);
//!
//! let mut view = View::new(ViewOptions::default());
//! view.layout(&tree, root, Point::ORIGIN);
//!
//! let bounds = view.get_view_node_for(block).map(|node| node.bounds[0]);
//! assert!(bounds.is_some_and(|b| b.width > 0.0));
//!
//! let mut surface = RecordingSurface::new();
//! view.draw(&tree, root, &mut surface, DrawStyle::default());
//! assert_eq!(surface.texts(), vec!["print 1"]);
//! ```

mod draw;
mod drop_area;
mod layout;
mod memo;
mod node;
mod options;
mod outline;
mod view;

pub use draw::DrawStyle;
pub use hit_test::DropTarget;
pub use memo::Memo;
pub use node::{
    Bevels, ChildSpan, Distance, Glue, LineMargins, Margins, Multiline, Size, ViewKind, ViewNode,
};
pub use options::ViewOptions;
pub use view::{LayoutStats, View};
