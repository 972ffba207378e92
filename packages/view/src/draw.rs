//! Rendering onto a [`Drawable`] surface.
//!
//! Each node draws itself and then its children. A subtree whose total
//! bounds miss the clip rectangle is skipped whole.

use crate::node::ViewKind;
use crate::view::View;
use droplet_geometry::{Color, Drawable, Rectangle};
use droplet_model::{ContainerId, NodeRef, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawStyle {
    pub grayscale: bool,
    /// Depth of enclosing lasso selections; anything above zero is tinted
    pub selected: u32,
    pub no_text: bool,
}

impl View {
    pub fn draw(&self, tree: &Tree, root: ContainerId, surface: &mut dyn Drawable, style: DrawStyle) {
        let mut style = style;
        self.draw_node(tree, NodeRef::Container(root), surface, None, &mut style);
    }

    /// Draw only what touches `clip`. Layout must already be current.
    pub fn draw_region(
        &self,
        tree: &Tree,
        root: ContainerId,
        surface: &mut dyn Drawable,
        clip: Rectangle,
        style: DrawStyle,
    ) {
        let mut style = style;
        self.draw_node(tree, NodeRef::Container(root), surface, Some(&clip), &mut style);
    }

    fn draw_node(
        &self,
        tree: &Tree,
        node: NodeRef,
        surface: &mut dyn Drawable,
        clip: Option<&Rectangle>,
        style: &mut DrawStyle,
    ) {
        let Some(view) = self.cache.get(&node) else {
            return;
        };
        if clip.is_some_and(|clip| !view.total_bounds.overlap(clip)) {
            return;
        }

        self.draw_self(tree, node, surface, style);

        let lasso = match node {
            NodeRef::Container(c) => tree
                .container(c)
                .as_segment()
                .is_some_and(|segment| segment.is_lasso_segment),
            NodeRef::Token(_) => false,
        };
        if lasso {
            style.selected += 1;
        }
        for span in &view.children {
            self.draw_node(tree, span.node, surface, clip, style);
        }
        if lasso {
            style.selected -= 1;
        }
    }

    fn draw_self(&self, tree: &Tree, node: NodeRef, surface: &mut dyn Drawable, style: &DrawStyle) {
        let Some(view) = self.cache.get(&node) else {
            return;
        };

        match view.kind {
            ViewKind::Block | ViewKind::Socket => {
                let mut path = view.path.clone();
                path.style.fill = path.style.fill.map(|fill| tint(fill, style));
                path.draw(surface);
            }
            ViewKind::Text => {
                if style.no_text {
                    return;
                }
                if let NodeRef::Token(t) = node {
                    let text = tree.text(t).unwrap_or_default();
                    if !text.is_empty() {
                        surface.fill_text(text, view.bounds[0].upper_left(), Color::BLACK);
                    }
                }
            }
            ViewKind::Indent | ViewKind::Segment | ViewKind::Cursor => {}
        }
    }
}

fn tint(color: Color, style: &DrawStyle) -> Color {
    let color = if style.grayscale { color.grayscale() } else { color };
    if style.selected > 0 {
        color.blend(Color::SELECTION, 0.6)
    } else {
        color
    }
}
