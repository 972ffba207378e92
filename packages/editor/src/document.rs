//! # Document Handle
//!
//! A token tree together with the root it is edited from.
//!
//! ## Lifecycle
//!
//! ```text
//! Parse → Edit → Layout → Stringify
//!   ↓       ↓       ↓         ↓
//! Tree  Operations View     Source
//! ```

use crate::{EditorError, Operation};
use droplet_model::{ContainerId, NodeRef, Tree};
use droplet_parser::{parse, ParseOptions};
use tracing::debug;

/// Editable droplet document
#[derive(Debug)]
pub struct Document {
    pub tree: Tree,
    pub root: ContainerId,

    /// Increments on each applied operation
    pub version: u64,
}

impl Document {
    pub fn new(tree: Tree, root: ContainerId) -> Self {
        Self {
            tree,
            root,
            version: 0,
        }
    }

    pub fn from_source(source: &str, options: ParseOptions) -> Result<Self, EditorError> {
        let (tree, root) = parse(source, options)?;
        Ok(Self::new(tree, root))
    }

    pub fn stringify(&self) -> String {
        self.tree.stringify(self.root)
    }

    /// Debug dump of the whole tree
    pub fn serialize(&self) -> String {
        self.tree.serialize(self.root)
    }

    /// Serialized location of the first token of `node`
    pub fn location_of(&self, node: impl Into<NodeRef>) -> usize {
        let (first, _) = self.tree.bounds_of(node.into());
        self.tree.get_serialized_location(first)
    }

    /// Copy a container out of another tree (a palette, a clipboard) so
    /// it can be dropped into this document
    pub fn import(&mut self, source: &Tree, container: ContainerId) -> ContainerId {
        self.tree.import_container(source, container)
    }

    /// Apply `operation`, returning its inverse
    pub fn apply(&mut self, operation: &Operation) -> Result<Operation, EditorError> {
        let inverse = operation.apply(self)?;
        self.version += 1;
        debug!(
            operation = operation.name(),
            version = self.version,
            "applied operation"
        );
        Ok(inverse)
    }

    /// Free the detached container `operation` holds. Call this for an
    /// inverse that will never be applied; the document keeps no other
    /// reference to it.
    pub fn discard(&mut self, operation: &Operation) {
        if let Some(container) = operation.held_container() {
            if self.tree.contains_container(container) && !self.tree.is_attached(container) {
                self.tree.free_container(container);
            }
        }
    }

    /// Reparse the block or socket at `location` from edited text. A
    /// failure leaves the tree untouched.
    pub fn try_reparse(&mut self, location: usize, text: &str) -> bool {
        let operation = Operation::Reparse {
            location,
            text: text.to_string(),
        };
        match self.apply(&operation) {
            Ok(inverse) => {
                self.discard(&inverse);
                true
            }
            Err(err) => {
                debug!(%err, location, "reparse rejected");
                false
            }
        }
    }
}
