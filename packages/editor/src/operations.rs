//! # Operations
//!
//! Undoable edits on a [`Document`]. Every operation addresses the tree by
//! serialized location rather than by handle, so a recorded operation stays
//! valid after the nodes it touched have been replaced by clones.
//!
//! ## Semantics
//!
//! ### Remove / Insert
//! - Without a record these are the user gestures: a pick-up collapses the
//!   blank line left behind, a drop follows the placement rules of the
//!   anchor token and displaces any text already in a target socket.
//! - With a record they replay exactly the newlines the record names. The
//!   inverse of one is always the other, carrying the record.
//! - Insert always attaches a clone, so the carried block can be inserted
//!   again on redo.
//!
//! ### SetText
//! - Atomic replacement of one text token's value.
//!
//! ### Reparse / Replace
//! - Reparse swaps a block or socket for the result of parsing new text.
//!   Its inverse is a Replace holding the container it swapped out.

use crate::document::Document;
use crate::errors::EditorError;
use droplet_model::{
    BlockData, ContainerId, ContainerKind, NodeRef, SocketLevel, SpliceRecord, TokenId, TokenKind,
    Tree,
};
use droplet_parser::{parse, ParseError, ParseOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Detach the container starting at `location`
    Remove {
        location: usize,
        record: Option<SpliceRecord>,
        /// Text to put back into the socket the container leaves
        restore_text: Option<String>,
    },

    /// Attach a clone of the detached `block` after the token at `anchor`
    Insert {
        anchor: usize,
        block: ContainerId,
        record: Option<SpliceRecord>,
        /// Socket text the block replaced, cleared again on replay
        displaced: Option<String>,
    },

    /// Replace the value of the text token at `location`
    SetText { location: usize, value: String },

    /// Swap the container at `location` for a clone of `container`
    Replace {
        location: usize,
        container: ContainerId,
    },

    /// Swap the block or socket at `location` for a parse of `text`
    Reparse { location: usize, text: String },
}

impl Operation {
    /// Lift the container at `location` out of the document
    pub fn pick_up(location: usize) -> Self {
        Operation::Remove {
            location,
            record: None,
            restore_text: None,
        }
    }

    /// Drop `block` after the token at `anchor`
    pub fn drop_block(anchor: usize, block: ContainerId) -> Self {
        Operation::Insert {
            anchor,
            block,
            record: None,
            displaced: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Remove { .. } => "remove",
            Operation::Insert { .. } => "insert",
            Operation::SetText { .. } => "set-text",
            Operation::Replace { .. } => "replace",
            Operation::Reparse { .. } => "reparse",
        }
    }

    /// The detached block an Insert would attach. The inverse of a
    /// pick-up carries the block that was lifted.
    pub fn carried_block(&self) -> Option<ContainerId> {
        match self {
            Operation::Insert { block, .. } => Some(*block),
            _ => None,
        }
    }

    /// The detached container this operation copies from, if any. Once no
    /// recorded operation holds it, it can be freed.
    pub fn held_container(&self) -> Option<ContainerId> {
        match self {
            Operation::Insert { block, .. } => Some(*block),
            Operation::Replace { container, .. } => Some(*container),
            _ => None,
        }
    }

    /// Apply to `doc`, returning the operation that undoes it
    pub fn apply(&self, doc: &mut Document) -> Result<Operation, EditorError> {
        match self {
            Operation::Remove {
                location,
                record,
                restore_text,
            } => apply_remove(doc, *location, *record, restore_text.as_deref()),

            Operation::Insert {
                anchor,
                block,
                record,
                displaced,
            } => apply_insert(doc, *anchor, *block, *record, displaced.as_deref()),

            Operation::SetText { location, value } => apply_set_text(doc, *location, value),

            Operation::Replace {
                location,
                container,
            } => {
                let old = container_at(doc, *location)?;
                let replacement = doc.tree.clone_container(*container);
                swap(&mut doc.tree, *location, old, replacement)?;
                Ok(Operation::Replace {
                    location: *location,
                    container: old,
                })
            }

            Operation::Reparse { location, text } => apply_reparse(doc, *location, text),
        }
    }
}

fn token_at(doc: &Document, location: usize) -> Result<TokenId, EditorError> {
    doc.tree
        .get_token_at_location(doc.root, location)
        .ok_or(EditorError::InvalidLocation(location))
}

/// Container opened by the token at `location`; the root never qualifies
fn container_at(doc: &Document, location: usize) -> Result<ContainerId, EditorError> {
    let token = token_at(doc, location)?;
    match doc.tree.kind(token) {
        TokenKind::Start(c) if *c != doc.root => Ok(*c),
        _ => Err(EditorError::NotAContainer(location)),
    }
}

fn apply_remove(
    doc: &mut Document,
    location: usize,
    record: Option<SpliceRecord>,
    restore_text: Option<&str>,
) -> Result<Operation, EditorError> {
    let container = container_at(doc, location)?;
    let tree = &mut doc.tree;
    let parent = tree.container(container).parent();

    let record = match record {
        Some(record) => {
            tree.splice_out_exact(container, record);
            record
        }
        None => tree.splice_out(container),
    };

    if let (Some(text), Some(socket)) = (restore_text, parent) {
        if tree.container_kind(socket) == ContainerKind::Socket && !text.is_empty() {
            let token = tree.new_text(text);
            tree.push(socket, token);
        }
    }

    // Token just before the gap, accounting for a collapsed newline
    let offset = if record.newline_before { 2 } else { 1 };
    Ok(Operation::Insert {
        anchor: location.saturating_sub(offset),
        block: container,
        record: Some(record),
        displaced: restore_text.map(str::to_owned),
    })
}

fn apply_insert(
    doc: &mut Document,
    anchor_location: usize,
    block: ContainerId,
    record: Option<SpliceRecord>,
    displaced: Option<&str>,
) -> Result<Operation, EditorError> {
    let anchor = token_at(doc, anchor_location)?;
    let tree = &mut doc.tree;

    let socket = match tree.kind(anchor) {
        TokenKind::Start(c) if tree.container_kind(*c) == ContainerKind::Socket => Some(*c),
        _ => None,
    };
    if socket.is_some_and(|s| tree.socket_filled_block(s).is_some()) {
        return Err(EditorError::SocketFilled(anchor_location));
    }

    let copy = tree.clone_container(block);
    let (record, displaced) = match record {
        Some(record) => {
            if let Some(socket) = socket.filter(|_| displaced.is_some()) {
                clear_socket_text(tree, socket);
            }
            tree.splice_in_exact(copy, anchor, record);
            (record, displaced.map(str::to_owned))
        }
        None => {
            let displaced = socket.and_then(|s| clear_socket_text(tree, s));
            (tree.splice_in(copy, anchor), displaced)
        }
    };

    Ok(Operation::Remove {
        location: tree.get_serialized_location(tree.start(copy)),
        record: Some(record),
        restore_text: displaced,
    })
}

fn apply_set_text(doc: &mut Document, location: usize, value: &str) -> Result<Operation, EditorError> {
    let token = token_at(doc, location)?;
    let old = doc
        .tree
        .text(token)
        .map(str::to_owned)
        .ok_or(EditorError::NotText(location))?;
    doc.tree.set_text(token, value);
    Ok(Operation::SetText { location, value: old })
}

fn apply_reparse(doc: &mut Document, location: usize, text: &str) -> Result<Operation, EditorError> {
    let old = container_at(doc, location)?;
    let replacement = match doc.tree.container_kind(old) {
        ContainerKind::Socket => reparse_socket(&mut doc.tree, old, text)?,
        ContainerKind::Block => reparse_block(&mut doc.tree, old, text)?,
        kind => return Err(EditorError::NotReparseable { location, kind }),
    };
    swap(&mut doc.tree, location, old, replacement)?;
    Ok(Operation::Replace {
        location,
        container: old,
    })
}

/// Detach `old` and put the detached `new` exactly where it was
fn swap(tree: &mut Tree, location: usize, old: ContainerId, new: ContainerId) -> Result<(), EditorError> {
    let anchor = tree
        .prev(tree.start(old))
        .ok_or(EditorError::NotAContainer(location))?;
    tree.splice_out_exact(old, SpliceRecord::default());
    tree.splice_in_exact(new, anchor, SpliceRecord::default());
    Ok(())
}

/// Remove every text token directly inside `socket`, returning their
/// concatenated value
fn clear_socket_text(tree: &mut Tree, socket: ContainerId) -> Option<String> {
    let tokens: Vec<TokenId> = tree
        .traverse_one_level(socket)
        .filter_map(|child| match child {
            NodeRef::Token(t) if tree.text(t).is_some() => Some(t),
            _ => None,
        })
        .collect();
    if tokens.is_empty() {
        return None;
    }

    let text: String = tokens.iter().filter_map(|t| tree.text(*t)).collect();
    for token in tokens {
        tree.delete(token);
    }
    Some(text)
}

/// New socket with the same data as `socket`, holding `text` parsed as a
/// value. Handwritten sockets keep the raw text.
fn reparse_socket(tree: &mut Tree, socket: ContainerId, text: &str) -> Result<ContainerId, EditorError> {
    let data = tree.container(socket).data().clone();
    let handwritten = tree
        .container(socket)
        .as_socket()
        .is_some_and(|socket| socket.handwritten);
    let replacement = tree.create_container(data);

    if handwritten {
        if !text.is_empty() {
            let token = tree.new_text(text);
            tree.push(replacement, token);
        }
        return Ok(replacement);
    }

    let options = ParseOptions {
        wrap_at_root: false,
        throw_error: true,
    };
    let (scratch, root) = parse(text, options)?;
    let pieces: Vec<NodeRef> = scratch.traverse_one_level(root).collect();

    match pieces.as_slice() {
        [] => {}
        // A lone literal fills the socket directly
        [NodeRef::Container(only)] if scratch.container_kind(*only) == ContainerKind::Socket => {
            import_children(tree, &scratch, *only, replacement);
        }
        _ => {
            let block = tree.new_block(BlockData::new("value", SocketLevel::ValueOnly));
            import_children(tree, &scratch, root, block);
            tree.push_container(replacement, block);
        }
    }
    Ok(replacement)
}

/// New block parsed from `text`, which must hold exactly one statement.
/// An indented body of `block` carries over when the new text has none.
fn reparse_block(tree: &mut Tree, block: ContainerId, text: &str) -> Result<ContainerId, EditorError> {
    let options = ParseOptions {
        wrap_at_root: true,
        throw_error: true,
    };
    let (scratch, root) = parse(text, options)?;
    let pieces: Vec<NodeRef> = scratch.traverse_one_level(root).collect();
    let [NodeRef::Container(parsed)] = pieces.as_slice() else {
        return Err(ParseError::syntax(1, 1, "expected exactly one block").into());
    };

    let replacement = tree.import_container(&scratch, *parsed);
    let parsed_body = indent_of(&scratch, *parsed);
    if let Some(body) = indent_of(tree, block).filter(|_| parsed_body.is_none()) {
        let body = tree.clone_container(body);
        tree.push_container(replacement, body);
    }
    Ok(replacement)
}

fn indent_of(tree: &Tree, block: ContainerId) -> Option<ContainerId> {
    tree.traverse_one_level(block).find_map(|child| match child {
        NodeRef::Container(c) if tree.container_kind(c) == ContainerKind::Indent => Some(c),
        _ => None,
    })
}

/// Copy the children of `from` in `source` onto the end of `into`
fn import_children(tree: &mut Tree, source: &Tree, from: ContainerId, into: ContainerId) {
    for child in source.traverse_one_level(from) {
        match child {
            NodeRef::Container(c) => {
                let copy = tree.import_container(source, c);
                tree.push_container(into, copy);
            }
            NodeRef::Token(t) => match source.kind(t) {
                TokenKind::Text(value) => {
                    let token = tree.new_text(value.as_str());
                    tree.push(into, token);
                }
                TokenKind::Newline => {
                    let nl = tree.new_newline();
                    tree.push(into, nl);
                }
                _ => {}
            },
        }
    }
}
