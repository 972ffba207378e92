//! # Traversal
//!
//! Walks over the token list: the one-level child walk shared by clone,
//! search and parent repair, serialized-location addressing, and line
//! lookups.

use crate::token::*;
use crate::tree::Tree;
use std::collections::HashSet;

/// Immediate children of a container. Nested containers are yielded once
/// and their interior is skipped.
pub struct OneLevel<'a> {
    tree: &'a Tree,
    head: Option<TokenId>,
    end: TokenId,
}

impl Iterator for OneLevel<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let current = self.head.filter(|t| *t != self.end)?;
        let (item, last) = match self.tree.kind(current) {
            TokenKind::Start(c) => (NodeRef::Container(*c), self.tree.end(*c)),
            _ => (NodeRef::Token(current), current),
        };
        self.head = self.tree.next(last);
        Some(item)
    }
}

/// Every token from a container's Start to its End, inclusive
pub struct Tokens<'a> {
    tree: &'a Tree,
    head: Option<TokenId>,
    end: TokenId,
}

impl Iterator for Tokens<'_> {
    type Item = TokenId;

    fn next(&mut self) -> Option<TokenId> {
        let current = self.head?;
        self.head = if current == self.end {
            None
        } else {
            self.tree.next(current)
        };
        Some(current)
    }
}

impl Tree {
    pub fn traverse_one_level(&self, container: ContainerId) -> OneLevel<'_> {
        OneLevel {
            tree: self,
            head: self.next(self.start(container)),
            end: self.end(container),
        }
    }

    pub fn tokens_of(&self, container: ContainerId) -> Tokens<'_> {
        Tokens {
            tree: self,
            head: Some(self.start(container)),
            end: self.end(container),
        }
    }

    /// Containers strictly inside `container`, in document order
    pub fn descendants(&self, container: ContainerId) -> Vec<ContainerId> {
        self.tokens_of(container)
            .skip(1)
            .filter_map(|t| match self.kind(t) {
                TokenKind::Start(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Recompute parent pointers for everything inside `container`
    pub fn correct_parent_tree(&mut self, container: ContainerId) {
        let children: Vec<NodeRef> = self.traverse_one_level(container).collect();
        for child in children {
            self.set_parent(child, Some(container));
            if let NodeRef::Container(inner) = child {
                self.correct_parent_tree(inner);
            }
        }
    }

    /// Number of non-cursor tokens before `token` in its list
    pub fn get_serialized_location(&self, token: TokenId) -> usize {
        let mut count = 0;
        let mut head = self.prev(token);
        while let Some(t) = head {
            if !self.token(t).is_cursor() {
                count += 1;
            }
            head = self.prev(t);
        }
        count
    }

    /// The `location`-th non-cursor token counting from `container`'s Start
    /// (which is location 0)
    pub fn get_token_at_location(&self, container: ContainerId, location: usize) -> Option<TokenId> {
        let mut remaining = location;
        let mut head = Some(self.start(container));
        while let Some(t) = head {
            if !self.token(t).is_cursor() {
                if remaining == 0 {
                    return Some(t);
                }
                remaining -= 1;
            }
            head = self.next(t);
        }
        None
    }

    /// Depth-first search over visible nodes inside `container`, not
    /// descending into any container listed in `exclude`
    pub fn find<F>(&self, container: ContainerId, mut predicate: F, exclude: &HashSet<ContainerId>) -> Option<NodeRef>
    where
        F: FnMut(NodeRef) -> bool,
    {
        let end = self.end(container);
        let mut head = self.next(self.start(container));
        while let Some(t) = head.filter(|t| *t != end) {
            match self.kind(t) {
                TokenKind::Start(c) => {
                    if predicate(NodeRef::Container(*c)) {
                        return Some(NodeRef::Container(*c));
                    }
                    if exclude.contains(c) {
                        head = self.next(self.end(*c));
                        continue;
                    }
                }
                TokenKind::Text(_) => {
                    if predicate(NodeRef::Token(t)) {
                        return Some(NodeRef::Token(t));
                    }
                }
                TokenKind::End(_) | TokenKind::Newline | TokenKind::Cursor => {}
            }
            head = self.next(t);
        }
        None
    }

    /// Innermost block open at the start of the 0-indexed `line`
    pub fn get_block_on_line(&self, container: ContainerId, line: usize) -> Option<ContainerId> {
        let end = self.end(container);
        let mut open: Vec<ContainerId> = Vec::new();
        let mut current_line = 0;
        let mut head = self.next(self.start(container));

        while let Some(t) = head.filter(|t| *t != end) {
            if current_line == line {
                break;
            }
            match self.kind(t) {
                TokenKind::Start(c) if self.container_kind(*c) == ContainerKind::Block => open.push(*c),
                TokenKind::End(c) if self.container_kind(*c) == ContainerKind::Block => {
                    open.pop();
                }
                TokenKind::Newline => current_line += 1,
                _ => {}
            }
            head = self.next(t);
        }

        if current_line < line {
            return None;
        }

        while let Some(t) = head.filter(|t| *t != end) {
            match self.token_type(t) {
                TokenType::Newline | TokenType::Cursor | TokenType::SegmentStart => head = self.next(t),
                _ => break,
            }
        }
        if let Some(t) = head.filter(|t| *t != end) {
            if self.token_type(t) == TokenType::BlockStart {
                if let TokenKind::Start(c) = self.kind(t) {
                    open.push(*c);
                }
            }
        }
        open.last().copied()
    }

    /// The block directly filling a socket, if any
    pub fn socket_filled_block(&self, socket: ContainerId) -> Option<ContainerId> {
        self.traverse_one_level(socket).find_map(|child| match child {
            NodeRef::Container(c) if self.container_kind(c) == ContainerKind::Block => Some(c),
            _ => None,
        })
    }

    /// Nearest enclosing container of the given kind
    pub fn ancestor_of_kind(&self, node: NodeRef, kind: ContainerKind) -> Option<ContainerId> {
        self.ancestors(node).find(|c| self.container_kind(*c) == kind)
    }

    /// Number of lines `container` spans (newlines inside it, plus one)
    pub fn line_count(&self, container: ContainerId) -> usize {
        1 + self
            .tokens_of(container)
            .filter(|t| self.token(*t).is_newline())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root: [block "a"] NL [block "b" [socket "c"]]
    fn sample() -> (Tree, ContainerId, Vec<ContainerId>) {
        let mut tree = Tree::new();
        let root = tree.new_root();

        let a = tree.new_block(BlockData::new("command", SocketLevel::MostlyBlock));
        let text_a = tree.new_text("a");
        tree.push(a, text_a);
        tree.push_container(root, a);

        let nl = tree.new_newline();
        tree.push(root, nl);

        let b = tree.new_block(BlockData::new("command", SocketLevel::MostlyBlock));
        let text_b = tree.new_text("b ");
        tree.push(b, text_b);
        let socket = tree.new_socket(SocketData::default());
        let text_c = tree.new_text("c");
        tree.push(socket, text_c);
        tree.push_container(b, socket);
        tree.push_container(root, b);

        (tree, root, vec![a, b, socket])
    }

    #[test]
    fn test_one_level_skips_nested_interiors() {
        let (tree, root, ids) = sample();
        let children: Vec<_> = tree.traverse_one_level(root).collect();

        assert_eq!(children.len(), 3);
        assert_eq!(children[0], NodeRef::Container(ids[0]));
        assert_eq!(children[2], NodeRef::Container(ids[1]));
    }

    #[test]
    fn test_location_round_trip_ignores_cursors() {
        let (mut tree, root, ids) = sample();
        let cursor = tree.new_cursor();
        tree.insert(tree.start(root), cursor);

        for t in tree.tokens_of(root).collect::<Vec<_>>() {
            if tree.token(t).is_cursor() {
                continue;
            }
            let location = tree.get_serialized_location(t);
            assert_eq!(tree.get_token_at_location(root, location), Some(t));
        }
        assert_eq!(tree.get_serialized_location(tree.start(ids[0])), 1);
    }

    #[test]
    fn test_find_respects_exclusions() {
        let (tree, root, ids) = sample();
        let is_c = |node: NodeRef| matches!(node, NodeRef::Token(t) if tree.text(t) == Some("c"));

        assert!(tree.find(root, is_c, &HashSet::new()).is_some());

        let exclude: HashSet<_> = [ids[2]].into_iter().collect();
        assert!(tree.find(root, is_c, &exclude).is_none());
    }

    #[test]
    fn test_block_on_line() {
        let (tree, root, ids) = sample();
        assert_eq!(tree.get_block_on_line(root, 0), Some(ids[0]));
        assert_eq!(tree.get_block_on_line(root, 1), Some(ids[1]));
        assert_eq!(tree.get_block_on_line(root, 5), None);
    }

    #[test]
    fn test_correct_parent_tree_repairs_links() {
        let (mut tree, root, ids) = sample();
        let text = tree.next(tree.start(ids[2])).unwrap();
        tree.set_parent(NodeRef::Token(text), None);
        tree.set_parent(NodeRef::Container(ids[2]), None);

        tree.correct_parent_tree(root);
        assert_eq!(tree.parent(text.into()), Some(ids[2]));
        assert_eq!(tree.parent(ids[2].into()), Some(ids[1]));
    }

    #[test]
    fn test_socket_filled_block() {
        let (mut tree, _root, ids) = sample();
        assert_eq!(tree.socket_filled_block(ids[2]), None);

        let socket = tree.new_socket(SocketData::default());
        let inner = tree.new_block(BlockData::new("value", SocketLevel::ValueOnly));
        tree.push_container(socket, inner);
        assert_eq!(tree.socket_filled_block(socket), Some(inner));
    }
}
