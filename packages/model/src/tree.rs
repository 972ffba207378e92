//! # Token Arena
//!
//! The document is a doubly-linked list of tokens. Containers are paired
//! Start/End tokens; everything strictly between them is their content.
//! Links and parent pointers are plain handles into the arena, so no token
//! owns another and detached runs simply stop being reachable from a root.
//!
//! ## Versions
//!
//! Every structural change bumps the version of the changed node and of all
//! its ancestors. That bump is the only invalidation signal the layout
//! cache reads.

use crate::token::*;
use slotmap::SlotMap;
use tracing::warn;

/// Arena holding every token and container of one or more documents
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub(crate) tokens: SlotMap<TokenId, Token>,
    pub(crate) containers: SlotMap<ContainerId, Container>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Create a detached, empty container (its Start linked straight to its End)
    pub fn create_container(&mut self, data: ContainerData) -> ContainerId {
        let id = self.containers.insert(Container {
            start: TokenId::default(),
            end: TokenId::default(),
            parent: None,
            version: 0,
            data,
        });

        let start = self.tokens.insert(Token::new(TokenKind::Start(id)));
        let end = self.tokens.insert(Token::new(TokenKind::End(id)));
        self.link(Some(start), Some(end));

        let container = &mut self.containers[id];
        container.start = start;
        container.end = end;
        id
    }

    pub fn new_block(&mut self, data: BlockData) -> ContainerId {
        self.create_container(ContainerData::Block(data))
    }

    pub fn new_socket(&mut self, data: SocketData) -> ContainerId {
        self.create_container(ContainerData::Socket(data))
    }

    pub fn new_indent(&mut self, data: IndentData) -> ContainerId {
        self.create_container(ContainerData::Indent(data))
    }

    pub fn new_segment(&mut self, data: SegmentData) -> ContainerId {
        self.create_container(ContainerData::Segment(data))
    }

    /// Empty document root
    pub fn new_root(&mut self) -> ContainerId {
        self.new_segment(SegmentData {
            is_lasso_segment: false,
            is_root: true,
        })
    }

    pub fn new_text(&mut self, value: impl Into<String>) -> TokenId {
        self.tokens.insert(Token::new(TokenKind::Text(value.into())))
    }

    pub fn new_newline(&mut self) -> TokenId {
        self.tokens.insert(Token::new(TokenKind::Newline))
    }

    pub fn new_cursor(&mut self) -> TokenId {
        self.tokens.insert(Token::new(TokenKind::Cursor))
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// Panics on a dangling handle
    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id]
    }

    /// Panics on a dangling handle
    pub fn container(&self, id: ContainerId) -> &Container {
        &self.containers[id]
    }

    pub fn contains_token(&self, id: TokenId) -> bool {
        self.tokens.contains_key(id)
    }

    pub fn contains_container(&self, id: ContainerId) -> bool {
        self.containers.contains_key(id)
    }

    /// Live tokens in the arena, attached or not
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn kind(&self, id: TokenId) -> &TokenKind {
        &self.tokens[id].kind
    }

    pub fn next(&self, id: TokenId) -> Option<TokenId> {
        self.tokens[id].next
    }

    pub fn prev(&self, id: TokenId) -> Option<TokenId> {
        self.tokens[id].prev
    }

    pub fn start(&self, id: ContainerId) -> TokenId {
        self.containers[id].start
    }

    pub fn end(&self, id: ContainerId) -> TokenId {
        self.containers[id].end
    }

    pub fn container_kind(&self, id: ContainerId) -> ContainerKind {
        self.containers[id].kind()
    }

    /// Value of a Text token
    pub fn text(&self, id: TokenId) -> Option<&str> {
        match &self.tokens[id].kind {
            TokenKind::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn token_type(&self, id: TokenId) -> TokenType {
        match self.tokens[id].kind {
            TokenKind::Start(c) => match self.container_kind(c) {
                ContainerKind::Block => TokenType::BlockStart,
                ContainerKind::Socket => TokenType::SocketStart,
                ContainerKind::Indent => TokenType::IndentStart,
                ContainerKind::Segment => TokenType::SegmentStart,
            },
            TokenKind::End(c) => match self.container_kind(c) {
                ContainerKind::Block => TokenType::BlockEnd,
                ContainerKind::Socket => TokenType::SocketEnd,
                ContainerKind::Indent => TokenType::IndentEnd,
                ContainerKind::Segment => TokenType::SegmentEnd,
            },
            TokenKind::Text(_) => TokenType::Text,
            TokenKind::Newline => TokenType::Newline,
            TokenKind::Cursor => TokenType::Cursor,
        }
    }

    pub fn version(&self, node: NodeRef) -> u64 {
        match node {
            NodeRef::Container(c) => self.containers[c].version,
            NodeRef::Token(t) => self.tokens[t].version,
        }
    }

    pub fn parent(&self, node: NodeRef) -> Option<ContainerId> {
        match node {
            NodeRef::Container(c) => self.containers[c].parent,
            NodeRef::Token(t) => self.tokens[t].parent,
        }
    }

    /// First and last token of a node's run
    pub fn bounds_of(&self, node: NodeRef) -> (TokenId, TokenId) {
        match node {
            NodeRef::Container(c) => (self.start(c), self.end(c)),
            NodeRef::Token(t) => (t, t),
        }
    }

    /// Parent chain, nearest first
    pub fn ancestors(&self, node: NodeRef) -> impl Iterator<Item = ContainerId> + '_ {
        std::iter::successors(self.parent(node), move |c| self.containers[*c].parent)
    }

    /// Whether `node` lies inside `ancestor` (a container counts as inside itself)
    pub fn is_within(&self, node: NodeRef, ancestor: ContainerId) -> bool {
        node == NodeRef::Container(ancestor) || self.ancestors(node).any(|c| c == ancestor)
    }

    /// Topmost container reachable through parent links
    pub fn root_of(&self, node: NodeRef) -> Option<ContainerId> {
        match node {
            NodeRef::Container(c) => Some(self.ancestors(node).last().unwrap_or(c)),
            NodeRef::Token(_) => self.ancestors(node).last(),
        }
    }

    pub fn is_attached(&self, c: ContainerId) -> bool {
        let container = &self.containers[c];
        self.tokens[container.start].prev.is_some() || self.tokens[container.end].next.is_some()
    }

    /// No tokens between Start and End other than cursors
    pub fn is_empty_container(&self, c: ContainerId) -> bool {
        let end = self.end(c);
        let mut head = self.next(self.start(c));
        while let Some(t) = head {
            if t == end {
                return true;
            }
            if !self.tokens[t].is_cursor() {
                return false;
            }
            head = self.next(t);
        }
        true
    }

    /// The container a token placed right after `at` belongs to
    pub fn container_after(&self, at: TokenId) -> Option<ContainerId> {
        match self.tokens[at].kind {
            TokenKind::Start(c) => Some(c),
            _ => self.tokens[at].parent,
        }
    }

    /// The container a token placed right before `at` belongs to
    pub fn container_before(&self, at: TokenId) -> Option<ContainerId> {
        match self.tokens[at].kind {
            TokenKind::End(c) => Some(c),
            _ => self.tokens[at].parent,
        }
    }

    // ---------------------------------------------------------------
    // Line helpers
    // ---------------------------------------------------------------

    /// Tokens that never affect lines or layout: cursors, and the
    /// boundaries of non-root segments
    pub fn is_invisible(&self, id: TokenId) -> bool {
        match self.tokens[id].kind {
            TokenKind::Cursor => true,
            TokenKind::Start(c) | TokenKind::End(c) => self.containers[c]
                .as_segment()
                .is_some_and(|s| !s.is_root),
            _ => false,
        }
    }

    pub fn prev_visible(&self, id: TokenId) -> Option<TokenId> {
        let mut head = self.prev(id);
        while let Some(t) = head {
            if !self.is_invisible(t) {
                return Some(t);
            }
            head = self.prev(t);
        }
        None
    }

    pub fn next_visible(&self, id: TokenId) -> Option<TokenId> {
        let mut head = self.next(id);
        while let Some(t) = head {
            if !self.is_invisible(t) {
                return Some(t);
            }
            head = self.next(t);
        }
        None
    }

    pub fn is_first_on_line(&self, node: NodeRef) -> bool {
        let (first, _) = self.bounds_of(node);
        match self.prev_visible(first) {
            None => true,
            Some(t) => matches!(self.tokens[t].kind, TokenKind::Newline | TokenKind::Start(_)),
        }
    }

    pub fn is_last_on_line(&self, node: NodeRef) -> bool {
        let (_, last) = self.bounds_of(node);
        match self.next_visible(last) {
            None => true,
            Some(t) => matches!(
                self.token_type(t),
                TokenType::Newline
                    | TokenType::IndentStart
                    | TokenType::BlockEnd
                    | TokenType::SocketEnd
                    | TokenType::IndentEnd
                    | TokenType::SegmentEnd
            ),
        }
    }

    // ---------------------------------------------------------------
    // Single-token mutation
    // ---------------------------------------------------------------

    /// Splice `token` (or, for a Start token, its container's whole run)
    /// immediately after `at`. Returns the last token of the inserted run.
    ///
    /// The run must be detached. Container-level operations
    /// ([`Tree::splice_in`]) should be preferred for containers.
    pub fn insert(&mut self, at: TokenId, token: TokenId) -> TokenId {
        self.warn_if_structural(token);
        self.insert_run(at, token)
    }

    /// Splice `token` (or its container's run) immediately before `at`
    pub fn insert_before(&mut self, at: TokenId, token: TokenId) -> TokenId {
        self.warn_if_structural(token);
        self.insert_run_before(at, token)
    }

    pub(crate) fn insert_run(&mut self, at: TokenId, token: TokenId) -> TokenId {
        let last = self.run_end(token);
        debug_assert!(
            self.tokens[token].prev.is_none() && self.tokens[last].next.is_none(),
            "inserted run must be detached"
        );

        self.link_run_after(at, token, last);
        let parent = self.container_after(at);
        self.reparent_run(token, last, parent);
        self.notify_opt(parent);
        last
    }

    pub(crate) fn insert_run_before(&mut self, at: TokenId, token: TokenId) -> TokenId {
        let last = self.run_end(token);
        debug_assert!(
            self.tokens[token].prev.is_none() && self.tokens[last].next.is_none(),
            "inserted run must be detached"
        );

        let prev = self.tokens[at].prev;
        self.link(prev, Some(token));
        self.link(Some(last), Some(at));

        let parent = self.container_before(at);
        self.reparent_run(token, last, parent);
        self.notify_opt(parent);
        last
    }

    /// Set `at`'s successor to `token`, discarding whatever followed `at`.
    /// Meant for building fresh runs. Returns the last token appended.
    pub fn append(&mut self, at: TokenId, token: TokenId) -> TokenId {
        let last = self.run_end(token);
        if let Some(old) = self.tokens[at].next {
            self.tokens[old].prev = None;
        }
        self.link(Some(at), Some(token));

        let parent = self.container_after(at);
        self.reparent_run(token, last, parent);
        self.notify_opt(parent);
        last
    }

    /// Append `token` as the last child of `container`
    pub fn push(&mut self, container: ContainerId, token: TokenId) -> TokenId {
        let end = self.end(container);
        self.insert_before(end, token)
    }

    /// Append a detached container as the last child of `container`
    pub fn push_container(&mut self, container: ContainerId, child: ContainerId) {
        let (end, start) = (self.end(container), self.start(child));
        self.insert_run_before(end, start);
    }

    /// Unlink a single token, reconnecting its neighbours.
    ///
    /// Boundary tokens cannot be removed this way; use
    /// [`Tree::splice_out`] to remove a whole container.
    pub fn remove(&mut self, token: TokenId) {
        assert!(
            !matches!(self.tokens[token].kind, TokenKind::Start(_) | TokenKind::End(_)),
            "remove() on a container boundary; use splice_out"
        );

        let parent = self.tokens[token].parent;
        self.unlink(token);
        self.touch(token);
        self.notify_opt(parent);
    }

    /// [`Tree::remove`], then drop the token from the arena
    pub fn delete(&mut self, token: TokenId) {
        self.remove(token);
        self.tokens.remove(token);
    }

    /// Replace a Text token's value and bump versions
    pub fn set_text(&mut self, token: TokenId, value: impl Into<String>) {
        match &mut self.tokens[token].kind {
            TokenKind::Text(current) => *current = value.into(),
            other => panic!("set_text on non-text token {other:?}"),
        }
        self.touch(token);
        let parent = self.tokens[token].parent;
        self.notify_opt(parent);
    }

    // ---------------------------------------------------------------
    // Versions
    // ---------------------------------------------------------------

    /// Bump `container` and every ancestor
    pub fn notify_change(&mut self, container: ContainerId) {
        let mut head = Some(container);
        while let Some(c) = head {
            let record = &mut self.containers[c];
            record.version += 1;
            head = record.parent;
        }
    }

    pub(crate) fn notify_opt(&mut self, container: Option<ContainerId>) {
        if let Some(c) = container {
            self.notify_change(c);
        }
    }

    pub(crate) fn touch(&mut self, token: TokenId) {
        self.tokens[token].version += 1;
    }

    // ---------------------------------------------------------------
    // Raw linking (no reparenting, no version bumps)
    // ---------------------------------------------------------------

    pub(crate) fn link(&mut self, a: Option<TokenId>, b: Option<TokenId>) {
        if let Some(a) = a {
            self.tokens[a].next = b;
        }
        if let Some(b) = b {
            self.tokens[b].prev = a;
        }
    }

    /// Last token of the run starting at `token`
    pub(crate) fn run_end(&self, token: TokenId) -> TokenId {
        match self.tokens[token].kind {
            TokenKind::Start(c) => self.containers[c].end,
            _ => token,
        }
    }

    pub(crate) fn link_run_after(&mut self, at: TokenId, first: TokenId, last: TokenId) {
        let next = self.tokens[at].next;
        self.link(Some(at), Some(first));
        self.link(Some(last), next);
    }

    pub(crate) fn detach_run(&mut self, first: TokenId, last: TokenId) {
        let prev = self.tokens[first].prev;
        let next = self.tokens[last].next;
        self.link(prev, next);
        self.tokens[first].prev = None;
        self.tokens[last].next = None;
    }

    pub(crate) fn unlink(&mut self, token: TokenId) {
        self.detach_run(token, token);
        self.tokens[token].parent = None;
    }

    pub(crate) fn set_parent(&mut self, node: NodeRef, parent: Option<ContainerId>) {
        match node {
            NodeRef::Container(c) => {
                let (start, end) = (self.start(c), self.end(c));
                self.containers[c].parent = parent;
                self.tokens[start].parent = parent;
                self.tokens[end].parent = parent;
            }
            NodeRef::Token(t) => self.tokens[t].parent = parent,
        }
    }

    /// Reparent the top-level items of the run `first..=last`
    pub(crate) fn reparent_run(&mut self, first: TokenId, last: TokenId, parent: Option<ContainerId>) {
        let mut head = Some(first);
        while let Some(t) = head {
            let item_end = match self.tokens[t].kind {
                TokenKind::Start(c) => {
                    self.set_parent(NodeRef::Container(c), parent);
                    self.containers[c].end
                }
                _ => {
                    self.tokens[t].parent = parent;
                    t
                }
            };
            if item_end == last {
                break;
            }
            head = self.tokens[item_end].next;
        }
    }

    fn warn_if_structural(&self, token: TokenId) {
        match self.tokens[token].kind {
            TokenKind::Start(c) => {
                warn!(container = ?c, "inserting a container through the token primitive");
            }
            TokenKind::End(c) => {
                warn!(container = ?c, "inserting a bare End token breaks pairing");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tree: &mut Tree) -> ContainerId {
        tree.new_block(BlockData::new("command", SocketLevel::MostlyBlock))
    }

    #[test]
    fn test_new_container_is_linked_and_empty() {
        let mut tree = Tree::new();
        let b = block(&mut tree);

        assert_eq!(tree.next(tree.start(b)), Some(tree.end(b)));
        assert!(tree.is_empty_container(b));
        assert!(!tree.is_attached(b));
        assert_eq!(tree.token_type(tree.start(b)), TokenType::BlockStart);
    }

    #[test]
    fn test_insert_reparents_and_bumps_versions() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let b = block(&mut tree);
        tree.push_container(root, b);

        let before_root = tree.version(root.into());
        let before_block = tree.version(b.into());

        let text = tree.new_text("hi");
        tree.insert(tree.start(b), text);

        assert_eq!(tree.parent(text.into()), Some(b));
        assert!(tree.version(b.into()) > before_block);
        assert!(tree.version(root.into()) > before_root);
    }

    #[test]
    fn test_insert_container_run_after_token() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let a = tree.new_text("a");
        tree.push(root, a);

        let b = block(&mut tree);
        let start = tree.start(b);
        let last = tree.insert(a, start);

        assert_eq!(last, tree.end(b));
        assert_eq!(tree.parent(b.into()), Some(root));
        assert_eq!(tree.next(tree.end(b)), Some(tree.end(root)));
    }

    #[test]
    fn test_remove_single_token() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let a = tree.new_text("a");
        let b = tree.new_text("b");
        tree.push(root, a);
        tree.push(root, b);

        tree.remove(a);
        assert_eq!(tree.next(tree.start(root)), Some(b));
        assert_eq!(tree.prev(b), Some(tree.start(root)));
        assert_eq!(tree.parent(a.into()), None);
    }

    #[test]
    #[should_panic(expected = "use splice_out")]
    fn test_remove_boundary_panics() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let b = block(&mut tree);
        tree.push_container(root, b);
        tree.remove(tree.start(b));
    }

    #[test]
    fn test_set_text_bumps_token_and_parent() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let t = tree.new_text("x");
        tree.push(root, t);

        let root_version = tree.version(root.into());
        tree.set_text(t, "y");

        assert_eq!(tree.text(t), Some("y"));
        assert_eq!(tree.version(t.into()), 1);
        assert_eq!(tree.version(root.into()), root_version + 1);
    }

    #[test]
    fn test_line_position_helpers() {
        let mut tree = Tree::new();
        let root = tree.new_root();
        let b = block(&mut tree);
        tree.push_container(root, b);
        let x = tree.new_text("x");
        let eq = tree.new_text(" = ");
        let one = tree.new_text("1");
        tree.push(b, x);
        tree.push(b, eq);
        tree.push(b, one);

        assert!(tree.is_first_on_line(x.into()));
        assert!(!tree.is_last_on_line(x.into()));
        assert!(!tree.is_first_on_line(eq.into()));
        assert!(tree.is_last_on_line(one.into()));
        assert!(tree.is_first_on_line(b.into()));
        assert!(tree.is_last_on_line(b.into()));
    }
}
