//! # Container Mutation
//!
//! Container-level operations: splicing whole runs out of and into the
//! list, wrapping and unwrapping ranges, and deep clones.
//!
//! Splicing also owns the blank-line bookkeeping around a block. Every
//! splice reports which newline tokens it added or removed in a
//! [`SpliceRecord`], which is enough to undo it exactly.

use crate::token::*;
use crate::tree::Tree;
use tracing::trace;

/// Newlines touched by a splice, on either side of the container.
///
/// For [`Tree::splice_out`] these were removed; for [`Tree::splice_in`]
/// they were inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpliceRecord {
    pub newline_before: bool,
    pub newline_after: bool,
}

impl Tree {
    /// Detach `container` from the list and collapse the blank line it
    /// leaves behind.
    ///
    /// A newline directly before the gap is dropped when the gap is followed
    /// by another newline or a closing boundary, except when the gap is the
    /// whole body of an indent (an empty indented block keeps its line).
    /// Otherwise a newline directly after the gap is dropped when the gap
    /// opens a line at the start of a non-indent container.
    pub fn splice_out(&mut self, container: ContainerId) -> SpliceRecord {
        let (start, end) = (self.start(container), self.end(container));
        let former_parent = self.container(container).parent();

        let before = self.prev(start);
        let after = self.next(end);
        if before.is_none() && after.is_none() {
            return SpliceRecord::default();
        }

        self.detach_run(start, end);
        self.set_parent(NodeRef::Container(container), None);

        let first = before.and_then(|t| self.non_cursor_at_or_before(t));
        let last = after.and_then(|t| self.non_cursor_at_or_after(t));
        let mut record = SpliceRecord::default();

        let first_is_newline = first.is_some_and(|t| self.token(t).is_newline());
        let last_closes = match last {
            None => true,
            Some(t) => matches!(self.kind(t), TokenKind::Newline | TokenKind::End(_)),
        };

        if first_is_newline && last_closes {
            if let Some(nl) = first.filter(|nl| !self.keeps_empty_indent(*nl, last)) {
                self.free_newline(nl);
                record.newline_before = true;
            }
        } else if let Some(nl) = last.filter(|t| self.token(*t).is_newline()) {
            let opens_line = match first {
                None => true,
                Some(t) => match self.kind(t) {
                    TokenKind::Start(c) => self.container_kind(*c) != ContainerKind::Indent,
                    _ => false,
                },
            };
            if opens_line {
                self.free_newline(nl);
                record.newline_after = true;
            }
        }

        trace!(?container, ?record, "spliced out");
        self.notify_change(container);
        self.notify_opt(former_parent);
        record
    }

    /// Insert a detached `container` after `at`, following the placement
    /// rules for the kind of `at`:
    ///
    /// - after an indent start, on a fresh line opening the indent body
    /// - after a block end, on a new line of its own
    /// - at the start of a non-empty segment, followed by a newline
    /// - at a socket start, as the socket's last child
    ///
    /// Anything already inside a target socket is left in place; callers
    /// move displaced socket text themselves.
    pub fn splice_in(&mut self, container: ContainerId, at: TokenId) -> SpliceRecord {
        assert!(
            !self.is_attached(container),
            "splice_in requires a detached container"
        );
        let start = self.start(container);
        let mut record = SpliceRecord::default();

        match self.token_type(at) {
            TokenType::IndentStart => {
                let anchor = match self.next_non_cursor(at) {
                    Some(nl) if self.token(nl).is_newline() => nl,
                    _ => {
                        record.newline_before = true;
                        let nl = self.new_newline();
                        self.insert(at, nl)
                    }
                };
                let last = self.insert_run(anchor, start);
                let needs_break = match self.next_non_cursor(last) {
                    None => false,
                    Some(t) => !matches!(self.kind(t), TokenKind::Newline | TokenKind::End(_)),
                };
                if needs_break {
                    record.newline_after = true;
                    let nl = self.new_newline();
                    self.insert(last, nl);
                }
            }
            TokenType::BlockEnd => {
                record.newline_before = true;
                let nl = self.new_newline();
                let nl = self.insert(at, nl);
                self.insert_run(nl, start);
            }
            TokenType::SegmentStart => {
                let segment = self
                    .container_after(at)
                    .unwrap_or_else(|| unreachable!("segment start without container"));
                let non_empty = !self.is_empty_container(segment);
                let last = self.insert_run(at, start);
                if non_empty {
                    record.newline_after = true;
                    let nl = self.new_newline();
                    self.insert(last, nl);
                }
            }
            TokenType::SocketStart => {
                let socket = self
                    .container_after(at)
                    .unwrap_or_else(|| unreachable!("socket start without container"));
                let end = self.end(socket);
                self.insert_run_before(end, start);
            }
            _ => {
                self.insert_run(at, start);
            }
        }

        trace!(?container, ?record, "spliced in");
        self.notify_change(container);
        record
    }

    /// Detach `container` and drop exactly the newlines `record` names,
    /// inverting a previous [`Tree::splice_in`]
    pub fn splice_out_exact(&mut self, container: ContainerId, record: SpliceRecord) {
        let (start, end) = (self.start(container), self.end(container));
        let former_parent = self.container(container).parent();

        let before = self.prev_non_cursor(start).filter(|t| self.token(*t).is_newline());
        let after = self.next_non_cursor(end).filter(|t| self.token(*t).is_newline());

        self.detach_run(start, end);
        self.set_parent(NodeRef::Container(container), None);

        if record.newline_before {
            debug_assert!(before.is_some(), "expected a newline before the container");
            if let Some(nl) = before {
                self.free_newline(nl);
            }
        }
        if record.newline_after {
            debug_assert!(after.is_some(), "expected a newline after the container");
            if let Some(nl) = after {
                self.free_newline(nl);
            }
        }

        self.notify_change(container);
        self.notify_opt(former_parent);
    }

    /// Insert `container` directly after `anchor`, restoring exactly the
    /// newlines `record` names; inverts a previous [`Tree::splice_out`]
    pub fn splice_in_exact(&mut self, container: ContainerId, anchor: TokenId, record: SpliceRecord) {
        assert!(
            !self.is_attached(container),
            "splice_in_exact requires a detached container"
        );

        let mut at = anchor;
        if record.newline_before {
            let nl = self.new_newline();
            at = self.insert(at, nl);
        }
        let start = self.start(container);
        let last = self.insert_run(at, start);
        if record.newline_after {
            let nl = self.new_newline();
            self.insert(last, nl);
        }
        self.notify_change(container);
    }

    /// Splice out (when attached), then splice in at `at` (when given)
    pub fn move_to(&mut self, container: ContainerId, at: Option<TokenId>) {
        if self.is_attached(container) {
            self.splice_out(container);
        }
        if let Some(at) = at {
            self.splice_in(container, at);
        }
    }

    /// Enclose the inclusive range `first..=last` in the empty, detached
    /// `container`. The range must start and end at the same nesting level.
    pub fn wrap(&mut self, container: ContainerId, first: TokenId, last: TokenId) {
        assert!(
            self.is_empty_container(container) && !self.is_attached(container),
            "wrap requires an empty detached container"
        );
        let (start, end) = (self.start(container), self.end(container));
        let parent = self.token(first).parent();
        let (before, after) = (self.prev(first), self.next(last));

        self.link(before, Some(start));
        self.link(Some(start), Some(first));
        self.link(Some(last), Some(end));
        self.link(Some(end), after);

        self.set_parent(NodeRef::Container(container), parent);
        self.reparent_run(first, last, Some(container));
        self.notify_change(container);
    }

    /// Remove `container`'s own boundaries, leaving its contents in place
    /// under its former parent. The container ends up empty and detached.
    pub fn unwrap(&mut self, container: ContainerId) {
        let (start, end) = (self.start(container), self.end(container));
        let parent = self.container(container).parent();
        let (before, after) = (self.prev(start), self.next(end));

        if self.next(start) == Some(end) {
            self.detach_run(start, end);
        } else {
            let first = self.next(start).unwrap_or_else(|| unreachable!("unterminated container"));
            let last = self.prev(end).unwrap_or_else(|| unreachable!("unterminated container"));
            self.link(before, Some(first));
            self.link(Some(last), after);
            self.tokens[start].prev = None;
            self.tokens[end].next = None;
            self.link(Some(start), Some(end));
            self.reparent_run(first, last, parent);
        }

        self.set_parent(NodeRef::Container(container), None);
        self.notify_change(container);
        self.notify_opt(parent);
    }

    /// Deep copy with fresh ids for every token and container; cursors are
    /// dropped. The copy is detached.
    pub fn clone_container(&mut self, container: ContainerId) -> ContainerId {
        let data = self.container(container).data().clone();
        let copy = self.create_container(data);

        let children: Vec<NodeRef> = self.traverse_one_level(container).collect();
        for child in children {
            match child {
                NodeRef::Container(inner) => {
                    let inner_copy = self.clone_container(inner);
                    self.push_container(copy, inner_copy);
                }
                NodeRef::Token(t) => {
                    let kind = match self.kind(t) {
                        TokenKind::Cursor => continue,
                        other => other.clone(),
                    };
                    let token = self.tokens.insert(Token::new(kind));
                    self.push(copy, token);
                }
            }
        }
        copy
    }

    /// Deep copy of `container` out of another tree, typically a scratch
    /// tree a fragment was parsed into. The copy is detached.
    pub fn import_container(&mut self, source: &Tree, container: ContainerId) -> ContainerId {
        let data = source.container(container).data().clone();
        let copy = self.create_container(data);

        for child in source.traverse_one_level(container) {
            match child {
                NodeRef::Container(inner) => {
                    let inner_copy = self.import_container(source, inner);
                    self.push_container(copy, inner_copy);
                }
                NodeRef::Token(t) => {
                    let kind = match source.kind(t) {
                        TokenKind::Cursor => continue,
                        other => other.clone(),
                    };
                    let token = self.tokens.insert(Token::new(kind));
                    self.push(copy, token);
                }
            }
        }
        copy
    }

    /// Drop a detached `container` and everything inside it from the arena.
    /// Every handle into the run dangles afterwards.
    pub fn free_container(&mut self, container: ContainerId) {
        assert!(
            !self.is_attached(container),
            "free_container requires a detached container"
        );
        let (start, end) = (self.start(container), self.end(container));

        let mut freed = 0;
        let mut head = Some(start);
        while let Some(t) = head {
            head = if t == end { None } else { self.next(t) };
            if let Some(token) = self.tokens.remove(t) {
                if let TokenKind::Start(inner) = token.kind {
                    self.containers.remove(inner);
                }
                freed += 1;
            }
        }
        trace!(?container, freed, "freed container");
    }

    /// Unlinked newline tokens are never referenced again
    fn free_newline(&mut self, nl: TokenId) {
        let parent = self.token(nl).parent();
        self.unlink(nl);
        self.tokens.remove(nl);
        self.notify_opt(parent);
    }

    /// An indent whose whole body was the removed container keeps the
    /// newline that opens its (now empty) body
    fn keeps_empty_indent(&self, nl: TokenId, last: Option<TokenId>) -> bool {
        let indent = match last.map(|t| self.kind(t)) {
            Some(TokenKind::End(c)) if self.container_kind(*c) == ContainerKind::Indent => *c,
            _ => return false,
        };
        self.prev_non_cursor(nl) == Some(self.start(indent))
    }

    pub(crate) fn non_cursor_at_or_before(&self, token: TokenId) -> Option<TokenId> {
        let mut head = Some(token);
        while let Some(t) = head {
            if !self.token(t).is_cursor() {
                return Some(t);
            }
            head = self.prev(t);
        }
        None
    }

    pub(crate) fn non_cursor_at_or_after(&self, token: TokenId) -> Option<TokenId> {
        let mut head = Some(token);
        while let Some(t) = head {
            if !self.token(t).is_cursor() {
                return Some(t);
            }
            head = self.next(t);
        }
        None
    }

    pub fn prev_non_cursor(&self, token: TokenId) -> Option<TokenId> {
        self.prev(token).and_then(|t| self.non_cursor_at_or_before(t))
    }

    pub fn next_non_cursor(&self, token: TokenId) -> Option<TokenId> {
        self.next(token).and_then(|t| self.non_cursor_at_or_after(t))
    }
}
