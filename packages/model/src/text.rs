//! # Text Rendering
//!
//! `stringify` produces source text (the inverse of parsing); `serialize`
//! produces a bracketed dump with every container boundary visible.

use crate::token::*;
use crate::tree::Tree;

/// Placeholder written for a socket with nothing in it
pub const EMPTY_SOCKET: &str = "``";

impl Tree {
    /// Source text of everything inside `container`.
    ///
    /// Indent prefixes accumulate and are written lazily at the first
    /// content on each line, so blank lines stay empty.
    pub fn stringify(&self, container: ContainerId) -> String {
        let mut out = String::new();
        let mut prefixes: Vec<String> = vec![String::new()];
        let mut at_line_start = true;

        let end = self.end(container);
        let mut head = self.next(self.start(container));
        while let Some(t) = head.filter(|t| *t != end) {
            let mut content: Option<&str> = None;
            match self.kind(t) {
                TokenKind::Start(c) => match self.container(*c).data() {
                    ContainerData::Indent(indent) => {
                        let outer = prefixes.last().cloned().unwrap_or_default();
                        prefixes.push(outer + &indent.prefix);
                    }
                    ContainerData::Socket(_) if self.is_empty_container(*c) => {
                        content = Some(EMPTY_SOCKET);
                    }
                    _ => {}
                },
                TokenKind::End(c) => {
                    if self.container_kind(*c) == ContainerKind::Indent {
                        prefixes.pop();
                    }
                }
                TokenKind::Text(value) => content = Some(value.as_str()),
                TokenKind::Newline => {
                    out.push('\n');
                    at_line_start = true;
                }
                TokenKind::Cursor => {}
            }

            if let Some(text) = content.filter(|s| !s.is_empty()) {
                if at_line_start {
                    out.push_str(prefixes.last().map(String::as_str).unwrap_or(""));
                    at_line_start = false;
                }
                out.push_str(text);
            }
            head = self.next(t);
        }
        out
    }

    /// Bracketed dump of `container`, including its own boundaries
    pub fn serialize(&self, container: ContainerId) -> String {
        let mut out = String::new();
        for t in self.tokens_of(container) {
            match self.kind(t) {
                TokenKind::Start(c) => out.push_str(&self.open_tag(*c)),
                TokenKind::End(c) => {
                    out.push_str("</");
                    out.push_str(&self.container_kind(*c).to_string());
                    out.push('>');
                }
                TokenKind::Text(value) => out.push_str(&escape(value)),
                TokenKind::Newline => out.push('\n'),
                TokenKind::Cursor => out.push_str("<cursor/>"),
            }
        }
        out
    }

    fn open_tag(&self, c: ContainerId) -> String {
        match self.container(c).data() {
            ContainerData::Block(block) => format!(
                r#"<block precedence="{}" color="{}" socketLevel="{}" classes="{}">"#,
                block.precedence,
                escape(&block.color),
                block.socket_level,
                escape(&block.classes.join(" ")),
            ),
            ContainerData::Socket(socket) => format!(
                r#"<socket precedence="{}" handwritten="{}" accepts="{}">"#,
                socket.precedence, socket.handwritten, socket.accepts,
            ),
            ContainerData::Indent(indent) => {
                format!(r#"<indent prefix="{}">"#, escape(&indent.prefix))
            }
            ContainerData::Segment(segment) => format!(
                r#"<segment isLassoSegment="{}" isRoot="{}">"#,
                segment.is_lasso_segment, segment.is_root,
            ),
        }
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
