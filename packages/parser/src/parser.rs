use crate::error::{ParseError, ParseResult};
use crate::lexer::{lex_line, Token};
use droplet_model::{
    AcceptPolicy, BlockData, ContainerId, IndentData, SocketData, SocketLevel, Tree,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Wrap each line in a block. When false, a single line's pieces are
    /// placed directly into the root (socket reparse).
    pub wrap_at_root: bool,
    /// Fail on the first error instead of wrapping the bad line
    pub throw_error: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            wrap_at_root: true,
            throw_error: false,
        }
    }
}

/// Parse `source` into a fresh tree
pub fn parse(source: &str, options: ParseOptions) -> ParseResult<(Tree, ContainerId)> {
    let mut tree = Tree::new();
    let root = parse_into(&mut tree, source, options)?;
    Ok((tree, root))
}

/// Parse `source` into `tree`, returning a new detached root segment
pub fn parse_into(tree: &mut Tree, source: &str, options: ParseOptions) -> ParseResult<ContainerId> {
    let root = tree.new_root();
    let mut parser = Parser::new(tree, source, options);

    if options.wrap_at_root {
        parser.parse_lines(root, "", false)?;
    } else {
        parser.parse_inline(root)?;
    }
    Ok(root)
}

#[derive(Debug)]
struct Line<'src> {
    /// 1-based
    number: usize,
    indent: &'src str,
    content: &'src str,
}

impl Line<'_> {
    fn is_blank(&self) -> bool {
        self.content.is_empty()
    }

    fn opens_body(&self) -> bool {
        !self.content.starts_with('#') && self.content.ends_with(':')
    }
}

/// Structural pieces of one line, before they become tokens
#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Socket(String),
    EmptySocket,
    /// Parenthesized group, parentheses included as text
    Group(Vec<Piece>),
}

/// Shape of a statement derived from its leading token and content
struct Statement {
    pieces: Vec<Piece>,
    color: &'static str,
    level: SocketLevel,
    /// Sockets before this index are assignment targets
    forbid_before: usize,
}

struct Parser<'t, 'src> {
    tree: &'t mut Tree,
    lines: Vec<Line<'src>>,
    pos: usize,
    options: ParseOptions,
}

impl<'t, 'src> Parser<'t, 'src> {
    fn new(tree: &'t mut Tree, source: &'src str, options: ParseOptions) -> Self {
        let lines = source
            .split('\n')
            .enumerate()
            .map(|(i, raw)| {
                let raw = raw.trim_end();
                let content = raw.trim_start_matches([' ', '\t']);
                Line {
                    number: i + 1,
                    indent: &raw[..raw.len() - content.len()],
                    content,
                }
            })
            .collect();

        Self {
            tree,
            lines,
            pos: 0,
            options,
        }
    }

    /// Consume every line belonging at `level`, appending statements to
    /// `container`. Lines inside an indent each start with a newline.
    fn parse_lines(&mut self, container: ContainerId, level: &str, leading_newline: bool) -> ParseResult<()> {
        let mut first = true;

        while let Some(line) = self.lines.get(self.pos) {
            if line.is_blank() {
                // Blank lines trailing an indented run belong to the parent
                if !level.is_empty() && !self.next_content_within(level) {
                    break;
                }
            } else if !line.indent.starts_with(level) {
                break;
            }

            if leading_newline || !first {
                let nl = self.tree.new_newline();
                self.tree.push(container, nl);
            }
            first = false;

            let line = &self.lines[self.pos];
            self.pos += 1;
            if line.is_blank() {
                continue;
            }

            let (number, indent, content) = (line.number, line.indent, line.content);
            if indent.len() > level.len() {
                // Deeper than the current level without a header line
                if self.options.throw_error {
                    return Err(ParseError::inconsistent_indent(number));
                }
                let text = format!("{}{}", &indent[level.len()..], content);
                let block = self.error_block(&text);
                self.tree.push_container(container, block);
                continue;
            }

            let block = self.statement_block(number, indent.chars().count(), content)?;
            self.tree.push_container(container, block);

            if self.lines[self.pos - 1].opens_body() {
                if let Some(body_indent) = self.body_indent(indent) {
                    let prefix = &body_indent[indent.len()..];
                    let body = self.tree.new_indent(IndentData::new(prefix));
                    self.parse_lines(body, body_indent, true)?;
                    self.tree.push_container(block, body);
                }
            }
        }
        Ok(())
    }

    /// Pieces of a single line placed straight into `root`
    fn parse_inline(&mut self, root: ContainerId) -> ParseResult<()> {
        let source: Vec<&str> = self.lines.iter().map(|l| l.content).collect();
        if self.lines.len() > 1 {
            if self.options.throw_error {
                return Err(ParseError::syntax(2, 1, "expected a single line"));
            }
            let block = self.error_block(&source.join(" "));
            self.tree.push_container(root, block);
            return Ok(());
        }

        let line = &self.lines[0];
        let (number, indent, content) = (line.number, line.indent, line.content);
        match self.pieces(number, indent.chars().count(), content) {
            Ok((pieces, _)) => {
                self.emit(root, &pieces, 0);
                Ok(())
            }
            Err(err) if !self.options.throw_error => {
                debug!(%err, "wrapping unparseable inline text");
                let socket = self.handwritten_socket(content);
                self.tree.push_container(root, socket);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Whether the next non-blank line sits at `level` or deeper
    fn next_content_within(&self, level: &str) -> bool {
        self.lines[self.pos..]
            .iter()
            .find(|l| !l.is_blank())
            .is_some_and(|l| l.indent.starts_with(level))
    }

    /// Indentation of the body following a header at `header_indent`
    fn body_indent(&self, header_indent: &str) -> Option<&'src str> {
        self.lines[self.pos..]
            .iter()
            .find(|l| !l.is_blank())
            .map(|l| l.indent)
            .filter(|indent| indent.len() > header_indent.len() && indent.starts_with(header_indent))
    }

    fn statement_block(&mut self, line: usize, column_offset: usize, content: &str) -> ParseResult<ContainerId> {
        if content.starts_with('#') {
            let block = self.tree.new_block(BlockData::new("comment", SocketLevel::AnyDrop));
            let socket = self.handwritten_socket(content);
            self.tree.push_container(block, socket);
            return Ok(block);
        }

        match self.classify(line, column_offset, content) {
            Ok(statement) => {
                let block = self
                    .tree
                    .new_block(BlockData::new(statement.color, statement.level));
                self.emit(block, &statement.pieces, statement.forbid_before);
                Ok(block)
            }
            Err(err) if !self.options.throw_error => {
                debug!(%err, line, "wrapping unparseable line");
                Ok(self.error_block(content))
            }
            Err(err) => Err(err),
        }
    }

    fn classify(&self, line: usize, column_offset: usize, content: &str) -> ParseResult<Statement> {
        let (pieces, assign_at) = self.pieces(line, column_offset, content)?;
        let leading = lex_line(content)
            .ok()
            .and_then(|tokens| tokens.into_iter().find(|t| t.token != Token::Whitespace))
            .map(|t| t.token);

        let (color, level, forbid_before) = match (leading, assign_at) {
            (Some(Token::Control), _) => ("control", SocketLevel::BlockOnly, 0),
            (Some(Token::Return), _) => ("return", SocketLevel::BlockOnly, 0),
            (_, Some(at)) => ("command", SocketLevel::BlockOnly, at),
            _ if matches!(pieces.as_slice(), [Piece::Socket(_)]) => ("value", SocketLevel::MostlyValue, 0),
            _ => ("command", SocketLevel::MostlyBlock, 0),
        };

        Ok(Statement {
            pieces,
            color,
            level,
            forbid_before,
        })
    }

    /// Split a line into pieces. Also returns the number of top-level
    /// pieces preceding a bare `=`, if there is one.
    fn pieces(&self, line: usize, column_offset: usize, content: &str) -> ParseResult<(Vec<Piece>, Option<usize>)> {
        let column = |start: usize| column_offset + content[..start].chars().count() + 1;
        let tokens = lex_line(content).map_err(|err| ParseError::lex(line, column(err.start), err.text))?;

        let mut stack: Vec<(Vec<Piece>, usize)> = vec![(Vec::new(), 0)];
        let mut assign_at = None;

        for spanned in tokens {
            let depth = stack.len();
            let (pieces, _) = stack
                .last_mut()
                .unwrap_or_else(|| unreachable!("piece stack is never empty"));
            match spanned.token {
                Token::LParen => stack.push((vec![Piece::Text("(".to_string())], spanned.start)),
                Token::RParen => {
                    if depth == 1 {
                        return Err(ParseError::unbalanced_paren(line, column(spanned.start)));
                    }
                    let (mut group, _) = stack.pop().unwrap_or_default();
                    push_text(&mut group, ")");
                    if let Some((parent, _)) = stack.last_mut() {
                        parent.push(Piece::Group(group));
                    }
                }
                Token::EmptySocket => pieces.push(Piece::EmptySocket),
                token if token.is_literal() => pieces.push(Piece::Socket(spanned.text.to_string())),
                Token::Assign if depth == 1 && assign_at.is_none() => {
                    assign_at = Some(pieces.len());
                    push_text(pieces, spanned.text);
                }
                _ => push_text(pieces, spanned.text),
            }
        }

        if stack.len() > 1 {
            let (_, open) = stack[stack.len() - 1];
            return Err(ParseError::unbalanced_paren(line, column(open)));
        }
        let (pieces, _) = stack.pop().unwrap_or_default();
        Ok((pieces, assign_at))
    }

    fn emit(&mut self, container: ContainerId, pieces: &[Piece], forbid_before: usize) {
        for (i, piece) in pieces.iter().enumerate() {
            match piece {
                Piece::Text(text) => {
                    let token = self.tree.new_text(text.as_str());
                    self.tree.push(container, token);
                }
                Piece::Socket(text) => {
                    let accepts = if i < forbid_before {
                        AcceptPolicy::Forbid
                    } else {
                        AcceptPolicy::Normal
                    };
                    let socket = self.tree.new_socket(SocketData {
                        accepts,
                        ..SocketData::default()
                    });
                    let token = self.tree.new_text(text.as_str());
                    self.tree.push(socket, token);
                    self.tree.push_container(container, socket);
                }
                Piece::EmptySocket => {
                    let socket = self.tree.new_socket(SocketData::default());
                    self.tree.push_container(container, socket);
                }
                Piece::Group(inner) => {
                    let socket = self.tree.new_socket(SocketData::default());
                    let block = self.tree.new_block(BlockData::new("value", SocketLevel::ValueOnly));
                    self.emit(block, inner, 0);
                    self.tree.push_container(socket, block);
                    self.tree.push_container(container, socket);
                }
            }
        }
    }

    fn handwritten_socket(&mut self, text: &str) -> ContainerId {
        let socket = self.tree.new_socket(SocketData {
            handwritten: true,
            ..SocketData::default()
        });
        let token = self.tree.new_text(text);
        self.tree.push(socket, token);
        socket
    }

    /// Blank block holding raw text the parser could not structure
    fn error_block(&mut self, text: &str) -> ContainerId {
        let block = self.tree.new_block(BlockData::new("error", SocketLevel::AnyDrop));
        let socket = self.handwritten_socket(text);
        self.tree.push_container(block, socket);
        block
    }
}

fn push_text(pieces: &mut Vec<Piece>, text: &str) {
    match pieces.last_mut() {
        Some(Piece::Text(existing)) => existing.push_str(text),
        _ => pieces.push(Piece::Text(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droplet_model::{ContainerKind, NodeRef};

    fn parse_ok(source: &str) -> (Tree, ContainerId) {
        parse(source, ParseOptions::default()).unwrap()
    }

    fn strict() -> ParseOptions {
        ParseOptions {
            throw_error: true,
            ..ParseOptions::default()
        }
    }

    fn top_level_blocks(tree: &Tree, root: ContainerId) -> Vec<ContainerId> {
        tree.traverse_one_level(root)
            .filter_map(|node| match node {
                NodeRef::Container(c) => Some(c),
                NodeRef::Token(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_program() {
        let (tree, root) = parse_ok("");
        assert!(tree.is_empty_container(root));
        assert_eq!(tree.stringify(root), "");
    }

    #[test]
    fn test_assignment_statement() {
        let (tree, root) = parse_ok("x = 1");
        let blocks = top_level_blocks(&tree, root);
        assert_eq!(blocks.len(), 1);

        let block = tree.container(blocks[0]).as_block().unwrap();
        assert_eq!(block.color, "command");
        assert_eq!(block.socket_level, SocketLevel::BlockOnly);

        let sockets: Vec<_> = tree
            .traverse_one_level(blocks[0])
            .filter_map(|n| match n {
                NodeRef::Container(c) => tree.container(c).as_socket().cloned(),
                _ => None,
            })
            .collect();
        assert_eq!(sockets.len(), 2);
        assert_eq!(sockets[0].accepts, AcceptPolicy::Forbid);
        assert_eq!(sockets[1].accepts, AcceptPolicy::Normal);
        assert_eq!(tree.stringify(root), "x = 1");
    }

    #[test]
    fn test_indented_body() {
        let source = "if x:\n  a\n  b\nc";
        let (tree, root) = parse_ok(source);
        assert_eq!(tree.stringify(root), source);

        let blocks = top_level_blocks(&tree, root);
        assert_eq!(blocks.len(), 2);
        let header = tree.container(blocks[0]).as_block().unwrap();
        assert_eq!(header.color, "control");

        let indent = tree
            .descendants(blocks[0])
            .into_iter()
            .find(|c| tree.container_kind(*c) == ContainerKind::Indent)
            .unwrap();
        assert_eq!(tree.container(indent).as_indent().unwrap().prefix, "  ");
    }

    #[test]
    fn test_trailing_blank_lines_belong_to_parent() {
        let source = "while y:\n    a\n\n\nb";
        let (tree, root) = parse_ok(source);
        assert_eq!(tree.stringify(root), source);

        let indent = tree
            .descendants(root)
            .into_iter()
            .find(|c| tree.container_kind(*c) == ContainerKind::Indent)
            .unwrap();
        assert_eq!(tree.line_count(indent), 2);
    }

    #[test]
    fn test_paren_group_becomes_value_block() {
        let (tree, root) = parse_ok("print (a + b)");
        let value = tree
            .descendants(root)
            .into_iter()
            .find(|c| {
                tree.container(*c)
                    .as_block()
                    .is_some_and(|b| b.socket_level == SocketLevel::ValueOnly)
            })
            .unwrap();
        assert_eq!(tree.stringify(value), "(a + b)");
        assert_eq!(tree.stringify(root), "print (a + b)");
    }

    #[test]
    fn test_empty_socket_round_trips() {
        let (tree, root) = parse_ok("print ``");
        assert_eq!(tree.stringify(root), "print ``");
    }

    #[test]
    fn test_comment_line() {
        let (tree, root) = parse_ok("# note");
        let blocks = top_level_blocks(&tree, root);
        let block = tree.container(blocks[0]).as_block().unwrap();
        assert_eq!(block.color, "comment");
        assert_eq!(block.socket_level, SocketLevel::AnyDrop);
    }

    #[test]
    fn test_single_literal_is_value() {
        let (tree, root) = parse_ok("42");
        let blocks = top_level_blocks(&tree, root);
        let block = tree.container(blocks[0]).as_block().unwrap();
        assert_eq!(block.color, "value");
        assert_eq!(block.socket_level, SocketLevel::MostlyValue);
    }

    #[test]
    fn test_strict_errors_carry_location() {
        let err = parse("x = (1", strict()).unwrap_err();
        assert_eq!(err, ParseError::unbalanced_paren(1, 5));

        let err = parse("a\n  b", strict()).unwrap_err();
        assert_eq!(err, ParseError::inconsistent_indent(2));

        let err = parse("ok\nx = $", strict()).unwrap_err();
        assert_eq!(err.line(), 2);
        assert_eq!(err.column(), Some(5));
    }

    #[test]
    fn test_lenient_errors_become_error_blocks() {
        let source = "x = (1\n  y";
        let (tree, root) = parse_ok(source);
        assert_eq!(tree.stringify(root), source);

        let blocks = top_level_blocks(&tree, root);
        assert_eq!(blocks.len(), 2);
        for block in blocks {
            let data = tree.container(block).as_block().unwrap();
            assert_eq!(data.color, "error");
            assert_eq!(data.socket_level, SocketLevel::AnyDrop);
        }
    }

    #[test]
    fn test_inline_parse_skips_block_wrapper() {
        let options = ParseOptions {
            wrap_at_root: false,
            throw_error: true,
        };
        let (tree, root) = parse("a + b", options).unwrap();
        let kinds: Vec<_> = tree
            .traverse_one_level(root)
            .map(|n| match n {
                NodeRef::Container(c) => Some(tree.container_kind(c)),
                NodeRef::Token(_) => None,
            })
            .collect();
        assert_eq!(kinds, vec![Some(ContainerKind::Socket), None, Some(ContainerKind::Socket)]);

        assert!(parse("a\nb", options).is_err());
    }
}
