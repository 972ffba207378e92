//! Token and container records stored in the tree arena.

use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Handle of a token in a [`Tree`](crate::Tree)
    pub struct TokenId;
    /// Handle of a container in a [`Tree`](crate::Tree)
    pub struct ContainerId;
}

/// Any node that gets its own view: a container or a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Container(ContainerId),
    Token(TokenId),
}

impl From<ContainerId> for NodeRef {
    fn from(id: ContainerId) -> Self {
        NodeRef::Container(id)
    }
}

impl From<TokenId> for NodeRef {
    fn from(id: TokenId) -> Self {
        NodeRef::Token(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Start(ContainerId),
    End(ContainerId),
    Text(String),
    Newline,
    Cursor,
}

/// Token kind with the owning container's kind folded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    BlockStart,
    BlockEnd,
    SocketStart,
    SocketEnd,
    IndentStart,
    IndentEnd,
    SegmentStart,
    SegmentEnd,
    Text,
    Newline,
    Cursor,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) prev: Option<TokenId>,
    pub(crate) next: Option<TokenId>,
    /// Enclosing container; for boundary tokens, the parent of their container
    pub(crate) parent: Option<ContainerId>,
    pub(crate) version: u64,
}

impl Token {
    pub(crate) fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            prev: None,
            next: None,
            parent: None,
            version: 0,
        }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn prev(&self) -> Option<TokenId> {
        self.prev
    }

    pub fn next(&self) -> Option<TokenId> {
        self.next
    }

    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_cursor(&self) -> bool {
        matches!(self.kind, TokenKind::Cursor)
    }

    pub fn is_newline(&self) -> bool {
        matches!(self.kind, TokenKind::Newline)
    }
}

/// Which kinds of sockets should welcome a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SocketLevel {
    #[default]
    AnyDrop,
    BlockOnly,
    MostlyBlock,
    MostlyValue,
    ValueOnly,
}

impl fmt::Display for SocketLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SocketLevel::AnyDrop => "ANY_DROP",
            SocketLevel::BlockOnly => "BLOCK_ONLY",
            SocketLevel::MostlyBlock => "MOSTLY_BLOCK",
            SocketLevel::MostlyValue => "MOSTLY_VALUE",
            SocketLevel::ValueOnly => "VALUE_ONLY",
        })
    }
}

/// A socket's declared stance towards anything dropped into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AcceptPolicy {
    EncourageAll,
    #[default]
    Normal,
    DiscourageAll,
    Forbid,
}

impl fmt::Display for AcceptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AcceptPolicy::EncourageAll => "ENCOURAGE_ALL",
            AcceptPolicy::Normal => "NORMAL",
            AcceptPolicy::DiscourageAll => "DISCOURAGE_ALL",
            AcceptPolicy::Forbid => "FORBID",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockData {
    pub precedence: i32,
    /// Color tag, resolved to RGB by the view
    pub color: String,
    pub socket_level: SocketLevel,
    pub classes: Vec<String>,
}

impl BlockData {
    pub fn new(color: impl Into<String>, socket_level: SocketLevel) -> Self {
        Self {
            precedence: 0,
            color: color.into(),
            socket_level,
            classes: Vec::new(),
        }
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SocketData {
    pub precedence: i32,
    /// Holds raw text the parser could not structure
    pub handwritten: bool,
    pub accepts: AcceptPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndentData {
    /// Whitespace added to every line inside the indent
    pub prefix: String,
    pub depth: usize,
}

impl IndentData {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let depth = prefix.chars().count();
        Self { prefix, depth }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentData {
    pub is_lasso_segment: bool,
    pub is_root: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Block,
    Socket,
    Indent,
    Segment,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainerKind::Block => "block",
            ContainerKind::Socket => "socket",
            ContainerKind::Indent => "indent",
            ContainerKind::Segment => "segment",
        })
    }
}

/// Kind-specific container payload
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerData {
    Block(BlockData),
    Socket(SocketData),
    Indent(IndentData),
    Segment(SegmentData),
}

impl ContainerData {
    pub fn kind(&self) -> ContainerKind {
        match self {
            ContainerData::Block(_) => ContainerKind::Block,
            ContainerData::Socket(_) => ContainerKind::Socket,
            ContainerData::Indent(_) => ContainerKind::Indent,
            ContainerData::Segment(_) => ContainerKind::Segment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    pub(crate) start: TokenId,
    pub(crate) end: TokenId,
    pub(crate) parent: Option<ContainerId>,
    pub(crate) version: u64,
    pub(crate) data: ContainerData,
}

impl Container {
    pub fn start(&self) -> TokenId {
        self.start
    }

    pub fn end(&self) -> TokenId {
        self.end
    }

    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn data(&self) -> &ContainerData {
        &self.data
    }

    pub fn kind(&self) -> ContainerKind {
        self.data.kind()
    }

    pub fn as_block(&self) -> Option<&BlockData> {
        match &self.data {
            ContainerData::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_socket(&self) -> Option<&SocketData> {
        match &self.data {
            ContainerData::Socket(socket) => Some(socket),
            _ => None,
        }
    }

    pub fn as_indent(&self) -> Option<&IndentData> {
        match &self.data {
            ContainerData::Indent(indent) => Some(indent),
            _ => None,
        }
    }

    pub fn as_segment(&self) -> Option<&SegmentData> {
        match &self.data {
            ContainerData::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.as_segment().is_some_and(|s| s.is_root)
    }
}
