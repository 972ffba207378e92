//! # Droplet Model
//!
//! The token tree behind the blocks editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → Tree                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: linked tokens + containers           │
//! │  - splice in/out, wrap/unwrap, clone        │
//! │  - versions bumped up the ancestor chain    │
//! │  - stringify / serialize / addressing       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ view: incremental layout keyed on versions  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! A document is one doubly-linked token list. A container is a matched
//! Start/End token pair; its children are whatever lies between. Tokens
//! and containers live in a [`Tree`] arena and refer to each other through
//! [`TokenId`] and [`ContainerId`] handles.
//!
//! ## Usage
//!
//! ```rust
//! use droplet_model::{BlockData, SocketLevel, Tree};
//!
//! let mut tree = Tree::new();
//! let root = tree.new_root();
//! let block = tree.new_block(BlockData::new("command", SocketLevel::MostlyBlock));
//! let text = tree.new_text("print 1");
//! tree.push(block, text);
//! tree.push_container(root, block);
//!
//! assert_eq!(tree.stringify(root), "print 1");
//! ```

mod accept;
mod splice;
mod text;
mod token;
mod traverse;
mod tree;

pub use accept::AcceptLevel;
pub use splice::SpliceRecord;
pub use text::EMPTY_SOCKET;
pub use token::{
    AcceptPolicy, BlockData, Container, ContainerData, ContainerId, ContainerKind, IndentData,
    NodeRef, SegmentData, SocketData, SocketLevel, Token, TokenId, TokenKind, TokenType,
};
pub use traverse::{OneLevel, Tokens};
pub use tree::Tree;
