//! # Droplet Editor
//!
//! Undoable editing on top of the droplet token tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → Tree                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + operations               │
//! │  - pick up / drop / set text / reparse      │
//! │  - every operation returns its inverse      │
//! │  - batched undo and redo                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ view: incremental layout keyed on versions  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use droplet_editor::{Document, Operation, UndoStack};
//! use droplet_parser::ParseOptions;
//!
//! let mut doc = Document::from_source("a = 1\nb = 2", ParseOptions::default()).unwrap();
//! let mut stack = UndoStack::new();
//!
//! let first = doc.tree.descendants(doc.root)[0];
//! let location = doc.location_of(first);
//! stack.apply(&Operation::pick_up(location), &mut doc).unwrap();
//! assert_eq!(doc.stringify(), "b = 2");
//!
//! stack.undo(&mut doc).unwrap();
//! assert_eq!(doc.stringify(), "a = 1\nb = 2");
//! ```

mod document;
mod errors;
mod operations;
mod undo_stack;

pub use document::Document;
pub use errors::EditorError;
pub use operations::Operation;
pub use undo_stack::{OperationBatch, UndoStack};
