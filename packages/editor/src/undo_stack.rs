//! # Undo/Redo Stack
//!
//! Tracks operation history and enables undo/redo.
//!
//! ## Design
//!
//! - Applying an operation yields its inverse, which is recorded with it
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original operations
//! - New operations clear the redo stack
//! - A drag (pick up, then drop) is usually recorded as one batch
//!
//! Operations address the tree by location, so replaying them after an
//! undo finds the clones that now stand where the originals were.

use crate::{Document, EditorError, Operation};
use droplet_model::ContainerId;
use std::collections::HashSet;
use tracing::{debug, warn};

/// A group of operations undone and redone together
#[derive(Debug, Clone)]
pub struct OperationBatch {
    /// In application order
    pub operations: Vec<Operation>,

    /// In undo order (reverse of application)
    pub inverses: Vec<Operation>,

    pub description: Option<String>,
}

impl OperationBatch {
    pub fn single(operation: Operation, inverse: Operation) -> Self {
        Self {
            operations: vec![operation],
            inverses: vec![inverse],
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn held_containers(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.operations
            .iter()
            .chain(&self.inverses)
            .filter_map(Operation::held_container)
    }

    fn empty() -> Self {
        Self {
            operations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        }
    }
}

#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<OperationBatch>,

    /// Most recent last
    redo_stack: Vec<OperationBatch>,

    /// 0 = unlimited
    max_levels: usize,

    current_batch: Option<OperationBatch>,
}

impl UndoStack {
    /// Undo stack keeping the last 100 batches
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply `operation` to `doc` and record it. Returns the inverse, which
    /// after a pick-up carries the lifted block.
    pub fn apply(&mut self, operation: &Operation, doc: &mut Document) -> Result<Operation, EditorError> {
        let inverse = doc.apply(operation)?;

        if let Some(batch) = &mut self.current_batch {
            batch.operations.push(operation.clone());
            batch.inverses.insert(0, inverse.clone());
        } else {
            self.push_batch(OperationBatch::single(operation.clone(), inverse.clone()), doc);
        }

        Ok(inverse)
    }

    /// Start a batch; everything applied until [`UndoStack::end_batch`]
    /// is undone as one step
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(OperationBatch::empty());
    }

    pub fn end_batch(&mut self, doc: &mut Document) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.operations.is_empty() {
                self.push_batch(batch, doc);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: OperationBatch, doc: &mut Document) {
        self.undo_stack.push(batch);

        let mut dropped = Vec::new();
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            dropped.push(self.undo_stack.remove(0));
        }

        // A new action invalidates the redo history
        dropped.append(&mut self.redo_stack);
        self.release(dropped, doc);
    }

    /// Free the containers held by `batches` that no recorded batch still
    /// refers to
    fn release(&self, batches: Vec<OperationBatch>, doc: &mut Document) {
        let held: HashSet<ContainerId> = self
            .undo_stack
            .iter()
            .chain(&self.redo_stack)
            .chain(&self.current_batch)
            .flat_map(OperationBatch::held_containers)
            .collect();

        for batch in &batches {
            for operation in batch.operations.iter().chain(&batch.inverses) {
                if operation.held_container().is_some_and(|c| !held.contains(&c)) {
                    doc.discard(operation);
                }
            }
        }
    }

    /// Undo the most recent batch. Returns false when there is none.
    ///
    /// When an inverse fails, the ones already applied are rolled back and
    /// the batch stays on the undo stack.
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool, EditorError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        if let Err(err) = apply_all(doc, &batch.inverses) {
            self.undo_stack.push(batch);
            return Err(err);
        }
        debug!(
            operations = batch.inverses.len(),
            description = batch.description.as_deref(),
            "undo"
        );

        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Redo the most recently undone batch. Returns false when there is none.
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool, EditorError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err(err) = apply_all(doc, &batch.operations) {
            self.redo_stack.push(batch);
            return Err(err);
        }
        debug!(
            operations = batch.operations.len(),
            description = batch.description.as_deref(),
            "redo"
        );

        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget all history, freeing every container it held
    pub fn clear(&mut self, doc: &mut Document) {
        let mut dropped: Vec<OperationBatch> = self.undo_stack.drain(..).collect();
        dropped.append(&mut self.redo_stack);
        dropped.extend(self.current_batch.take());
        self.release(dropped, doc);
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `operations` in order, or none of them. The inverses produced
/// along the way are never recorded, so whatever they hold is freed.
fn apply_all(doc: &mut Document, operations: &[Operation]) -> Result<(), EditorError> {
    let mut applied = Vec::with_capacity(operations.len());
    let mut failure = None;

    for operation in operations {
        match doc.apply(operation) {
            Ok(inverse) => applied.push(inverse),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    if let Some(err) = &failure {
        warn!(%err, rolled_back = applied.len(), "batch failed part way");
        for inverse in applied.iter().rev() {
            match doc.apply(inverse) {
                Ok(restored) => doc.discard(&restored),
                Err(err) => warn!(%err, "rollback failed"),
            }
        }
    }
    for inverse in &applied {
        doc.discard(inverse);
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droplet_model::TokenId;
    use droplet_parser::ParseOptions;

    fn document(source: &str) -> Document {
        Document::from_source(source, ParseOptions::default()).unwrap()
    }

    /// Location of the first text token with the given value
    fn text_location(doc: &Document, value: &str) -> usize {
        let token: TokenId = doc
            .tree
            .tokens_of(doc.root)
            .find(|t| doc.tree.text(*t) == Some(value))
            .unwrap();
        doc.tree.get_serialized_location(token)
    }

    fn set_text(location: usize, value: &str) -> Operation {
        Operation::SetText {
            location,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_undo_redo_text() {
        let mut doc = document("x = 1");
        let mut stack = UndoStack::new();
        let location = text_location(&doc, "1");

        stack.apply(&set_text(location, "2"), &mut doc).unwrap();
        assert_eq!(doc.stringify(), "x = 2");
        assert!(stack.can_undo());

        assert!(stack.undo(&mut doc).unwrap());
        assert_eq!(doc.stringify(), "x = 1");
        assert_eq!(stack.redo_levels(), 1);

        assert!(stack.redo(&mut doc).unwrap());
        assert_eq!(doc.stringify(), "x = 2");
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_batched_operations() {
        let mut doc = document("x = 1");
        let mut stack = UndoStack::new();
        let location = text_location(&doc, "1");

        stack.begin_batch();
        stack.set_batch_description("Retype value");
        stack.apply(&set_text(location, "12"), &mut doc).unwrap();
        stack.apply(&set_text(location, "123"), &mut doc).unwrap();
        stack.end_batch(&mut doc);

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Retype value"));

        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.stringify(), "x = 1");
        assert_eq!(stack.redo_description(), Some("Retype value"));
    }

    #[test]
    fn test_new_operation_clears_redo() {
        let mut doc = document("x = 1");
        let mut stack = UndoStack::new();
        let location = text_location(&doc, "1");

        stack.apply(&set_text(location, "2"), &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        stack.apply(&set_text(location, "3"), &mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = document("x = 1");
        let mut stack = UndoStack::with_max_levels(2);
        let location = text_location(&doc, "1");

        for i in 0..3 {
            stack.apply(&set_text(location, &i.to_string()), &mut doc).unwrap();
        }
        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_failed_operation_is_not_recorded() {
        let mut doc = document("x = 1");
        let mut stack = UndoStack::new();

        let err = stack.apply(&set_text(0, "y"), &mut doc).unwrap_err();
        assert_eq!(err, EditorError::NotText(0));
        assert!(!stack.can_undo());
        assert_eq!(doc.version, 0);
    }
}
