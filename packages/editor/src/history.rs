//! Batched undo and redo for committed changes.
//!
//! Every committed change lands in a [`Batch`] that stores its operations
//! next to their inverses and the selections on either side. Typing or
//! deleting that continues the previous edit in the same text joins the top
//! batch while it is open, which keeps a typed word to one undo step. The
//! batch closes on [`History::flush`], after the merge window, or at the
//! first edit that does not continue it. Selection operations never enter a
//! batch, and recording anything new empties the redo side.
//!
//! ```rust,ignore
//! let mut history = History::new();
//! history.record(&change.operations(), &before, &after);
//! assert!(history.undo(&mut value)?);
//! ```

use crate::apply::apply_operation;
use crate::errors::OperationResult;
use crate::operation::Operation;
use folio_model::{Selection, Value};
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_LEVELS: usize = 100;

/// How long after an edit the next one may still join its batch
pub const DEFAULT_MERGE_WINDOW: Duration = Duration::from_millis(1000);

/// A group of operations undone and redone together
#[derive(Debug, Clone)]
pub struct Batch {
    /// Forward operations, oldest first
    pub operations: Vec<Operation>,

    /// Inverses, newest first
    pub inverses: Vec<Operation>,

    /// Selection put back by undo
    pub selection_before: Selection,

    /// Selection put back by redo
    pub selection_after: Selection,

    /// Label shown for the undo step
    pub description: Option<String>,
}

impl Batch {
    pub fn from_operations(
        operations: Vec<Operation>,
        selection_before: Selection,
        selection_after: Selection,
    ) -> Self {
        let inverses = operations.iter().rev().map(Operation::invert).collect();
        Self {
            operations,
            inverses,
            selection_before,
            selection_after,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn extend(&mut self, operations: Vec<Operation>, selection_after: Selection) {
        let mut inverses: Vec<Operation> = operations.iter().rev().map(Operation::invert).collect();
        inverses.append(&mut self.inverses);
        self.inverses = inverses;
        self.operations.extend(operations);
        self.selection_after = selection_after;
    }
}

/// Whether `next` continues `previous`: typing or deleting contiguously in
/// the same text.
pub fn should_merge(previous: &Operation, next: &Operation) -> bool {
    match (previous, next) {
        (
            Operation::InsertText {
                path: p1,
                offset: o1,
                text: t1,
                ..
            },
            Operation::InsertText {
                path: p2,
                offset: o2,
                ..
            },
        ) => p1 == p2 && *o2 == o1 + t1.chars().count(),
        (
            Operation::RemoveText {
                path: p1,
                offset: o1,
                ..
            },
            Operation::RemoveText {
                path: p2,
                offset: o2,
                text: t2,
                ..
            },
        ) => p1 == p2 && (o2 + t2.chars().count() == *o1 || o2 == o1),
        _ => false,
    }
}

/// Undo and redo stacks for one editor
#[derive(Debug)]
pub struct History {
    /// Batches that can be undone, newest last
    undo_stack: Vec<Batch>,

    /// Batches that can be redone, newest last
    redo_stack: Vec<Batch>,

    /// Undo depth; zero keeps everything
    max_levels: usize,

    /// How long after the last edit the open batch still accepts merges
    merge_window: Duration,

    /// Whether the top batch accepts merges
    open: bool,

    last_recorded: Option<Instant>,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    /// History that keeps at most `max_levels` undo steps
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            merge_window: DEFAULT_MERGE_WINDOW,
            open: false,
            last_recorded: None,
        }
    }

    pub fn with_merge_window(mut self, merge_window: Duration) -> Self {
        self.merge_window = merge_window;
        self
    }

    /// Record the operations of one committed change
    pub fn record(&mut self, operations: &[Operation], before: &Selection, after: &Selection) {
        self.record_at(operations, before, after, Instant::now());
    }

    /// Record with an explicit timestamp
    pub fn record_at(
        &mut self,
        operations: &[Operation],
        before: &Selection,
        after: &Selection,
        now: Instant,
    ) {
        let operations: Vec<Operation> = operations
            .iter()
            .filter(|op| !op.is_selection())
            .cloned()
            .collect();
        let Some(first) = operations.first() else {
            return;
        };

        let within_window = self
            .last_recorded
            .map_or(false, |last| now.saturating_duration_since(last) <= self.merge_window);
        let merge_into = match self.undo_stack.last_mut() {
            Some(batch)
                if self.open
                    && within_window
                    && batch
                        .operations
                        .last()
                        .map_or(false, |previous| should_merge(previous, first)) =>
            {
                Some(batch)
            }
            _ => None,
        };

        match merge_into {
            Some(batch) => {
                tracing::debug!(operations = operations.len(), "merging into open batch");
                batch.extend(operations, after.clone());
                self.redo_stack.clear();
            }
            None => {
                let batch = Batch::from_operations(operations, before.clone(), after.clone());
                self.push_batch(batch);
            }
        }
        self.open = true;
        self.last_recorded = Some(now);
    }

    /// Close the open batch, so the next edit starts a new one
    pub fn flush(&mut self) {
        self.open = false;
    }

    /// Label the newest undo step
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = self.undo_stack.last_mut() {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: Batch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Revert the newest batch.
    ///
    /// Inverses are applied to a copy of `value`, which is only replaced
    /// when every one of them succeeds.
    #[tracing::instrument(skip_all, fields(levels = self.undo_stack.len()))]
    pub fn undo(&mut self, value: &mut Value) -> OperationResult<bool> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };
        match replay(value, &batch.inverses, &batch.selection_before) {
            Ok(()) => {
                tracing::debug!(operations = batch.inverses.len(), "undo");
                self.redo_stack.push(batch);
                self.open = false;
                Ok(true)
            }
            Err(error) => {
                self.undo_stack.push(batch);
                Err(error)
            }
        }
    }

    /// Reapply the batch undone last
    #[tracing::instrument(skip_all, fields(levels = self.redo_stack.len()))]
    pub fn redo(&mut self, value: &mut Value) -> OperationResult<bool> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match replay(value, &batch.operations, &batch.selection_after) {
            Ok(()) => {
                tracing::debug!(operations = batch.operations.len(), "redo");
                self.undo_stack.push(batch);
                self.open = false;
                Ok(true)
            }
            Err(error) => {
                self.redo_stack.push(batch);
                Err(error)
            }
        }
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

    /// Forget every batch
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open = false;
        self.last_recorded = None;
    }

    /// Description of the batch the next undo reverts
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().and_then(|b| b.description.as_deref())
    }

    /// Description of the batch the next redo reapplies
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().and_then(|b| b.description.as_deref())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn replay(value: &mut Value, operations: &[Operation], selection: &Selection) -> OperationResult<()> {
    let mut next = value.clone();
    for op in operations {
        apply_operation(&mut next, op)?;
    }
    next.selection = next.document.resolve_selection(selection);
    *value = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::builder::{cursor, paragraphs, value};
    use folio_model::{MarkSet, Path};

    fn insert(offset: usize, text: &str) -> Operation {
        Operation::InsertText {
            path: Path::from([0, 0]),
            offset,
            text: text.to_string(),
            marks: MarkSet::new(),
        }
    }

    /// Apply and record a single-operation change
    fn type_text(history: &mut History, v: &mut Value, op: Operation, now: Instant) {
        let before = v.selection.clone();
        apply_operation(v, &op).unwrap();
        history.record_at(&[op], &before, &v.selection, now);
    }

    #[test]
    fn test_contiguous_typing_merges() {
        let mut history = History::new();
        let mut v = value(paragraphs(&[""]), cursor([0, 0], 0));
        let now = Instant::now();

        type_text(&mut history, &mut v, insert(0, "a"), now);
        type_text(&mut history, &mut v, insert(1, "b"), now);
        type_text(&mut history, &mut v, insert(2, "c"), now);

        assert_eq!(history.undo_levels(), 1);
        assert!(history.undo(&mut v).unwrap());
        assert_eq!(v.document.text(), "");
        assert_eq!(v.selection.anchor, Some(folio_model::Point::new([0, 0], 0)));
    }

    #[test]
    fn test_flush_closes_batch() {
        let mut history = History::new();
        let mut v = value(paragraphs(&[""]), cursor([0, 0], 0));
        let now = Instant::now();

        type_text(&mut history, &mut v, insert(0, "a"), now);
        history.flush();
        type_text(&mut history, &mut v, insert(1, "b"), now);

        assert_eq!(history.undo_levels(), 2);
        history.undo(&mut v).unwrap();
        assert_eq!(v.document.text(), "a");
    }

    #[test]
    fn test_merge_window_elapses() {
        let mut history = History::new().with_merge_window(Duration::from_millis(10));
        let mut v = value(paragraphs(&[""]), cursor([0, 0], 0));
        let now = Instant::now();

        type_text(&mut history, &mut v, insert(0, "a"), now);
        type_text(&mut history, &mut v, insert(1, "b"), now + Duration::from_millis(50));

        assert_eq!(history.undo_levels(), 2);
    }

    #[test]
    fn test_non_contiguous_edit_starts_batch() {
        let mut history = History::new();
        let mut v = value(paragraphs(&["xyz"]), cursor([0, 0], 0));
        let now = Instant::now();

        type_text(&mut history, &mut v, insert(0, "a"), now);
        type_text(&mut history, &mut v, insert(3, "b"), now);

        assert_eq!(history.undo_levels(), 2);
    }

    #[test]
    fn test_backspacing_merges() {
        let previous = Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 3,
            text: "d".to_string(),
            marks: MarkSet::new(),
        };
        let next = Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 2,
            text: "c".to_string(),
            marks: MarkSet::new(),
        };
        assert!(should_merge(&previous, &next));
        assert!(!should_merge(&previous, &insert(3, "d")));
    }

    #[test]
    fn test_redo_and_new_edit_clears_redo() {
        let mut history = History::new();
        let mut v = value(paragraphs(&[""]), cursor([0, 0], 0));
        let now = Instant::now();

        type_text(&mut history, &mut v, insert(0, "a"), now);
        history.undo(&mut v).unwrap();
        assert!(history.can_redo());
        assert!(history.redo(&mut v).unwrap());
        assert_eq!(v.document.text(), "a");
        assert_eq!(v.selection.anchor, Some(folio_model::Point::new([0, 0], 1)));

        history.undo(&mut v).unwrap();
        type_text(&mut history, &mut v, insert(0, "z"), now);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_past_the_bottom_is_noop() {
        let mut history = History::new();
        let mut v = Value::default();
        assert!(!history.undo(&mut v).unwrap());
        assert!(!history.redo(&mut v).unwrap());
    }

    #[test]
    fn test_max_levels_evicts_oldest() {
        let mut history = History::with_max_levels(2);
        let mut v = value(paragraphs(&[""]), cursor([0, 0], 0));
        let now = Instant::now();
        for (i, c) in ["a", "b", "c"].iter().enumerate() {
            type_text(&mut history, &mut v, insert(i, c), now);
            history.flush();
        }
        assert_eq!(history.undo_levels(), 2);
        history.undo(&mut v).unwrap();
        history.undo(&mut v).unwrap();
        assert!(!history.undo(&mut v).unwrap());
        assert_eq!(v.document.text(), "a");
    }

    #[test]
    fn test_selection_only_changes_are_not_recorded() {
        let mut history = History::new();
        let op = Operation::SetSelection {
            selection: cursor([0, 0], 1),
            previous: cursor([0, 0], 0),
        };
        history.record(&[op], &Selection::unset(), &Selection::unset());
        assert!(!history.can_undo());
    }
}
