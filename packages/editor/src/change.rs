//! # Change
//!
//! A transaction over a [`Value`]. Commands append operations, each applied
//! immediately so later commands see the edited tree. When the outermost
//! command returns, the nodes the operations touched are normalized.
//!
//! A change owns its value: dropping it discards every edit, and nothing in
//! it is visible until [`Editor::commit`](crate::Editor::commit).

use crate::apply::apply_operation;
use crate::errors::EditorResult;
use crate::normalizer::Normalizer;
use crate::operation::Operation;
use crate::transform::transform_path;
use folio_model::{Node, Path, Selection, Value};
use folio_schema::Schema;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const DEFAULT_BLOCK: &str = "paragraph";

#[derive(Debug)]
pub struct Change {
    value: Value,
    operations: Vec<Operation>,
    /// Paths touched since the last normalization, in current coordinates
    dirty: BTreeSet<Path>,
    schema: Arc<Schema>,
    normalizer: Arc<Normalizer>,
    default_block: String,
    /// Nesting of running commands; normalization waits for the outermost
    depth: usize,
    normalizing: bool,
    normalize_enabled: bool,
}

impl Change {
    pub fn new(value: Value, schema: Arc<Schema>, normalizer: Arc<Normalizer>) -> Self {
        Self {
            value,
            operations: Vec::new(),
            dirty: BTreeSet::new(),
            schema,
            normalizer,
            default_block: DEFAULT_BLOCK.to_string(),
            depth: 0,
            normalizing: false,
            normalize_enabled: true,
        }
    }

    /// Change over `value` with only the core schema
    pub fn standalone(value: Value) -> Self {
        Self::new(value, Arc::new(Schema::new()), Arc::new(Normalizer::new()))
    }

    pub fn with_default_block(mut self, block_type: impl Into<String>) -> Self {
        self.default_block = block_type.into();
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn document(&self) -> &Node {
        &self.value.document
    }

    pub fn selection(&self) -> &Selection {
        &self.value.selection
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Block type used when a command has to create a block
    pub fn default_block(&self) -> &str {
        &self.default_block
    }

    /// Operations applied so far, in order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_parts(self) -> (Value, Vec<Operation>) {
        (self.value, self.operations)
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Apply one operation and track the paths it dirtied
    #[tracing::instrument(level = "debug", skip_all, fields(op = op.kind()))]
    pub fn apply_operation(&mut self, op: Operation) -> EditorResult<()> {
        apply_operation(&mut self.value, &op)?;

        let dirty = std::mem::take(&mut self.dirty);
        self.dirty = dirty
            .iter()
            .filter_map(|path| transform_path(path, &op))
            .collect();
        self.dirty.extend(op.dirty_paths());

        tracing::debug!(path = ?op.path().map(ToString::to_string), "applied operation");
        self.operations.push(op);
        Ok(())
    }

    pub fn apply_operations(&mut self, ops: impl IntoIterator<Item = Operation>) -> EditorResult<()> {
        self.command(|change| {
            for op in ops {
                change.apply_operation(op)?;
            }
            Ok(())
        })
    }

    /// Run a command body. Normalization runs once the outermost command
    /// has returned successfully.
    pub fn command<F>(&mut self, body: F) -> EditorResult<()>
    where
        F: FnOnce(&mut Change) -> EditorResult<()>,
    {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result?;
        if self.depth == 0 {
            self.normalize()?;
        }
        Ok(())
    }

    /// Run `body` with normalization deferred until it returns
    pub fn without_normalizing<F>(&mut self, body: F) -> EditorResult<()>
    where
        F: FnOnce(&mut Change) -> EditorResult<()>,
    {
        let enabled = self.normalize_enabled;
        self.normalize_enabled = false;
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        self.normalize_enabled = enabled;
        result?;
        if self.depth == 0 {
            self.normalize()?;
        }
        Ok(())
    }

    /// Normalize every dirty path. Re-entrant calls (from repairs) are
    /// no-ops; the running pass picks up whatever they dirty.
    pub fn normalize(&mut self) -> EditorResult<()> {
        if self.normalizing || !self.normalize_enabled {
            return Ok(());
        }
        self.normalizing = true;
        let normalizer = Arc::clone(&self.normalizer);
        let result = normalizer.normalize(self);
        self.normalizing = false;
        result
    }

    /// Mark the whole document dirty and normalize it
    pub fn normalize_document(&mut self) -> EditorResult<()> {
        let paths = self.value.document.paths_under(&Path::root());
        self.dirty.extend(paths);
        self.normalize()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Remove and return the deepest dirty path
    pub(crate) fn take_dirty(&mut self) -> Option<Path> {
        let path = self.dirty.iter().max_by_key(|path| path.len())?.clone();
        self.dirty.remove(&path);
        Some(path)
    }
}
