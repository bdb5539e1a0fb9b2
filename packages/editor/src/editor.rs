//! # Editor
//!
//! Owns the current value, the schema, the normalizer and the history.
//!
//! Edits go through a [`Change`]: [`Editor::change`] hands one out over a
//! copy of the current value, and [`Editor::commit`] records its operations
//! and makes its value current. [`Editor::edit`] does both around a closure.
//!
//! ```rust,ignore
//! let mut editor = Editor::new(value).with_plugin(quotes);
//! editor.edit(|change| change.insert_text("hello"))?;
//! editor.undo()?;
//! ```

use crate::change::Change;
use crate::config::EditorConfig;
use crate::errors::EditorResult;
use crate::history::History;
use crate::normalizer::Normalizer;
use crate::plugin::Plugin;
use folio_model::{Node, Selection, Value};
use folio_schema::Schema;
use std::sync::Arc;

#[derive(Debug)]
pub struct Editor {
    value: Value,
    history: History,
    schema: Arc<Schema>,
    normalizer: Arc<Normalizer>,
    config: EditorConfig,
    plugins: Vec<String>,
}

impl Editor {
    /// Editor with the core schema and default settings
    pub fn new(value: Value) -> Self {
        Self {
            value,
            history: History::new(),
            schema: Arc::new(Schema::new()),
            normalizer: Arc::new(Normalizer::new()),
            config: EditorConfig::default(),
            plugins: Vec::new(),
        }
    }

    /// Editor configured from `config`, including its schema layers
    pub fn with_config(value: Value, config: EditorConfig) -> EditorResult<Self> {
        let mut schema = Schema::new();
        for layer in config.schema.build()? {
            schema.add_layer(layer);
        }
        let history = History::with_max_levels(config.history.max_levels)
            .with_merge_window(config.history.merge_window());
        let normalizer = Normalizer::new().with_iteration_base(config.normalize.iteration_base);

        Ok(Self {
            value,
            history,
            schema: Arc::new(schema),
            normalizer: Arc::new(normalizer),
            config,
            plugins: Vec::new(),
        })
    }

    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.register_plugin(plugin);
        self
    }

    /// Add a plugin's schema layer and repair hook
    pub fn register_plugin(&mut self, plugin: Plugin) {
        tracing::debug!(plugin = %plugin.name, "registering plugin");
        if let Some(hook) = plugin.hook.clone() {
            Arc::make_mut(&mut self.normalizer).add_hook(plugin.hook_layer(), hook);
        }
        if let Some(layer) = plugin.layer {
            Arc::make_mut(&mut self.schema).add_layer(layer);
        }
        self.plugins.push(plugin.name);
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
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

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Start a change over the current value
    pub fn change(&self) -> Change {
        Change::new(
            self.value.clone(),
            Arc::clone(&self.schema),
            Arc::clone(&self.normalizer),
        )
        .with_default_block(self.config.default_block.clone())
    }

    /// Record `change` in the history and make its value current
    pub fn commit(&mut self, change: Change) {
        let (value, operations) = change.into_parts();
        tracing::debug!(operations = operations.len(), "commit");
        self.history
            .record(&operations, &self.value.selection, &value.selection);
        self.value = value;
    }

    /// Run `body` on a new change and commit it. On error nothing changes.
    pub fn edit<F>(&mut self, body: F) -> EditorResult<()>
    where
        F: FnOnce(&mut Change) -> EditorResult<()>,
    {
        let mut change = self.change();
        change.command(body)?;
        self.commit(change);
        Ok(())
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        Ok(self.history.undo(&mut self.value)?)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        Ok(self.history.redo(&mut self.value)?)
    }

    /// Close the open history batch
    pub fn flush_history(&mut self) {
        self.history.flush();
    }

    /// Normalize the whole document. The repairs are not undoable.
    pub fn normalize_document(&mut self) -> EditorResult<()> {
        let mut change = self.change();
        change.normalize_document()?;
        self.value = change.into_value();
        Ok(())
    }

    /// Replace the value and forget the history
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.history.clear();
    }
}
