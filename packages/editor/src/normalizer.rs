//! # Normalizer
//!
//! Brings dirty nodes back in line with the schema.
//!
//! Dirty paths are processed deepest-first. For each node the schema is
//! asked for the first violation; the violation is repaired with ordinary
//! operations and the node is checked again, until it is valid or the
//! iteration ceiling is hit.
//!
//! ## Repairs
//!
//! A layer can register a [`NormalizeHook`]. Violations from that layer go
//! to the hook first; if it declines (returns `false`) the default repair
//! for the violation code runs:
//!
//! | code                              | repair                                   |
//! |-----------------------------------|------------------------------------------|
//! | child / first / last / parent     | remove the child (or its block, if the child is the block's only text) |
//! | `child_required`, `child_min_invalid`, `node_text_invalid` | remove the node |
//! | `node_data_invalid`               | unset the data key (remove if missing)   |
//! | `node_mark_invalid`               | strip the mark                           |
//!
//! Core violations have their own repairs: empty elements and unpadded
//! voids get an empty text, adjacent texts are merged, and invalid or
//! surplus children are removed.

use crate::change::Change;
use crate::errors::{EditorError, EditorResult};
use crate::transform::transform_path;
use folio_model::{Key, Node, NodeProperties, Path};
use folio_schema::{Violation, ViolationCode, CORE_LAYER};
use std::sync::Arc;

/// Default per-node repair budget, before adding the node's child count
pub const DEFAULT_ITERATION_BASE: usize = 100;

/// Custom repair for the violations of one schema layer
pub trait NormalizeHook: Send + Sync {
    /// Repair `violation` through `change`. Return `false` to fall back to
    /// the default repair.
    fn normalize(&self, change: &mut Change, violation: &Violation) -> EditorResult<bool>;
}

impl<F> NormalizeHook for F
where
    F: Fn(&mut Change, &Violation) -> EditorResult<bool> + Send + Sync,
{
    fn normalize(&self, change: &mut Change, violation: &Violation) -> EditorResult<bool> {
        self(change, violation)
    }
}

#[derive(Clone)]
pub struct Normalizer {
    hooks: Vec<(String, Arc<dyn NormalizeHook>)>,
    iteration_base: usize,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            iteration_base: DEFAULT_ITERATION_BASE,
        }
    }

    pub fn with_iteration_base(mut self, iteration_base: usize) -> Self {
        self.iteration_base = iteration_base;
        self
    }

    pub fn iteration_base(&self) -> usize {
        self.iteration_base
    }

    /// Register the repair hook for `layer`, replacing any previous one
    pub fn add_hook(&mut self, layer: impl Into<String>, hook: Arc<dyn NormalizeHook>) {
        let layer = layer.into();
        self.hooks.retain(|(name, _)| *name != layer);
        self.hooks.push((layer, hook));
    }

    pub fn hook(&self, layer: &str) -> Option<&Arc<dyn NormalizeHook>> {
        self.hooks
            .iter()
            .find(|(name, _)| name == layer)
            .map(|(_, hook)| hook)
    }

    /// Normalize every dirty path of `change`
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn normalize(&self, change: &mut Change) -> EditorResult<()> {
        while let Some(path) = change.take_dirty() {
            self.normalize_node(change, path)?;
        }
        Ok(())
    }

    fn normalize_node(&self, change: &mut Change, path: Path) -> EditorResult<()> {
        let Some(node) = change.document().get(&path) else {
            return Ok(());
        };
        let key = node.key();
        let node_type = node
            .node_type()
            .filter(|t| !t.is_empty())
            .unwrap_or(node.object().as_str())
            .to_string();
        let ceiling = self.iteration_base + node.nodes().len();

        let mut path = path;
        let mut iterations = 0;
        loop {
            let Some(violation) = change.schema().validate(change.document(), &path) else {
                return Ok(());
            };
            if iterations == ceiling {
                tracing::warn!(
                    key = %key,
                    node_type = %node_type,
                    code = %violation.code,
                    layer = %violation.layer,
                    "normalization did not settle"
                );
                return Err(EditorError::NormalizationLimit {
                    key,
                    node_type,
                    iterations,
                });
            }
            iterations += 1;

            let applied = change.operations().len();
            self.repair(change, &violation)?;
            match refind(change, &path, key, applied) {
                Some(next) => path = next,
                None => return Ok(()),
            }
        }
    }

    /// Repair one violation, through the layer's hook when it has one
    pub fn repair(&self, change: &mut Change, violation: &Violation) -> EditorResult<()> {
        tracing::debug!(
            code = %violation.code,
            layer = %violation.layer,
            path = %violation.path,
            "repairing"
        );
        if let Some(hook) = self.hook(&violation.layer) {
            if hook.normalize(change, violation)? {
                return Ok(());
            }
        }
        if violation.layer == CORE_LAYER {
            core_repair(change, violation)
        } else {
            default_repair(change, violation)
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let layers: Vec<&str> = self.hooks.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("Normalizer")
            .field("hooks", &layers)
            .field("iteration_base", &self.iteration_base)
            .finish()
    }
}

/// Where the node with `key` is now, after the operations since `since`
fn refind(change: &Change, path: &Path, key: Key, since: usize) -> Option<Path> {
    let mut current = Some(path.clone());
    for op in &change.operations()[since..] {
        current = current.and_then(|p| transform_path(&p, op));
    }
    if let Some(current) = current {
        if change.document().get(&current).map(Node::key) == Some(key) {
            return Some(current);
        }
    }
    change.document().path_by_key(key)
}

/// Repairs for the built-in invariants
fn core_repair(change: &mut Change, violation: &Violation) -> EditorResult<()> {
    match violation.code {
        ViolationCode::ChildRequired => {
            change.insert_node_by_path(&violation.path, 0, Node::new_text(""))
        }
        ViolationCode::InlineVoidUnpadded => {
            let index = violation.index.unwrap_or(0);
            change.insert_node_by_path(&violation.path, index, Node::new_text(""))
        }
        ViolationCode::AdjacentText => match violation.child_path() {
            Some(child) => change.merge_node_by_path(&child),
            None => Ok(()),
        },
        ViolationCode::ChildObjectInvalid
        | ViolationCode::InlineEmpty
        | ViolationCode::ExtraEmptyText => match violation.child_path() {
            Some(child) => change.remove_node_by_path(&child),
            None => remove_node(change, &violation.path),
        },
        _ => default_repair(change, violation),
    }
}

/// Repair for a violation no hook handled
pub fn default_repair(change: &mut Change, violation: &Violation) -> EditorResult<()> {
    let path = &violation.path;
    match violation.code {
        code if code.targets_child() => remove_child(change, violation),

        ViolationCode::NodeDataInvalid => {
            let data = change.document().get(path).and_then(Node::data).cloned();
            match (data, &violation.data_key) {
                (Some(mut data), Some(key)) if data.contains_key(key) => {
                    data.remove(key);
                    change.set_node_by_path(path, NodeProperties::default().with_data(data))
                }
                _ => remove_node(change, path),
            }
        }

        ViolationCode::NodeMarkInvalid => {
            let Some(mark) = violation.mark.clone() else {
                return remove_node(change, path);
            };
            let texts: Vec<(Path, usize)> = change
                .document()
                .texts_under(path)
                .into_iter()
                .map(|(text_path, text)| (text_path, text.len()))
                .collect();
            for (text_path, len) in texts {
                change.remove_mark_by_path(&text_path, 0, len, mark.clone())?;
            }
            Ok(())
        }

        _ => remove_node(change, path),
    }
}

/// Remove the offending child. A text that is its block's only child takes
/// the block with it, since the block would only get the text back. A
/// rejected child whose group names a wrapper is wrapped instead.
fn remove_child(change: &mut Change, violation: &Violation) -> EditorResult<()> {
    let Some(child) = violation.child_path() else {
        return remove_node(change, &violation.path);
    };
    if let (Some(wrap), ViolationCode::ChildObjectInvalid | ViolationCode::ChildTypeInvalid) =
        (&violation.wrap, violation.code)
    {
        return wrap_child(change, &violation.path, &child, wrap);
    }
    let only_text = change.document().get(&violation.path).map_or(false, |node| {
        node.is_block() && node.nodes().len() == 1 && node.nodes()[0].is_text()
    });
    if only_text {
        remove_node(change, &violation.path)
    } else {
        change.remove_node_by_path(&child)
    }
}

/// Wrap the child at `child` in a new `wrap` block. Texts and inlines are
/// wrapped together with their non-block neighbours so the parent never
/// ends up mixing blocks with inline content.
fn wrap_child(change: &mut Change, parent: &Path, child: &Path, wrap: &str) -> EditorResult<()> {
    let Some(index) = child.last() else {
        return Ok(());
    };
    let (start, end) = match change.document().get(parent) {
        Some(node) if !node.nodes().get(index).map_or(true, Node::is_block) => {
            let siblings = node.nodes();
            let start = siblings[..index]
                .iter()
                .rposition(Node::is_block)
                .map_or(0, |block| block + 1);
            let end = siblings[index..]
                .iter()
                .position(Node::is_block)
                .map_or(siblings.len(), |block| index + block);
            (start, end)
        }
        _ => (index, index + 1),
    };
    let wrapper = parent.child(start);
    change.insert_node_by_path(parent, start, Node::block(wrap, vec![]))?;
    for offset in 0..end - start {
        change.move_node_by_path(&parent.child(start + 1), &wrapper, offset)?;
    }
    Ok(())
}

fn remove_node(change: &mut Change, path: &Path) -> EditorResult<()> {
    if path.is_root() {
        // Nothing to remove; the ceiling reports the conflict
        tracing::warn!("schema asked to remove the document");
        return Ok(());
    }
    change.remove_node_by_path(path)
}
