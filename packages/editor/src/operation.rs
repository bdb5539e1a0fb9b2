//! Invertible edit operations.
//!
//! Every change to a [`Value`](folio_model::Value) is expressed as a list of
//! operations. Each one carries enough data to be applied deterministically
//! and to build its exact inverse, which is what history replays.

use crate::transform::{move_target, transform_path};
use folio_model::{Data, Mark, MarkSet, Node, NodeProperties, Path, Selection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    InsertText {
        path: Path,
        offset: usize,
        text: String,
        #[serde(default)]
        marks: MarkSet,
    },
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
        #[serde(default)]
        marks: MarkSet,
    },
    AddMark {
        path: Path,
        offset: usize,
        length: usize,
        mark: Mark,
    },
    RemoveMark {
        path: Path,
        offset: usize,
        length: usize,
        mark: Mark,
    },
    SetMark {
        path: Path,
        offset: usize,
        length: usize,
        mark: Mark,
        new_mark: Mark,
    },
    InsertNode {
        path: Path,
        node: Node,
    },
    RemoveNode {
        path: Path,
        node: Node,
    },
    /// Merge the node at `path` into its previous sibling. `position` is the
    /// previous sibling's split length before the merge, `properties` those
    /// of the node that disappears.
    MergeNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },
    /// Split the node at `path` at `position`. The new right-hand node gets
    /// `properties`, including its key.
    SplitNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },
    /// Move the node at `path` so it lands at `new_path`, given in the
    /// coordinates of the tree before the move.
    MoveNode {
        path: Path,
        new_path: Path,
    },
    SetNode {
        path: Path,
        properties: NodeProperties,
        previous: NodeProperties,
    },
    SetSelection {
        selection: Selection,
        previous: Selection,
    },
    SetValue {
        data: Data,
        previous: Data,
    },
}

impl Operation {
    /// Operation that undoes this one when applied right after it
    pub fn invert(&self) -> Operation {
        match self {
            Operation::InsertText {
                path,
                offset,
                text,
                marks,
            } => Operation::RemoveText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
                marks: marks.clone(),
            },
            Operation::RemoveText {
                path,
                offset,
                text,
                marks,
            } => Operation::InsertText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
                marks: marks.clone(),
            },
            Operation::AddMark {
                path,
                offset,
                length,
                mark,
            } => Operation::RemoveMark {
                path: path.clone(),
                offset: *offset,
                length: *length,
                mark: mark.clone(),
            },
            Operation::RemoveMark {
                path,
                offset,
                length,
                mark,
            } => Operation::AddMark {
                path: path.clone(),
                offset: *offset,
                length: *length,
                mark: mark.clone(),
            },
            Operation::SetMark {
                path,
                offset,
                length,
                mark,
                new_mark,
            } => Operation::SetMark {
                path: path.clone(),
                offset: *offset,
                length: *length,
                mark: new_mark.clone(),
                new_mark: mark.clone(),
            },
            Operation::InsertNode { path, node } => Operation::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },
            Operation::RemoveNode { path, node } => Operation::InsertNode {
                path: path.clone(),
                node: node.clone(),
            },
            Operation::MergeNode {
                path,
                position,
                properties,
            } => Operation::SplitNode {
                path: path.previous().unwrap_or_else(|| path.clone()),
                position: *position,
                properties: properties.clone(),
            },
            Operation::SplitNode {
                path,
                position,
                properties,
            } => Operation::MergeNode {
                path: path.next().unwrap_or_else(|| path.clone()),
                position: *position,
                properties: properties.clone(),
            },
            Operation::MoveNode { path, new_path } => {
                let target = move_target(path, new_path);
                let back = transform_path(
                    path,
                    &Operation::InsertNode {
                        path: target.clone(),
                        node: Node::new_text(""),
                    },
                )
                .unwrap_or_else(|| path.clone());
                Operation::MoveNode {
                    path: target,
                    new_path: back,
                }
            }
            Operation::SetNode {
                path,
                properties,
                previous,
            } => Operation::SetNode {
                path: path.clone(),
                properties: previous.clone(),
                previous: properties.clone(),
            },
            Operation::SetSelection {
                selection,
                previous,
            } => Operation::SetSelection {
                selection: previous.clone(),
                previous: selection.clone(),
            },
            Operation::SetValue { data, previous } => Operation::SetValue {
                data: previous.clone(),
                previous: data.clone(),
            },
        }
    }

    /// Snake-case name, as used in the serialized form
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InsertText { .. } => "insert_text",
            Operation::RemoveText { .. } => "remove_text",
            Operation::AddMark { .. } => "add_mark",
            Operation::RemoveMark { .. } => "remove_mark",
            Operation::SetMark { .. } => "set_mark",
            Operation::InsertNode { .. } => "insert_node",
            Operation::RemoveNode { .. } => "remove_node",
            Operation::MergeNode { .. } => "merge_node",
            Operation::SplitNode { .. } => "split_node",
            Operation::MoveNode { .. } => "move_node",
            Operation::SetNode { .. } => "set_node",
            Operation::SetSelection { .. } => "set_selection",
            Operation::SetValue { .. } => "set_value",
        }
    }

    /// Path the operation targets, if it targets a node
    pub fn path(&self) -> Option<&Path> {
        match self {
            Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::AddMark { path, .. }
            | Operation::RemoveMark { path, .. }
            | Operation::SetMark { path, .. }
            | Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path, .. }
            | Operation::MergeNode { path, .. }
            | Operation::SplitNode { path, .. }
            | Operation::MoveNode { path, .. }
            | Operation::SetNode { path, .. } => Some(path),
            Operation::SetSelection { .. } | Operation::SetValue { .. } => None,
        }
    }

    /// Whether the operation only touches the selection
    pub fn is_selection(&self) -> bool {
        matches!(self, Operation::SetSelection { .. })
    }

    /// Whether the operation removes nodes from the tree
    pub fn removes_nodes(&self) -> bool {
        matches!(
            self,
            Operation::RemoveNode { .. } | Operation::MergeNode { .. }
        )
    }

    /// Paths that may have become invalid, in the coordinates of the tree
    /// after this operation was applied.
    ///
    /// That is the ancestors of the affected node and the node itself; for
    /// inserts, every inserted descendant too.
    pub fn dirty_paths(&self) -> Vec<Path> {
        match self {
            Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::AddMark { path, .. }
            | Operation::RemoveMark { path, .. }
            | Operation::SetMark { path, .. }
            | Operation::SetNode { path, .. } => with_ancestors(path),
            Operation::InsertNode { path, node } => {
                let mut paths: Vec<Path> = path.ancestors().collect();
                paths.extend(
                    node.paths_under(&Path::root())
                        .into_iter()
                        .map(|relative| path.join(relative.as_slice())),
                );
                paths
            }
            Operation::RemoveNode { path, .. } => path.ancestors().collect(),
            Operation::MergeNode { path, .. } => match path.previous() {
                Some(previous) => with_ancestors(&previous),
                None => path.ancestors().collect(),
            },
            Operation::SplitNode { path, .. } => {
                let mut paths = with_ancestors(path);
                paths.extend(path.next());
                paths
            }
            Operation::MoveNode { path, new_path } => {
                let target = move_target(path, new_path);
                let mut paths = Vec::new();
                if let Some(old_parent) = path.parent() {
                    if let Some(old_parent) = transform_path(&old_parent, self) {
                        paths.extend(with_ancestors(&old_parent));
                    }
                }
                paths.extend(with_ancestors(&target));
                paths
            }
            Operation::SetSelection { .. } | Operation::SetValue { .. } => Vec::new(),
        }
    }
}

fn with_ancestors(path: &Path) -> Vec<Path> {
    let mut paths: Vec<Path> = path.ancestors().collect();
    paths.push(path.clone());
    paths
}
