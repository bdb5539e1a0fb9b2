use crate::change::Change;
use crate::errors::{EditorResult, OperationError};
use crate::operation::Operation;
use folio_model::{Data, Key, Mark, MarkSet, ModelError, Node, NodeProperties, Path};

fn check_span(path: &Path, offset: usize, length: usize, len: usize) -> EditorResult<()> {
    if offset + length > len {
        return Err(ModelError::offset_out_of_range(path, offset + length, len).into());
    }
    Ok(())
}

fn parent_and_index(path: &Path) -> EditorResult<(Path, usize)> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(OperationError::RootTarget.into()),
    }
}

impl Change {
    /// Insert `text` into the text at `path`. Without explicit marks the
    /// text takes the marks a character typed at `offset` would get.
    pub fn insert_text_by_path(
        &mut self,
        path: &Path,
        offset: usize,
        text: &str,
        marks: Option<MarkSet>,
    ) -> EditorResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let node = self.document().assert_text(path)?;
        check_span(path, offset, 0, node.len())?;
        let marks = marks.unwrap_or_else(|| node.marks_at(offset));
        let op = Operation::InsertText {
            path: path.clone(),
            offset,
            text: text.to_string(),
            marks,
        };
        self.command(|change| change.apply_operation(op))
    }

    /// Remove `length` characters. One operation per leaf run, last run
    /// first, so each inverse restores its own marks.
    pub fn remove_text_by_path(&mut self, path: &Path, offset: usize, length: usize) -> EditorResult<()> {
        if length == 0 {
            return Ok(());
        }
        let node = self.document().assert_text(path)?;
        check_span(path, offset, length, node.len())?;
        let ops: Vec<Operation> = node
            .runs(offset, length)
            .into_iter()
            .rev()
            .map(|(start, leaf)| Operation::RemoveText {
                path: path.clone(),
                offset: start,
                text: leaf.text,
                marks: leaf.marks,
            })
            .collect();
        self.apply_operations(ops)
    }

    pub fn add_mark_by_path(&mut self, path: &Path, offset: usize, length: usize, mark: Mark) -> EditorResult<()> {
        let node = self.document().assert_text(path)?;
        check_span(path, offset, length, node.len())?;
        let ops: Vec<Operation> = node
            .runs(offset, length)
            .into_iter()
            .filter(|(_, leaf)| !leaf.marks.contains(&mark))
            .map(|(start, leaf)| Operation::AddMark {
                path: path.clone(),
                offset: start,
                length: leaf.len(),
                mark: mark.clone(),
            })
            .collect();
        self.apply_operations(ops)
    }

    pub fn remove_mark_by_path(
        &mut self,
        path: &Path,
        offset: usize,
        length: usize,
        mark: Mark,
    ) -> EditorResult<()> {
        let node = self.document().assert_text(path)?;
        check_span(path, offset, length, node.len())?;
        let ops: Vec<Operation> = node
            .runs(offset, length)
            .into_iter()
            .filter(|(_, leaf)| leaf.marks.contains(&mark))
            .map(|(start, leaf)| Operation::RemoveMark {
                path: path.clone(),
                offset: start,
                length: leaf.len(),
                mark: mark.clone(),
            })
            .collect();
        self.apply_operations(ops)
    }

    /// Replace `mark` with `new_mark` wherever the span carries it
    pub fn set_mark_by_path(
        &mut self,
        path: &Path,
        offset: usize,
        length: usize,
        mark: Mark,
        new_mark: Mark,
    ) -> EditorResult<()> {
        let node = self.document().assert_text(path)?;
        check_span(path, offset, length, node.len())?;
        let ops: Vec<Operation> = node
            .runs(offset, length)
            .into_iter()
            .filter(|(_, leaf)| leaf.marks.contains(&mark) && mark != new_mark)
            .map(|(start, leaf)| {
                // Where the new mark is already set, dropping the old one is enough
                if leaf.marks.contains(&new_mark) {
                    Operation::RemoveMark {
                        path: path.clone(),
                        offset: start,
                        length: leaf.len(),
                        mark: mark.clone(),
                    }
                } else {
                    Operation::SetMark {
                        path: path.clone(),
                        offset: start,
                        length: leaf.len(),
                        mark: mark.clone(),
                        new_mark: new_mark.clone(),
                    }
                }
            })
            .collect();
        self.apply_operations(ops)
    }

    pub fn insert_node_by_path(&mut self, parent: &Path, index: usize, node: Node) -> EditorResult<()> {
        let op = Operation::InsertNode {
            path: parent.child(index),
            node,
        };
        self.command(|change| change.apply_operation(op))
    }

    pub fn remove_node_by_path(&mut self, path: &Path) -> EditorResult<()> {
        if path.is_root() {
            return Err(OperationError::RootTarget.into());
        }
        let node = self.document().assert_node(path)?.clone();
        let op = Operation::RemoveNode {
            path: path.clone(),
            node,
        };
        self.command(|change| change.apply_operation(op))
    }

    pub fn remove_node_by_key(&mut self, key: Key) -> EditorResult<()> {
        let path = self.document().assert_path_by_key(key)?;
        self.remove_node_by_path(&path)
    }

    /// Merge the node at `path` into its previous sibling
    pub fn merge_node_by_path(&mut self, path: &Path) -> EditorResult<()> {
        let node = self.document().assert_node(path)?;
        let previous_path = path.previous().ok_or_else(|| OperationError::InvalidMerge {
            path: path.clone(),
            reason: "no previous sibling".to_string(),
        })?;
        let previous = self.document().assert_node(&previous_path)?;
        let op = Operation::MergeNode {
            path: path.clone(),
            position: previous.split_len(),
            properties: node.properties(),
        };
        self.command(|change| change.apply_operation(op))
    }

    /// Split the node at `path` before child (or character) `position`.
    /// The right-hand node gets a fresh key.
    pub fn split_node_by_path(&mut self, path: &Path, position: usize) -> EditorResult<()> {
        let node = self.document().assert_node(path)?;
        if path.is_root() || position > node.split_len() {
            return Err(OperationError::InvalidSplit {
                path: path.clone(),
                position,
            }
            .into());
        }
        let properties = NodeProperties {
            key: Some(Key::generate()),
            ..node.properties()
        };
        let op = Operation::SplitNode {
            path: path.clone(),
            position,
            properties,
        };
        self.command(|change| change.apply_operation(op))
    }

    /// Split the text at `path` at `offset`, then every ancestor up to and
    /// including `ancestor`, each right after the half that was just made.
    pub fn split_descendants_by_path(&mut self, ancestor: &Path, path: &Path, offset: usize) -> EditorResult<()> {
        if !ancestor.is_ancestor_or_equal(path) {
            return Err(OperationError::InvalidSplit {
                path: ancestor.clone(),
                position: offset,
            }
            .into());
        }
        let ancestor = ancestor.clone();
        let path = path.clone();
        self.command(move |change| {
            let mut current = path;
            let mut position = offset;
            loop {
                change.split_node_by_path(&current, position)?;
                if current == ancestor {
                    return Ok(());
                }
                let (parent, index) = parent_and_index(&current)?;
                position = index + 1;
                current = parent;
            }
        })
    }

    /// Move the node at `path` so it ends up at `new_index` under
    /// `new_parent`. `new_parent` is addressed in the current tree.
    pub fn move_node_by_path(&mut self, path: &Path, new_parent: &Path, new_index: usize) -> EditorResult<()> {
        let (parent, index) = parent_and_index(path)?;
        let new_path = if parent == *new_parent {
            if new_index == index {
                return Ok(());
            }
            // Insertion point is counted before the node leaves its slot
            if new_index > index {
                new_parent.child(new_index + 1)
            } else {
                new_parent.child(new_index)
            }
        } else {
            new_parent.child(new_index)
        };
        let op = Operation::MoveNode {
            path: path.clone(),
            new_path,
        };
        self.command(|change| change.apply_operation(op))
    }

    pub fn move_node_by_key(&mut self, key: Key, new_parent_key: Key, new_index: usize) -> EditorResult<()> {
        let path = self.document().assert_path_by_key(key)?;
        let new_parent = self.document().assert_path_by_key(new_parent_key)?;
        self.move_node_by_path(&path, &new_parent, new_index)
    }

    /// Set type and data on the node at `path`. Keys never change.
    pub fn set_node_by_path(&mut self, path: &Path, properties: NodeProperties) -> EditorResult<()> {
        let node = self.document().assert_node(path)?;
        let properties = NodeProperties { key: None, ..properties };
        if properties.is_empty() {
            return Ok(());
        }
        let previous = NodeProperties {
            node_type: properties
                .node_type
                .as_ref()
                .and(node.node_type().map(str::to_string)),
            data: properties.data.as_ref().and(node.data().cloned()),
            key: None,
        };
        let op = Operation::SetNode {
            path: path.clone(),
            properties,
            previous,
        };
        self.command(|change| change.apply_operation(op))
    }

    pub fn set_node_by_key(&mut self, key: Key, properties: NodeProperties) -> EditorResult<()> {
        let path = self.document().assert_path_by_key(key)?;
        self.set_node_by_path(&path, properties)
    }

    /// Insert `block` in place of the node at `path` and move the node
    /// into it, after any children the block already has
    pub fn wrap_block_by_path(&mut self, path: &Path, block: Node) -> EditorResult<()> {
        let (parent, index) = parent_and_index(path)?;
        let target = block.nodes().len();
        let path = path.clone();
        self.command(move |change| {
            change.insert_node_by_path(&parent, index, block)?;
            change.move_node_by_path(&parent.child(index + 1), &path, target)
        })
    }

    pub fn wrap_inline_by_path(&mut self, path: &Path, inline: Node) -> EditorResult<()> {
        self.wrap_block_by_path(path, inline)
    }

    /// Lift the node at `path` out of its parent. The parent is split when
    /// the node sits between siblings and removed when it was the only child.
    pub fn unwrap_node_by_path(&mut self, path: &Path) -> EditorResult<()> {
        let (parent_path, index) = parent_and_index(path)?;
        let (grandparent, parent_index) = parent_and_index(&parent_path)?;
        let count = self.document().assert_node(&parent_path)?.nodes().len();
        let path = path.clone();
        self.command(move |change| {
            if count == 1 {
                change.move_node_by_path(&path, &grandparent, parent_index)?;
                change.remove_node_by_path(&grandparent.child(parent_index + 1))
            } else if index == 0 {
                change.move_node_by_path(&path, &grandparent, parent_index)
            } else if index + 1 == count {
                change.move_node_by_path(&path, &grandparent, parent_index + 1)
            } else {
                change.split_node_by_path(&parent_path, index)?;
                let moved = grandparent.child(parent_index + 1).child(0);
                change.move_node_by_path(&moved, &grandparent, parent_index + 1)
            }
        })
    }

    pub fn unwrap_node_by_key(&mut self, key: Key) -> EditorResult<()> {
        let path = self.document().assert_path_by_key(key)?;
        self.unwrap_node_by_path(&path)
    }

    pub fn replace_node_by_path(&mut self, path: &Path, node: Node) -> EditorResult<()> {
        let (parent, index) = parent_and_index(path)?;
        let path = path.clone();
        self.command(move |change| {
            change.remove_node_by_path(&path)?;
            change.insert_node_by_path(&parent, index, node)
        })
    }

    /// Replace the value-level data map
    pub fn set_data(&mut self, data: Data) -> EditorResult<()> {
        let previous = self.value().data.clone();
        if previous == data {
            return Ok(());
        }
        self.command(|change| change.apply_operation(Operation::SetValue { data, previous }))
    }
}
