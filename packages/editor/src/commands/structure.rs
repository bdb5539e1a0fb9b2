use crate::change::Change;
use crate::errors::EditorResult;
use folio_model::{Key, Node, NodeProperties, Path, Point};

/// Copy of `node` with its children dropped
fn emptied(mut node: Node) -> Node {
    if let Some(element) = node.element_mut() {
        element.nodes.clear();
    }
    node
}

impl Change {
    /// Split the block at the cursor. `depth` counts enclosing blocks to
    /// split, starting from the closest; it is clamped to the outermost.
    pub fn split_block(&mut self, depth: usize) -> EditorResult<()> {
        self.command(|change| {
            if change.selection().is_expanded() {
                change.delete()?;
            }
            let Some(point) = change.selection().start() else {
                return Ok(());
            };
            let blocks: Vec<Path> = change
                .document()
                .ancestors(&point.path)
                .into_iter()
                .filter(|(_, node)| node.is_block())
                .map(|(path, _)| path)
                .rev()
                .collect();
            let Some(target) = blocks.get(depth.max(1) - 1).or(blocks.last()).cloned() else {
                return Ok(());
            };
            change.split_descendants_by_path(&target, &point.path, point.offset)
        })
    }

    /// Wrap the leaf blocks in the selection with `block`. Blocks under
    /// different parents are wrapped at their closest common ancestor.
    pub fn wrap_block(&mut self, block: Node) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        let blocks: Vec<Path> = self
            .document()
            .leaf_blocks_at_range(&range)
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
            return Ok(());
        };
        let (parent, from, to) = if first == last {
            match (first.parent(), first.last()) {
                (Some(parent), Some(index)) => (parent, index, index),
                _ => return Ok(()),
            }
        } else {
            let common = first.common_ancestor(last);
            match (first.get(common.len()), last.get(common.len())) {
                (Some(from), Some(to)) => (common, from, to),
                _ => return Ok(()),
            }
        };
        let wrapper = emptied(block);

        self.command(move |change| {
            change.insert_node_by_path(&parent, from, wrapper)?;
            let wrapper_path = parent.child(from);
            for i in 0..=(to - from) {
                change.move_node_by_path(&parent.child(from + 1), &wrapper_path, i)?;
            }
            Ok(())
        })
    }

    /// Lift the selected blocks out of their closest ancestor of
    /// `block_type`, splitting it where only part of it is selected
    pub fn unwrap_block(&mut self, block_type: &str) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        let document = self.document();
        let leaves: Vec<Key> = document
            .leaf_blocks_at_range(&range)
            .into_iter()
            .map(|(_, node)| node.key())
            .collect();
        let mut wrappers: Vec<Key> = Vec::new();
        for (path, _) in document.leaf_blocks_at_range(&range) {
            let wrapper = document
                .ancestors(&path)
                .into_iter()
                .rev()
                .find(|(_, node)| node.is_block() && node.node_type() == Some(block_type))
                .map(|(_, node)| node.key());
            if let Some(key) = wrapper.filter(|key| !wrappers.contains(key)) {
                wrappers.push(key);
            }
        }
        if wrappers.is_empty() {
            return Ok(());
        }

        self.command(move |change| {
            for wrapper in wrappers {
                let document = change.document();
                let wrapper_path = document.assert_path_by_key(wrapper)?;
                let leaf_paths: Vec<Path> = leaves
                    .iter()
                    .filter_map(|key| document.path_by_key(*key))
                    .collect();
                let selected: Vec<usize> = (0..document.assert_node(&wrapper_path)?.nodes().len())
                    .filter(|i| {
                        let child = wrapper_path.child(*i);
                        leaf_paths.iter().any(|leaf| child.is_ancestor_or_equal(leaf))
                    })
                    .collect();
                // Last first, so the wrapper keeps its key and its place
                for index in selected.into_iter().rev() {
                    let wrapper_path = change.document().assert_path_by_key(wrapper)?;
                    change.unwrap_node_by_path(&wrapper_path.child(index))?;
                }
            }
            Ok(())
        })
    }

    /// Wrap the selected content of each block in a copy of `inline`.
    /// A collapsed selection wraps nothing.
    pub fn wrap_inline(&mut self, inline: Node) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_collapsed() {
            return Ok(());
        }
        let start = range.start().clone();
        let end = range.end().clone();
        let blocks: Vec<Path> = self
            .document()
            .leaf_blocks_at_range(&range)
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        let inline = emptied(inline);

        self.command(move |change| {
            let mut first = true;
            // Later blocks first: splits only shift paths inside a block
            for block in blocks.iter().rev() {
                let document = change.document();
                let head = if block.is_ancestor(&start.path) {
                    Some(start.clone())
                } else {
                    document.first_text(block).map(|(path, _)| Point::new(path, 0))
                };
                let tail = if block.is_ancestor(&end.path) {
                    Some(end.clone())
                } else {
                    document
                        .last_text(block)
                        .map(|(path, text)| Point::new(path, text.len()))
                };
                let (Some(head), Some(tail)) = (head, tail) else {
                    continue;
                };
                if head == tail {
                    continue;
                }
                let depth = block.len();
                let (Some(from), Some(to)) = (head.path.get(depth), tail.path.get(depth)) else {
                    continue;
                };

                change.split_descendants_by_path(&block.child(to), &tail.path, tail.offset)?;
                change.split_descendants_by_path(&block.child(from), &head.path, head.offset)?;

                let wrapper = if first { inline.clone() } else { inline.regenerate_keys() };
                first = false;
                change.insert_node_by_path(block, from + 1, wrapper)?;
                let wrapper_path = block.child(from + 1);
                for i in 0..=(to - from) {
                    change.move_node_by_path(&block.child(from + 2), &wrapper_path, i)?;
                }
            }
            Ok(())
        })
    }

    /// Replace every inline of `inline_type` in the selection with its
    /// children
    pub fn unwrap_inline(&mut self, inline_type: &str) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        let document = self.document();
        let mut inlines: Vec<Key> = Vec::new();
        for (path, _) in document.texts_at_range(&range) {
            for (_, node) in document.ancestors(&path) {
                if node.is_inline() && node.node_type() == Some(inline_type) && !inlines.contains(&node.key()) {
                    inlines.push(node.key());
                }
            }
        }
        if inlines.is_empty() {
            return Ok(());
        }

        self.command(move |change| {
            for key in inlines {
                let Some(path) = change.document().path_by_key(key) else {
                    continue;
                };
                let (Some(parent), Some(index)) = (path.parent(), path.last()) else {
                    continue;
                };
                let count = change.document().assert_node(&path)?.nodes().len();
                for i in 0..count {
                    change.move_node_by_path(&parent.child(index + i).child(0), &parent, index + i)?;
                }
                change.remove_node_by_path(&parent.child(index + count))?;
            }
            Ok(())
        })
    }

    /// Set type and data on the leaf blocks in the selection
    pub fn set_blocks(&mut self, properties: NodeProperties) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        let paths: Vec<Path> = self
            .document()
            .leaf_blocks_at_range(&range)
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        self.command(move |change| {
            for path in &paths {
                change.set_node_by_path(path, properties.clone())?;
            }
            Ok(())
        })
    }

    /// Set type and data on the closest inlines in the selection
    pub fn set_inlines(&mut self, properties: NodeProperties) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        let paths: Vec<Path> = self
            .document()
            .inlines_at_range(&range)
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        self.command(move |change| {
            for path in &paths {
                change.set_node_by_path(path, properties.clone())?;
            }
            Ok(())
        })
    }
}
