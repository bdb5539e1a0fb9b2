use crate::change::Change;
use crate::errors::EditorResult;
use folio_model::{Key, Node, Path, Point, Range};
use unicode_segmentation::UnicodeSegmentation;

/// Character offsets of every grapheme boundary in `text`
fn grapheme_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries = vec![0];
    let mut offset = 0;
    for grapheme in text.graphemes(true) {
        offset += grapheme.chars().count();
        boundaries.push(offset);
    }
    boundaries
}

fn previous_boundary(text: &str, offset: usize) -> usize {
    grapheme_boundaries(text)
        .into_iter()
        .rev()
        .find(|boundary| *boundary < offset)
        .unwrap_or(0)
}

fn next_boundary(text: &str, offset: usize) -> usize {
    grapheme_boundaries(text)
        .into_iter()
        .find(|boundary| *boundary > offset)
        .unwrap_or(offset)
}

/// Roots of the subtrees strictly between two texts, in document order
fn nodes_between(document: &Node, start: &Path, end: &Path) -> Vec<Path> {
    let common = start.common_ancestor(end);
    let depth = common.len();
    let (Some(first), Some(last)) = (start.get(depth), end.get(depth)) else {
        return Vec::new();
    };
    let count_under = |parent: &Path| document.get(parent).map_or(0, |node| node.nodes().len());

    let mut paths = Vec::new();
    for level in (depth + 1..start.len()).rev() {
        let parent = Path::from(&start.as_slice()[..level]);
        let index = start.as_slice()[level];
        paths.extend((index + 1..count_under(&parent)).map(|i| parent.child(i)));
    }
    paths.extend((first + 1..last).map(|i| common.child(i)));
    for level in depth + 1..end.len() {
        let parent = Path::from(&end.as_slice()[..level]);
        paths.extend((0..end.as_slice()[level]).map(|i| parent.child(i)));
    }
    paths
}

/// Give an empty element a text child so the cursor has somewhere to go
fn with_text_child(mut node: Node) -> Node {
    if node.nodes().is_empty() {
        if let Some(element) = node.element_mut() {
            element.nodes.push(Node::new_text(""));
        }
    }
    node
}

fn is_leaf_block(node: &Node) -> bool {
    node.is_block() && node.nodes().first().map_or(true, |child| !child.is_block())
}

impl Change {
    /// Insert text at the cursor, replacing the selection if expanded.
    /// Pending marks win over the marks at the cursor.
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.command(|change| {
            if change.selection().is_expanded() {
                change.delete()?;
            }
            let Some(point) = change.selection().start() else {
                return Ok(());
            };
            if change.schema().has_void_parent(change.document(), &point.path) {
                return Ok(());
            }
            let marks = match &change.selection().marks {
                Some(marks) => marks.clone(),
                None => change.document().insert_marks_at_point(&point),
            };
            change.insert_text_by_path(&point.path, point.offset, text, Some(marks))
        })
    }

    /// Delete the selected content and collapse to where it started
    pub fn delete(&mut self) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_collapsed() {
            return Ok(());
        }
        self.command(|change| {
            change.delete_at_range(&range)?;
            change.collapse_to_start()
        })
    }

    /// Delete the content of `range`. Blocks cut at either edge are joined,
    /// and containers emptied by the join are removed.
    pub fn delete_at_range(&mut self, range: &Range) -> EditorResult<()> {
        if range.is_collapsed() {
            return Ok(());
        }
        let start = range.start().clone();
        let end = range.end().clone();
        tracing::debug!(start = %start.path, end = %end.path, "delete at range");

        self.command(|change| {
            if start.path == end.path {
                return match change.schema().closest_void(change.document(), &start.path) {
                    Some(void) => change.remove_node_by_path(&void),
                    None => change.remove_text_by_path(&start.path, start.offset, end.offset - start.offset),
                };
            }

            let document = change.document();
            let start_block = document.closest_block(&start.path).map(|(_, node)| node.key());
            let end_block = document.closest_block(&end.path).map(|(_, node)| node.key());
            let start_void = change.schema().closest_void(document, &start.path);
            let end_void = change.schema().closest_void(document, &end.path);

            // Trim the edges first: text edits never move paths
            if end_void.is_none() {
                change.remove_text_by_path(&end.path, 0, end.offset)?;
            }
            if start_void.is_none() {
                let len = change.document().assert_text(&start.path)?.len();
                change.remove_text_by_path(&start.path, start.offset, len.saturating_sub(start.offset))?;
            }

            // Voids at either edge go whole. Reverse document order keeps
            // the remaining paths valid.
            let mut doomed = nodes_between(change.document(), &start.path, &end.path);
            doomed.extend(start_void);
            doomed.extend(end_void);
            doomed.sort();
            doomed.dedup();
            for path in doomed.iter().rev() {
                change.remove_node_by_path(path)?;
            }

            match (start_block, end_block) {
                (Some(start_block), Some(end_block)) if start_block != end_block => {
                    change.join_blocks(start_block, end_block)
                }
                _ => Ok(()),
            }
        })
    }

    /// Pull the content of `end` into `start`, then remove `end` and any
    /// containers it leaves empty
    fn join_blocks(&mut self, start: Key, end: Key) -> EditorResult<()> {
        let document = self.document();
        let (Some(start_path), Some(end_path)) = (document.path_by_key(start), document.path_by_key(end)) else {
            return Ok(());
        };
        if start_path.next().as_ref() == Some(&end_path) {
            return self.merge_node_by_path(&end_path);
        }

        let count = document.assert_node(&end_path)?.nodes().len();
        let offset = document.assert_node(&start_path)?.nodes().len();
        for i in 0..count {
            self.move_node_by_path(&end_path.child(0), &start_path, offset + i)?;
        }

        let document = self.document();
        let end_path = document.assert_path_by_key(end)?;
        let mut doomed = end_path;
        while let Some(parent) = doomed.parent() {
            let only_child = document.get(&parent).map_or(false, |node| node.nodes().len() == 1);
            if parent.is_root() || parent.is_ancestor(&start_path) || !only_child {
                break;
            }
            doomed = parent;
        }
        self.remove_node_by_path(&doomed)
    }

    /// Delete one grapheme before the cursor. At the start of a block the
    /// block joins the previous one; a void before the cursor is removed.
    pub fn delete_backward(&mut self) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_expanded() {
            return self.delete();
        }
        let point = range.anchor;
        self.command(|change| {
            let document = change.document();
            if let Some(void) = change.schema().closest_void(document, &point.path) {
                return change.remove_node_by_path(&void);
            }
            if point.offset > 0 {
                let text = document.assert_text(&point.path)?.text();
                let start = previous_boundary(&text, point.offset);
                return change.remove_text_by_path(&point.path, start, point.offset - start);
            }

            let block = document.closest_block(&point.path).map(|(path, _)| path);
            let mut current = point.path.clone();
            loop {
                let Some((previous, text)) = document.previous_text(&current) else {
                    return Ok(());
                };
                if let Some(void) = change.schema().closest_void(document, &previous) {
                    return change.remove_node_by_path(&void);
                }
                let previous_block = document.closest_block(&previous).map(|(path, _)| path);
                if previous_block != block {
                    let range = Range::new(Point::new(previous, text.len()), point.clone());
                    return change.delete_at_range(&range);
                }
                if !text.is_empty() {
                    let text = text.text();
                    let len = text.chars().count();
                    let start = previous_boundary(&text, len);
                    return change.remove_text_by_path(&previous, start, len - start);
                }
                current = previous;
            }
        })
    }

    /// Delete one grapheme after the cursor, joining the next block in
    /// when the cursor is at the end of its own
    pub fn delete_forward(&mut self) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_expanded() {
            return self.delete();
        }
        let point = range.anchor;
        self.command(|change| {
            let document = change.document();
            if let Some(void) = change.schema().closest_void(document, &point.path) {
                return change.remove_node_by_path(&void);
            }
            let text = document.assert_text(&point.path)?.text();
            if point.offset < text.chars().count() {
                let end = next_boundary(&text, point.offset);
                return change.remove_text_by_path(&point.path, point.offset, end - point.offset);
            }

            let block = document.closest_block(&point.path).map(|(path, _)| path);
            let mut current = point.path.clone();
            loop {
                let Some((next, text)) = document.next_text(&current) else {
                    return Ok(());
                };
                if let Some(void) = change.schema().closest_void(document, &next) {
                    return change.remove_node_by_path(&void);
                }
                let next_block = document.closest_block(&next).map(|(path, _)| path);
                if next_block != block {
                    let range = Range::new(point.clone(), Point::new(next, 0));
                    return change.delete_at_range(&range);
                }
                if !text.is_empty() {
                    let end = next_boundary(&text.text(), 0);
                    return change.remove_text_by_path(&next, 0, end);
                }
                current = next;
            }
        })
    }

    /// Insert `block` at the cursor. Inside a block the block is split
    /// first; at either edge the new block goes before or after it.
    pub fn insert_block(&mut self, block: Node) -> EditorResult<()> {
        let block = with_text_child(block);
        self.command(|change| {
            if change.selection().is_expanded() {
                change.delete()?;
            }
            let Some(point) = change.selection().start() else {
                return Ok(());
            };
            let document = change.document();
            let Some((block_path, current)) = document.closest_block(&point.path) else {
                return Ok(());
            };
            let (Some(parent), Some(index)) = (block_path.parent(), block_path.last()) else {
                return Ok(());
            };
            let at_start = point.offset == 0
                && document.first_text(&block_path).map(|(path, _)| path) == Some(point.path.clone());
            let at_end = document
                .last_text(&block_path)
                .map_or(false, |(path, text)| path == point.path && point.offset == text.len());

            let insert_at = if change.schema().is_void(current) || at_end {
                index + 1
            } else if at_start {
                index
            } else {
                change.split_descendants_by_path(&block_path, &point.path, point.offset)?;
                index + 1
            };
            change.insert_node_by_path(&parent, insert_at, block)?;

            if let Some((path, _)) = change.document().first_text(&parent.child(insert_at)) {
                change.move_to(Point::new(path, 0))?;
            }
            Ok(())
        })
    }

    /// Insert `inline` at the cursor, splitting the text around it. The
    /// cursor ends up just after the inline.
    pub fn insert_inline(&mut self, inline: Node) -> EditorResult<()> {
        let inline = with_text_child(inline);
        self.command(|change| {
            if change.selection().is_expanded() {
                change.delete()?;
            }
            let Some(point) = change.selection().start() else {
                return Ok(());
            };
            if change.schema().has_void_parent(change.document(), &point.path) {
                return Ok(());
            }
            let (Some(parent), Some(index)) = (point.path.parent(), point.path.last()) else {
                return Ok(());
            };
            change.split_node_by_path(&point.path, point.offset)?;
            change.insert_node_by_path(&parent, index + 1, inline)?;
            change.move_to(Point::new(parent.child(index + 2), 0))
        })
    }

    /// Insert a document fragment at the cursor. A fragment of one block
    /// is inlined into the current block; with several, the current block
    /// is split and the outer fragment blocks join its two halves.
    pub fn insert_fragment(&mut self, fragment: &Node) -> EditorResult<()> {
        let fragment = fragment.regenerate_keys();
        let blocks: Vec<&Node> = fragment.nodes().iter().filter(|node| node.is_block()).collect();
        let single = match blocks.as_slice() {
            [] => Some(fragment.nodes().to_vec()),
            [block] if is_leaf_block(block) => Some(block.nodes().to_vec()),
            _ => None,
        };
        if fragment.texts().is_empty() {
            return Ok(());
        }

        self.command(|change| {
            if change.selection().is_expanded() {
                change.delete()?;
            }
            let Some(point) = change.selection().start() else {
                return Ok(());
            };
            if change.schema().has_void_parent(change.document(), &point.path) {
                return Ok(());
            }

            if let Some(children) = single {
                let (Some(parent), Some(index)) = (point.path.parent(), point.path.last()) else {
                    return Ok(());
                };
                change.split_node_by_path(&point.path, point.offset)?;
                let count = children.len();
                for (i, child) in children.into_iter().enumerate() {
                    change.insert_node_by_path(&parent, index + 1 + i, child)?;
                }
                if let Some((path, text)) = change.document().last_text(&parent.child(index + count)) {
                    let end = Point::new(path, text.len());
                    change.move_to(end)?;
                }
                return Ok(());
            }

            let Some((block_path, _)) = change.document().closest_block(&point.path) else {
                return Ok(());
            };
            let (Some(parent), Some(index)) = (block_path.parent(), block_path.last()) else {
                return Ok(());
            };
            change.split_descendants_by_path(&block_path, &point.path, point.offset)?;
            let nodes = fragment.nodes().to_vec();
            let count = nodes.len();
            let joins_head = nodes.first().map_or(false, is_leaf_block);
            let joins_tail = nodes.last().map_or(false, is_leaf_block);
            for (i, node) in nodes.into_iter().enumerate() {
                change.insert_node_by_path(&parent, index + 1 + i, node)?;
            }
            if let Some((path, text)) = change.document().last_text(&parent.child(index + count)) {
                let end = Point::new(path, text.len());
                change.move_to(end)?;
            }
            if joins_tail {
                change.merge_node_by_path(&parent.child(index + count + 1))?;
            }
            if joins_head {
                change.merge_node_by_path(&parent.child(index + 1))?;
            }
            Ok(())
        })
    }
}
