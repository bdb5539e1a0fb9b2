//! # Tree Queries
//!
//! Read-only lookups over a node tree, addressed by path or key. All paths
//! are relative to the node the query is called on (normally the document).

use crate::visitor::{PathCollector, TextCollector};
use crate::{
    Element, Key, MarkSet, ModelError, ModelResult, Node, Path, Point, Range, Selection, Text,
};

impl Node {
    pub fn get(&self, path: &Path) -> Option<&Node> {
        self.descend(path.as_slice())
    }

    fn descend(&self, indices: &[usize]) -> Option<&Node> {
        match indices.split_first() {
            None => Some(self),
            Some((index, rest)) => self.nodes().get(*index)?.descend(rest),
        }
    }

    pub fn has_node(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    pub fn assert_node(&self, path: &Path) -> ModelResult<&Node> {
        self.get(path)
            .ok_or_else(|| ModelError::PathNotFound(path.clone()))
    }

    pub fn assert_text(&self, path: &Path) -> ModelResult<&Text> {
        self.assert_node(path)?
            .as_text()
            .ok_or_else(|| ModelError::NotText(path.clone()))
    }

    pub fn assert_element(&self, path: &Path) -> ModelResult<&Element> {
        self.assert_node(path)?
            .as_element()
            .ok_or_else(|| ModelError::NotElement(path.clone()))
    }

    pub fn path_by_key(&self, key: Key) -> Option<Path> {
        if self.key() == key {
            return Some(Path::root());
        }
        for (index, child) in self.nodes().iter().enumerate() {
            if let Some(path) = child.path_by_key(key) {
                let mut indices = vec![index];
                indices.extend_from_slice(path.as_slice());
                return Some(Path::new(indices));
            }
        }
        None
    }

    pub fn node_by_key(&self, key: Key) -> Option<&Node> {
        let path = self.path_by_key(key)?;
        self.get(&path)
    }

    pub fn assert_path_by_key(&self, key: Key) -> ModelResult<Path> {
        self.path_by_key(key).ok_or(ModelError::KeyNotFound(key))
    }

    pub fn parent_of(&self, path: &Path) -> Option<&Node> {
        self.get(&path.parent()?)
    }

    /// Ancestors of the node at `path`, root first, excluding the node
    pub fn ancestors(&self, path: &Path) -> Vec<(Path, &Node)> {
        path.ancestors()
            .filter_map(|p| self.get(&p).map(|node| (p, node)))
            .collect()
    }

    /// Nearest strict ancestor matching `predicate`
    pub fn closest<F>(&self, path: &Path, predicate: F) -> Option<(Path, &Node)>
    where
        F: Fn(&Node) -> bool,
    {
        self.ancestors(path)
            .into_iter()
            .rev()
            .find(|(_, node)| predicate(node))
    }

    /// Outermost strict ancestor matching `predicate`
    pub fn furthest<F>(&self, path: &Path, predicate: F) -> Option<(Path, &Node)>
    where
        F: Fn(&Node) -> bool,
    {
        self.ancestors(path)
            .into_iter()
            .find(|(_, node)| predicate(node))
    }

    pub fn closest_block(&self, path: &Path) -> Option<(Path, &Node)> {
        self.closest(path, Node::is_block)
    }

    pub fn closest_inline(&self, path: &Path) -> Option<(Path, &Node)> {
        self.closest(path, Node::is_inline)
    }

    /// Every path under (and including) `path`, pre-order
    pub fn paths_under(&self, path: &Path) -> Vec<Path> {
        match self.get(path) {
            Some(node) => PathCollector::collect(node, path),
            None => Vec::new(),
        }
    }

    /// Every text leaf in document order
    pub fn texts(&self) -> Vec<(Path, &Text)> {
        TextCollector::collect(self, &Path::root())
    }

    /// Text leaves inside the node at `path`
    pub fn texts_under(&self, path: &Path) -> Vec<(Path, &Text)> {
        match self.get(path) {
            Some(node) => TextCollector::collect(node, path),
            None => Vec::new(),
        }
    }

    /// First text inside (or at) `path`
    pub fn first_text(&self, path: &Path) -> Option<(Path, &Text)> {
        let node = self.get(path)?;
        match node {
            Node::Text(text) => Some((path.clone(), text)),
            _ => (0..node.nodes().len()).find_map(|i| self.first_text(&path.child(i))),
        }
    }

    /// Last text inside (or at) `path`
    pub fn last_text(&self, path: &Path) -> Option<(Path, &Text)> {
        let node = self.get(path)?;
        match node {
            Node::Text(text) => Some((path.clone(), text)),
            _ => (0..node.nodes().len())
                .rev()
                .find_map(|i| self.last_text(&path.child(i))),
        }
    }

    /// Closest text before the node at `path`, outside of it
    pub fn previous_text(&self, path: &Path) -> Option<(Path, &Text)> {
        let mut current = path.clone();
        loop {
            match current.previous() {
                Some(previous) => {
                    if let Some(found) = self.last_text(&previous) {
                        return Some(found);
                    }
                    current = previous;
                }
                None => current = current.parent()?,
            }
        }
    }

    /// Closest text after the node at `path`, outside of it
    pub fn next_text(&self, path: &Path) -> Option<(Path, &Text)> {
        let mut current = path.clone();
        loop {
            let parent = current.parent()?;
            let index = current.last()?;
            let siblings = self.get(&parent)?.nodes().len();
            if index + 1 < siblings {
                let next = parent.child(index + 1);
                if let Some(found) = self.first_text(&next) {
                    return Some(found);
                }
                current = next;
            } else {
                current = parent;
            }
        }
    }

    /// Texts touched by the range, in document order
    pub fn texts_at_range(&self, range: &Range) -> Vec<(Path, &Text)> {
        let start = &range.start().path;
        let end = &range.end().path;
        self.texts()
            .into_iter()
            .filter(|(path, _)| path >= start && path <= end)
            .collect()
    }

    /// Closest blocks of the texts in the range, deduplicated
    pub fn leaf_blocks_at_range(&self, range: &Range) -> Vec<(Path, &Node)> {
        let mut blocks: Vec<(Path, &Node)> = Vec::new();
        for (path, _) in self.texts_at_range(range) {
            if let Some((block_path, block)) = self.closest_block(&path) {
                if blocks.last().map_or(true, |(p, _)| *p != block_path) {
                    blocks.push((block_path, block));
                }
            }
        }
        blocks
    }

    /// Closest inlines of the texts in the range, deduplicated
    pub fn inlines_at_range(&self, range: &Range) -> Vec<(Path, &Node)> {
        let mut inlines: Vec<(Path, &Node)> = Vec::new();
        for (path, _) in self.texts_at_range(range) {
            if let Some((inline_path, inline)) = self.closest_inline(&path) {
                if !inlines.iter().any(|(p, _)| *p == inline_path) {
                    inlines.push((inline_path, inline));
                }
            }
        }
        inlines
    }

    /// Marks a character typed at `point` would receive
    pub fn insert_marks_at_point(&self, point: &Point) -> MarkSet {
        self.get(&point.path)
            .and_then(Node::as_text)
            .map(|text| text.marks_at(point.offset))
            .unwrap_or_default()
    }

    /// Per-text `(path, offset, length)` portions covered by the range
    pub fn text_portions(&self, range: &Range) -> Vec<(Path, usize, usize)> {
        let start = range.start();
        let end = range.end();
        self.texts_at_range(range)
            .into_iter()
            .filter_map(|(path, text)| {
                let from = if path == start.path { start.offset } else { 0 };
                let to = if path == end.path {
                    end.offset.min(text.len())
                } else {
                    text.len()
                };
                (from < to).then(|| (path, from, to - from))
            })
            .collect()
    }

    /// Union of marks over the range (insert marks when collapsed)
    pub fn marks_at_range(&self, range: &Range) -> MarkSet {
        if range.is_collapsed() {
            return self.insert_marks_at_point(&range.anchor);
        }
        let mut marks = MarkSet::new();
        for (path, offset, len) in self.text_portions(range) {
            if let Some(text) = self.get(&path).and_then(Node::as_text) {
                for (_, leaf) in text.runs(offset, len) {
                    marks = marks.union(&leaf.marks);
                }
            }
        }
        marks
    }

    /// Marks present on every character of the range
    pub fn active_marks_at_range(&self, range: &Range) -> MarkSet {
        if range.is_collapsed() {
            return self.insert_marks_at_point(&range.anchor);
        }
        let mut active: Option<MarkSet> = None;
        for (path, offset, len) in self.text_portions(range) {
            if let Some(text) = self.get(&path).and_then(Node::as_text) {
                for (_, leaf) in text.runs(offset, len) {
                    active = Some(match active {
                        None => leaf.marks.clone(),
                        Some(current) => current.intersection(&leaf.marks),
                    });
                }
            }
        }
        active.unwrap_or_default()
    }

    /// Copy of the content inside the range as a document, with fresh keys
    pub fn fragment_at_range(&self, range: &Range) -> Node {
        let start = range.start();
        let end = range.end();
        let sliced = slice_node(
            self,
            Some((start.path.as_slice(), start.offset)),
            Some((end.path.as_slice(), end.offset)),
        );
        let fragment = match sliced {
            Node::Document(_) => sliced,
            other => Node::document(vec![other]),
        };
        fragment.regenerate_keys()
    }

    /// Snap a point to an existing text leaf and clamp its offset.
    ///
    /// A point on an element moves to the start of the element's first
    /// text. A point on a missing node moves to the end of the closest
    /// preceding text, or the start of the closest following one. Returns
    /// None only when the tree has no texts at all.
    pub fn resolve_point(&self, point: &Point) -> Option<Point> {
        match self.get(&point.path) {
            Some(Node::Text(text)) => {
                return Some(Point::new(point.path.clone(), point.offset.min(text.len())))
            }
            Some(_) => {
                if let Some((path, _)) = self.first_text(&point.path) {
                    return Some(Point::new(path, 0));
                }
            }
            None => {}
        }
        let texts = self.texts();
        if let Some((path, text)) = texts.iter().rev().find(|(p, _)| *p < point.path) {
            return Some(Point::new(path.clone(), text.len()));
        }
        texts
            .iter()
            .find(|(p, _)| *p > point.path)
            .map(|(path, _)| Point::new(path.clone(), 0))
    }

    pub fn resolve_range(&self, range: &Range) -> Option<Range> {
        Some(Range::new(
            self.resolve_point(&range.anchor)?,
            self.resolve_point(&range.focus)?,
        ))
    }

    /// Resolve both ends of a selection, unsetting it if the tree is empty
    pub fn resolve_selection(&self, selection: &Selection) -> Selection {
        match selection.range().and_then(|r| self.resolve_range(&r)) {
            Some(range) => selection.with_range(range),
            None => Selection {
                anchor: None,
                focus: None,
                ..selection.clone()
            },
        }
    }
}

type Edge<'a> = Option<(&'a [usize], usize)>;

fn slice_node(node: &Node, start: Edge<'_>, end: Edge<'_>) -> Node {
    match node {
        Node::Text(text) => {
            let from = start.map_or(0, |(_, offset)| offset.min(text.len()));
            let to = end.map_or(text.len(), |(_, offset)| offset.min(text.len()));
            let leaves = text
                .runs(from, to.saturating_sub(from))
                .into_iter()
                .map(|(_, leaf)| leaf)
                .collect();
            Node::leaves(leaves)
        }
        _ => {
            let children = node.nodes();
            if children.is_empty() {
                return node.clone();
            }
            let last = children.len() - 1;
            let first_index = start
                .and_then(|(path, _)| path.first().copied())
                .unwrap_or(0)
                .min(last);
            let last_index = end
                .and_then(|(path, _)| path.first().copied())
                .unwrap_or(last)
                .min(last);

            let mut nodes = Vec::new();
            for index in first_index..=last_index {
                let child_start = if index == first_index {
                    start.map(|(path, offset)| (path.get(1..).unwrap_or(&[]), offset))
                } else {
                    None
                };
                let child_end = if index == last_index {
                    end.map(|(path, offset)| (path.get(1..).unwrap_or(&[]), offset))
                } else {
                    None
                };
                nodes.push(slice_node(&children[index], child_start, child_end));
            }

            let mut copy = node.clone();
            if let Some(element) = copy.element_mut() {
                element.nodes = nodes;
            }
            copy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;

    fn sample() -> Node {
        // <doc>
        //   <p>one</p>
        //   <quote><p>two<link>three</link>four</p></quote>
        //   <p>five</p>
        // </doc>
        Node::document(vec![
            Node::block("paragraph", vec![Node::new_text("one")]),
            Node::block(
                "quote",
                vec![Node::block(
                    "paragraph",
                    vec![
                        Node::new_text("two"),
                        Node::inline("link", vec![Node::new_text("three")]),
                        Node::new_text("four"),
                    ],
                )],
            ),
            Node::block("paragraph", vec![Node::new_text("five")]),
        ])
    }

    #[test]
    fn test_get_and_assert() {
        let doc = sample();
        assert_eq!(doc.get(&Path::from([1, 0, 1, 0])).unwrap().text(), "three");
        assert!(doc.get(&Path::from([5])).is_none());
        assert_eq!(
            doc.assert_text(&Path::from([1])),
            Err(ModelError::NotText(Path::from([1])))
        );
    }

    #[test]
    fn test_path_by_key() {
        let doc = sample();
        let key = doc.get(&Path::from([1, 0, 2])).unwrap().key();
        assert_eq!(doc.path_by_key(key), Some(Path::from([1, 0, 2])));
        assert_eq!(doc.path_by_key(Key::generate()), None);
    }

    #[test]
    fn test_closest_block_and_inline() {
        let doc = sample();
        let text = Path::from([1, 0, 1, 0]);

        let (block_path, block) = doc.closest_block(&text).unwrap();
        assert_eq!(block_path, Path::from([1, 0]));
        assert_eq!(block.node_type(), Some("paragraph"));

        let (inline_path, _) = doc.closest_inline(&text).unwrap();
        assert_eq!(inline_path, Path::from([1, 0, 1]));

        let (top, _) = doc.furthest(&text, Node::is_block).unwrap();
        assert_eq!(top, Path::from([1]));
    }

    #[test]
    fn test_previous_and_next_text() {
        let doc = sample();
        let (prev, _) = doc.previous_text(&Path::from([1, 0, 0])).unwrap();
        assert_eq!(prev, Path::from([0, 0]));

        let (next, _) = doc.next_text(&Path::from([1, 0, 2])).unwrap();
        assert_eq!(next, Path::from([2, 0]));

        assert!(doc.previous_text(&Path::from([0, 0])).is_none());
        assert!(doc.next_text(&Path::from([2, 0])).is_none());
    }

    #[test]
    fn test_leaf_blocks_at_range() {
        let doc = sample();
        let range = Range::new(Point::new([0, 0], 1), Point::new([1, 0, 2], 1));
        let blocks: Vec<Path> = doc
            .leaf_blocks_at_range(&range)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(blocks, vec![Path::from([0]), Path::from([1, 0])]);
    }

    #[test]
    fn test_fragment_at_range() {
        let doc = sample();
        let range = Range::new(Point::new([1, 0, 0], 1), Point::new([2, 0], 2));
        let fragment = doc.fragment_at_range(&range);

        assert!(fragment.is_document());
        assert_eq!(fragment.nodes().len(), 2);
        assert_eq!(fragment.text(), "wothreefourfi");
        assert_eq!(fragment.nodes()[0].node_type(), Some("quote"));
    }

    #[test]
    fn test_marks_at_range() {
        let mut doc = Node::document(vec![Node::block("paragraph", vec![Node::new_text("hello")])]);
        doc.get_mut(&[0, 0])
            .and_then(Node::text_mut)
            .unwrap()
            .add_mark(0, 2, &Mark::new("bold"));

        let range = Range::new(Point::new([0, 0], 0), Point::new([0, 0], 4));
        assert!(doc.marks_at_range(&range).has_type("bold"));
        assert!(doc.active_marks_at_range(&range).is_empty());

        let inside = Range::new(Point::new([0, 0], 0), Point::new([0, 0], 2));
        assert!(doc.active_marks_at_range(&inside).has_type("bold"));
    }

    #[test]
    fn test_resolve_point() {
        let doc = sample();

        // Offset clamped
        assert_eq!(
            doc.resolve_point(&Point::new([0, 0], 99)),
            Some(Point::new([0, 0], 3))
        );
        // Element → first text
        assert_eq!(
            doc.resolve_point(&Point::new([1], 4)),
            Some(Point::new([1, 0, 0], 0))
        );
        // Missing node → end of preceding text
        assert_eq!(
            doc.resolve_point(&Point::new([1, 0, 7], 2)),
            Some(Point::new([1, 0, 2], 4))
        );
        // Nothing precedes → start of following text
        let empty_first = Node::document(vec![
            Node::block("image", vec![]),
            Node::block("paragraph", vec![Node::new_text("x")]),
        ]);
        assert_eq!(
            empty_first.resolve_point(&Point::new([0, 0], 0)),
            Some(Point::new([1, 0], 0))
        );
        assert_eq!(
            Node::document(vec![]).resolve_point(&Point::new([0, 0], 0)),
            None
        );
    }
}
