use crate::{Node, Path, Text};

/// Visitor pattern for traversing a node tree in document order
///
/// The default implementation walks the entire tree. Override `visit_node`
/// to act on every node (call [`walk_node`] to keep descending), or
/// `visit_text` to act on leaves only.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &Node, path: &Path) {
        walk_node(self, node, path);
    }

    fn visit_text(&mut self, _text: &Text, _path: &Path) {
        // Texts end the walk
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node, path: &Path) {
    match node {
        Node::Text(text) => visitor.visit_text(text, path),
        Node::Document(_) | Node::Block(_) | Node::Inline(_) => {
            for (index, child) in node.nodes().iter().enumerate() {
                visitor.visit_node(child, &path.child(index));
            }
        }
    }
}

/// Collects every text leaf with its path
pub(crate) struct TextCollector<'a> {
    pub texts: Vec<(Path, &'a Text)>,
}

impl<'a> TextCollector<'a> {
    pub fn collect(node: &'a Node, path: &Path) -> Vec<(Path, &'a Text)> {
        let mut collector = TextCollector { texts: Vec::new() };
        collector.walk(node, path);
        collector.texts
    }

    // The Visitor trait hands out short-lived borrows, so collecting
    // references tied to the tree lifetime needs its own walk.
    fn walk(&mut self, node: &'a Node, path: &Path) {
        match node {
            Node::Text(text) => self.texts.push((path.clone(), text)),
            _ => {
                for (index, child) in node.nodes().iter().enumerate() {
                    self.walk(child, &path.child(index));
                }
            }
        }
    }
}

/// Collects every path in the tree (pre-order, including the start node)
#[derive(Default)]
pub struct PathCollector {
    pub paths: Vec<Path>,
}

impl Visitor for PathCollector {
    fn visit_node(&mut self, node: &Node, path: &Path) {
        self.paths.push(path.clone());
        walk_node(self, node, path);
    }

    fn visit_text(&mut self, _text: &Text, _path: &Path) {}
}

impl PathCollector {
    pub fn collect(node: &Node, path: &Path) -> Vec<Path> {
        let mut collector = PathCollector::default();
        collector.visit_node(node, path);
        collector.paths
    }
}
