//! # Document Nodes
//!
//! Persistent, structurally shared node tree.
//!
//! ```text
//! Document ── Block ── Block ── Text
//!                 └─── Inline ── Text
//! ```
//!
//! Every variant wraps its payload in an `Arc`. Cloning a node is a pointer
//! copy; the `*_mut` accessors use `Arc::make_mut`, so editing a shared node
//! first copies it (and only it), leaving every other holder of the old
//! tree untouched.

use crate::{Data, Key, Leaf, MarkSet, Text};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Object {
    Document,
    Block,
    Inline,
    Text,
}

impl Object {
    pub fn as_str(self) -> &'static str {
        match self {
            Object::Document => "document",
            Object::Block => "block",
            Object::Inline => "inline",
            Object::Text => "text",
        }
    }
}

/// Payload shared by document, block and inline nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Key,
    pub node_type: String,
    pub data: Data,
    pub nodes: Vec<Node>,
}

impl Element {
    pub fn new(node_type: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            key: Key::generate(),
            node_type: node_type.into(),
            data: Data::new(),
            nodes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document(Arc<Element>),
    Block(Arc<Element>),
    Inline(Arc<Element>),
    Text(Arc<Text>),
}

/// Patchable node properties.
///
/// Used by `set_node` (type, data) and by `split_node`/`merge_node`, which
/// also carry the key of the node they create or remove.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
}

impl NodeProperties {
    pub fn node_type(node_type: impl Into<String>) -> Self {
        Self {
            node_type: Some(node_type.into()),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.node_type.is_none() && self.data.is_none() && self.key.is_none()
    }
}

impl Node {
    pub fn document(nodes: Vec<Node>) -> Node {
        Node::Document(Arc::new(Element::new("", nodes)))
    }

    pub fn block(node_type: impl Into<String>, nodes: Vec<Node>) -> Node {
        Node::Block(Arc::new(Element::new(node_type, nodes)))
    }

    pub fn inline(node_type: impl Into<String>, nodes: Vec<Node>) -> Node {
        Node::Inline(Arc::new(Element::new(node_type, nodes)))
    }

    pub fn new_text(text: &str) -> Node {
        Node::Text(Arc::new(Text::new(text)))
    }

    pub fn text_with_marks(text: &str, marks: MarkSet) -> Node {
        Node::leaves(vec![Leaf::new(text, marks)])
    }

    pub fn leaves(leaves: Vec<Leaf>) -> Node {
        Node::Text(Arc::new(Text::from_leaves(Key::generate(), leaves)))
    }

    /// Build an element node of the given object kind
    pub fn element(object: Object, element: Element) -> Node {
        let element = Arc::new(element);
        match object {
            Object::Document => Node::Document(element),
            Object::Block => Node::Block(element),
            Object::Inline => Node::Inline(element),
            Object::Text => Node::Text(Arc::new(Text::from_leaves(element.key, Vec::new()))),
        }
    }

    pub fn with_data(mut self, data: Data) -> Node {
        if let Some(element) = self.element_mut() {
            element.data = data;
        }
        self
    }

    pub fn with_key(mut self, key: Key) -> Node {
        self.set_key(key);
        self
    }

    pub fn object(&self) -> Object {
        match self {
            Node::Document(_) => Object::Document,
            Node::Block(_) => Object::Block,
            Node::Inline(_) => Object::Inline,
            Node::Text(_) => Object::Text,
        }
    }

    pub fn key(&self) -> Key {
        match self {
            Node::Document(e) | Node::Block(e) | Node::Inline(e) => e.key,
            Node::Text(t) => t.key,
        }
    }

    /// Element type; texts have none
    pub fn node_type(&self) -> Option<&str> {
        self.as_element().map(|e| e.node_type.as_str())
    }

    pub fn data(&self) -> Option<&Data> {
        self.as_element().map(|e| &e.data)
    }

    /// Children (always empty for texts)
    pub fn nodes(&self) -> &[Node] {
        match self.as_element() {
            Some(element) => &element.nodes,
            None => &[],
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.nodes().get(index)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Document(e) | Node::Block(e) | Node::Inline(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn is_element(&self) -> bool {
        !self.is_text()
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Node::Block(_))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Node::Inline(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Node::Document(_))
    }

    /// Concatenated text of every descendant leaf
    pub fn text(&self) -> String {
        match self {
            Node::Text(t) => t.text(),
            _ => self.nodes().iter().map(Node::text).collect(),
        }
    }

    /// Length of [`Node::text`] in characters
    pub fn text_len(&self) -> usize {
        match self {
            Node::Text(t) => t.len(),
            _ => self.nodes().iter().map(Node::text_len).sum(),
        }
    }

    /// Length used by split/merge positions: characters for texts, child
    /// count for elements.
    pub fn split_len(&self) -> usize {
        match self {
            Node::Text(t) => t.len(),
            _ => self.nodes().len(),
        }
    }

    /// Copy-on-write access to an element payload
    pub fn element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Document(e) | Node::Block(e) | Node::Inline(e) => Some(Arc::make_mut(e)),
            Node::Text(_) => None,
        }
    }

    /// Copy-on-write access to a text payload
    pub fn text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(t) => Some(Arc::make_mut(t)),
            _ => None,
        }
    }

    /// Copy-on-write access to the node at a relative path
    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => self.element_mut()?.nodes.get_mut(*index)?.get_mut(rest),
        }
    }

    pub fn properties(&self) -> NodeProperties {
        NodeProperties {
            node_type: self.node_type().map(str::to_string),
            data: self.data().cloned(),
            key: Some(self.key()),
        }
    }

    /// Apply every property that is set
    pub fn apply_properties(&mut self, properties: &NodeProperties) {
        if let Some(key) = properties.key {
            self.set_key(key);
        }
        if let Some(element) = self.element_mut() {
            if let Some(node_type) = &properties.node_type {
                element.node_type = node_type.clone();
            }
            if let Some(data) = &properties.data {
                element.data = data.clone();
            }
        }
    }

    /// Empty node of the same kind carrying `properties`.
    ///
    /// Used when splitting: the new right-hand node starts empty and then
    /// receives the tail of the original.
    pub fn empty_like(&self, properties: &NodeProperties) -> Node {
        let mut node = match self {
            Node::Text(_) => Node::leaves(Vec::new()),
            Node::Document(e) | Node::Block(e) | Node::Inline(e) => {
                let mut element = Element::new(e.node_type.clone(), Vec::new());
                element.data = e.data.clone();
                Node::element(self.object(), element)
            }
        };
        node.apply_properties(properties);
        node
    }

    fn set_key(&mut self, key: Key) {
        match self {
            Node::Document(e) | Node::Block(e) | Node::Inline(e) => Arc::make_mut(e).key = key,
            Node::Text(t) => Arc::make_mut(t).key = key,
        }
    }

    /// Deep copy with freshly generated keys
    pub fn regenerate_keys(&self) -> Node {
        match self {
            Node::Text(t) => Node::Text(Arc::new(Text::from_leaves(
                Key::generate(),
                t.leaves().to_vec(),
            ))),
            _ => {
                let mut node = self.clone();
                if let Some(element) = node.element_mut() {
                    element.key = Key::generate();
                    element.nodes = element.nodes.iter().map(Node::regenerate_keys).collect();
                }
                node
            }
        }
    }

    /// Structural equality ignoring keys
    pub fn content_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(a), Node::Text(b)) => a.leaves() == b.leaves(),
            (a, b) if a.object() == b.object() => {
                let (Some(ea), Some(eb)) = (a.as_element(), b.as_element()) else {
                    return false;
                };
                ea.node_type == eb.node_type
                    && ea.data == eb.data
                    && ea.nodes.len() == eb.nodes.len()
                    && ea.nodes.iter().zip(&eb.nodes).all(|(x, y)| x.content_eq(y))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_shares_until_mutated() {
        let original = Node::block("paragraph", vec![Node::new_text("one"), Node::new_text("two")]);
        let mut edited = original.clone();

        edited
            .get_mut(&[1])
            .and_then(Node::text_mut)
            .unwrap()
            .insert_text(3, "!", &MarkSet::new());

        assert_eq!(original.text(), "onetwo");
        assert_eq!(edited.text(), "onetwo!");

        // The untouched child is still shared
        let (Node::Text(a), Node::Text(b)) = (&original.nodes()[0], &edited.nodes()[0]) else {
            panic!("expected texts");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_properties_round_trip() {
        let mut data = Data::new();
        data.insert("level".to_string(), json!(2));
        let node = Node::block("heading", vec![Node::new_text("Title")]).with_data(data.clone());

        let props = node.properties();
        assert_eq!(props.node_type.as_deref(), Some("heading"));
        assert_eq!(props.data, Some(data));

        let mut other = Node::block("paragraph", vec![]);
        other.apply_properties(&NodeProperties::node_type("heading"));
        assert_eq!(other.node_type(), Some("heading"));
    }

    #[test]
    fn test_regenerate_keys_keeps_content() {
        let node = Node::block("paragraph", vec![Node::new_text("x")]);
        let copy = node.regenerate_keys();

        assert_ne!(node.key(), copy.key());
        assert_ne!(node.nodes()[0].key(), copy.nodes()[0].key());
        assert!(node.content_eq(&copy));
        assert_ne!(node, copy);
    }

    #[test]
    fn test_empty_like() {
        let node = Node::block("quote", vec![Node::new_text("x")]);
        let key = Key::generate();
        let empty = node.empty_like(&NodeProperties::default().with_key(key));

        assert_eq!(empty.node_type(), Some("quote"));
        assert_eq!(empty.key(), key);
        assert!(empty.nodes().is_empty());
    }
}
