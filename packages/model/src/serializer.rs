//! # Portable JSON
//!
//! ```json
//! {
//!   "object": "value",
//!   "document": { "object": "document", "data": {}, "nodes": [ ... ] },
//!   "selection": { "anchor": { "path": [0, 0], "offset": 0 }, "focus": ..., "isFocused": false, "marks": null }
//! }
//! ```
//!
//! Blocks and inlines are `{ "object", "type", "data", "nodes" }`, texts are
//! `{ "object": "text", "leaves": [{ "object": "leaf", "text", "marks" }] }`.
//! Keys are written only when `preserve_keys` is set. Keys read back are
//! adopted so later generated keys never collide with them.

use crate::{
    Data, Element, Key, Leaf, Mark, MarkSet, ModelError, ModelResult, Node, Object, Selection,
    Text, Value,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializeOptions {
    #[serde(default)]
    pub preserve_keys: bool,
}

impl SerializeOptions {
    pub fn preserve_keys() -> Self {
        Self {
            preserve_keys: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Serializer {
    options: SerializeOptions,
}

impl Serializer {
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> SerializeOptions {
        self.options
    }

    pub fn value_to_json(&self, value: &Value) -> serde_json::Value {
        let json = JsonValue {
            object: "value".to_string(),
            document: self.node_to_raw(&value.document),
            selection: Some(value.selection.clone()),
            data: value.data.clone(),
        };
        serde_json::to_value(json).unwrap_or(serde_json::Value::Null)
    }

    pub fn node_to_json(&self, node: &Node) -> serde_json::Value {
        serde_json::to_value(self.node_to_raw(node)).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_string(&self, value: &Value) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(&self.value_to_json(value))?)
    }

    pub fn value_from_json(&self, json: serde_json::Value) -> ModelResult<Value> {
        let raw: JsonValue = serde_json::from_value(json)?;
        if raw.object != "value" {
            return Err(ModelError::Deserialize(format!(
                "expected object \"value\", found \"{}\"",
                raw.object
            )));
        }
        let document = self.node_from_raw(raw.document)?;
        if !document.is_document() {
            return Err(ModelError::Deserialize(
                "value.document must be a document node".to_string(),
            ));
        }
        let mut value = Value::new(document);
        value.data = raw.data;
        if let Some(selection) = raw.selection {
            value.selection = selection;
        }
        Ok(value)
    }

    pub fn node_from_json(&self, json: serde_json::Value) -> ModelResult<Node> {
        let raw: JsonNode = serde_json::from_value(json)?;
        self.node_from_raw(raw)
    }

    pub fn from_str(&self, source: &str) -> ModelResult<Value> {
        let json: serde_json::Value = serde_json::from_str(source)?;
        self.value_from_json(json)
    }

    fn key_out(&self, key: Key) -> Option<u64> {
        self.options.preserve_keys.then(|| key.as_u64())
    }

    fn key_in(&self, key: Option<u64>) -> Key {
        match key {
            Some(raw) if self.options.preserve_keys => Key::adopt(raw),
            _ => Key::generate(),
        }
    }

    fn node_to_raw(&self, node: &Node) -> JsonNode {
        match node {
            Node::Text(text) => JsonNode::Text {
                key: self.key_out(text.key),
                leaves: text.leaves().iter().map(JsonLeaf::from).collect(),
            },
            Node::Document(element) => JsonNode::Document(self.element_to_raw(element)),
            Node::Block(element) => JsonNode::Block(self.element_to_raw(element)),
            Node::Inline(element) => JsonNode::Inline(self.element_to_raw(element)),
        }
    }

    fn element_to_raw(&self, element: &Element) -> JsonElement {
        JsonElement {
            key: self.key_out(element.key),
            node_type: element.node_type.clone(),
            data: element.data.clone(),
            nodes: element.nodes.iter().map(|n| self.node_to_raw(n)).collect(),
        }
    }

    fn node_from_raw(&self, raw: JsonNode) -> ModelResult<Node> {
        let (object, raw) = match raw {
            JsonNode::Text { key, leaves } => {
                let leaves = leaves.into_iter().map(Leaf::from).collect();
                return Ok(Node::Text(std::sync::Arc::new(Text::from_leaves(
                    self.key_in(key),
                    leaves,
                ))));
            }
            JsonNode::Document(raw) => (Object::Document, raw),
            JsonNode::Block(raw) => (Object::Block, raw),
            JsonNode::Inline(raw) => (Object::Inline, raw),
        };
        let nodes = raw
            .nodes
            .into_iter()
            .map(|n| self.node_from_raw(n))
            .collect::<ModelResult<Vec<_>>>()?;
        if object != Object::Document && raw.node_type.is_empty() {
            return Err(ModelError::Deserialize(format!(
                "{} node is missing a type",
                object.as_str()
            )));
        }
        let element = Element {
            key: self.key_in(raw.key),
            node_type: raw.node_type,
            data: raw.data,
            nodes,
        };
        Ok(Node::element(object, element))
    }
}

/// Nodes embedded in other serialized structures (operations, fixtures)
/// always carry their keys, so replaying them is deterministic.
impl Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serializer::new(SerializeOptions::preserve_keys())
            .node_to_raw(self)
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = JsonNode::deserialize(deserializer)?;
        Serializer::new(SerializeOptions::preserve_keys())
            .node_from_raw(raw)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize)]
struct JsonValue {
    object: String,
    document: JsonNode,
    #[serde(default)]
    selection: Option<Selection>,
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    data: Data,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "lowercase")]
enum JsonNode {
    Document(JsonElement),
    Block(JsonElement),
    Inline(JsonElement),
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<u64>,
        #[serde(default)]
        leaves: Vec<JsonLeaf>,
    },
}

#[derive(Serialize, Deserialize)]
struct JsonElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<u64>,
    #[serde(rename = "type", default)]
    node_type: String,
    #[serde(default)]
    data: Data,
    #[serde(default)]
    nodes: Vec<JsonNode>,
}

#[derive(Serialize, Deserialize)]
struct JsonLeaf {
    #[serde(default = "leaf_object")]
    object: String,
    text: String,
    #[serde(default)]
    marks: Vec<JsonMark>,
}

#[derive(Serialize, Deserialize)]
struct JsonMark {
    #[serde(default = "mark_object")]
    object: String,
    #[serde(rename = "type")]
    mark_type: String,
    #[serde(default)]
    data: Data,
}

fn leaf_object() -> String {
    "leaf".to_string()
}

fn mark_object() -> String {
    "mark".to_string()
}

impl From<&Leaf> for JsonLeaf {
    fn from(leaf: &Leaf) -> Self {
        JsonLeaf {
            object: leaf_object(),
            text: leaf.text.clone(),
            marks: leaf
                .marks
                .iter()
                .map(|mark| JsonMark {
                    object: mark_object(),
                    mark_type: mark.mark_type.clone(),
                    data: mark.data.clone(),
                })
                .collect(),
        }
    }
}

impl From<JsonLeaf> for Leaf {
    fn from(raw: JsonLeaf) -> Self {
        let marks: MarkSet = raw
            .marks
            .into_iter()
            .map(|m| Mark::new(m.mark_type).with_data(m.data))
            .collect();
        Leaf::new(raw.text, marks)
    }
}
