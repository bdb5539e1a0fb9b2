use folio_model::{Node, Object};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Predicate on one `data` entry of a node (None when the key is absent)
#[derive(Clone)]
pub enum DataPredicate {
    Present,
    Equals(serde_json::Value),
    OneOf(Vec<serde_json::Value>),
    String,
    Number,
    Bool,
    Pattern(Regex),
    Custom(Arc<dyn Fn(Option<&serde_json::Value>) -> bool + Send + Sync>),
}

impl DataPredicate {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Option<&serde_json::Value>) -> bool + Send + Sync + 'static,
    {
        DataPredicate::Custom(Arc::new(f))
    }

    pub fn test(&self, value: Option<&serde_json::Value>) -> bool {
        match self {
            DataPredicate::Present => value.is_some(),
            DataPredicate::Equals(expected) => value == Some(expected),
            DataPredicate::OneOf(options) => value.map_or(false, |v| options.contains(v)),
            DataPredicate::String => value.map_or(false, serde_json::Value::is_string),
            DataPredicate::Number => value.map_or(false, serde_json::Value::is_number),
            DataPredicate::Bool => value.map_or(false, serde_json::Value::is_boolean),
            DataPredicate::Pattern(re) => value
                .and_then(serde_json::Value::as_str)
                .map_or(false, |s| re.is_match(s)),
            DataPredicate::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for DataPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataPredicate::Present => f.write_str("Present"),
            DataPredicate::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            DataPredicate::OneOf(v) => f.debug_tuple("OneOf").field(v).finish(),
            DataPredicate::String => f.write_str("String"),
            DataPredicate::Number => f.write_str("Number"),
            DataPredicate::Bool => f.write_str("Bool"),
            DataPredicate::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            DataPredicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Which part of a matcher rejected a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Object,
    Type,
}

/// Selects nodes by object kind, type and data.
///
/// Empty `objects` or `types` lists accept anything.
#[derive(Debug, Clone, Default)]
pub struct NodeMatcher {
    pub objects: Vec<Object>,
    pub types: Vec<String>,
    pub data: Vec<(String, DataPredicate)>,
}

impl NodeMatcher {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn object(object: Object) -> Self {
        Self {
            objects: vec![object],
            ..Self::default()
        }
    }

    /// Nodes of one element type (any object kind)
    pub fn node_type(node_type: &str) -> Self {
        Self::types(&[node_type])
    }

    pub fn types(types: &[&str]) -> Self {
        Self {
            types: types.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn block(node_type: &str) -> Self {
        Self::node_type(node_type).with_object(Object::Block)
    }

    pub fn inline(node_type: &str) -> Self {
        Self::node_type(node_type).with_object(Object::Inline)
    }

    pub fn with_object(mut self, object: Object) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, predicate: DataPredicate) -> Self {
        self.data.push((key.into(), predicate));
        self
    }

    pub fn check(&self, node: &Node) -> Result<(), Mismatch> {
        if !self.objects.is_empty() && !self.objects.contains(&node.object()) {
            return Err(Mismatch::Object);
        }
        if !self.types.is_empty() {
            // Texts carry no type, so a typed matcher never accepts one
            let Some(node_type) = node.node_type() else {
                return Err(Mismatch::Object);
            };
            if !self.types.iter().any(|t| t == node_type) {
                return Err(Mismatch::Type);
            }
        }
        if !self.data.is_empty() {
            let data = node.data();
            let ok = self
                .data
                .iter()
                .all(|(key, predicate)| predicate.test(data.and_then(|d| d.get(key))));
            if !ok {
                return Err(Mismatch::Type);
            }
        }
        Ok(())
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.check(node).is_ok()
    }
}

/// Check a node against alternatives; the reported mismatch is `Object`
/// when no alternative accepts the node's object kind.
pub fn check_any(matchers: &[NodeMatcher], node: &Node) -> Result<(), Mismatch> {
    if matchers.is_empty() {
        return Ok(());
    }
    let mut mismatch = Mismatch::Object;
    for matcher in matchers {
        match matcher.check(node) {
            Ok(()) => return Ok(()),
            Err(Mismatch::Type) => mismatch = Mismatch::Type,
            Err(Mismatch::Object) => {}
        }
    }
    Err(mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::Data;
    use serde_json::json;

    #[test]
    fn test_matcher_object_and_type() {
        let paragraph = Node::block("paragraph", vec![]);
        let link = Node::inline("link", vec![]);
        let text = Node::new_text("x");

        let matcher = NodeMatcher::block("paragraph");
        assert!(matcher.matches(&paragraph));
        assert_eq!(matcher.check(&link), Err(Mismatch::Object));
        assert_eq!(matcher.check(&text), Err(Mismatch::Object));
        assert_eq!(
            matcher.check(&Node::block("quote", vec![])),
            Err(Mismatch::Type)
        );
    }

    #[test]
    fn test_check_any_reports_type_when_object_fits() {
        let matchers = [NodeMatcher::block("paragraph"), NodeMatcher::object(Object::Text)];
        assert_eq!(
            check_any(&matchers, &Node::block("quote", vec![])),
            Err(Mismatch::Type)
        );
        assert_eq!(
            check_any(&matchers, &Node::inline("link", vec![])),
            Err(Mismatch::Object)
        );
        assert!(check_any(&matchers, &Node::new_text("")).is_ok());
    }

    #[test]
    fn test_data_predicates() {
        let mut data = Data::new();
        data.insert("level".to_string(), json!(2));
        data.insert("href".to_string(), json!("https://example.com"));
        let node = Node::block("heading", vec![]).with_data(data);

        assert!(NodeMatcher::any()
            .with_data("level", DataPredicate::OneOf(vec![json!(1), json!(2)]))
            .matches(&node));
        assert!(NodeMatcher::any()
            .with_data("href", DataPredicate::Pattern(Regex::new("^https://").unwrap()))
            .matches(&node));
        assert!(!NodeMatcher::any()
            .with_data("missing", DataPredicate::Present)
            .matches(&node));
        assert!(NodeMatcher::any()
            .with_data("missing", DataPredicate::custom(|v| v.is_none()))
            .matches(&node));
    }
}
