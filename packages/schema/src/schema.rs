use crate::layer::SchemaLayer;
use crate::rule::ValidationContext;
use crate::violation::Violation;
use folio_model::{Node, Path, PathCollector};

/// Ordered schema layers: custom layers by descending priority (ties keep
/// insertion order), then the core layer.
#[derive(Debug, Clone)]
pub struct Schema {
    layers: Vec<SchemaLayer>,
    core: SchemaLayer,
}

impl Schema {
    /// Schema with only the core layer
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            core: SchemaLayer::core(),
        }
    }

    pub fn add_layer(&mut self, layer: SchemaLayer) {
        let position = self
            .layers
            .iter()
            .position(|existing| existing.priority() < layer.priority())
            .unwrap_or(self.layers.len());
        tracing::debug!(layer = layer.name(), priority = layer.priority(), "adding schema layer");
        self.layers.insert(position, layer);
    }

    pub fn with_layer(mut self, layer: SchemaLayer) -> Self {
        self.add_layer(layer);
        self
    }

    /// Every layer in evaluation order, core last
    pub fn layers(&self) -> impl Iterator<Item = &SchemaLayer> {
        self.layers.iter().chain(std::iter::once(&self.core))
    }

    pub fn layer(&self, name: &str) -> Option<&SchemaLayer> {
        self.layers().find(|layer| layer.name() == name)
    }

    /// First violation on `node`, which sits at `path`
    pub fn validate_node(&self, node: &Node, path: &Path) -> Option<Violation> {
        let ctx = ValidationContext { path, schema: self };
        let violation = self.layers().find_map(|layer| layer.validate(node, &ctx));
        if let Some(violation) = &violation {
            tracing::trace!(
                code = %violation.code,
                layer = %violation.layer,
                path = %path,
                "schema violation"
            );
        }
        violation
    }

    /// First violation on the node at `path` in `document`
    pub fn validate(&self, document: &Node, path: &Path) -> Option<Violation> {
        let node = document.get(path)?;
        self.validate_node(node, path)
    }

    /// First violation of every invalid node, in document order
    pub fn validate_all(&self, document: &Node) -> Vec<Violation> {
        PathCollector::collect(document, &Path::root())
            .into_iter()
            .filter_map(|path| self.validate(document, &path))
            .collect()
    }

    pub fn is_valid(&self, document: &Node) -> bool {
        PathCollector::collect(document, &Path::root())
            .iter()
            .all(|path| self.validate(document, path).is_none())
    }

    pub fn is_void(&self, node: &Node) -> bool {
        self.layers().any(|layer| layer.is_void(node))
    }

    /// Whether the node at `path` has a void ancestor
    pub fn has_void_parent(&self, document: &Node, path: &Path) -> bool {
        document
            .ancestors(path)
            .iter()
            .any(|(_, node)| self.is_void(node))
    }

    /// Closest void ancestor-or-self of `path`
    pub fn closest_void(&self, document: &Node, path: &Path) -> Option<Path> {
        if document.get(path).map_or(false, |node| self.is_void(node)) {
            return Some(path.clone());
        }
        document
            .closest(path, |node| self.is_void(node))
            .map(|(path, _)| path)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChildGroup, NodeMatcher, Rule, ViolationCode};

    #[test]
    fn test_layers_ordered_by_priority() {
        let schema = Schema::new()
            .with_layer(SchemaLayer::new("low").with_priority(1))
            .with_layer(SchemaLayer::new("high").with_priority(10))
            .with_layer(SchemaLayer::new("also-low").with_priority(1));

        let names: Vec<&str> = schema.layers().map(SchemaLayer::name).collect();
        assert_eq!(names, vec!["high", "low", "also-low", "core"]);
    }

    #[test]
    fn test_custom_layer_checked_before_core() {
        let schema = Schema::new().with_layer(SchemaLayer::new("quotes").rule(
            Rule::block("quote").nodes(vec![ChildGroup::of(NodeMatcher::block("paragraph"))]),
        ));
        let doc = Node::document(vec![Node::block("quote", vec![Node::new_text("text")])]);

        let violation = schema.validate(&doc, &Path::from([0])).unwrap();
        assert_eq!(violation.layer, "quotes");
        assert_eq!(violation.code, ViolationCode::ChildObjectInvalid);
    }

    #[test]
    fn test_void_queries() {
        let schema = Schema::new().with_layer(SchemaLayer::new("media").rule(Rule::inline("emoji").void()));
        let doc = Node::document(vec![Node::block(
            "paragraph",
            vec![
                Node::new_text(""),
                Node::inline("emoji", vec![Node::new_text("")]),
                Node::new_text(""),
            ],
        )]);

        assert!(schema.has_void_parent(&doc, &Path::from([0, 1, 0])));
        assert!(!schema.has_void_parent(&doc, &Path::from([0, 0])));
        assert_eq!(
            schema.closest_void(&doc, &Path::from([0, 1, 0])),
            Some(Path::from([0, 1]))
        );
        assert!(schema.is_valid(&doc));
    }

    #[test]
    fn test_validate_all_reports_each_node() {
        let schema = Schema::new();
        let doc = Node::document(vec![
            Node::block("paragraph", vec![]),
            Node::block("paragraph", vec![Node::new_text("a"), Node::new_text("b")]),
        ]);

        let codes: Vec<ViolationCode> = schema.validate_all(&doc).iter().map(|v| v.code).collect();
        assert_eq!(
            codes,
            vec![ViolationCode::ChildRequired, ViolationCode::AdjacentText]
        );
    }
}
