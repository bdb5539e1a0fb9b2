use crate::invariants;
use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::Violation;
use folio_model::Node;
use std::sync::Arc;

/// Name of the built-in layer
pub const CORE_LAYER: &str = "core";

/// Named, prioritized group of schema rules
#[derive(Clone)]
pub struct SchemaLayer {
    name: String,
    priority: i32,
    rules: Vec<Arc<dyn SchemaRule>>,
}

impl SchemaLayer {
    /// Create an empty layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            rules: Vec::new(),
        }
    }

    /// The built-in structural invariants
    pub fn core() -> Self {
        Self {
            name: CORE_LAYER.to_string(),
            priority: i32::MIN,
            rules: invariants::rules(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a rule to the layer
    pub fn rule(mut self, rule: impl SchemaRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn add_rule(&mut self, rule: Arc<dyn SchemaRule>) {
        self.rules.push(rule);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Rules in registration order
    pub fn rules(&self) -> &[Arc<dyn SchemaRule>] {
        &self.rules
    }

    pub fn is_core(&self) -> bool {
        self.name == CORE_LAYER
    }

    /// First violation any rule of this layer reports on `node`
    pub fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        self.rules
            .iter()
            .find_map(|rule| rule.validate(node, ctx))
            .map(|violation| violation.in_layer(self.name.clone()))
    }

    pub fn is_void(&self, node: &Node) -> bool {
        self.rules.iter().any(|rule| rule.is_void(node))
    }
}

impl std::fmt::Debug for SchemaLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaLayer")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}
