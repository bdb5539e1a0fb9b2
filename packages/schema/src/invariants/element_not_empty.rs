use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// Blocks and inlines always have at least one child
pub struct ElementNotEmptyRule;

impl SchemaRule for ElementNotEmptyRule {
    fn name(&self) -> &str {
        "element-not-empty"
    }

    fn description(&self) -> &str {
        "Ensure block and inline nodes have at least one text child"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        if !(node.is_block() || node.is_inline()) || !node.nodes().is_empty() {
            return None;
        }
        Some(
            Violation::new(
                ViolationCode::ChildRequired,
                self.name(),
                format!("{} has no children", node.object().as_str()),
                ctx.path,
                node.key(),
            )
            .with_index(0),
        )
    }
}
