use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// Non-void inlines never end up without text
pub struct InlineNotEmptyRule;

impl SchemaRule for InlineNotEmptyRule {
    fn name(&self) -> &str {
        "inline-not-empty"
    }

    fn description(&self) -> &str {
        "Remove non-void inline nodes whose text is empty"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        if !(node.is_block() || node.is_inline()) {
            return None;
        }
        let (index, child) = node.nodes().iter().enumerate().find(|(_, child)| {
            child.is_inline() && !ctx.schema.is_void(child) && child.text_len() == 0
        })?;
        Some(
            Violation::new(
                ViolationCode::InlineEmpty,
                self.name(),
                format!("inline '{}' is empty", child.node_type().unwrap_or_default()),
                ctx.path,
                node.key(),
            )
            .with_child(index, child.key()),
        )
    }
}
