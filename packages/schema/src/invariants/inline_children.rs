use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// Inline children must be inlines or texts
pub struct InlineChildrenRule;

impl SchemaRule for InlineChildrenRule {
    fn name(&self) -> &str {
        "inline-children"
    }

    fn description(&self) -> &str {
        "Only allow inline and text nodes in inlines"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        if !node.is_inline() {
            return None;
        }
        let (index, child) = node
            .nodes()
            .iter()
            .enumerate()
            .find(|(_, child)| child.is_block())?;
        Some(
            Violation::new(
                ViolationCode::ChildObjectInvalid,
                self.name(),
                format!("inline holds a block at {index}"),
                ctx.path,
                node.key(),
            )
            .with_child(index, child.key()),
        )
    }
}
