use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// A block holds either blocks or inline content, decided by its first child
pub struct BlockChildrenRule;

impl SchemaRule for BlockChildrenRule {
    fn name(&self) -> &str {
        "block-children"
    }

    fn description(&self) -> &str {
        "Only allow all-block or all-inline children in blocks"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        if !node.is_block() {
            return None;
        }
        let first_is_block = node.nodes().first()?.is_block();
        let (index, child) = node
            .nodes()
            .iter()
            .enumerate()
            .find(|(_, child)| child.is_block() != first_is_block)?;
        let expected = if first_is_block { "blocks" } else { "inlines and texts" };
        Some(
            Violation::new(
                ViolationCode::ChildObjectInvalid,
                self.name(),
                format!("block holds {expected}, found {} at {index}", child.object().as_str()),
                ctx.path,
                node.key(),
            )
            .with_child(index, child.key()),
        )
    }
}
