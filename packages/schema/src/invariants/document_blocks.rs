use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// Document children must be blocks
pub struct DocumentBlocksRule;

impl SchemaRule for DocumentBlocksRule {
    fn name(&self) -> &str {
        "document-blocks"
    }

    fn description(&self) -> &str {
        "Only allow block nodes in documents"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        if !node.is_document() {
            return None;
        }
        let (index, child) = node
            .nodes()
            .iter()
            .enumerate()
            .find(|(_, child)| !child.is_block())?;
        Some(
            Violation::new(
                ViolationCode::ChildObjectInvalid,
                self.name(),
                format!("document child at {index} is {}, not a block", child.object().as_str()),
                ctx.path,
                node.key(),
            )
            .with_child(index, child.key()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::test_support::check;

    #[test]
    fn test_rejects_text_in_document() {
        let doc = Node::document(vec![
            Node::block("paragraph", vec![Node::new_text("a")]),
            Node::new_text("stray"),
        ]);
        let violation = check(&DocumentBlocksRule, &doc).unwrap();
        assert_eq!(violation.code, ViolationCode::ChildObjectInvalid);
        assert_eq!(violation.index, Some(1));
    }

    #[test]
    fn test_allows_blocks() {
        let doc = Node::document(vec![Node::block("paragraph", vec![])]);
        assert!(check(&DocumentBlocksRule, &doc).is_none());
    }
}
