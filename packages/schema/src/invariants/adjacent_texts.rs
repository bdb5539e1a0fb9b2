use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// Two texts are never siblings; the second merges into the first
pub struct AdjacentTextsRule;

impl SchemaRule for AdjacentTextsRule {
    fn name(&self) -> &str {
        "adjacent-texts"
    }

    fn description(&self) -> &str {
        "Merge adjacent text nodes"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        let children = node.nodes();
        let index = (1..children.len())
            .find(|&i| children[i - 1].is_text() && children[i].is_text())?;
        Some(
            Violation::new(
                ViolationCode::AdjacentText,
                self.name(),
                format!("texts at {} and {index} are adjacent", index - 1),
                ctx.path,
                node.key(),
            )
            .with_child(index, children[index].key()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::test_support::check;

    #[test]
    fn test_reports_second_text() {
        let block = Node::block(
            "paragraph",
            vec![
                Node::new_text("a"),
                Node::inline("link", vec![Node::new_text("b")]),
                Node::new_text("c"),
                Node::new_text("d"),
            ],
        );
        let violation = check(&AdjacentTextsRule, &block).unwrap();
        assert_eq!(violation.index, Some(3));
        assert_eq!(violation.child, Some(block.nodes()[3].key()));
    }
}
