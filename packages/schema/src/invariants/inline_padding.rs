use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// Every inline has a text sibling on both sides, so the cursor can always
/// sit before and after it
pub struct InlinePaddingRule;

impl SchemaRule for InlinePaddingRule {
    fn name(&self) -> &str {
        "inline-padding"
    }

    fn description(&self) -> &str {
        "Ensure inline nodes are surrounded by text nodes"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        if !(node.is_block() || node.is_inline()) {
            return None;
        }
        let children = node.nodes();
        for (index, child) in children.iter().enumerate() {
            if !child.is_inline() {
                continue;
            }
            let before = index.checked_sub(1).and_then(|i| children.get(i));
            let insert_at = if !before.map_or(false, Node::is_text) {
                index
            } else if !children.get(index + 1).map_or(false, Node::is_text) {
                index + 1
            } else {
                continue;
            };
            return Some(
                Violation::new(
                    ViolationCode::InlineVoidUnpadded,
                    self.name(),
                    format!("inline at {index} needs a text at {insert_at}"),
                    ctx.path,
                    node.key(),
                )
                .with_index(insert_at),
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::test_support::check;

    fn link() -> Node {
        Node::inline("link", vec![Node::new_text("l")])
    }

    #[test]
    fn test_missing_text_before() {
        let block = Node::block("paragraph", vec![link(), Node::new_text("")]);
        assert_eq!(check(&InlinePaddingRule, &block).unwrap().index, Some(0));
    }

    #[test]
    fn test_missing_text_after() {
        let block = Node::block("paragraph", vec![Node::new_text(""), link()]);
        assert_eq!(check(&InlinePaddingRule, &block).unwrap().index, Some(2));
    }

    #[test]
    fn test_between_two_inlines() {
        let block = Node::block("paragraph", vec![Node::new_text(""), link(), link(), Node::new_text("")]);
        assert_eq!(check(&InlinePaddingRule, &block).unwrap().index, Some(2));
    }

    #[test]
    fn test_padded() {
        let block = Node::block("paragraph", vec![Node::new_text(""), link(), Node::new_text("")]);
        assert!(check(&InlinePaddingRule, &block).is_none());
    }
}
