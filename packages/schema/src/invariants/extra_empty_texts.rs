use crate::rule::{SchemaRule, ValidationContext};
use crate::violation::{Violation, ViolationCode};
use folio_model::Node;

/// Empty texts survive only as the sole child or as inline padding
pub struct ExtraEmptyTextsRule;

impl SchemaRule for ExtraEmptyTextsRule {
    fn name(&self) -> &str {
        "extra-empty-texts"
    }

    fn description(&self) -> &str {
        "Remove empty text nodes that neither fill an element nor pad an inline"
    }

    fn validate(&self, node: &Node, ctx: &ValidationContext<'_>) -> Option<Violation> {
        let children = node.nodes();
        if children.len() < 2 {
            return None;
        }
        let index = (0..children.len()).find(|&i| {
            let child = &children[i];
            let pads_inline = (i > 0 && children[i - 1].is_inline())
                || children.get(i + 1).map_or(false, Node::is_inline);
            child.is_text() && child.text_len() == 0 && !pads_inline
        })?;
        Some(
            Violation::new(
                ViolationCode::ExtraEmptyText,
                self.name(),
                format!("empty text at {index}"),
                ctx.path,
                node.key(),
            )
            .with_child(index, children[index].key()),
        )
    }
}
