//! Structural invariants every document keeps regardless of custom layers.

mod adjacent_texts;
mod block_children;
mod document_blocks;
mod element_not_empty;
mod extra_empty_texts;
mod inline_children;
mod inline_not_empty;
mod inline_padding;

pub use adjacent_texts::AdjacentTextsRule;
pub use block_children::BlockChildrenRule;
pub use document_blocks::DocumentBlocksRule;
pub use element_not_empty::ElementNotEmptyRule;
pub use extra_empty_texts::ExtraEmptyTextsRule;
pub use inline_children::InlineChildrenRule;
pub use inline_not_empty::InlineNotEmptyRule;
pub use inline_padding::InlinePaddingRule;

use crate::rule::SchemaRule;
use std::sync::Arc;

/// Core rules in evaluation order
pub fn rules() -> Vec<Arc<dyn SchemaRule>> {
    vec![
        Arc::new(DocumentBlocksRule),
        Arc::new(BlockChildrenRule),
        Arc::new(InlineChildrenRule),
        Arc::new(ElementNotEmptyRule),
        Arc::new(InlineNotEmptyRule),
        Arc::new(InlinePaddingRule),
        Arc::new(AdjacentTextsRule),
        Arc::new(ExtraEmptyTextsRule),
    ]
}
