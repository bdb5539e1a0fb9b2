//! Plain-text conversion: one block per line.

use crate::{Node, Value};

/// Build a value with one `block_type` block per line of `text`
pub fn deserialize(text: &str, block_type: &str) -> Value {
    let blocks = text
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            Node::block(block_type, vec![Node::new_text(line)])
        })
        .collect();
    Value::with_cursor_at_start(Node::document(blocks))
}

/// Text of every leaf block, joined by newlines
pub fn serialize(node: &Node) -> String {
    let mut lines = Vec::new();
    collect_lines(node, &mut lines);
    lines.join("\n")
}

fn collect_lines(node: &Node, lines: &mut Vec<String>) {
    let has_block_children = node.nodes().iter().any(Node::is_block);
    if node.is_document() || has_block_children {
        for child in node.nodes() {
            collect_lines(child, lines);
        }
    } else {
        lines.push(node.text());
    }
}
