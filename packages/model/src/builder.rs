//! Compact constructors for writing trees in tests and fixtures.
//!
//! ```
//! use folio_model::builder::{cursor, paragraphs};
//! use folio_model::Value;
//!
//! let value = Value::new(paragraphs(&["word", "another"])).with_selection(cursor([1, 0], 0));
//! assert_eq!(value.document.nodes().len(), 2);
//! ```

use crate::{Mark, MarkSet, Node, Point, Range, Selection, Value};

/// Document holding one `paragraph` per string
pub fn paragraphs(lines: &[&str]) -> Node {
    Node::document(
        lines
            .iter()
            .map(|line| Node::block("paragraph", vec![Node::new_text(line)]))
            .collect(),
    )
}

/// Text node with every character carrying the named marks
pub fn marked(text: &str, mark_types: &[&str]) -> Node {
    let marks: MarkSet = mark_types.iter().map(|t| Mark::new(*t)).collect();
    Node::text_with_marks(text, marks)
}

/// Collapsed, focused selection
pub fn cursor<P: Into<crate::Path>>(path: P, offset: usize) -> Selection {
    Selection::collapsed(Point::new(path, offset)).with_focus(true)
}

/// Expanded, focused selection
pub fn span<A, F>(anchor: A, anchor_offset: usize, focus: F, focus_offset: usize) -> Selection
where
    A: Into<crate::Path>,
    F: Into<crate::Path>,
{
    Selection::from_range(Range::new(
        Point::new(anchor, anchor_offset),
        Point::new(focus, focus_offset),
    ))
    .with_focus(true)
}

/// Value over `document` with `selection`
pub fn value(document: Node, selection: Selection) -> Value {
    Value::new(document).with_selection(selection)
}
