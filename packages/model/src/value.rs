use crate::{Data, Decoration, Node, Point, Selection};

/// Immutable editor state snapshot.
///
/// Cloning a value is cheap (the document is `Arc`-shared), so any past
/// snapshot can be kept and read without locks.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub document: Node,
    pub selection: Selection,
    pub decorations: Vec<Decoration>,
    pub data: Data,
}

impl Value {
    pub fn new(document: Node) -> Self {
        Self {
            document,
            selection: Selection::unset(),
            decorations: Vec::new(),
            data: Data::new(),
        }
    }

    /// Value with a collapsed selection at the start of the first text
    pub fn with_cursor_at_start(document: Node) -> Self {
        let selection = document
            .first_text(&crate::Path::root())
            .map(|(path, _)| Selection::collapsed(Point::new(path, 0)))
            .unwrap_or_default();
        Self {
            selection,
            ..Self::new(document)
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_decorations(mut self, decorations: Vec<Decoration>) -> Self {
        self.decorations = decorations;
        self
    }

    /// Content equality ignoring node keys
    pub fn content_eq(&self, other: &Value) -> bool {
        self.document.content_eq(&other.document)
            && self.selection == other.selection
            && self.decorations == other.decorations
            && self.data == other.data
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new(Node::document(Vec::new()))
    }
}
