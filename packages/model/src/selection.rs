use crate::{MarkSet, Point, Range};
use serde::{Deserialize, Serialize};

/// The user's selection: a range (unset when the document has no text),
/// focus state, and marks pending for the next insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub anchor: Option<Point>,
    pub focus: Option<Point>,

    #[serde(default)]
    pub is_focused: bool,

    /// Marks to apply to the next inserted text when collapsed
    #[serde(default)]
    pub marks: Option<MarkSet>,
}

impl Selection {
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn from_range(range: Range) -> Self {
        Self {
            anchor: Some(range.anchor),
            focus: Some(range.focus),
            is_focused: false,
            marks: None,
        }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::from_range(Range::collapsed(point))
    }

    pub fn is_set(&self) -> bool {
        self.anchor.is_some() && self.focus.is_some()
    }

    pub fn range(&self) -> Option<Range> {
        match (&self.anchor, &self.focus) {
            (Some(anchor), Some(focus)) => Some(Range::new(anchor.clone(), focus.clone())),
            _ => None,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.range().map_or(true, |r| r.is_collapsed())
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn start(&self) -> Option<Point> {
        self.range().map(|r| r.start().clone())
    }

    pub fn end(&self) -> Option<Point> {
        self.range().map(|r| r.end().clone())
    }

    /// Same focus state and marks, new range
    pub fn with_range(&self, range: Range) -> Self {
        Self {
            anchor: Some(range.anchor),
            focus: Some(range.focus),
            is_focused: self.is_focused,
            marks: self.marks.clone(),
        }
    }

    pub fn with_marks(mut self, marks: Option<MarkSet>) -> Self {
        self.marks = marks;
        self
    }

    pub fn with_focus(mut self, is_focused: bool) -> Self {
        self.is_focused = is_focused;
        self
    }
}
