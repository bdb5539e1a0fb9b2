use crate::{Mark, Point};
use serde::{Deserialize, Serialize};

/// Ordered pair of points. The anchor is where the range started, the focus
/// where it ends; the anchor may come after the focus ("backward").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    pub fn is_forward(&self) -> bool {
        !self.is_backward()
    }

    pub fn start(&self) -> &Point {
        if self.is_backward() {
            &self.focus
        } else {
            &self.anchor
        }
    }

    pub fn end(&self) -> &Point {
        if self.is_backward() {
            &self.anchor
        } else {
            &self.focus
        }
    }

    pub fn flip(&self) -> Range {
        Range::new(self.focus.clone(), self.anchor.clone())
    }

    pub fn collapse_to_start(&self) -> Range {
        Range::collapsed(self.start().clone())
    }

    pub fn collapse_to_end(&self) -> Range {
        Range::collapsed(self.end().clone())
    }

    pub fn collapse_to_anchor(&self) -> Range {
        Range::collapsed(self.anchor.clone())
    }

    pub fn collapse_to_focus(&self) -> Range {
        Range::collapsed(self.focus.clone())
    }

    /// Same focus, anchor moved to `point`
    pub fn move_anchor(&self, point: Point) -> Range {
        Range::new(point, self.focus.clone())
    }

    /// Same anchor, focus moved to `point`
    pub fn move_focus(&self, point: Point) -> Range {
        Range::new(self.anchor.clone(), point)
    }

    /// Whether `point` lies within the range, ends included
    pub fn includes(&self, point: &Point) -> bool {
        self.start() <= point && point <= self.end()
    }
}

/// Mark applied over a range without being part of the document content
/// (search highlights, spell check, etc).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub range: Range,
    pub mark: Mark,
}

impl Decoration {
    pub fn new(range: Range, mark: Mark) -> Self {
        Self { range, mark }
    }
}
