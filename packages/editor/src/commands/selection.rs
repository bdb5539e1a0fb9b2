use crate::change::Change;
use crate::errors::EditorResult;
use crate::operation::Operation;
use folio_model::{Path, Point, Range, Selection};

impl Change {
    /// Emit a selection operation if `selection` differs from the current one
    pub fn set_selection(&mut self, selection: Selection) -> EditorResult<()> {
        let previous = self.selection().clone();
        if previous == selection {
            return Ok(());
        }
        self.command(|change| change.apply_operation(Operation::SetSelection { selection, previous }))
    }

    /// Select `selection`, snapped to existing texts. Pending marks are
    /// dropped: they only live until the cursor moves.
    pub fn select(&mut self, selection: Selection) -> EditorResult<()> {
        let resolved = self.document().resolve_selection(&selection).with_marks(None);
        self.set_selection(resolved)
    }

    pub fn select_range(&mut self, range: Range) -> EditorResult<()> {
        let selection = self.selection().with_range(range);
        self.select(selection)
    }

    pub fn move_to(&mut self, point: Point) -> EditorResult<()> {
        self.select_range(Range::collapsed(point))
    }

    pub fn move_anchor_to(&mut self, point: Point) -> EditorResult<()> {
        match self.selection().range() {
            Some(range) => self.select_range(range.move_anchor(point)),
            None => self.move_to(point),
        }
    }

    pub fn move_focus_to(&mut self, point: Point) -> EditorResult<()> {
        match self.selection().range() {
            Some(range) => self.select_range(range.move_focus(point)),
            None => self.move_to(point),
        }
    }

    pub fn collapse_to_start(&mut self) -> EditorResult<()> {
        self.collapse_with(Range::collapse_to_start)
    }

    pub fn collapse_to_end(&mut self) -> EditorResult<()> {
        self.collapse_with(Range::collapse_to_end)
    }

    pub fn collapse_to_anchor(&mut self) -> EditorResult<()> {
        self.collapse_with(Range::collapse_to_anchor)
    }

    pub fn collapse_to_focus(&mut self) -> EditorResult<()> {
        self.collapse_with(Range::collapse_to_focus)
    }

    fn collapse_with(&mut self, collapse: fn(&Range) -> Range) -> EditorResult<()> {
        match self.selection().range() {
            Some(range) if range.is_expanded() => self.select_range(collapse(&range)),
            _ => Ok(()),
        }
    }

    /// Select from the start of the first text to the end of the last
    pub fn select_all(&mut self) -> EditorResult<()> {
        let document = self.document();
        let (Some((first, _)), Some((last, text))) =
            (document.first_text(&Path::root()), document.last_text(&Path::root()))
        else {
            return Ok(());
        };
        let range = Range::new(Point::new(first, 0), Point::new(last, text.len()));
        self.select_range(range)
    }

    pub fn deselect(&mut self) -> EditorResult<()> {
        self.set_selection(Selection::unset())
    }

    pub fn focus(&mut self) -> EditorResult<()> {
        let selection = self.selection().clone().with_focus(true);
        self.set_selection(selection)
    }

    pub fn blur(&mut self) -> EditorResult<()> {
        let selection = self.selection().clone().with_focus(false);
        self.set_selection(selection)
    }

    /// Move a collapsed cursor `n` characters back, crossing into previous
    /// texts. An expanded selection collapses to its start instead.
    pub fn move_backward(&mut self, n: usize) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_expanded() {
            return self.collapse_to_start();
        }
        let document = self.document();
        let mut point = range.anchor;
        let mut remaining = n;
        while remaining > point.offset {
            let Some((previous, text)) = document.previous_text(&point.path) else {
                remaining = point.offset;
                break;
            };
            remaining -= point.offset;
            point = Point::new(previous, text.len());
        }
        let point = point.with_offset(point.offset - remaining);
        self.move_to(point)
    }

    pub fn move_forward(&mut self, n: usize) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_expanded() {
            return self.collapse_to_end();
        }
        let document = self.document();
        let mut point = range.anchor;
        let mut remaining = n;
        loop {
            let len = document.assert_text(&point.path)?.len();
            if point.offset + remaining <= len {
                break;
            }
            let Some((next, _)) = document.next_text(&point.path) else {
                remaining = len - point.offset;
                break;
            };
            remaining -= len - point.offset;
            point = Point::new(next, 0);
        }
        let point = point.with_offset(point.offset + remaining);
        self.move_to(point)
    }
}
