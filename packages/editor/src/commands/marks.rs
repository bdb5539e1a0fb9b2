use crate::change::Change;
use crate::errors::EditorResult;
use folio_model::{Mark, MarkSet, Range};

impl Change {
    /// Marks the next insertion at a collapsed selection would carry
    fn pending_marks(&self, range: &Range) -> MarkSet {
        match &self.selection().marks {
            Some(marks) => marks.clone(),
            None => self.document().insert_marks_at_point(&range.anchor),
        }
    }

    fn set_pending_marks(&mut self, marks: MarkSet) -> EditorResult<()> {
        let selection = self.selection().clone().with_marks(Some(marks));
        self.set_selection(selection)
    }

    /// Add `mark` to the selected text, or to the pending marks when the
    /// selection is collapsed
    pub fn add_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_collapsed() {
            let mut marks = self.pending_marks(&range);
            if marks.insert(mark) {
                return self.set_pending_marks(marks);
            }
            return Ok(());
        }
        self.add_mark_at_range(&range, mark)
    }

    pub fn remove_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        if range.is_collapsed() {
            let mut marks = self.pending_marks(&range);
            if marks.remove(&mark) {
                return self.set_pending_marks(marks);
            }
            return Ok(());
        }
        self.remove_mark_at_range(&range, mark)
    }

    /// Remove `mark` if every selected character has it, add it otherwise
    pub fn toggle_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let Some(range) = self.selection().range() else {
            return Ok(());
        };
        let active = if range.is_collapsed() {
            self.pending_marks(&range)
        } else {
            self.document().active_marks_at_range(&range)
        };
        if active.contains(&mark) {
            self.remove_mark(mark)
        } else {
            self.add_mark(mark)
        }
    }

    pub fn add_mark_at_range(&mut self, range: &Range, mark: Mark) -> EditorResult<()> {
        let portions = self.document().text_portions(range);
        self.command(|change| {
            for (path, offset, length) in portions {
                change.add_mark_by_path(&path, offset, length, mark.clone())?;
            }
            Ok(())
        })
    }

    pub fn remove_mark_at_range(&mut self, range: &Range, mark: Mark) -> EditorResult<()> {
        let portions = self.document().text_portions(range);
        self.command(|change| {
            for (path, offset, length) in portions {
                change.remove_mark_by_path(&path, offset, length, mark.clone())?;
            }
            Ok(())
        })
    }

    pub fn set_mark_at_range(&mut self, range: &Range, mark: Mark, new_mark: Mark) -> EditorResult<()> {
        let portions = self.document().text_portions(range);
        self.command(|change| {
            for (path, offset, length) in portions {
                change.set_mark_by_path(&path, offset, length, mark.clone(), new_mark.clone())?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::change::Change;
    use folio_model::builder::{cursor, paragraphs, span, value};
    use folio_model::{Mark, Path, Point};

    fn bold() -> Mark {
        Mark::new("bold")
    }

    #[test]
    fn test_add_mark_over_blocks() {
        let mut change = Change::standalone(value(paragraphs(&["ab", "cd"]), span([0, 0], 1, [1, 0], 1)));
        change.add_mark(bold()).unwrap();

        let doc = change.document();
        let first = doc.assert_text(&Path::from([0, 0])).unwrap();
        let second = doc.assert_text(&Path::from([1, 0])).unwrap();
        assert!(!first.marks_at(1).contains(&bold()));
        assert!(first.marks_at(2).contains(&bold()));
        assert!(second.marks_at(1).contains(&bold()));
        assert!(!second.marks_at(2).contains(&bold()));
    }

    #[test]
    fn test_collapsed_mark_applies_to_next_insert() {
        let mut change = Change::standalone(value(paragraphs(&["ab"]), cursor([0, 0], 2)));
        change.add_mark(bold()).unwrap();
        assert!(change.operations().iter().all(|op| op.is_selection()));

        change.insert_text("c").unwrap();
        let text = change.document().assert_text(&Path::from([0, 0])).unwrap();
        assert!(text.marks_at(3).contains(&bold()));
        assert!(!text.marks_at(2).contains(&bold()));
    }

    #[test]
    fn test_toggle_mark() {
        let mut change = Change::standalone(value(paragraphs(&["abc"]), span([0, 0], 0, [0, 0], 3)));
        change.toggle_mark(bold()).unwrap();
        assert!(change.document().marks_at_range(&change.selection().range().unwrap()).contains(&bold()));

        change.toggle_mark(bold()).unwrap();
        let text = change.document().assert_text(&Path::from([0, 0])).unwrap();
        assert!(text.marks().is_empty());
        assert_eq!(change.selection().focus, Some(Point::new([0, 0], 3)));
    }
}
