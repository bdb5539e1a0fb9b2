//! Text leaves.
//!
//! A [`Text`] holds its characters as a list of [`Leaf`] runs, each run
//! tagged with one [`MarkSet`]. Runs are kept canonical: no empty runs and no
//! two adjacent runs with equal marks. Offsets count `char`s.

use crate::{Key, Mark, MarkSet};
use serde::{Deserialize, Serialize};

/// A run of characters sharing one set of marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub text: String,

    #[serde(default)]
    pub marks: MarkSet,
}

impl Leaf {
    pub fn new(text: impl Into<String>, marks: MarkSet) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text leaf node
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub key: Key,
    leaves: Vec<Leaf>,
}

impl Text {
    pub fn new(text: &str) -> Self {
        Self::from_leaves(Key::generate(), vec![Leaf::new(text, MarkSet::new())])
    }

    pub fn from_leaves(key: Key, leaves: Vec<Leaf>) -> Self {
        let mut text = Self { key, leaves };
        text.normalize_leaves();
        text
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn text(&self) -> String {
        self.leaves.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.leaves.iter().map(Leaf::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Marks that apply to a character inserted at `offset`.
    ///
    /// This is the mark set of the character before the offset, or of the
    /// first character when the offset is at the start.
    pub fn marks_at(&self, offset: usize) -> MarkSet {
        let target = offset.saturating_sub(1);
        let mut start = 0;
        for leaf in &self.leaves {
            let len = leaf.len();
            if target < start + len {
                return leaf.marks.clone();
            }
            start += len;
        }
        MarkSet::new()
    }

    /// Union of all marks present anywhere in the text
    pub fn marks(&self) -> MarkSet {
        self.leaves
            .iter()
            .fold(MarkSet::new(), |acc, leaf| acc.union(&leaf.marks))
    }

    /// Characters in `[offset, offset + len)`, or None when out of range
    pub fn slice(&self, offset: usize, len: usize) -> Option<String> {
        if offset + len > self.len() {
            return None;
        }
        Some(self.text().chars().skip(offset).take(len).collect())
    }

    /// Leaf runs covering `[offset, offset + len)`, clipped to that range.
    ///
    /// Each entry carries the absolute offset at which the run starts.
    pub fn runs(&self, offset: usize, len: usize) -> Vec<(usize, Leaf)> {
        let end = offset + len;
        let mut runs = Vec::new();
        let mut start = 0;
        for leaf in &self.leaves {
            let leaf_len = leaf.len();
            let leaf_end = start + leaf_len;
            let from = offset.max(start);
            let to = end.min(leaf_end);
            if from < to {
                let text: String = leaf.text.chars().skip(from - start).take(to - from).collect();
                runs.push((from, Leaf::new(text, leaf.marks.clone())));
            }
            start = leaf_end;
        }
        runs
    }

    pub fn insert_text(&mut self, offset: usize, text: &str, marks: &MarkSet) {
        if text.is_empty() {
            return;
        }
        let index = self.split_boundary(offset);
        self.leaves.insert(index, Leaf::new(text, marks.clone()));
        self.normalize_leaves();
    }

    pub fn remove_text(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        let start = self.split_boundary(offset);
        let end = self.split_boundary(offset + len);
        self.leaves.drain(start..end);
        self.normalize_leaves();
    }

    pub fn add_mark(&mut self, offset: usize, len: usize, mark: &Mark) {
        self.update_marks(offset, len, |marks| {
            marks.insert(mark.clone());
        });
    }

    pub fn remove_mark(&mut self, offset: usize, len: usize, mark: &Mark) {
        self.update_marks(offset, len, |marks| {
            marks.remove(mark);
        });
    }

    /// Replace `mark` with `new_mark` wherever it appears in the range
    pub fn set_mark(&mut self, offset: usize, len: usize, mark: &Mark, new_mark: &Mark) {
        self.update_marks(offset, len, |marks| {
            if marks.remove(mark) {
                marks.insert(new_mark.clone());
            }
        });
    }

    /// Truncate to `offset` characters and return the removed tail leaves
    pub fn split_off(&mut self, offset: usize) -> Vec<Leaf> {
        let index = self.split_boundary(offset);
        let tail = self.leaves.split_off(index);
        self.normalize_leaves();
        tail
    }

    /// Append leaves to the end of this text
    pub fn append(&mut self, leaves: Vec<Leaf>) {
        self.leaves.extend(leaves);
        self.normalize_leaves();
    }

    fn update_marks<F: Fn(&mut MarkSet)>(&mut self, offset: usize, len: usize, f: F) {
        if len == 0 {
            return;
        }
        let start = self.split_boundary(offset);
        let end = self.split_boundary(offset + len);
        for leaf in &mut self.leaves[start..end] {
            f(&mut leaf.marks);
        }
        self.normalize_leaves();
    }

    /// Ensure a leaf boundary at `offset`; returns the index of the leaf
    /// starting there (or the leaf count when at the end).
    fn split_boundary(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for index in 0..self.leaves.len() {
            if offset == start {
                return index;
            }
            let len = self.leaves[index].len();
            if offset < start + len {
                let leaf = &mut self.leaves[index];
                let byte = byte_index(&leaf.text, offset - start);
                let right = leaf.text.split_off(byte);
                let marks = leaf.marks.clone();
                self.leaves.insert(index + 1, Leaf::new(right, marks));
                return index + 1;
            }
            start += len;
        }
        self.leaves.len()
    }

    fn normalize_leaves(&mut self) {
        let mut merged: Vec<Leaf> = Vec::with_capacity(self.leaves.len());
        for leaf in self.leaves.drain(..) {
            if leaf.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.marks == leaf.marks => prev.text.push_str(&leaf.text),
                _ => merged.push(leaf),
            }
        }
        self.leaves = merged;
    }
}

/// Byte index of the `char_index`-th character (or the string length)
pub fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Mark {
        Mark::new("bold")
    }

    #[test]
    fn test_insert_and_remove_text() {
        let mut text = Text::new("word");
        text.insert_text(2, "XY", &MarkSet::new());
        assert_eq!(text.text(), "woXYrd");
        assert_eq!(text.leaves().len(), 1);

        text.remove_text(1, 3);
        assert_eq!(text.text(), "wrd");
    }

    #[test]
    fn test_offsets_count_chars() {
        let mut text = Text::new("héllo");
        assert_eq!(text.len(), 5);
        text.remove_text(1, 1);
        assert_eq!(text.text(), "hllo");
    }

    #[test]
    fn test_marks_split_and_merge_leaves() {
        let mut text = Text::new("hello world");
        text.add_mark(0, 5, &bold());
        assert_eq!(text.leaves().len(), 2);
        assert!(text.marks_at(3).contains(&bold()));
        assert!(!text.marks_at(7).contains(&bold()));

        text.remove_mark(0, 5, &bold());
        assert_eq!(text.leaves().len(), 1);
    }

    #[test]
    fn test_marked_insert_creates_run() {
        let mut text = Text::new("ab");
        let marks: MarkSet = vec![bold()].into_iter().collect();
        text.insert_text(1, "X", &marks);

        let runs = text.runs(0, 3);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1], (1, Leaf::new("X", marks)));
    }

    #[test]
    fn test_split_off_and_append_restore() {
        let mut text = Text::new("another");
        text.add_mark(0, 2, &bold());
        let original = text.clone();

        let tail = text.split_off(4);
        assert_eq!(text.text(), "anot");
        text.append(tail);
        assert_eq!(text, original);
    }

    #[test]
    fn test_set_mark_only_touches_matching_runs() {
        let mut text = Text::new("abcd");
        text.add_mark(0, 2, &bold());
        text.set_mark(0, 4, &bold(), &Mark::new("strong"));

        assert!(text.marks_at(1).has_type("strong"));
        assert!(text.marks_at(4).is_empty());
    }

    #[test]
    fn test_empty_text_has_no_leaves() {
        let text = Text::new("");
        assert!(text.is_empty());
        assert_eq!(text.len(), 0);
        assert!(text.marks_at(0).is_empty());
    }
}
