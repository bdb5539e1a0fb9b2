//! How paths and points move when an operation is applied elsewhere.
//!
//! All functions take coordinates in the tree *before* the operation and
//! return coordinates in the tree *after* it. `None` means the addressed
//! node no longer exists.

use crate::operation::Operation;
use folio_model::{Decoration, Path, Point, Range, Selection};

/// Where a moved node lands, given the pre-move insertion point
pub fn move_target(path: &Path, new_path: &Path) -> Path {
    match path.len().checked_sub(1) {
        Some(level) if path.ends_before(new_path) => new_path.decrement(level, 1),
        _ => new_path.clone(),
    }
}

fn after_insert(at: &Path, path: &Path) -> Path {
    match at.len().checked_sub(1) {
        Some(level) if at.ends_before(path) || at.is_ancestor_or_equal(path) => {
            path.increment(level, 1)
        }
        _ => path.clone(),
    }
}

fn after_remove(at: &Path, path: &Path) -> Option<Path> {
    if at.is_ancestor_or_equal(path) {
        return None;
    }
    Some(match at.len().checked_sub(1) {
        Some(level) if at.ends_before(path) => path.decrement(level, 1),
        _ => path.clone(),
    })
}

/// Transform `path` across `op`
pub fn transform_path(path: &Path, op: &Operation) -> Option<Path> {
    let result = match op {
        Operation::InsertText { .. }
        | Operation::RemoveText { .. }
        | Operation::AddMark { .. }
        | Operation::RemoveMark { .. }
        | Operation::SetMark { .. }
        | Operation::SetNode { .. }
        | Operation::SetSelection { .. }
        | Operation::SetValue { .. } => Some(path.clone()),

        Operation::InsertNode { path: at, .. } => Some(after_insert(at, path)),

        Operation::RemoveNode { path: at, .. } => after_remove(at, path),

        Operation::MergeNode {
            path: at, position, ..
        } => {
            let Some(level) = at.len().checked_sub(1) else {
                return Some(path.clone());
            };
            if at.is_ancestor(path) {
                Some(path.decrement(level, 1).increment(level + 1, *position))
            } else if at == path || at.ends_before(path) {
                Some(path.decrement(level, 1))
            } else {
                Some(path.clone())
            }
        }

        Operation::SplitNode {
            path: at, position, ..
        } => {
            let Some(level) = at.len().checked_sub(1) else {
                return Some(path.clone());
            };
            if at.ends_before(path) {
                Some(path.increment(level, 1))
            } else if at.is_ancestor(path) && path.get(level + 1).map_or(false, |i| i >= *position) {
                Some(path.increment(level, 1).decrement(level + 1, *position))
            } else {
                Some(path.clone())
            }
        }

        Operation::MoveNode {
            path: from,
            new_path,
        } => {
            if from.is_root() || from.is_ancestor(new_path) {
                return Some(path.clone());
            }
            let target = move_target(from, new_path);
            if from.is_ancestor_or_equal(path) {
                let relative = path.relative_to(from).unwrap_or(&[]);
                Some(target.join(relative))
            } else {
                after_remove(from, path).map(|removed| after_insert(&target, &removed))
            }
        }
    };
    tracing::trace!(op = op.kind(), from = %path, to = ?result.as_ref().map(ToString::to_string), "transform path");
    result
}

/// Transform `point` across `op`. Offsets shift with text edits inside the
/// point's own text; merges and splits of that text carry the point along.
pub fn transform_point(point: &Point, op: &Operation) -> Option<Point> {
    match op {
        Operation::InsertText {
            path, offset, text, ..
        } if *path == point.path => {
            let len = text.chars().count();
            Some(if point.offset >= *offset {
                point.with_offset(point.offset + len)
            } else {
                point.clone()
            })
        }
        Operation::RemoveText {
            path, offset, text, ..
        } if *path == point.path => {
            let end = offset + text.chars().count();
            Some(if point.offset >= end {
                point.with_offset(point.offset - (end - offset))
            } else if point.offset > *offset {
                point.with_offset(*offset)
            } else {
                point.clone()
            })
        }
        Operation::MergeNode { path, position, .. } if *path == point.path => {
            let previous = path.previous()?;
            Some(Point::new(previous, point.offset + position))
        }
        Operation::SplitNode { path, position, .. }
            if *path == point.path && point.offset >= *position =>
        {
            let next = path.next()?;
            Some(Point::new(next, point.offset - position))
        }
        _ => {
            let path = transform_path(&point.path, op)?;
            Some(Point::new(path, point.offset))
        }
    }
}

pub fn transform_range(range: &Range, op: &Operation) -> Option<Range> {
    Some(Range::new(
        transform_point(&range.anchor, op)?,
        transform_point(&range.focus, op)?,
    ))
}

/// Transform both ends of a selection. An end whose node was removed is
/// left unset; callers substitute a fallback before resolving.
pub fn transform_selection(selection: &Selection, op: &Operation) -> Selection {
    Selection {
        anchor: selection
            .anchor
            .as_ref()
            .and_then(|point| transform_point(point, op)),
        focus: selection
            .focus
            .as_ref()
            .and_then(|point| transform_point(point, op)),
        ..selection.clone()
    }
}

/// Transform decorations, dropping those that lost an endpoint
pub fn transform_decorations(decorations: &[Decoration], op: &Operation) -> Vec<Decoration> {
    decorations
        .iter()
        .filter_map(|decoration| {
            transform_range(&decoration.range, op)
                .map(|range| Decoration::new(range, decoration.mark.clone()))
        })
        .collect()
}
