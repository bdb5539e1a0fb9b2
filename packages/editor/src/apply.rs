//! Applying operations to values.

use crate::errors::{OperationError, OperationResult};
use crate::operation::Operation;
use crate::transform::{move_target, transform_decorations, transform_point, transform_selection};
use folio_model::{Element, MarkSet, ModelError, Node, NodeProperties, Path, Point, Text, Value};

/// Apply `op` to `value`.
///
/// The tree edit is atomic: on error `value` is left untouched. On success
/// the selection and decorations are transformed along with the tree, and
/// after a removal the selection is resolved back onto existing text.
pub fn apply_operation(value: &mut Value, op: &Operation) -> OperationResult<()> {
    match op {
        Operation::SetSelection { selection, .. } => {
            value.selection = selection.clone();
            return Ok(());
        }
        Operation::SetValue { data, .. } => {
            value.data = data.clone();
            return Ok(());
        }
        _ => {}
    }

    let fallback = match op {
        Operation::RemoveNode { path, .. } => removal_fallback(&value.document, path, op),
        _ => None,
    };

    let mut document = value.document.clone();
    apply_to_document(&mut document, op)?;
    value.document = document;

    let mut selection = transform_selection(&value.selection, op);
    if value.selection.anchor.is_some() && selection.anchor.is_none() {
        selection.anchor = fallback.clone();
    }
    if value.selection.focus.is_some() && selection.focus.is_none() {
        selection.focus = fallback;
    }
    if op.removes_nodes() {
        selection = value.document.resolve_selection(&selection);
    }
    value.selection = selection;
    value.decorations = transform_decorations(&value.decorations, op);
    Ok(())
}

/// Where a point inside the removed node goes: the end of the closest
/// preceding text, else the start of the closest following one.
fn removal_fallback(document: &Node, path: &Path, op: &Operation) -> Option<Point> {
    let point = match document.previous_text(path) {
        Some((previous, text)) => Point::new(previous, text.len()),
        None => {
            let (next, _) = document.next_text(path)?;
            Point::new(next, 0)
        }
    };
    transform_point(&point, op)
}

fn node_mut<'a>(document: &'a mut Node, path: &Path) -> OperationResult<&'a mut Node> {
    document
        .get_mut(path.as_slice())
        .ok_or_else(|| ModelError::PathNotFound(path.clone()).into())
}

fn text_mut<'a>(document: &'a mut Node, path: &Path) -> OperationResult<&'a mut Text> {
    node_mut(document, path)?
        .text_mut()
        .ok_or_else(|| ModelError::NotText(path.clone()).into())
}

/// Parent element of `path` and the child index within it
fn parent_mut<'a>(document: &'a mut Node, path: &Path) -> OperationResult<(&'a mut Element, usize)> {
    let (Some(parent), Some(index)) = (path.parent(), path.last()) else {
        return Err(OperationError::RootTarget);
    };
    let element = node_mut(document, &parent)?
        .element_mut()
        .ok_or_else(|| ModelError::NotElement(parent.clone()))?;
    Ok((element, index))
}

fn check_index(element: &Element, path: &Path, index: usize, inclusive: bool) -> OperationResult<()> {
    let len = element.nodes.len();
    if index < len || (inclusive && index == len) {
        return Ok(());
    }
    Err(OperationError::IndexOutOfRange {
        parent: path.parent().unwrap_or_default(),
        index,
        len,
    })
}

fn check_span(text: &Text, path: &Path, offset: usize, length: usize) -> OperationResult<()> {
    if offset + length > text.len() {
        return Err(ModelError::offset_out_of_range(path, offset + length, text.len()).into());
    }
    Ok(())
}

fn invalid_payload(op: &Operation, path: &Path, reason: impl Into<String>) -> OperationError {
    OperationError::InvalidPayload {
        kind: op.kind(),
        path: path.clone(),
        reason: reason.into(),
    }
}

/// First run start in the span whose marks fail `accept`
fn find_run(text: &Text, offset: usize, length: usize, accept: impl Fn(&MarkSet) -> bool) -> Option<usize> {
    text.runs(offset, length)
        .into_iter()
        .find(|(_, leaf)| !accept(&leaf.marks))
        .map(|(start, _)| start)
}

fn apply_to_document(document: &mut Node, op: &Operation) -> OperationResult<()> {
    match op {
        Operation::InsertText {
            path,
            offset,
            text,
            marks,
        } => {
            let target = text_mut(document, path)?;
            check_span(target, path, *offset, 0)?;
            target.insert_text(*offset, text, marks);
        }

        Operation::RemoveText {
            path,
            offset,
            text,
            marks,
        } => {
            let target = text_mut(document, path)?;
            let length = text.chars().count();
            if target.slice(*offset, length).as_deref() != Some(text.as_str()) {
                return Err(OperationError::TextMismatch {
                    path: path.clone(),
                    offset: *offset,
                    expected: text.clone(),
                });
            }
            if let Some(start) = find_run(target, *offset, length, |run| run == marks) {
                return Err(invalid_payload(
                    op,
                    path,
                    format!("characters at offset {} carry other marks", start),
                ));
            }
            target.remove_text(*offset, length);
        }

        Operation::AddMark {
            path,
            offset,
            length,
            mark,
        } => {
            let target = text_mut(document, path)?;
            check_span(target, path, *offset, *length)?;
            if let Some(start) = find_run(target, *offset, *length, |run| !run.contains(mark)) {
                return Err(invalid_payload(
                    op,
                    path,
                    format!("{} is already set at offset {}", mark.mark_type, start),
                ));
            }
            target.add_mark(*offset, *length, mark);
        }

        Operation::RemoveMark {
            path,
            offset,
            length,
            mark,
        } => {
            let target = text_mut(document, path)?;
            check_span(target, path, *offset, *length)?;
            if let Some(start) = find_run(target, *offset, *length, |run| run.contains(mark)) {
                return Err(invalid_payload(
                    op,
                    path,
                    format!("{} is not set at offset {}", mark.mark_type, start),
                ));
            }
            target.remove_mark(*offset, *length, mark);
        }

        Operation::SetMark {
            path,
            offset,
            length,
            mark,
            new_mark,
        } => {
            let target = text_mut(document, path)?;
            check_span(target, path, *offset, *length)?;
            let replaceable =
                |run: &MarkSet| run.contains(mark) && (mark == new_mark || !run.contains(new_mark));
            if let Some(start) = find_run(target, *offset, *length, replaceable) {
                return Err(invalid_payload(
                    op,
                    path,
                    format!(
                        "cannot replace {} with {} at offset {}",
                        mark.mark_type, new_mark.mark_type, start
                    ),
                ));
            }
            target.set_mark(*offset, *length, mark, new_mark);
        }

        Operation::InsertNode { path, node } => {
            if node.is_document() {
                return Err(OperationError::InvalidNode { object: "document" });
            }
            let (parent, index) = parent_mut(document, path)?;
            check_index(parent, path, index, true)?;
            parent.nodes.insert(index, node.clone());
        }

        Operation::RemoveNode { path, node } => {
            let (parent, index) = parent_mut(document, path)?;
            check_index(parent, path, index, false)?;
            if !parent.nodes[index].content_eq(node) {
                return Err(invalid_payload(op, path, "the removed node differs"));
            }
            parent.nodes.remove(index);
        }

        Operation::MergeNode {
            path,
            position,
            properties,
        } => {
            let (parent, index) = parent_mut(document, path)?;
            check_index(parent, path, index, false)?;
            let invalid = |reason: String| OperationError::InvalidMerge {
                path: path.clone(),
                reason,
            };
            if index == 0 {
                return Err(invalid("it has no previous sibling".to_string()));
            }
            let node = parent.nodes.remove(index);
            let previous = &mut parent.nodes[index - 1];
            if previous.object() != node.object() || node.is_document() {
                return Err(invalid(format!(
                    "cannot merge {} into {}",
                    node.object().as_str(),
                    previous.object().as_str()
                )));
            }
            if previous.split_len() != *position {
                return Err(invalid(format!(
                    "expected position {}, found {}",
                    previous.split_len(),
                    position
                )));
            }
            // Splitting back must rebuild the node that disappears
            let rebuilt = previous.empty_like(properties);
            if rebuilt.node_type() != node.node_type()
                || rebuilt.data() != node.data()
                || properties.key.map_or(false, |key| key != node.key())
            {
                return Err(invalid_payload(
                    op,
                    path,
                    "properties differ from the merged node",
                ));
            }
            match node {
                Node::Text(tail) => {
                    if let Some(text) = previous.text_mut() {
                        text.append(tail.leaves().to_vec());
                    }
                }
                other => {
                    if let Some(element) = previous.element_mut() {
                        element.nodes.extend(other.nodes().iter().cloned());
                    }
                }
            }
        }

        Operation::SplitNode {
            path,
            position,
            properties,
        } => {
            let (parent, index) = parent_mut(document, path)?;
            check_index(parent, path, index, false)?;
            let node = &mut parent.nodes[index];
            if *position > node.split_len() {
                return Err(OperationError::InvalidSplit {
                    path: path.clone(),
                    position: *position,
                });
            }
            let mut right = node.empty_like(properties);
            if node.is_text() {
                let tail = node
                    .text_mut()
                    .map(|left| left.split_off(*position))
                    .unwrap_or_default();
                if let Some(text) = right.text_mut() {
                    text.append(tail);
                }
            } else {
                let tail = node
                    .element_mut()
                    .map(|left| left.nodes.split_off(*position))
                    .unwrap_or_default();
                if let Some(element) = right.element_mut() {
                    element.nodes = tail;
                }
            }
            parent.nodes.insert(index + 1, right);
        }

        Operation::MoveNode { path, new_path } => {
            if path.is_root() || new_path.is_root() {
                return Err(OperationError::RootTarget);
            }
            if path.is_ancestor(new_path) {
                return Err(OperationError::InvalidMove {
                    path: path.clone(),
                    new_path: new_path.clone(),
                });
            }
            let (parent, index) = parent_mut(document, path)?;
            check_index(parent, path, index, false)?;
            let node = parent.nodes.remove(index);

            let target = move_target(path, new_path);
            let (parent, index) = parent_mut(document, &target)?;
            check_index(parent, &target, index, true)?;
            parent.nodes.insert(index, node);
        }

        Operation::SetNode {
            path,
            properties,
            previous,
        } => {
            let node = node_mut(document, path)?;
            let current = node.properties();
            let type_restored = (properties.node_type.is_none() && previous.node_type.is_none())
                || previous.node_type == current.node_type;
            let data_restored = (properties.data.is_none() && previous.data.is_none())
                || previous.data == current.data;
            // Texts have no type or data to restore
            if !node.is_text() && (!type_restored || !data_restored) {
                return Err(invalid_payload(
                    op,
                    path,
                    "previous properties differ from the node",
                ));
            }
            // Keys are identity, never patched through set_node
            let properties = NodeProperties {
                key: None,
                ..properties.clone()
            };
            node.apply_properties(&properties);
        }

        Operation::SetSelection { .. } | Operation::SetValue { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::builder::{cursor, paragraphs, value};
    use folio_model::{Decoration, Mark, MarkSet, Range};

    fn remove_text(path: &[usize], offset: usize, text: &str) -> Operation {
        Operation::RemoveText {
            path: Path::from(path),
            offset,
            text: text.to_string(),
            marks: MarkSet::new(),
        }
    }

    #[test]
    fn test_remove_text_moves_anchor_back() {
        let mut v = value(paragraphs(&["abc"]), cursor([0, 0], 3));
        apply_operation(&mut v, &remove_text(&[0, 0], 1, "b")).unwrap();

        assert_eq!(v.document.text(), "ac");
        assert_eq!(v.selection.anchor, Some(Point::new([0, 0], 2)));
    }

    #[test]
    fn test_text_mismatch_leaves_value_untouched() {
        let mut v = value(paragraphs(&["abc"]), cursor([0, 0], 0));
        let before = v.clone();
        let result = apply_operation(&mut v, &remove_text(&[0, 0], 1, "x"));

        assert!(matches!(result, Err(OperationError::TextMismatch { .. })));
        assert_eq!(v, before);
    }

    #[test]
    fn test_missing_path() {
        let mut v = value(paragraphs(&["abc"]), cursor([0, 0], 0));
        let result = apply_operation(&mut v, &remove_text(&[3, 0], 0, "a"));
        assert_eq!(
            result,
            Err(OperationError::Model(ModelError::PathNotFound(Path::from([3, 0]))))
        );
    }

    #[test]
    fn test_merge_texts_and_blocks() {
        let mut v = value(paragraphs(&["word", "another"]), cursor([1, 0], 2));
        let properties = v.document.nodes()[1].properties();
        apply_operation(
            &mut v,
            &Operation::MergeNode {
                path: Path::from([1]),
                position: 1,
                properties,
            },
        )
        .unwrap();
        assert_eq!(v.document.nodes().len(), 1);
        assert_eq!(v.selection.anchor, Some(Point::new([0, 1], 2)));

        apply_operation(
            &mut v,
            &Operation::MergeNode {
                path: Path::from([0, 1]),
                position: 4,
                properties: NodeProperties::default(),
            },
        )
        .unwrap();
        assert_eq!(v.document.nodes()[0].nodes().len(), 1);
        assert_eq!(v.document.text(), "wordanother");
        assert_eq!(v.selection.anchor, Some(Point::new([0, 0], 6)));
    }

    #[test]
    fn test_merge_incompatible() {
        let doc = Node::document(vec![Node::block(
            "paragraph",
            vec![
                Node::new_text(""),
                Node::inline("link", vec![Node::new_text("x")]),
                Node::new_text(""),
            ],
        )]);
        let mut v = Value::new(doc);
        let result = apply_operation(
            &mut v,
            &Operation::MergeNode {
                path: Path::from([0, 1]),
                position: 0,
                properties: NodeProperties::default(),
            },
        );
        assert!(matches!(result, Err(OperationError::InvalidMerge { .. })));
    }

    #[test]
    fn test_split_carries_properties() {
        let mut v = value(paragraphs(&["hello"]), cursor([0, 0], 4));
        let key = folio_model::Key::generate();
        apply_operation(
            &mut v,
            &Operation::SplitNode {
                path: Path::from([0, 0]),
                position: 2,
                properties: NodeProperties::default().with_key(key),
            },
        )
        .unwrap();

        let block = &v.document.nodes()[0];
        assert_eq!(block.nodes()[0].text(), "he");
        assert_eq!(block.nodes()[1].text(), "llo");
        assert_eq!(block.nodes()[1].key(), key);
        assert_eq!(v.selection.anchor, Some(Point::new([0, 1], 2)));
    }

    #[test]
    fn test_move_into_itself() {
        let doc = Node::document(vec![Node::block(
            "quote",
            vec![Node::block("paragraph", vec![Node::new_text("x")])],
        )]);
        let mut v = Value::new(doc);
        let result = apply_operation(
            &mut v,
            &Operation::MoveNode {
                path: Path::from([0]),
                new_path: Path::from([0, 0, 1]),
            },
        );
        assert!(matches!(result, Err(OperationError::InvalidMove { .. })));
    }

    #[test]
    fn test_remove_node_selection_falls_back() {
        let mut v = value(paragraphs(&["one", "two", "three"]), cursor([1, 0], 1));
        let node = v.document.nodes()[1].clone();
        apply_operation(
            &mut v,
            &Operation::RemoveNode {
                path: Path::from([1]),
                node,
            },
        )
        .unwrap();
        assert_eq!(v.selection.anchor, Some(Point::new([0, 0], 3)));
        assert!(v.selection.is_collapsed());

        let mut v = value(paragraphs(&["one", "two"]), cursor([0, 0], 1));
        let node = v.document.nodes()[0].clone();
        apply_operation(
            &mut v,
            &Operation::RemoveNode {
                path: Path::from([0]),
                node,
            },
        )
        .unwrap();
        assert_eq!(v.selection.anchor, Some(Point::new([0, 0], 0)));
    }

    #[test]
    fn test_decorations_follow_and_drop() {
        let bold = Mark::new("highlight");
        let mut v = value(paragraphs(&["one", "two"]), cursor([0, 0], 0)).with_decorations(vec![
            Decoration::new(
                Range::new(Point::new([1, 0], 0), Point::new([1, 0], 2)),
                bold.clone(),
            ),
            Decoration::new(
                Range::new(Point::new([0, 0], 0), Point::new([0, 0], 2)),
                bold,
            ),
        ]);
        let node = v.document.nodes()[0].clone();
        apply_operation(
            &mut v,
            &Operation::RemoveNode {
                path: Path::from([0]),
                node,
            },
        )
        .unwrap();

        assert_eq!(v.decorations.len(), 1);
        assert_eq!(v.decorations[0].range.anchor.path, Path::from([0, 0]));
    }

    #[test]
    fn test_set_node_ignores_key() {
        let mut v = Value::new(paragraphs(&["a"]));
        let key = v.document.nodes()[0].key();
        apply_operation(
            &mut v,
            &Operation::SetNode {
                path: Path::from([0]),
                properties: NodeProperties::node_type("heading").with_key(folio_model::Key::generate()),
                previous: NodeProperties::node_type("paragraph"),
            },
        )
        .unwrap();
        assert_eq!(v.document.nodes()[0].node_type(), Some("heading"));
        assert_eq!(v.document.nodes()[0].key(), key);
    }

    fn bold_then_plain() -> Value {
        let bold = MarkSet::from_iter([Mark::new("bold")]);
        let text = Node::leaves(vec![
            folio_model::Leaf::new("ab", bold),
            folio_model::Leaf::new("cd", MarkSet::new()),
        ]);
        value(
            Node::document(vec![Node::block("paragraph", vec![text])]),
            cursor([0, 0], 0),
        )
    }

    fn assert_invalid_payload(v: &mut Value, op: &Operation) {
        let before = v.clone();
        let result = apply_operation(v, op);
        assert!(
            matches!(result, Err(OperationError::InvalidPayload { .. })),
            "{:?} gave {:?}",
            op,
            result
        );
        assert_eq!(*v, before);
    }

    #[test]
    fn test_remove_node_checks_node() {
        let mut v = value(paragraphs(&["keep", "two"]), cursor([0, 0], 0));
        assert_invalid_payload(
            &mut v,
            &Operation::RemoveNode {
                path: Path::from([1]),
                node: Node::block("heading", vec![Node::new_text("bogus")]),
            },
        );
    }

    #[test]
    fn test_remove_text_checks_marks() {
        let mut v = bold_then_plain();
        assert_invalid_payload(&mut v, &remove_text(&[0, 0], 0, "abcd"));

        let op = Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 0,
            text: "ab".to_string(),
            marks: MarkSet::from_iter([Mark::new("bold")]),
        };
        let original = v.clone();
        apply_operation(&mut v, &op).unwrap();
        apply_operation(&mut v, &op.invert()).unwrap();
        assert_eq!(v.document, original.document);
    }

    #[test]
    fn test_mark_ops_require_exact_spans() {
        let mut v = bold_then_plain();
        let bold = Mark::new("bold");
        let italic = Mark::new("italic");
        // Half the span is already bold, half of it is not
        assert_invalid_payload(
            &mut v,
            &Operation::AddMark {
                path: Path::from([0, 0]),
                offset: 0,
                length: 4,
                mark: bold.clone(),
            },
        );
        assert_invalid_payload(
            &mut v,
            &Operation::RemoveMark {
                path: Path::from([0, 0]),
                offset: 0,
                length: 4,
                mark: bold.clone(),
            },
        );
        assert_invalid_payload(
            &mut v,
            &Operation::SetMark {
                path: Path::from([0, 0]),
                offset: 0,
                length: 4,
                mark: bold.clone(),
                new_mark: italic.clone(),
            },
        );

        let original = v.clone();
        let add = Operation::AddMark {
            path: Path::from([0, 0]),
            offset: 2,
            length: 2,
            mark: bold,
        };
        apply_operation(&mut v, &add).unwrap();
        apply_operation(&mut v, &add.invert()).unwrap();
        assert_eq!(v.document, original.document);
    }

    #[test]
    fn test_merge_checks_properties() {
        let mut v = value(paragraphs(&["a", "b"]), cursor([0, 0], 0));
        assert_invalid_payload(
            &mut v,
            &Operation::MergeNode {
                path: Path::from([1]),
                position: 1,
                properties: NodeProperties::node_type("heading"),
            },
        );
    }

    #[test]
    fn test_set_node_checks_previous() {
        let mut v = value(paragraphs(&["a"]), cursor([0, 0], 0));
        assert_invalid_payload(
            &mut v,
            &Operation::SetNode {
                path: Path::from([0]),
                properties: NodeProperties::node_type("heading"),
                previous: NodeProperties::node_type("quote"),
            },
        );
    }
}
