//! Integration tests for the editor crate

use folio_editor::{
    apply_operation, transform_path, Change, Editor, EditorResult, Normalizer, Operation, Plugin,
};
use folio_model::builder::{cursor, paragraphs, span, value};
use folio_model::{
    Key, Leaf, Mark, MarkSet, Node, NodeProperties, Path, Point, SerializeOptions, Serializer, Text,
    Value,
};
use folio_schema::{ChildGroup, NodeMatcher, Rule, Schema, SchemaLayer, Violation};
use proptest::prelude::*;
use std::sync::Arc;

fn texts(editor: &Editor) -> Vec<String> {
    editor.document().nodes().iter().map(Node::text).collect()
}

#[test]
fn test_delete_backward_inside_word() {
    // <p>wo|rd</p> -> <p>w|rd</p>
    let mut editor = Editor::new(value(paragraphs(&["word"]), cursor([0, 0], 2)));
    editor.edit(|change| change.delete_backward()).unwrap();

    assert_eq!(editor.document().text(), "wrd");
    assert_eq!(editor.selection().anchor, Some(Point::new([0, 0], 1)));
    assert!(editor.selection().is_collapsed());
}

#[test]
fn test_delete_backward_joins_paragraphs() {
    let mut editor = Editor::new(value(paragraphs(&["word", "another"]), cursor([1, 0], 0)));
    editor.edit(|change| change.delete_backward()).unwrap();

    assert_eq!(texts(&editor), ["wordanother"]);
    assert_eq!(editor.document().nodes()[0].nodes().len(), 1);
    assert_eq!(editor.selection().anchor, Some(Point::new([0, 0], 4)));

    editor.undo().unwrap();
    assert_eq!(texts(&editor), ["word", "another"]);
    assert_eq!(editor.selection().anchor, Some(Point::new([1, 0], 0)));
}

#[test]
fn test_quote_children_wrapped_by_hook() {
    let layer = SchemaLayer::new("quotes")
        .rule(Rule::block("quote").nodes(vec![ChildGroup::of(NodeMatcher::block("paragraph")).min(1)]));
    let plugin = Plugin::new("quotes").with_layer(layer).with_hook(
        |change: &mut Change, violation: &Violation| -> EditorResult<bool> {
            let Some(child) = violation.child_path() else {
                return Ok(false);
            };
            change.wrap_block_by_path(&child, Node::block("paragraph", vec![]))?;
            Ok(true)
        },
    );

    let doc = Node::document(vec![Node::block("quote", vec![Node::new_text("text")])]);
    let mut editor = Editor::new(value(doc, cursor([0, 0], 2))).with_plugin(plugin);
    editor.normalize_document().unwrap();

    let quote = &editor.document().nodes()[0];
    assert_eq!(quote.node_type(), Some("quote"));
    assert_eq!(quote.nodes().len(), 1);
    assert_eq!(quote.nodes()[0].node_type(), Some("paragraph"));
    assert_eq!(quote.text(), "text");
    // The cursor followed its text into the new paragraph
    assert_eq!(editor.selection().anchor, Some(Point::new([0, 0, 0], 2)));
}

#[test]
fn test_quote_children_wrapped_by_schema() {
    let layer = SchemaLayer::new("quotes")
        .rule(Rule::block("quote").nodes(vec![ChildGroup::of(NodeMatcher::block("paragraph")).min(1)]));
    let plugin = Plugin::new("quotes").with_layer(layer);

    let doc = Node::document(vec![Node::block("quote", vec![Node::new_text("text")])]);
    let mut editor = Editor::new(value(doc, cursor([0, 0], 2))).with_plugin(plugin);
    editor.normalize_document().unwrap();

    let quote = &editor.document().nodes()[0];
    assert_eq!(quote.node_type(), Some("quote"));
    assert_eq!(quote.nodes().len(), 1);
    assert_eq!(quote.nodes()[0].node_type(), Some("paragraph"));
    assert_eq!(quote.text(), "text");
    assert_eq!(editor.selection().anchor, Some(Point::new([0, 0, 0], 2)));
}

#[test]
fn test_anchor_moves_back_when_text_before_it_is_removed() {
    let mut editor = Editor::new(value(paragraphs(&["abc"]), cursor([0, 0], 3)));
    editor
        .edit(|change| change.remove_text_by_path(&Path::from([0, 0]), 0, 1))
        .unwrap();

    assert_eq!(editor.document().text(), "bc");
    assert_eq!(editor.selection().anchor, Some(Point::new([0, 0], 2)));
}

#[test]
fn test_typing_is_undone_as_one_batch() {
    let mut editor = Editor::new(value(paragraphs(&[""]), cursor([0, 0], 0)));
    for ch in ["h", "e", "y"] {
        editor.edit(|change| change.insert_text(ch)).unwrap();
    }
    assert_eq!(editor.document().text(), "hey");
    assert_eq!(editor.history().undo_levels(), 1);

    editor.undo().unwrap();
    assert_eq!(editor.document().text(), "");
    assert_eq!(editor.selection().anchor, Some(Point::new([0, 0], 0)));
}

#[test]
fn test_undo_all_then_redo_all() {
    let initial = value(paragraphs(&["one", "two"]), cursor([0, 0], 3));
    let mut editor = Editor::new(initial.clone());

    editor.edit(|change| change.insert_text("!")).unwrap();
    editor.flush_history();
    editor.edit(|change| change.split_block(1)).unwrap();
    editor.flush_history();
    editor
        .edit(|change| {
            change.select_all()?;
            change.toggle_mark(Mark::new("bold"))
        })
        .unwrap();
    editor.flush_history();
    editor
        .edit(|change| change.wrap_block(Node::block("quote", vec![])))
        .unwrap();

    let last = editor.value().clone();
    let levels = editor.history().undo_levels();
    assert_eq!(levels, 4);

    for _ in 0..levels {
        assert!(editor.undo().unwrap());
    }
    assert!(editor.document().content_eq(&initial.document));
    assert!(!editor.undo().unwrap(), "undo past the bottom is a no-op");
    assert!(editor.document().content_eq(&initial.document));

    for _ in 0..levels {
        assert!(editor.redo().unwrap());
    }
    assert!(editor.document().content_eq(&last.document));
    assert_eq!(editor.selection().range(), last.selection.range());
    assert!(!editor.redo().unwrap());
}

#[test]
fn test_new_edit_clears_redo() {
    let mut editor = Editor::new(value(paragraphs(&["a"]), cursor([0, 0], 1)));
    editor.edit(|change| change.insert_text("b")).unwrap();
    editor.undo().unwrap();
    assert!(editor.history().can_redo());

    editor.edit(|change| change.insert_text("c")).unwrap();
    assert!(!editor.history().can_redo());
    assert_eq!(editor.document().text(), "ac");
}

#[test]
fn test_normalizing_a_normalized_tree_is_a_noop() {
    let messy = Node::document(vec![
        Node::block("paragraph", vec![Node::new_text("a"), Node::new_text("b")]),
        Node::block("paragraph", vec![]),
        Node::block(
            "paragraph",
            vec![Node::inline("link", vec![Node::new_text("x")])],
        ),
    ]);
    let mut change = Change::standalone(Value::new(messy));
    change.normalize_document().unwrap();
    let applied = change.operations().len();
    assert!(applied > 0);
    assert!(Schema::new().is_valid(change.document()));

    change.normalize_document().unwrap();
    assert_eq!(change.operations().len(), applied);
}

#[test]
fn test_value_round_trips_through_json() {
    let mut editor = Editor::new(value(paragraphs(&["plain", "bold"]), span([1, 0], 0, [1, 0], 4)));
    editor.edit(|change| change.add_mark(Mark::new("bold"))).unwrap();

    let serializer = Serializer::new(SerializeOptions::default());
    let json = serializer.to_string(editor.value()).unwrap();
    let restored = serializer.from_str(&json).unwrap();
    assert!(restored.content_eq(editor.value()));

    let keyed = Serializer::new(SerializeOptions::preserve_keys());
    let restored = keyed.from_str(&keyed.to_string(editor.value()).unwrap()).unwrap();
    assert_eq!(restored.document, editor.value().document);
}

#[test]
fn test_operations_round_trip_through_json() {
    let mut change = Change::standalone(value(paragraphs(&["ab", "cd"]), cursor([0, 0], 1)));
    change.split_block(1).unwrap();
    change.insert_text("x").unwrap();

    let json = serde_json::to_string(change.operations()).unwrap();
    let ops: Vec<Operation> = serde_json::from_str(&json).unwrap();
    assert_eq!(ops, change.operations());
}

#[test]
fn test_normalization_limit_is_reported() {
    let layer = SchemaLayer::new("stubborn")
        .rule(Rule::block("paragraph").nodes(vec![ChildGroup::of(NodeMatcher::block("line")).min(1)]));
    let mut normalizer = Normalizer::new().with_iteration_base(3);
    normalizer.add_hook(
        "stubborn",
        Arc::new(|_: &mut Change, _: &Violation| -> EditorResult<bool> { Ok(true) }),
    );
    let mut change = Change::new(
        value(paragraphs(&["a"]), cursor([0, 0], 0)),
        Arc::new(Schema::new().with_layer(layer)),
        Arc::new(normalizer),
    );

    let err = change.normalize_document().unwrap_err();
    assert!(err.is_normalization_limit());
}

// Property tests

fn mark_set(bits: u8) -> MarkSet {
    let mut marks = MarkSet::new();
    if bits & 1 != 0 {
        marks.insert(Mark::new("bold"));
    }
    if bits & 2 != 0 {
        marks.insert(Mark::new("italic"));
    }
    marks
}

/// Paragraphs of marked runs, with the cursor somewhere in the text
fn arb_value() -> impl Strategy<Value = Value> {
    let runs = prop::collection::vec(("[a-z]{1,4}", 0u8..4), 0..4);
    (prop::collection::vec(runs, 1..5), any::<usize>(), any::<usize>()).prop_map(
        |(blocks, block_seed, offset_seed)| {
            let document = Node::document(
                blocks
                    .into_iter()
                    .map(|runs| {
                        let leaves = runs
                            .into_iter()
                            .map(|(text, bits)| Leaf::new(text, mark_set(bits)))
                            .collect();
                        Node::block("paragraph", vec![Node::leaves(leaves)])
                    })
                    .collect(),
            );
            let block = block_seed % document.nodes().len();
            let len = document.nodes()[block].text().chars().count();
            value(document, cursor([block, 0], offset_seed % (len + 1)))
        },
    )
}

/// A span inside one leaf run of `text`, as (offset, length, marks)
fn pick_run(text: &Text, a: usize, b: usize) -> Option<(usize, usize, MarkSet)> {
    let runs = text.runs(0, text.len());
    if runs.is_empty() {
        return None;
    }
    let (start, leaf) = &runs[a % runs.len()];
    let len = leaf.len();
    let skip = b % len;
    Some((start + skip, 1 + (a / 7) % (len - skip), leaf.marks.clone()))
}

/// A valid operation against `value`, picked by `kind` and shaped by the seeds
fn build_op(value: &Value, kind: u8, a: usize, b: usize) -> Option<Operation> {
    let doc = &value.document;
    let count = doc.nodes().len();
    let block = a % count;
    let text_path = Path::from([block, 0]);
    let text = doc.get(&text_path).and_then(Node::as_text)?;
    let len = text.len();

    Some(match kind % 14 {
        0 => Operation::InsertText {
            path: text_path,
            offset: b % (len + 1),
            text: "xy".to_string(),
            marks: mark_set((a / 3) as u8 % 4),
        },
        1 => {
            let (offset, length, marks) = pick_run(text, a, b)?;
            Operation::RemoveText {
                path: text_path,
                offset,
                text: text.slice(offset, length)?,
                marks,
            }
        }
        2 => Operation::InsertNode {
            path: Path::from([b % (count + 1)]),
            node: Node::block("paragraph", vec![Node::new_text("new")]),
        },
        3 => Operation::RemoveNode {
            path: Path::from([block]),
            node: doc.nodes()[block].clone(),
        },
        4 => Operation::SplitNode {
            path: text_path,
            position: b % (len + 1),
            properties: NodeProperties::default().with_key(Key::generate()),
        },
        5 => {
            if count < 2 {
                return None;
            }
            let index = 1 + a % (count - 1);
            Operation::MergeNode {
                path: Path::from([index]),
                position: doc.nodes()[index - 1].split_len(),
                properties: doc.nodes()[index].properties(),
            }
        }
        6 => Operation::MoveNode {
            path: Path::from([block]),
            new_path: Path::from([b % (count + 1)]),
        },
        7 => {
            let (offset, length, marks) = pick_run(text, a, b)?;
            let mark = ["bold", "italic"]
                .into_iter()
                .map(Mark::new)
                .find(|mark| !marks.contains(mark))?;
            Operation::AddMark {
                path: text_path,
                offset,
                length,
                mark,
            }
        }
        8 => Operation::SplitNode {
            path: Path::from([block]),
            position: b % 2,
            properties: NodeProperties::node_type("paragraph").with_key(Key::generate()),
        },
        9 => Operation::SetNode {
            path: Path::from([block]),
            properties: NodeProperties::node_type("heading"),
            previous: NodeProperties::node_type("paragraph"),
        },
        10 => {
            let (offset, length, marks) = pick_run(text, a, b)?;
            Operation::RemoveMark {
                path: text_path,
                offset,
                length,
                mark: marks.iter().next()?.clone(),
            }
        }
        11 => {
            let (offset, length, marks) = pick_run(text, a, b)?;
            Operation::SetMark {
                path: text_path,
                offset,
                length,
                mark: marks.iter().next()?.clone(),
                new_mark: Mark::new("underline"),
            }
        }
        12 => Operation::SetSelection {
            selection: span([block, 0], b % (len + 1), [block, 0], len),
            previous: value.selection.clone(),
        },
        _ => {
            let mut data = value.data.clone();
            data.insert("seed".to_string(), serde_json::json!(b));
            Operation::SetValue {
                data,
                previous: value.data.clone(),
            }
        }
    })
}

proptest! {
    /// Applying an operation and then its inverse restores the document
    #[test]
    fn prop_invert_restores_document(
        original in arb_value(),
        kind in any::<u8>(),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let Some(op) = build_op(&original, kind, a, b) else {
            return Ok(());
        };
        let mut value = original.clone();
        apply_operation(&mut value, &op).unwrap();
        apply_operation(&mut value, &op.invert()).unwrap();

        prop_assert_eq!(&value.document, &original.document, "op: {:?}", op);
        prop_assert_eq!(&value.data, &original.data, "op: {:?}", op);
        // Removals collapse points inside the removed content, so only the
        // other operations bring the cursor back
        if !matches!(
            op,
            Operation::RemoveText { .. } | Operation::RemoveNode { .. } | Operation::MergeNode { .. }
        ) {
            prop_assert_eq!(&value.selection, &original.selection, "op: {:?}", op);
        }
        // Moves that leave the node in place have several spellings
        if !matches!(op, Operation::MoveNode { .. }) {
            prop_assert_eq!(op.invert().invert(), op);
        }
    }

    /// Paths outside a moved subtree keep their relative document order
    #[test]
    fn prop_transform_preserves_order(
        original in arb_value(),
        kind in any::<u8>(),
        a in any::<usize>(),
        b in any::<usize>(),
        i in any::<usize>(),
        j in any::<usize>(),
    ) {
        let Some(op) = build_op(&original, kind, a, b) else {
            return Ok(());
        };
        let paths: Vec<Path> = original
            .document
            .paths_under(&Path::root())
            .into_iter()
            .skip(1)
            .collect();
        let (p, q) = (&paths[i % paths.len()], &paths[j % paths.len()]);
        let (p, q) = if p <= q { (p, q) } else { (q, p) };
        // A moved or merged node (and its subtree) may legitimately jump
        if let Operation::MoveNode { path, .. } | Operation::MergeNode { path, .. } = &op {
            if path.is_ancestor_or_equal(p) || path.is_ancestor_or_equal(q) {
                return Ok(());
            }
        }

        if let (Some(tp), Some(tq)) = (transform_path(p, &op), transform_path(q, &op)) {
            prop_assert!(tp <= tq, "{} -> {}, {} -> {} under {:?}", p, tp, q, tq, op);
        }
    }

    /// Transformed paths still address the same node after the operation
    #[test]
    fn prop_transformed_paths_follow_their_node(
        original in arb_value(),
        kind in any::<u8>(),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let Some(op) = build_op(&original, kind, a, b) else {
            return Ok(());
        };
        let mut value = original.clone();
        apply_operation(&mut value, &op).unwrap();

        for path in original.document.paths_under(&Path::root()) {
            let Some(node) = original.document.get(&path) else { continue };
            let Some(moved) = transform_path(&path, &op) else { continue };
            // Merges and splits change the node at the edge; only keys of
            // untouched nodes are stable
            if matches!(op, Operation::MergeNode { .. } | Operation::SplitNode { .. })
                && (op.path().map_or(false, |at| path.is_ancestor_or_equal(at) || at.is_ancestor_or_equal(&path)))
            {
                continue;
            }
            let found = value.document.get(&moved).map(Node::key);
            prop_assert_eq!(found, Some(node.key()), "{} -> {} under {:?}", path, moved, op);
        }
    }
}
