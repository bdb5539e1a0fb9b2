//! Editor benchmarks
//!
//! Target: typing into a 1000-paragraph document stays under 100µs per key

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_editor::{Change, Editor};
use folio_model::builder::cursor;
use folio_model::{plain, Path, Point, Value};

fn generate_document(num_paragraphs: usize) -> Value {
    let mut source = String::new();
    for i in 0..num_paragraphs {
        source.push_str(&format!("Paragraph {} with a little text in it\n", i));
    }
    plain::deserialize(source.trim_end(), "paragraph")
}

fn type_into_large_document(c: &mut Criterion) {
    let value = generate_document(1000).with_selection(cursor([500, 0], 5));
    let mut editor = Editor::new(value);

    c.bench_function("type_one_character", |b| {
        b.iter(|| {
            editor
                .edit(|change| change.insert_text(black_box("x")))
                .unwrap();
        })
    });
}

fn delete_across_blocks(c: &mut Criterion) {
    let value = generate_document(200);

    c.bench_function("delete_range_across_100_blocks", |b| {
        b.iter(|| {
            let mut change = Change::standalone(value.clone());
            change
                .select_range(folio_model::Range::new(
                    Point::new([10, 0], 3),
                    Point::new([110, 0], 3),
                ))
                .unwrap();
            change.delete().unwrap();
            black_box(change.into_value())
        })
    });
}

fn normalize_large_document(c: &mut Criterion) {
    let value = generate_document(1000);

    c.bench_function("normalize_1000_paragraphs", |b| {
        b.iter(|| {
            let mut change = Change::standalone(value.clone());
            change.normalize_document().unwrap();
            black_box(change.operations().len())
        })
    });
}

fn undo_redo_cycle(c: &mut Criterion) {
    let value = generate_document(100).with_selection(cursor([50, 0], 0));
    let mut editor = Editor::new(value);
    for _ in 0..50 {
        editor.edit(|change| change.split_block(1)).unwrap();
        editor.flush_history();
    }

    c.bench_function("undo_redo_50_splits", |b| {
        b.iter(|| {
            while editor.undo().unwrap() {}
            while editor.redo().unwrap() {}
            black_box(editor.document().get(&Path::from([50])).is_some())
        })
    });
}

criterion_group!(
    benches,
    type_into_large_document,
    delete_across_blocks,
    normalize_large_document,
    undo_redo_cycle
);
criterion_main!(benches);
