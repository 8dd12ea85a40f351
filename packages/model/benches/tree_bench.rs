use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagebuilder_model::{
    tree, Component, ComponentRef, Forest, GridContents, IdGenerator, ParallaxLayer, Props,
    GRID_CONTENTS_KEY, PAGES_KEY,
};

fn text(id: u64) -> ComponentRef {
    Arc::new(Component::new(id, "text", Props::new().with("content", "Your text...")))
}

/// 50 root grids, each with 4 cells of 5 texts and one nested parallax.
fn build_forest() -> Forest {
    let mut next_id = 1;
    let mut id = || {
        next_id += 1;
        next_id
    };

    (0..50)
        .map(|_| {
            let mut cells = GridContents::new();
            for cell in 0..4 {
                cells.insert(cell, (0..5).map(|_| text(id())).collect());
            }
            let layer = ParallaxLayer::new(1).with_components((0..5).map(|_| text(id())).collect());
            let parallax = Arc::new(Component::new(
                id(),
                "parallax",
                Props::new().with(PAGES_KEY, vec![layer]),
            ));
            cells.entry(0).or_default().push(parallax);

            Arc::new(Component::new(
                id(),
                "column",
                Props::new()
                    .with("numCols", 2)
                    .with("numRows", 2)
                    .with(GRID_CONTENTS_KEY, cells),
            ))
        })
        .collect()
}

fn update_deepest(c: &mut Criterion) {
    let forest = build_forest();
    let target = tree::max_id(&forest).unwrap_or_default() - 2;
    let patch = Props::new().with("content", "Updated");

    c.bench_function("deep_update_nested", |b| {
        b.iter(|| tree::deep_update(black_box(&forest), black_box(target), &patch))
    });
}

fn delete_deepest(c: &mut Criterion) {
    let forest = build_forest();
    let target = tree::max_id(&forest).unwrap_or_default() - 2;

    c.bench_function("deep_delete_nested", |b| {
        b.iter(|| tree::deep_delete(black_box(&forest), black_box(target)))
    });
}

fn unique_ids(c: &mut Criterion) {
    let forest = build_forest();
    let ids = IdGenerator::starting_at(1);

    c.bench_function("ensure_unique_ids", |b| {
        b.iter(|| tree::ensure_unique_ids(black_box(&forest), &ids))
    });
}

criterion_group!(benches, update_deepest, delete_deepest, unique_ids);
criterion_main!(benches);
