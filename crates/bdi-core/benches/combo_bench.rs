//! # Action Core Benchmarks
//!
//! Performance benchmarks for unification, option enumeration and combo
//! execution.
//!
//! Run with: `cargo bench -p bdi-core`

use bdi_core::{
    Action, ActionCombo, ActionSpec, InsertAction, MemoryState, Query, RecordingCollaborators,
    Substitution, Term, Update, UserSpecAction, mgu, parse_term, parse_terms,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A state believing `item(0) .. item(size - 1)`.
fn create_item_state(size: usize) -> MemoryState {
    let mut state = MemoryState::new("bench");
    let atoms = (0..size).map(|i| Term::compound("item", vec![Term::int(i as i64)]));
    state
        .add_beliefs(&Update::adding(atoms))
        .expect("beliefs");
    state
}

/// `take(Y) + insert(seen(Y))` where `take(X)` requires `item(X)`.
fn create_take_combo() -> ActionCombo {
    let spec = ActionSpec::new(
        "take",
        parse_terms("X").expect("params"),
        Query::parse("item(X)").expect("pre"),
        Update::parse("taken(X), not(item(X))").expect("post"),
    )
    .with_external(false);
    let mut take = UserSpecAction::new("take", parse_terms("Y").expect("args"));
    take.add_specification(&spec);
    ActionCombo::new(vec![
        Action::UserSpec(take),
        Action::Insert(InsertAction::new(Update::parse("seen(Y)").expect("update"))),
    ])
    .expect("combo")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_unification(c: &mut Criterion) {
    let a = parse_term("f(g(X, b), h(Y, Z), k(W))").expect("term");
    let b = parse_term("f(g(a, Y), h(b, k(W)), V)").expect("term");
    c.bench_function("mgu_nested", |bench| {
        bench.iter(|| black_box(mgu(black_box(&a), black_box(&b))));
    });
}

fn bench_get_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("combo_get_options");
    let combo = create_take_combo();

    for size in [10, 100, 1000].iter() {
        let state = create_item_state(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let mut collab = RecordingCollaborators::new();
            b.iter(|| black_box(combo.get_options(&state, &mut collab.context())));
        });
    }

    group.finish();
}

fn bench_combo_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("combo_run");
    let combo = create_take_combo();

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                || (create_item_state(size), RecordingCollaborators::new()),
                |(mut state, mut collab)| {
                    black_box(combo.run(
                        &mut state,
                        &Substitution::empty(),
                        &mut collab.context(),
                        false,
                    ))
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_unification, bench_get_options, bench_combo_run);

criterion_main!(benches);
