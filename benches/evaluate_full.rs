use criterion::{criterion_group, criterion_main, Criterion};
use nereval::{evaluate, evaluate_predictions, EntityAnnotation};
use pprof::criterion::{Output, PProfProfiler};

const TYPES: [&str; 8] = [
    "person",
    "organization",
    "location",
    "date",
    "product",
    "event",
    "work_of_art",
    "misc",
];

/// Deterministic corpus: every 7th prediction is dropped and every 11th one gets the wrong type.
fn build_corpus(
    n_instances: usize,
    per_instance: usize,
) -> (Vec<Vec<EntityAnnotation>>, Vec<Vec<EntityAnnotation>>) {
    let mut gold = Vec::with_capacity(n_instances);
    let mut predicted = Vec::with_capacity(n_instances);
    let mut k = 0usize;
    for i in 0..n_instances {
        let mut gold_instance = Vec::with_capacity(per_instance);
        let mut pred_instance = Vec::with_capacity(per_instance);
        for j in 0..per_instance {
            let entity_type = TYPES[(i + j) % TYPES.len()];
            let text = format!("entity {i} {j}");
            k += 1;
            if k % 11 == 0 {
                let wrong_type = TYPES[(i + j + 1) % TYPES.len()];
                pred_instance.push(EntityAnnotation::new(wrong_type, text.clone()));
            } else if k % 7 != 0 {
                pred_instance.push(EntityAnnotation::new(entity_type, text.clone()));
            }
            gold_instance.push(EntityAnnotation::new(entity_type, text));
        }
        gold.push(gold_instance);
        predicted.push(pred_instance);
    }
    (gold, predicted)
}

fn benchmark_small_corpus(c: &mut Criterion) {
    let (gold, predicted) = build_corpus(1_000, 4);
    c.bench_function("small_corpus_evaluate", |b| {
        b.iter(|| evaluate(&gold, &predicted, None).unwrap())
    });
}

fn benchmark_big_corpus(c: &mut Criterion) {
    let (gold, predicted) = build_corpus(10_000, 8);
    c.bench_function("big_corpus_evaluate", |b| {
        b.iter(|| evaluate(&gold, &predicted, None).unwrap())
    });
}

fn benchmark_big_corpus_known_types(c: &mut Criterion) {
    let (gold, predicted) = build_corpus(10_000, 8);
    c.bench_function("big_corpus_evaluate_known_types", |b| {
        b.iter(|| evaluate(&gold, &predicted, Some(&TYPES[..])).unwrap())
    });
}

fn benchmark_big_corpus_micro_only(c: &mut Criterion) {
    let (gold, predicted) = build_corpus(10_000, 8);
    c.bench_function("big_corpus_evaluate_predictions", |b| {
        b.iter(|| evaluate_predictions(&gold, &predicted).unwrap())
    });
}

criterion_group!(
    name=evaluate_benches;
    config = Criterion::default().sample_size(100).with_profiler(PProfProfiler::new(3000, Output::Flamegraph(None)));
    targets = benchmark_small_corpus,
    benchmark_big_corpus,
    benchmark_big_corpus_known_types,
    benchmark_big_corpus_micro_only
);
criterion_main!(evaluate_benches);
