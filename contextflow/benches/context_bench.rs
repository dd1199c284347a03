//! Benchmarks for context attach/detach overhead.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use contextflow::context::ContextSlot;
use contextflow::events::{EventPublisher, EventPublishingWrapper, NoOpEventListener};
use contextflow::storage::ContextStorage;

fn context_benchmark(c: &mut Criterion) {
    let bare = ContextStorage::new();
    let _ = bare.current();

    c.bench_function("current", |b| {
        b.iter(|| black_box(bare.current()));
    });

    c.bench_function("attach_detach", |b| {
        b.iter(|| {
            let mut scope = bare.attach(ContextSlot::for_span("t", "s"));
            scope.detach().unwrap();
        });
    });

    let wired = ContextStorage::new();
    let publisher = Arc::new(EventPublisher::new().with_listener(Arc::new(NoOpEventListener)));
    wired
        .register_wrapper(Arc::new(EventPublishingWrapper::new(publisher)))
        .ok()
        .unwrap();

    c.bench_function("attach_detach_with_listener", |b| {
        b.iter(|| {
            let mut scope = wired.attach(ContextSlot::for_span("t", "s"));
            scope.detach().unwrap();
        });
    });
}

criterion_group!(benches, context_benchmark);
criterion_main!(benches);
