//! Benchmarks for span estimation and windowing.
//!
//! Run with: cargo bench -p journal-view

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use journal_view::span::{SpanCache, estimate_span};
use journal_view::viewport::{ViewportState, ViewportWindower};
use std::hint::black_box;

fn chat_line(len: usize) -> String {
    "Alice: selling runic hammers and valorite ingots at the bank "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

fn history(n: usize) -> Vec<String> {
    (0..n).map(|i| chat_line(40 + (i * 7) % 160)).collect()
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("span/estimate");
    for len in [20, 200, 2000] {
        let text = chat_line(len);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| black_box(estimate_span(text, 60)))
        });
    }
    group.finish();
}

fn bench_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("span/cached");
    for len in [20, 200, 2000] {
        let text = chat_line(len);
        let mut cache = SpanCache::new(64);
        cache.span(&text, 60);
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| black_box(cache.span(text, 60)))
        });
    }
    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport/select");
    for n in [200, 2000] {
        let records = history(n);
        group.bench_with_input(BenchmarkId::new("warm", n), &records, |b, records| {
            let mut cache = SpanCache::new(4096);
            let windower = ViewportWindower::new(60, 30);
            b.iter(|| {
                let mut state = ViewportState::default();
                black_box(windower.select(records, &mut state, &mut cache))
            })
        });
        group.bench_with_input(BenchmarkId::new("cold", n), &records, |b, records| {
            let windower = ViewportWindower::new(60, 30);
            b.iter(|| {
                let mut cache = SpanCache::new(4096);
                let mut state = ViewportState::default();
                black_box(windower.select(records, &mut state, &mut cache))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_estimate, bench_cached, bench_window);
criterion_main!(benches);
