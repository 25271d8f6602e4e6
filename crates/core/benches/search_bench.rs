//! Benchmarks for feed flattening and search
//!
//! Run with: cargo bench --package feedcache-core --bench search_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use feedcache_core::feed::{FeedLoader, FlattenSettings};
use feedcache_core::{FeedCacheConfig, QueryEngine, StaticFetcher};
use std::sync::Arc;

/// Generate a catalogue with `count` products
fn catalog(count: usize) -> String {
    let mut xml = String::from("<catalog>");
    for i in 0..count {
        xml.push_str(&format!(
            r#"<product sku="SKU{i}"><id>{i}</id><name>Wine {i} Reserva</name><price currency="EUR">{i}.5</price><tag>red</tag><tag>dry</tag></product>"#
        ));
    }
    xml.push_str("</catalog>");
    xml
}

fn settings() -> FlattenSettings {
    let config = FeedCacheConfig::default();
    FlattenSettings {
        entry_elements: config.feed.entry_elements,
        id_fields: config.feed.id_fields,
        max_records: 100_000,
    }
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for size in [100, 1_000, 10_000] {
        let body = catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| {
                let snapshot = FeedLoader::build_snapshot(black_box(body), &settings(), "bench");
                black_box(snapshot)
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut config = FeedCacheConfig::default();
    config.limits.max_records = 10_000;
    let engine = QueryEngine::from_fetcher(Arc::new(StaticFetcher::new(catalog(10_000))), &config);
    rt.block_on(engine.ensure_fresh()).unwrap();

    for query in ["reserva", "wine 9999", "absent"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), query, |b, query| {
            b.to_async(&rt).iter(|| async {
                let response = engine.search(black_box(query)).await;
                black_box(response)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_flatten, bench_search);
criterion_main!(benches);
