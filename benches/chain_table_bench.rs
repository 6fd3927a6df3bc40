use chain_map::chain_table::ChainTable;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hashbrown::hash_map::DefaultHashBuilder;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn populated(n: usize, capacity: usize) -> ChainTable<String, u64, DefaultHashBuilder> {
    let mut t = ChainTable::with_capacity_and_hasher(capacity, DefaultHashBuilder::default());
    for (i, x) in lcg(5).take(n).enumerate() {
        t.put(key(x), i as u64);
    }
    t
}

// Rebuild cost in isolation: stored hashes mean no key is rehashed.
fn bench_rebuild_grow_100k(c: &mut Criterion) {
    c.bench_function("table::rebuild_grow_100k", |b| {
        b.iter_batched(
            || populated(100_000, 131_072),
            |mut t| {
                t.rebuild(262_144);
                black_box(t)
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_rebuild_shrink_100k(c: &mut Criterion) {
    c.bench_function("table::rebuild_shrink_100k", |b| {
        b.iter_batched(
            || populated(100_000, 262_144),
            |mut t| {
                t.rebuild(65_536);
                black_box(t)
            },
            BatchSize::LargeInput,
        )
    });
}

// Long chains: one bucket holding 1k entries.
fn bench_single_chain_get(c: &mut Criterion) {
    c.bench_function("table::single_chain_get_1k", |b| {
        let t = populated(1_000, 1);
        let keys: Vec<_> = lcg(5).take(1_000).map(key).collect();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k.as_str()));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(6))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_rebuild_grow_100k, bench_rebuild_shrink_100k, bench_single_chain_get
}
criterion_main!(benches);
