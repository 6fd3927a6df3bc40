use chain_map::ChainingHashMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
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

fn bench_put_10k(c: &mut Criterion) {
    c.bench_function("chaining::put_fresh_10k", |b| {
        b.iter_batched(
            ChainingHashMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_put_update(c: &mut Criterion) {
    c.bench_function("chaining::put_update", |b| {
        let mut m = ChainingHashMap::new();
        let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.put(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap().clone();
            black_box(m.put(k, 0));
        })
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("chaining::get_hit", |b| {
        let mut m = ChainingHashMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.put(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("chaining::get_miss", |b| {
        let mut m = ChainingHashMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.put(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.get(&k));
        })
    });
}

// Drains a populated map, which walks the table down through every shrink.
fn bench_remove_all_10k(c: &mut Criterion) {
    c.bench_function("chaining::remove_all_10k", |b| {
        b.iter_batched(
            || {
                let mut m = ChainingHashMap::new();
                let keys: Vec<_> = lcg(13).take(10_000).map(key).collect();
                for (i, k) in keys.iter().cloned().enumerate() {
                    m.put(k, i as u64);
                }
                (m, keys)
            },
            |(mut m, keys)| {
                for k in &keys {
                    black_box(m.remove(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_put_10k, bench_put_update, bench_get_hit, bench_get_miss, bench_remove_all_10k
}
criterion_main!(benches);
