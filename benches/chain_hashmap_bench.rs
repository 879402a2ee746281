use chain_hashmap::ChainHashMap;
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

fn filled(seed: u64, n: usize) -> (ChainHashMap<String, u64>, Vec<String>) {
    let mut m = ChainHashMap::new();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        m.insert(k.clone(), i as u64);
    }
    (m, keys)
}

// 10k indices into `0..n`, drawn with a second LCG.
fn sample_indices(n: usize, count: usize) -> Vec<usize> {
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..count)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            (s as usize) % n
        })
        .collect()
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("chain::insert_fresh_100k", |b| {
        b.iter_batched(
            ChainHashMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

// Inserting present keys never resizes and never runs the value path.
fn bench_insert_duplicate_100k(c: &mut Criterion) {
    c.bench_function("chain::insert_duplicate_100k", |b| {
        b.iter_batched(
            || filled(2, 100_000),
            |(mut m, keys)| {
                for k in keys {
                    black_box(m.insert(k, 0));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

// Drains to a quarter: one shrink, at 32768 entries, from 131072 to 65536 buckets.
fn bench_remove_to_quarter_100k(c: &mut Criterion) {
    c.bench_function("chain::remove_to_quarter_100k", |b| {
        b.iter_batched(
            || filled(5, 100_000),
            |(mut m, keys)| {
                for k in &keys[keys.len() / 4..] {
                    black_box(m.remove(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_10k(c: &mut Criterion) {
    c.bench_function("chain::find_hit_10k_on_100k", |b| {
        let (m, keys) = filled(7, 100_000);
        let queries: Vec<String> = sample_indices(keys.len(), 10_000)
            .into_iter()
            .map(|i| keys[i].clone())
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(m.find(k.as_str()).value());
            }
        })
    });
}

fn bench_find_miss_10k(c: &mut Criterion) {
    c.bench_function("chain::find_miss_10k_on_100k", |b| {
        let (m, _) = filled(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = key(miss.next().unwrap_or_default());
                black_box(m.find(&k).is_end());
            }
        })
    });
}

fn bench_index_increment_10k(c: &mut Criterion) {
    c.bench_function("chain::index_increment_10k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = filled(123, 100_000);
                let targets: Vec<String> = sample_indices(keys.len(), 10_000)
                    .into_iter()
                    .map(|i| keys[i].clone())
                    .collect();
                (m, targets)
            },
            |(mut m, targets)| {
                for k in targets {
                    let v = m.get_or_insert_default(k);
                    *v = v.wrapping_add(1);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter_and_iter_mut(c: &mut Criterion) {
    c.bench_function("chain::cursor_walk_100k", |b| {
        let (m, _) = filled(999, 100_000);
        b.iter(|| {
            let mut sum = 0u64;
            let mut cur = m.begin();
            while let Some(v) = cur.value() {
                sum = sum.wrapping_add(*v);
                cur.move_next();
            }
            black_box(sum)
        })
    });

    c.bench_function("chain::iter_mut_increment_all_100k", |b| {
        b.iter_batched(
            || filled(1001, 100_000).0,
            |mut m| {
                for (_k, v) in m.iter_mut() {
                    *v = v.wrapping_add(1);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_duplicate_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_to_quarter_100k,
              bench_find_hit_10k,
              bench_find_miss_10k,
              bench_index_increment_10k,
              bench_iter_and_iter_mut
}
criterion_main!(benches_insert, benches_ops);
