use std::{collections::HashMap, hint::black_box};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oahash::{FxKeyHasher, OaTable};
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use rustc_hash::FxHashMap;

type FxTable = OaTable<u64, u64, FxKeyHasher>;

const SIZES: &[usize] = &[100, 1_000, 10_000];

fn filled(n: usize) -> FxTable {
    let mut t = FxTable::default();
    for i in 0..n as u64 {
        t.insert(i, i).unwrap();
    }
    t
}

fn shuffled_keys(n: usize) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..n as u64).collect();
    keys.shuffle(&mut SmallRng::seed_from_u64(42));
    keys
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("oa_table_insert");

    for &n in SIZES {
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("OaTable", n), &n, |b, &n| {
            b.iter(|| {
                let mut t = FxTable::default();
                for i in 0..n as u64 {
                    t.insert(black_box(i), black_box(i)).unwrap();
                }
                t
            });
        });

        group.bench_with_input(BenchmarkId::new("OaTable presized", n), &n, |b, &n| {
            b.iter(|| {
                let mut t = FxTable::with_hasher(n * 2, 0.9, FxKeyHasher).unwrap();
                for i in 0..n as u64 {
                    t.insert(black_box(i), black_box(i)).unwrap();
                }
                t
            });
        });

        group.bench_with_input(BenchmarkId::new("FxHashMap", n), &n, |b, &n| {
            b.iter(|| {
                let mut m = FxHashMap::default();
                for i in 0..n as u64 {
                    m.insert(black_box(i), black_box(i));
                }
                m
            });
        });
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("oa_table_get");

    for &n in SIZES {
        let table = filled(n);
        let map: FxHashMap<u64, u64> = (0..n as u64).map(|i| (i, i)).collect();
        let keys = shuffled_keys(n);

        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("OaTable hit", n), &keys, |b, keys| {
            b.iter(|| {
                for k in keys {
                    black_box(table.get(k));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("OaTable miss", n), &n, |b, &n| {
            b.iter(|| {
                for k in n as u64..2 * n as u64 {
                    black_box(table.get(&k));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("FxHashMap hit", n), &keys, |b, keys| {
            b.iter(|| {
                for k in keys {
                    black_box(map.get(k));
                }
            });
        });
    }

    group.finish();
}

/// Вставки и удаления вперемешку: tombstone'ы удлиняют пробы, пока их не
/// уберёт рехеширование или компакция.
fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("oa_table_churn");
    let n = 10_000u64;

    group.bench_function("OaTable", |b| {
        b.iter(|| {
            let mut t = FxTable::default();
            for i in 0..n {
                t.insert(i, i).unwrap();
                if i >= 64 {
                    t.remove(&(i - 64));
                }
            }
            black_box(t.tombstones())
        });
    });

    group.bench_function("OaTable compaction 0.25", |b| {
        b.iter(|| {
            let mut t = FxTable::default()
                .with_compaction_ratio(Some(0.25))
                .unwrap();
            for i in 0..n {
                t.insert(i, i).unwrap();
                if i >= 64 {
                    t.remove(&(i - 64));
                }
            }
            black_box(t.tombstones())
        });
    });

    group.bench_function("HashMap", |b| {
        b.iter(|| {
            let mut m = HashMap::new();
            for i in 0..n {
                m.insert(i, i);
                if i >= 64 {
                    m.remove(&(i - 64));
                }
            }
            black_box(m.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_churn);
criterion_main!(benches);
