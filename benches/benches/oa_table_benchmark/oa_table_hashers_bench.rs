use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oahash::{FxKeyHasher, KeyHasher, OaTable, PolyHasher, ProbeStep, SipKeyHasher, XxKeyHasher};

const N: usize = 10_000;

fn keys() -> Vec<String> {
    (0..N).map(|i| format!("user:{i:06}")).collect()
}

fn build<H: KeyHasher<String> + KeyHasher<str>>(
    hasher: H,
    step: ProbeStep,
    keys: &[String],
) -> OaTable<String, usize, H> {
    let mut t = OaTable::with_hasher(16, 0.75, hasher)
        .unwrap()
        .with_probe_step(step)
        .unwrap();
    for (i, k) in keys.iter().enumerate() {
        // При шаге Reference отдельные ключи могут не найти ячейку.
        let _ = t.insert(k.clone(), i);
    }
    t
}

fn bench_with<H: KeyHasher<String> + KeyHasher<str>>(
    c: &mut Criterion,
    name: &str,
    hasher: H,
) {
    let keys = keys();
    let mut group = c.benchmark_group(format!("hasher_{name}"));
    group.throughput(Throughput::Elements(N as u64));

    for step in [ProbeStep::Coprime, ProbeStep::Reference] {
        group.bench_with_input(BenchmarkId::new("insert", step), &step, |b, &step| {
            b.iter(|| build(hasher.clone(), step, &keys));
        });

        let table = build(hasher.clone(), step, &keys);
        let stats = table.stats();
        eprintln!(
            "{name}/{step}: {} of {N} keys, avg probe {:.2}, max probe {}",
            stats.len, stats.avg_probe_len, stats.max_probe_len
        );

        group.bench_with_input(BenchmarkId::new("get", step), &step, |b, _| {
            b.iter(|| {
                for k in &keys {
                    black_box(table.get(k.as_str()));
                }
            });
        });
    }

    group.finish();
}

fn bench_hashers(c: &mut Criterion) {
    bench_with(c, "poly31", PolyHasher);
    bench_with(c, "siphash", SipKeyHasher::default());
    bench_with(c, "xxhash64", XxKeyHasher::default());
    bench_with(c, "fxhash", FxKeyHasher);
}

/// Стоимость самой хеш-функции без таблицы.
fn bench_hash_only(c: &mut Criterion) {
    let keys = keys();
    let mut group = c.benchmark_group("hash_only");
    group.throughput(Throughput::Elements(N as u64));

    group.bench_function("poly31", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(PolyHasher::hash_str(k));
            }
        });
    });

    let sip = SipKeyHasher::default();
    group.bench_function("siphash", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(KeyHasher::<str>::hash_key(&sip, k.as_str()));
            }
        });
    });

    let xx = XxKeyHasher::default();
    group.bench_function("xxhash64", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(KeyHasher::<str>::hash_key(&xx, k.as_str()));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_hashers, bench_hash_only);
criterion_main!(benches);
