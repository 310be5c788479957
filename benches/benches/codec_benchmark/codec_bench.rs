use std::{convert::Infallible, hint::black_box, io::Cursor, num::ParseIntError};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oahash::{
    engine::DEFAULT_MAX_FIELD_LEN, load_from_file, read_binary, read_dump, read_text, save_to_file,
    write_binary, write_dump, write_text, OaTable,
};
use tempfile::tempdir;

const SIZES: &[usize] = &[100, 10_000];

fn table(n: usize) -> OaTable<String, i64> {
    let mut t = OaTable::default();
    for i in 0..n {
        t.insert(format!("key_{i}"), i as i64 * 7).unwrap();
    }
    t
}

fn parse_key(s: &str) -> Result<String, ParseIntError> {
    Ok(s.to_string())
}

fn parse_value(s: &str) -> Result<i64, ParseIntError> {
    s.parse()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_encode");

    for &n in SIZES {
        let t = table(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("text", n), &t, |b, t| {
            b.iter(|| {
                let mut buf = Vec::new();
                write_text(t, &mut buf).unwrap();
                black_box(buf)
            });
        });

        group.bench_with_input(BenchmarkId::new("binary", n), &t, |b, t| {
            b.iter(|| {
                let mut buf = Vec::new();
                write_binary(t, &mut buf).unwrap();
                black_box(buf)
            });
        });

        group.bench_with_input(BenchmarkId::new("dump", n), &t, |b, t| {
            b.iter(|| {
                let mut buf = Vec::new();
                write_dump(t, &mut buf).unwrap();
                black_box(buf)
            });
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_decode");

    for &n in SIZES {
        let t = table(n);
        let mut text = Vec::new();
        write_text(&t, &mut text).unwrap();
        let mut binary = Vec::new();
        write_binary(&t, &mut binary).unwrap();
        let mut dump = Vec::new();
        write_dump(&t, &mut dump).unwrap();

        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("text", n), &text, |b, text| {
            b.iter(|| {
                let mut fresh: OaTable<String, i64> = OaTable::default();
                read_text(&mut fresh, Cursor::new(text), parse_key, parse_value).unwrap();
                fresh
            });
        });

        group.bench_with_input(BenchmarkId::new("binary", n), &binary, |b, binary| {
            b.iter(|| {
                let mut fresh: OaTable<String, i64> = OaTable::default();
                read_binary(&mut fresh, &binary[..]).unwrap();
                fresh
            });
        });

        group.bench_with_input(BenchmarkId::new("dump", n), &dump, |b, dump| {
            b.iter(|| {
                let mut fresh: OaTable<String, i64> = OaTable::default();
                read_dump(&mut fresh, &dump[..], DEFAULT_MAX_FIELD_LEN).unwrap();
                fresh
            });
        });
    }

    group.finish();
}

/// Полный цикл через файл: временный файл, fsync, rename и чтение.
fn bench_dump_file(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.oat");
    let t = table(10_000);

    let mut group = c.benchmark_group("dump_file");
    group.sample_size(20);

    group.bench_function("save 10_000", |b| {
        b.iter(|| save_to_file(&t, &path).unwrap());
    });

    save_to_file(&t, &path).unwrap();
    group.bench_function("load 10_000", |b| {
        b.iter(|| {
            let mut fresh: OaTable<String, i64> = OaTable::default();
            load_from_file(&mut fresh, &path).unwrap();
            fresh
        });
    });

    group.finish();
}

/// Текст с мусорными строками: цена политики Skip.
fn bench_text_skip(c: &mut Criterion) {
    let mut input = String::new();
    for i in 0..10_000 {
        if i % 10 == 0 {
            input.push_str("garbage line\n");
        } else {
            input.push_str(&format!("k{i}:{i}\n"));
        }
    }

    c.bench_function("text decode with 10% malformed", |b| {
        b.iter(|| {
            let mut fresh: OaTable<String, String> = OaTable::default();
            read_text(
                &mut fresh,
                input.as_bytes(),
                |s| Ok::<_, Infallible>(s.to_string()),
                |s| Ok(s.to_string()),
            )
            .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_dump_file,
    bench_text_skip
);
criterion_main!(benches);
