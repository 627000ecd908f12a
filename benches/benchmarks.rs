use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use zawk::{Lexer, Value, ZMap, ZString};

// ============ Lexer Benchmarks ============

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    // Simple program
    let simple = r#"BEGIN { print "hello" }"#;
    group.bench_function("simple_program", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(simple));
            lexer.tokenize().unwrap()
        })
    });

    // Complex program with many tokens
    let complex = r#"
        BEGIN {
            FS = ":"
            count = 0
        }
        /pattern/ {
            for (i = 1; i <= NF; i++) {
                if ($i ~ /[0-9]+/) {
                    sum += $i ** 2
                    count++
                }
            }
        }
        END {
            if (count > 0) {
                printf "Average: %.2f\n", sum / count
            }
        }
    "#;
    group.bench_function("complex_program", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(complex));
            lexer.tokenize().unwrap()
        })
    });

    // Throughput over a long program
    let long: String = (0..1000)
        .map(|i| format!("x{i} = a[\"k{i}\"] / {i}.5e1 # note\n"))
        .collect();
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long_program", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(&long));
            lexer.tokenize().unwrap()
        })
    });

    group.finish();
}

// ============ ZMap Benchmarks ============

fn bench_zmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("zmap");

    for size in [100, 10_000] {
        let keys: Vec<ZString> = (0..size).map(|i| ZString::from(format!("key{i}"))).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert", size), &keys, |b, keys| {
            b.iter(|| {
                let mut map = ZMap::new();
                for (i, key) in keys.iter().enumerate() {
                    map.insert(key, Value::Number(i as f64));
                }
                map
            })
        });

        let mut filled = ZMap::new();
        for key in &keys {
            filled.insert(key, Value::Number(1.0));
        }
        group.bench_with_input(BenchmarkId::new("find", size), &keys, |b, keys| {
            b.iter(|| keys.iter().filter(|k| filled.find(black_box(k)).is_some()).count())
        });

        // Insert/delete churn exercises tombstone reuse and rebuilds
        group.bench_with_input(BenchmarkId::new("churn", size), &keys, |b, keys| {
            b.iter(|| {
                let mut map = ZMap::new();
                for key in keys {
                    map.insert(key, Value::Uninitialized);
                    map.delete(key);
                }
                map
            })
        });
    }

    group.finish();
}

// ============ ZString Benchmarks ============

fn bench_zstring(c: &mut Criterion) {
    let mut group = c.benchmark_group("zstring");

    group.bench_function("append_unique", |b| {
        b.iter(|| {
            let mut s = ZString::with_capacity(16);
            for _ in 0..1000 {
                s.push_bytes(black_box(b"abc"));
            }
            s
        })
    });

    group.bench_function("update_shared", |b| {
        let base = ZString::from("the quick brown fox");
        b.iter(|| {
            let mut s = base.clone();
            s.update(4, black_box(b"slow"));
            s
        })
    });

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_zmap, bench_zstring);

criterion_main!(benches);
