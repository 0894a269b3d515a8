//! Benchmarks for Games-Howell comparisons.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use posthoc::prelude::*;

fn observations(k: u32, per_group: u32) -> Vec<Observation<u32>> {
    (0..k)
        .flat_map(|g| {
            (0..per_group).map(move |i| {
                let spread = 1.0 + f64::from(g % 4);
                Observation::new(g, f64::from(g) + spread * f64::from((i * 31 + g) % 17) / 17.0)
            })
        })
        .collect()
}

fn bench_games_howell(c: &mut Criterion) {
    let mut group = c.benchmark_group("games_howell");

    for k in [3u32, 8, 20].iter() {
        let obs = observations(*k, 30);

        group.bench_with_input(BenchmarkId::new("sequential", k), k, |b, _| {
            b.iter(|| GamesHowell::new().run(black_box(&obs)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("parallel", k), k, |b, _| {
            b.iter(|| {
                GamesHowell::new()
                    .with_parallel(true)
                    .run(black_box(&obs))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_studentized_range(c: &mut Criterion) {
    c.bench_function("tukey_quantile_k5_df20", |b| {
        b.iter(|| Tukey.quantile(black_box(0.95), 5, black_box(20.0)).unwrap());
    });
}

criterion_group!(benches, bench_games_howell, bench_studentized_range);
criterion_main!(benches);
