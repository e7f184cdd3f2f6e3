//! Benchmarks for 2D arrangement.
//!
//! Measures exact overlap tests, separating-line construction and full
//! arrangement runs at various scales.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seqarrange_core::rational::rational_from_int;
use seqarrange_core::{Arranger, SolverConfiguration};
use seqarrange_d2::polygon::{overlaps, separating_line, PlacedShape};
use seqarrange_d2::{ArrangementObject, Arranger2D};

fn objects(n: usize) -> Vec<ArrangementObject> {
    (0..n)
        .map(|i| {
            let w = 6.0 + (i as f64 * 3.0) % 8.0;
            let h = 5.0 + (i as f64 * 7.0) % 9.0;
            if i % 3 == 2 {
                ArrangementObject::l_shape(format!("L{}", i), w + 4.0, h + 4.0, 4.0, 4.0)
            } else {
                ArrangementObject::rectangle(format!("R{}", i), w, h)
            }
        })
        .collect()
}

fn bench_arranger(c: &mut Criterion) {
    let mut group = c.benchmark_group("arranger2d");
    group.sample_size(10);

    for &n in &[4, 8, 12] {
        let input = objects(n);
        let arranger = Arranger2D::new(
            SolverConfiguration::new()
                .with_plate_range(10.0, 120.0)
                .with_size_step(10.0)
                .with_batch_size(4),
        );

        group.bench_with_input(BenchmarkId::new("mixed", n), &input, |b, input| {
            b.iter(|| {
                let result = arranger.arrange(black_box(input));
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let bracket = match ArrangementObject::l_shape("L", 30.0, 30.0, 15.0, 15.0).prepare() {
        Ok(prepared) => prepared,
        Err(_) => return,
    };
    let origin = (rational_from_int(0), rational_from_int(0));
    let shifted = (rational_from_int(14), rational_from_int(14));
    let a = PlacedShape::new(&bracket.footprint, &origin, 0);
    let b = PlacedShape::new(&bracket.footprint, &shifted, 1);

    c.bench_function("overlaps_l_shapes", |bench| {
        bench.iter(|| overlaps(black_box(&a), black_box(&b)))
    });
    c.bench_function("separating_line_l_shapes", |bench| {
        bench.iter(|| separating_line(black_box(&a), black_box(&b)))
    });
    c.bench_function("prepare_arrow", |bench| {
        let arrow = ArrangementObject::arrow("arrow", 40.0, 20.0, 8.0, 12.0);
        bench.iter(|| black_box(&arrow).prepare())
    });
}

criterion_group!(benches, bench_arranger, bench_geometry);
criterion_main!(benches);
