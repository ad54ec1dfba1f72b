//! Benchmarks pour la détection et la reprojection

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crs_sn::{Catalogue, CrsDetector};

const POINTS: &[(&str, f64, f64)] = &[
    ("wgs84", -17.4440, 14.6928),
    ("utm28n", 237000.0, 1626000.0),
    ("utm27n", 880000.0, 1450000.0),
    ("lambert", 300000.0, 350000.0),
    ("fallback", 1000000.0, 1000000.0),
];

fn bench_convert(c: &mut Criterion) {
    let catalogue = Catalogue::senegal().unwrap();
    let detector = CrsDetector::new(&catalogue);

    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Elements(1));

    for &(name, x, y) in POINTS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(x, y), |b, &(x, y)| {
            b.iter(|| black_box(detector.convert_xy(black_box(x), black_box(y))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
