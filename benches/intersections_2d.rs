use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ncollide2d::na::Point2;

use aeroshape_rs::airfoil::generate::AirfoilFamily;
use aeroshape_rs::airfoil::params::{ShapeParameters, Spacing};
use aeroshape_rs::airfoil::validate::validate_geometry;
use aeroshape_rs::geometry::polyline_intersections::{
    indexed_self_intersections, naive_self_intersections,
};

fn airfoil_points(count: usize) -> Vec<Point2<f64>> {
    let params = ShapeParameters {
        spacing: Spacing::Cosine,
        ..ShapeParameters::new(AirfoilFamily::Naca4Digit)
    };
    let latent: Vec<f64> = (0..32).map(|i| (i as f64 * 0.37).sin()).collect();
    AirfoilFamily::Naca4Digit
        .generate(&params, &latent, count)
        .expect("Failed generating airfoil")
        .into_points()
}

fn benchmark(c: &mut Criterion) {
    let points = airfoil_points(2000);

    c.bench_function("Naive self intersections", |b| {
        b.iter(|| naive_self_intersections(black_box(&points)))
    });
    c.bench_function("Indexed self intersections", |b| {
        b.iter(|| indexed_self_intersections(black_box(&points)))
    });

    let small = airfoil_points(100);
    let shape = AirfoilFamily::Naca4Digit
        .generate(&ShapeParameters::default(), &[], 100)
        .expect("Failed generating airfoil");
    c.bench_function("Validate 100 points", |b| {
        b.iter(|| validate_geometry(black_box(&shape)))
    });
    c.bench_function("Naive self intersections 100 points", |b| {
        b.iter(|| naive_self_intersections(black_box(&small)))
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
