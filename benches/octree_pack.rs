//! Octree build + pack benchmarks over synthetic triangle grids of
//! increasing size, mirroring the shape of the asset-pipeline corpus's
//! adversarial benches (local synthetic input generation, BenchmarkId /
//! Throughput groups) but driving the collision compiler instead.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use astraweave_collision_compiler::emitter::VecSink;
use astraweave_collision_compiler::kcl::{pack, Triangle};
use astraweave_collision_compiler::vector::Vector;

fn synthetic_triangles(n: usize) -> Vec<Triangle> {
    let side = (n as f64).sqrt().ceil() as usize;
    let mut triangles = Vec::with_capacity(n);
    'outer: for row in 0..side {
        for col in 0..side {
            if triangles.len() >= n {
                break 'outer;
            }
            let x = col as f32 * 10.0;
            let y = row as f32 * 10.0;
            triangles.push(
                Triangle::new(
                    Vector::new(x, y, 0.0),
                    Vector::new(x + 1.0, y, 0.0),
                    Vector::new(x, y + 1.0, 0.0),
                    0,
                )
                .expect("synthetic triangle is non-degenerate"),
            );
        }
    }
    triangles
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("kcl_pack");

    for &n in &[100usize, 1_000, 10_000] {
        let triangles = synthetic_triangles(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &triangles, |b, triangles| {
            b.iter(|| {
                let mut sink = VecSink::new();
                pack(&mut sink, triangles, 25, 8).unwrap();
                std::hint::black_box(sink.into_bytes());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack);
criterion_main!(benches);
