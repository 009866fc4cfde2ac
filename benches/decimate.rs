//! Benchmarks for mesh decimation.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use whittle::algo::decimate::{qem_decimate, DecimateOptions};
use whittle::mesh::primitives::{sphere, subdivided_cube};

fn bench_decimate_sphere(c: &mut Criterion) {
    let mesh = sphere(10.0, 96, 48);

    c.bench_function("decimate_sphere_to_10_percent", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| {
                qem_decimate(&mut mesh, &DecimateOptions::with_target_ratio(0.1));
                mesh
            },
            BatchSize::LargeInput,
        );
    });

    c.bench_function("decimate_sphere_to_10_percent_sequential_init", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| {
                qem_decimate(
                    &mut mesh,
                    &DecimateOptions::with_target_ratio(0.1).sequential(),
                );
                mesh
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_decimate_flat(c: &mut Criterion) {
    let mesh = subdivided_cube(10.0, 32);

    c.bench_function("decimate_cube_to_quarter", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| {
                qem_decimate(&mut mesh, &DecimateOptions::with_target_ratio(0.25));
                mesh
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_decimate_sphere, bench_decimate_flat);
criterion_main!(benches);
