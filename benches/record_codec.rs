//! Benchmarks for per-frame host work: encoding particle buffers, decoding
//! readbacks and binning.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use shader_types::buffer::{decode_slice, encode_slice};
use shader_types::flocking::{self, Grid, GridDims};
use shader_types::{dla, ProjectionParameters};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let bounds = ProjectionParameters::default();
    let system = dla::v2::ParticleSystem::default();

    for count in [1_000usize, dla::v2::PARTICLE_COUNT] {
        let mut rng = SmallRng::seed_from_u64(1);
        let particles = match dla::v2::seed_particles(count, &bounds, &system, &mut rng) {
            Ok(particles) => particles,
            Err(e) => panic!("{}", e),
        };

        group.bench_with_input(BenchmarkId::new("dla_v2", count), &particles, |b, p| {
            b.iter(|| black_box(encode_slice(p)))
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let bounds = ProjectionParameters::default();
    let mut rng = SmallRng::seed_from_u64(2);
    let particles = flocking::v2::spawn_particles(dla::v2::PARTICLE_COUNT, &bounds, 0.4, &mut rng);
    let bytes = encode_slice(&particles);

    group.bench_function("flocking_v2_30000", |b| {
        b.iter(|| black_box(decode_slice::<flocking::v2::Particle>(&bytes)))
    });

    // Readbacks are not guaranteed to be aligned
    let mut shifted = vec![0u8; bytes.len() + 1];
    shifted[1..].copy_from_slice(&bytes);
    group.bench_function("flocking_v2_30000_unaligned", |b| {
        b.iter(|| black_box(decode_slice::<flocking::v2::Particle>(&shifted[1..])))
    });

    group.finish();
}

fn bench_binning(c: &mut Criterion) {
    let mut group = c.benchmark_group("binning");
    let bounds = ProjectionParameters::default();

    for (width, height) in [(40u32, 40u32), (400, 375)] {
        let dims = match GridDims::new(width, height) {
            Ok(dims) => dims,
            Err(e) => panic!("{}", e),
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let mut particles =
            flocking::v2::spawn_particles(flocking::v1::PARTICLE_COUNT, &bounds, 0.4, &mut rng);
        let mut grid = Grid::new_boxed();

        group.bench_function(BenchmarkId::new("bin", format!("{}x{}", width, height)), |b| {
            b.iter(|| {
                grid.bin(&mut particles, dims, &bounds);
                black_box(grid.prefix_offsets(dims))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_binning);
criterion_main!(benches);
