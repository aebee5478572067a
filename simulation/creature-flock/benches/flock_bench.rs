use creature_flock::{FlockParams, FlockSimulator};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("flock_update");

    for count in [64usize, 256, 1024] {
        let mut flock = FlockSimulator::new(FlockParams::default()).unwrap();
        flock.spawn(count, &mut StdRng::seed_from_u64(1));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                flock.update();
                black_box(flock.centroid());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
