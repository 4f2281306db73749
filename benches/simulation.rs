//! Performance benchmarks for life_invaders

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use life_invaders::{
    AutomatonGrid, Config, EntitySpec, GenerationCadence, Simulation, Vec2,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn benchmark_advance_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_generation");

    for size in [64usize, 256, 512].iter() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut grid = AutomatonGrid::new(*size, *size, &mut rng);
        grid.randomize(0.3, &mut rng);

        group.bench_with_input(BenchmarkId::new("size", size), size, |b, _| {
            b.iter(|| {
                grid.advance_generation(&mut rng);
            });
        });
    }

    group.finish();
}

fn benchmark_neighbor_count(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut grid = AutomatonGrid::new(128, 128, &mut rng);
    grid.randomize(0.5, &mut rng);

    c.bench_function("count_live_neighbors_full_scan", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for y in 0..128 {
                for x in 0..128 {
                    total += grid.count_live_neighbors(black_box(x), black_box(y));
                }
            }
            total
        });
    });
}

fn benchmark_step_with_entities(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_with_entities");
    let logging = Config::default().logging;
    let env = env_logger::Env::default().default_filter_or(logging.log_level.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();

    for count in [100usize, 1000].iter() {
        let mut config = Config::default();
        config.world.width = 128;
        config.world.height = 128;
        config.automaton.initial_density = 0.3;
        config.automaton.cadence = GenerationCadence::Timer { interval_secs: 0.2 };

        let mut sim = Simulation::new_with_seed(config, 42);
        let (w, h) = sim.config.world.extent();
        for i in 0..*count {
            let x = (i as f32 * 37.0) % w;
            let y = (i as f32 * 53.0) % h;
            sim.spawn(
                EntitySpec::projectile(Vec2::new(x, y), Vec2::new(0.0, 0.0))
                    .with_piercing(true),
            );
        }

        group.bench_with_input(BenchmarkId::new("projectiles", count), count, |b, _| {
            b.iter(|| {
                sim.step(1.0 / 60.0);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_advance_generation,
    benchmark_neighbor_count,
    benchmark_step_with_entities,
);
criterion_main!(benches);
