use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use physics::{BroadPhase, RigidBodyDesc, Shape, World, WorldConfig};

fn pile(broad_phase: BroadPhase, count: usize) -> World {
    let mut world = World::new(WorldConfig {
        broad_phase,
        ..WorldConfig::default()
    });
    world
        .add_static_rigid_body(RigidBodyDesc::new("ground", Shape::cuboid(Vec3::new(50.0, 1.0, 50.0)).unwrap()))
        .unwrap();
    let side = (count as f32).sqrt().ceil() as usize;
    for i in 0..count {
        let x = (i % side) as f32 * 1.5 - side as f32 * 0.75;
        let z = (i / side) as f32 * 1.5 - side as f32 * 0.75;
        let shape = if i % 2 == 0 {
            Shape::sphere(0.5).unwrap()
        } else {
            Shape::cuboid(Vec3::splat(0.5)).unwrap()
        };
        world
            .add_rigid_body(RigidBodyDesc::new(format!("body{i}"), shape).position(Vec3::new(x, 3.0, z)))
            .unwrap();
    }
    world
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");
    for count in [64_usize, 256] {
        for (name, strategy) in [
            ("all_pairs", BroadPhase::AllPairs),
            ("grid", BroadPhase::Grid { cell_size: 2.0 }),
        ] {
            let mut world = pile(strategy, count);
            group.bench_with_input(BenchmarkId::new(name, count), &count, |b, _| {
                b.iter(|| world.update(1.0 / 60.0).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
