use glam::{Quat, Vec3};
use physics::collision::candidate_pairs;
use physics::{
    BoundingBox, BroadPhase, CollisionDispatcher, CollisionPhase, ConvexMesh, Material, RigidBodyDesc, Shape,
    Transform, World, WorldConfig,
};

const DT: f32 = 1.0 / 60.0;

fn zero_gravity(broad_phase: BroadPhase) -> World {
    World::new(WorldConfig {
        gravity: Vec3::ZERO,
        broad_phase,
        ..WorldConfig::default()
    })
}

#[test]
fn elastic_head_on_collision_swaps_velocities() {
    let mut world = zero_gravity(BroadPhase::AllPairs);
    world
        .add_rigid_body(
            RigidBodyDesc::new("left", Shape::sphere(0.5).unwrap())
                .position(Vec3::new(-2.0, 0.0, 0.0))
                .linear_velocity(Vec3::new(2.0, 0.0, 0.0))
                .material(Material::new(0.5, 1.0)),
        )
        .unwrap();
    world
        .add_rigid_body(
            RigidBodyDesc::new("right", Shape::sphere(0.5).unwrap())
                .position(Vec3::new(0.5, 0.0, 0.0))
                .material(Material::new(0.5, 1.0)),
        )
        .unwrap();

    for _ in 0..90 {
        world.update(DT).unwrap();
    }

    let left = world.rigid_body("left").unwrap().linear_velocity();
    let right = world.rigid_body("right").unwrap().linear_velocity();
    println!("left = {left:?}, right = {right:?}");
    assert!(left.length() < 1e-3);
    assert!((right - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-3);
}

#[test]
fn slow_elastic_collision_still_swaps_velocities() {
    let mut world = zero_gravity(BroadPhase::AllPairs);
    world
        .add_rigid_body(
            RigidBodyDesc::new("left", Shape::sphere(0.5).unwrap())
                .position(Vec3::new(-2.0, 0.0, 0.0))
                .linear_velocity(Vec3::new(0.4, 0.0, 0.0))
                .material(Material::new(0.5, 1.0)),
        )
        .unwrap();
    world
        .add_rigid_body(
            RigidBodyDesc::new("right", Shape::sphere(0.5).unwrap())
                .position(Vec3::new(0.5, 0.0, 0.0))
                .material(Material::new(0.5, 1.0)),
        )
        .unwrap();

    for _ in 0..300 {
        world.update(DT).unwrap();
    }

    let left = world.rigid_body("left").unwrap().linear_velocity();
    let right = world.rigid_body("right").unwrap().linear_velocity();
    println!("left = {left:?}, right = {right:?}");
    assert!(left.length() < 1e-3);
    assert!((right - Vec3::new(0.4, 0.0, 0.0)).length() < 1e-3);
}

#[test]
fn collision_events_begin_then_end() {
    let mut world = zero_gravity(BroadPhase::AllPairs);
    world
        .add_rigid_body(
            RigidBodyDesc::new("a", Shape::sphere(0.5).unwrap())
                .position(Vec3::new(-1.5, 0.0, 0.0))
                .linear_velocity(Vec3::new(2.0, 0.0, 0.0))
                .material(Material::new(0.0, 1.0)),
        )
        .unwrap();
    world
        .add_rigid_body(
            RigidBodyDesc::new("b", Shape::sphere(0.5).unwrap())
                .position(Vec3::new(1.5, 0.0, 0.0))
                .linear_velocity(Vec3::new(-2.0, 0.0, 0.0))
                .material(Material::new(0.0, 1.0)),
        )
        .unwrap();

    let mut phases = Vec::new();
    for _ in 0..60 {
        world.update(DT).unwrap();
        for event in world.drain_collision_events() {
            assert_eq!((event.body_a.as_str(), event.body_b.as_str()), ("a", "b"));
            phases.push(event.phase);
        }
    }
    println!("{phases:?}");
    assert_eq!(phases.first(), Some(&CollisionPhase::Begin));
    assert_eq!(phases.last(), Some(&CollisionPhase::End));
    assert_eq!(phases.iter().filter(|p| **p == CollisionPhase::Begin).count(), 1);
}

fn scattered_bodies(broad_phase: BroadPhase) -> World {
    let mut world = World::new(WorldConfig {
        broad_phase,
        ..WorldConfig::default()
    });
    world
        .add_static_rigid_body(RigidBodyDesc::new("ground", Shape::cuboid(Vec3::new(30.0, 1.0, 30.0)).unwrap()))
        .unwrap();
    for i in 0..60_u16 {
        let f = f32::from(i);
        let position = Vec3::new((f * 1.7).sin() * 6.0, 2.0 + (f * 0.37) % 5.0, (f * 2.3).cos() * 6.0);
        let shape = match i % 4 {
            0 => Shape::sphere(0.5).unwrap(),
            1 => Shape::cuboid(Vec3::new(0.4, 0.3, 0.5)).unwrap(),
            2 => Shape::capsule(Vec3::new(0.0, -0.3, 0.0), Vec3::new(0.0, 0.3, 0.0), 0.3).unwrap(),
            _ => Shape::ConvexMesh(ConvexMesh::cuboid(Vec3::splat(0.4)).unwrap()),
        };
        world
            .add_rigid_body(
                RigidBodyDesc::new(format!("body{i}"), shape)
                    .position(position)
                    .orientation(Quat::from_rotation_y(f * 0.4)),
            )
            .unwrap();
    }
    world
}

#[test]
fn grid_and_all_pairs_agree() {
    let mut brute = scattered_bodies(BroadPhase::AllPairs);
    let mut grid = scattered_bodies(BroadPhase::Grid { cell_size: 1.5 });

    for step in 0..120 {
        let bounds: Vec<BoundingBox> = brute
            .bodies()
            .iter()
            .map(|b| b.shape().bounding_box(b.transform()))
            .collect();
        let all = candidate_pairs(brute.bodies(), &bounds, BroadPhase::AllPairs);
        let gridded = candidate_pairs(brute.bodies(), &bounds, BroadPhase::Grid { cell_size: 1.5 });
        assert_eq!(all, gridded, "step {step}");

        brute.update(DT).unwrap();
        grid.update(DT).unwrap();
    }

    for (a, b) in brute.bodies().iter().zip(grid.bodies()) {
        assert_eq!(a.position(), b.position(), "{}", a.id());
    }
}

#[test]
fn reversed_shape_order_mirrors_contact() {
    let dispatcher = CollisionDispatcher::new();
    let shapes = [
        Shape::sphere(0.5).unwrap(),
        Shape::capsule(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0), 0.3).unwrap(),
        Shape::cuboid(Vec3::splat(0.5)).unwrap(),
        Shape::ConvexMesh(ConvexMesh::cuboid(Vec3::splat(0.5)).unwrap()),
    ];
    let lower = Transform::IDENTITY;
    let upper = Transform::new(Vec3::new(0.05, 0.5, -0.05), Quat::from_rotation_y(0.3));

    for a in &shapes {
        for b in &shapes {
            let forward = dispatcher.detect(a, &upper, b, &lower).unwrap();
            let reverse = dispatcher.detect(b, &lower, a, &upper).unwrap();
            let (Some(forward), Some(reverse)) = (forward, reverse) else {
                panic!("{:?} vs {:?} missed a contact", a.kind(), b.kind());
            };
            assert!(
                (forward.normal + reverse.normal).length() < 1e-3,
                "{:?} vs {:?}: {:?} / {:?}",
                a.kind(),
                b.kind(),
                forward.normal,
                reverse.normal
            );
            assert!((forward.depth - reverse.depth).abs() < 1e-3);
            // the upper shape is pushed up
            assert!(forward.normal.y > 0.5, "{:?} vs {:?}: {:?}", a.kind(), b.kind(), forward.normal);
        }
    }
}

#[test]
fn sleeping_body_is_woken_by_impact() {
    let mut world = World::new(WorldConfig {
        sleep_frames: 30,
        ..WorldConfig::default()
    });
    world
        .add_static_rigid_body(RigidBodyDesc::new("ground", Shape::cuboid(Vec3::new(8.0, 1.0, 8.0)).unwrap()))
        .unwrap();
    world
        .add_rigid_body(RigidBodyDesc::new("resting", Shape::sphere(0.5).unwrap()).position(Vec3::new(0.0, 1.49, 0.0)))
        .unwrap();
    for _ in 0..60 {
        world.update(DT).unwrap();
    }
    assert!(world.rigid_body("resting").unwrap().is_sleeping());

    world
        .add_rigid_body(RigidBodyDesc::new("falling", Shape::sphere(0.5).unwrap()).position(Vec3::new(0.2, 4.0, 0.0)))
        .unwrap();
    let mut woke = false;
    for _ in 0..60 {
        world.update(DT).unwrap();
        woke |= !world.rigid_body("resting").unwrap().is_sleeping();
    }
    assert!(woke);
}
