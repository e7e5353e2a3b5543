use physics::spatial_grid::SpatialGrid;
use physics::{BoundingBox, BroadPhase, RigidBodyDesc, Shape, Vec3, World, WorldConfig};

#[test]
fn test_spatial_grid_basic() {
    let mut grid = SpatialGrid::new(4.0);
    let boxes = [
        BoundingBox::from_center_half_extents(Vec3::ZERO, Vec3::ONE),
        BoundingBox::from_center_half_extents(Vec3::new(1.5, 0.0, 0.0), Vec3::ONE),
        BoundingBox::from_center_half_extents(Vec3::new(8.0, 8.0, 8.0), Vec3::ONE),
    ];
    for (i, bounds) in boxes.iter().enumerate() {
        grid.insert(i, bounds);
    }

    let pairs = grid.potential_pairs();
    assert!(pairs.contains(&(0, 1)), "close boxes must be paired: {pairs:?}");
    assert!(pairs.iter().all(|&(a, b)| a != 2 && b != 2), "far box paired: {pairs:?}");
}

#[test]
fn test_spatial_grid_stats() {
    let mut grid = SpatialGrid::new(3.0);
    let mut index = 0;
    for x in 0..10_u8 {
        for y in 0..10_u8 {
            for z in 0..5_u8 {
                // one unit box in the middle of every cell
                let center = Vec3::new(f32::from(x), f32::from(y), f32::from(z)) * 3.0 + Vec3::splat(1.5);
                grid.insert(index, &BoundingBox::from_center_half_extents(center, Vec3::splat(0.5)));
                index += 1;
            }
        }
    }

    let stats = grid.stats();
    println!("{stats:?}");
    assert_eq!(stats.occupied_cells, 500);
    assert_eq!(stats.total_entries, 500);
    assert!((stats.average_entries_per_cell - 1.0).abs() < f32::EPSILON);
    assert!(grid.potential_pairs().is_empty());

    grid.clear();
    assert_eq!(grid.stats().occupied_cells, 0);
}

#[test]
fn test_grid_world_stacks_like_all_pairs() {
    let stack = |broad_phase: BroadPhase| {
        let mut world = World::new(WorldConfig {
            broad_phase,
            ..WorldConfig::default()
        });
        world
            .add_static_rigid_body(RigidBodyDesc::new("floor", Shape::cuboid(Vec3::new(20.0, 0.5, 20.0)).unwrap()))
            .unwrap();
        for level in 0..4_u8 {
            world
                .add_rigid_body(
                    RigidBodyDesc::new(format!("crate{level}"), Shape::cuboid(Vec3::splat(0.5)).unwrap())
                        .position(Vec3::new(0.0, 1.0 + f32::from(level) * 1.05, 0.0)),
                )
                .unwrap();
        }
        for _ in 0..120 {
            world.update(1.0 / 60.0).unwrap();
        }
        world
            .bodies()
            .iter()
            .map(|b| b.position())
            .collect::<Vec<_>>()
    };

    let brute = stack(BroadPhase::AllPairs);
    let gridded = stack(BroadPhase::Grid { cell_size: 1.0 });
    assert_eq!(brute, gridded);
    // the top crate is still above the others
    assert!(gridded[4].y > gridded[3].y + 0.9);
}
