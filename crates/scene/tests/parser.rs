use std::fs;

use scene::{BroadPhaseDef, Scene, ShapeDef};

fn load(name: &str) -> Scene {
    let json = fs::read_to_string(format!("tests/data/{name}")).unwrap();
    Scene::from_str(&json).unwrap()
}

#[test]
fn parse_drop_scene_with_defaults() {
    let scene = load("drop.json");
    assert_eq!(scene.bodies.len(), 2);
    assert_eq!(scene.gravity, [0.0, -9.81, 0.0]);
    assert_eq!(scene.config.iterations, 8);
    assert!(matches!(scene.config.broad_phase, BroadPhaseDef::AllPairs));

    let ball = &scene.bodies[1];
    assert!(!ball.is_static);
    assert_eq!(ball.orientation, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(ball.collision_type_ids, u32::MAX);
    assert!((ball.friction - 0.5).abs() < f32::EPSILON);
    assert!(matches!(ball.shape, ShapeDef::Sphere { radius, .. } if (radius - 0.4).abs() < f32::EPSILON));
}

#[test]
fn drop_scene_settles_on_ground() {
    let mut world = load("drop.json").into_world().unwrap();
    for _ in 0..300 {
        world.update(1.0 / 60.0).unwrap();
    }
    let y = world.rigid_body("ball").unwrap().position().y;
    println!("ball settled at {y}");
    assert!((y - 1.4).abs() < 0.05);
}

#[test]
fn parse_mixed_scene() {
    let scene = load("mixed.json");
    assert_eq!(scene.bodies.len(), 6);
    assert_eq!(scene.config.iterations, 10);
    assert_eq!(scene.config.sleep_frames, 120);
    assert!((scene.config.slop - 0.01).abs() < f32::EPSILON);
    assert!(matches!(scene.config.broad_phase, BroadPhaseDef::Grid { cell_size } if (cell_size - 2.0).abs() < f32::EPSILON));
    assert!(scene.bodies[4].lock_rotation);
}

#[test]
fn mixed_scene_steps() {
    let mut world = load("mixed.json").into_world().unwrap();
    assert_eq!(world.len(), 6);
    assert_eq!(world.config().resolver.iterations, 10);
    for _ in 0..240 {
        world.update(1.0 / 60.0).unwrap();
    }
    for body in world.bodies() {
        println!("{} at {:?}", body.id(), body.position());
        assert!(body.position().is_finite());
    }
    // the ghost only collides with type 4 and falls through the floor
    assert!(world.rigid_body("ghost").unwrap().position().y < -10.0);
    assert!(world.rigid_body("crate").unwrap().position().y > 0.9);
    assert_eq!(world.rigid_body("crate").unwrap().angular_velocity(), physics::Vec3::ZERO);
}

#[test]
fn bad_mesh_index_is_reported() {
    let json = r#"{ "bodies": [
        { "id": "rock", "shape": "convex_mesh", "vertices": [[0, 0, 0]], "triangles": [[0, 1, 2]] }
    ] }"#;
    let err = Scene::from_str(json).unwrap().into_world().unwrap_err();
    let message = format!("{err:#}");
    println!("{message}");
    assert!(message.contains("rock"));
    assert!(message.contains("out of range"));
}

#[test]
fn duplicate_ids_are_rejected() {
    let json = r#"{ "bodies": [
        { "id": "a", "shape": "sphere", "radius": 1.0 },
        { "id": "a", "shape": "box", "half_extents": [1, 1, 1] }
    ] }"#;
    let err = Scene::from_str(json).unwrap().into_world().unwrap_err();
    assert!(format!("{err:#}").contains("adding body a"));
}

#[test]
fn unknown_shape_fails_to_parse() {
    let json = r#"{ "bodies": [ { "id": "a", "shape": "cylinder", "radius": 1.0 } ] }"#;
    assert!(Scene::from_str(json).is_err());
}

#[test]
fn missing_file_has_context() {
    let err = Scene::from_path("tests/data/missing.json").unwrap_err();
    assert!(format!("{err}").contains("missing.json"));
}
