use anyhow::Context;
use glam::{Mat3, Quat, Vec3};
use physics::{compute_inertia_matrix, ConvexMesh, InertiaSpec, OrientedBox, RigidBodyDesc, Shape, World};

fn assert_diagonal(tensor: Mat3, expected: Vec3, tolerance: f32) {
    println!("{tensor:?}");
    let diagonal = Vec3::new(tensor.x_axis.x, tensor.y_axis.y, tensor.z_axis.z);
    assert!((diagonal - expected).abs().max_element() < tolerance, "{diagonal:?} != {expected:?}");
    let off = [tensor.x_axis.y, tensor.x_axis.z, tensor.y_axis.x, tensor.y_axis.z, tensor.z_axis.x, tensor.z_axis.y];
    assert!(off.iter().all(|v| v.abs() < tolerance), "off-diagonal {off:?}");
}

#[test]
fn unit_sphere() {
    let tensor = compute_inertia_matrix(&Shape::sphere(1.0).unwrap(), 1.0, Vec3::ONE).unwrap();
    assert_diagonal(tensor, Vec3::splat(0.4), 1e-6);
}

#[test]
fn box_closed_form() {
    let shape = Shape::cuboid(Vec3::new(1.0, 2.0, 3.0)).unwrap();
    let tensor = compute_inertia_matrix(&shape, 12.0, Vec3::ONE).unwrap();
    assert_diagonal(tensor, Vec3::new(52.0, 40.0, 20.0), 1e-4);
}

#[test]
fn rotated_box_keeps_principal_moments() {
    let rotation = glam::Mat3::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
    let shape = Shape::Box(
        OrientedBox::with_axes(Vec3::ZERO, [rotation.x_axis, rotation.y_axis, rotation.z_axis], Vec3::new(1.0, 2.0, 3.0))
            .unwrap(),
    );
    let tensor = compute_inertia_matrix(&shape, 12.0, Vec3::ONE).unwrap();
    // a quarter turn about z swaps the x and y moments
    assert_diagonal(tensor, Vec3::new(40.0, 52.0, 20.0), 1e-3);
}

#[test]
fn mesh_cuboid_matches_box_formula() {
    let half = Vec3::new(0.5, 1.0, 1.5);
    let mesh = Shape::ConvexMesh(ConvexMesh::cuboid(half).unwrap());
    let cuboid = Shape::cuboid(half).unwrap();

    let from_mesh = compute_inertia_matrix(&mesh, 3.0, Vec3::ONE).unwrap();
    let from_box = compute_inertia_matrix(&cuboid, 3.0, Vec3::ONE).unwrap();
    let expected = Vec3::new(from_box.x_axis.x, from_box.y_axis.y, from_box.z_axis.z);
    assert_diagonal(from_mesh, expected, 1e-3);
}

#[test]
fn short_capsule_approaches_sphere() {
    let radius = 0.5;
    let mass = 2.0;
    let sphere = 0.4 * mass * radius * radius;

    let mut previous_error = f32::MAX;
    for length in [2.0, 0.5, 0.1, 1e-3] {
        let half = length * 0.5;
        let shape = Shape::capsule(Vec3::new(0.0, -half, 0.0), Vec3::new(0.0, half, 0.0), radius).unwrap();
        let tensor = compute_inertia_matrix(&shape, mass, Vec3::ONE).unwrap();
        // the axial moment never exceeds the perpendicular one
        assert!(tensor.y_axis.y <= tensor.x_axis.x + 1e-6);
        let error = (tensor.x_axis.x - sphere).abs();
        println!("length {length}: {tensor:?}, error {error}");
        assert!(error <= previous_error);
        previous_error = error;
    }
    assert!(previous_error < 1e-3);
}

#[test]
fn body_uses_world_inertia_after_rotation() -> anyhow::Result<()> {
    let mut world = World::default();
    world.add_rigid_body(
        RigidBodyDesc::new("plank", Shape::cuboid(Vec3::new(2.0, 0.1, 0.5))?)
            .mass(6.0)
            .orientation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
    )?;
    let body = world.rigid_body("plank").context("plank was not added")?;
    let local = body.inertia();
    let world_inverse = body.world_inverse_inertia();
    // rotated a quarter turn about y, the long axis now lies along z
    assert!((world_inverse.x_axis.x - 1.0 / local.z_axis.z).abs() < 1e-4);
    assert!((world_inverse.z_axis.z - 1.0 / local.x_axis.x).abs() < 1e-4);
    Ok(())
}

#[test]
fn locked_inertia_ignores_torque() {
    let mut world = World::default();
    world
        .add_rigid_body(
            RigidBodyDesc::new("crate", Shape::cuboid(Vec3::splat(0.5)).unwrap())
                .position(Vec3::new(0.0, 5.0, 0.0))
                .inertia(InertiaSpec::Locked),
        )
        .unwrap();
    let body = world.rigid_body_mut("crate").unwrap();
    let corner = body.position() + Vec3::new(0.5, 0.5, 0.5);
    body.apply_force(Vec3::new(0.0, 0.0, 10.0), corner);
    world.update(1.0 / 60.0).unwrap();
    assert_eq!(world.rigid_body("crate").unwrap().angular_velocity(), Vec3::ZERO);
}
