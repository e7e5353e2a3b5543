//! Mass properties of the collision primitives.

use std::f32::consts::PI;

use glam::{Mat3, Vec3};

use crate::error::PhysicsError;
use crate::shapes::{Capsule, ConvexMesh, OrientedBox, Shape};

/// Body-space inertia tensor of `shape` carrying `mass`, about the body
/// origin, with per-axis `scale` factors applied to the tensor entries.
///
/// Shapes whose centre is offset from the body origin pick up the
/// parallel-axis term. Scaling multiplies entry `(i, j)` by
/// `sqrt(scale_i * scale_j)`, so the diagonal scales linearly per axis.
pub fn compute_inertia_matrix(shape: &Shape, mass: f32, scale: Vec3) -> Result<Mat3, PhysicsError> {
    if !(mass.is_finite() && mass > 0.0) {
        return Err(PhysicsError::DegenerateInertia("mass must be positive and finite"));
    }
    if !scale.is_finite() || scale.min_element() <= 0.0 {
        return Err(PhysicsError::DegenerateInertia("scale factors must be positive"));
    }

    let (central, center) = match shape {
        Shape::Sphere(s) => (Mat3::from_diagonal(Vec3::splat(0.4 * mass * s.radius * s.radius)), s.center),
        Shape::Capsule(c) => (capsule_inertia(c, mass), c.center()),
        Shape::Box(b) => (box_inertia(b, mass), b.center),
        Shape::ConvexMesh(m) => mesh_inertia(m, mass)?,
    };

    let tensor = central + parallel_axis(mass, center);
    let scaled = apply_scale(tensor, scale);

    if !scaled.is_finite() || scaled.x_axis.x <= 0.0 || scaled.y_axis.y <= 0.0 || scaled.z_axis.z <= 0.0 {
        return Err(PhysicsError::DegenerateInertia("tensor is not positive definite"));
    }
    Ok(scaled)
}

/// Whether a user supplied tensor can be inverted for integration:
/// symmetric and with all leading principal minors positive.
pub(crate) fn is_positive_definite(tensor: &Mat3) -> bool {
    if !tensor.is_finite() {
        return false;
    }
    let t = tensor.transpose();
    if !tensor.abs_diff_eq(t, 1e-4 * tensor.x_axis.x.abs().max(1.0)) {
        return false;
    }
    let m1 = tensor.x_axis.x;
    let m2 = tensor.x_axis.x * tensor.y_axis.y - tensor.y_axis.x * tensor.x_axis.y;
    m1 > 0.0 && m2 > 0.0 && tensor.determinant() > 0.0
}

fn box_inertia(b: &OrientedBox, mass: f32) -> Mat3 {
    let h2 = b.half_extents * b.half_extents;
    let local = Mat3::from_diagonal(Vec3::new(h2.y + h2.z, h2.x + h2.z, h2.x + h2.y) * (mass / 3.0));
    let rotation = b.rotation();
    rotation * local * rotation.transpose()
}

fn capsule_inertia(c: &Capsule, mass: f32) -> Mat3 {
    let r = c.radius;
    let h = c.length();
    let r2 = r * r;

    let cylinder_volume = PI * r2 * h;
    let sphere_volume = 4.0 / 3.0 * PI * r2 * r;
    let mc = mass * cylinder_volume / (cylinder_volume + sphere_volume);
    let ms = mass - mc;

    let axial = mc * r2 * 0.5 + ms * 0.4 * r2;
    let perpendicular = mc * (r2 * 0.25 + h * h / 12.0) + ms * (0.4 * r2 + h * h * 0.25 + 3.0 * h * r / 8.0);

    let axis = (c.b - c.a).normalize_or_zero();
    if axis == Vec3::ZERO {
        return Mat3::from_diagonal(Vec3::splat(axial));
    }
    Mat3::from_diagonal(Vec3::splat(perpendicular)) + outer(axis, axis) * (axial - perpendicular)
}

/// Central inertia and centre of mass of a uniform-density convex mesh.
fn mesh_inertia(mesh: &ConvexMesh, mass: f32) -> Result<(Mat3, Vec3), PhysicsError> {
    // covariance of the reference tetrahedron (0, e1, e2, e3)
    let canonical = Mat3::from_cols(
        Vec3::new(2.0, 1.0, 1.0),
        Vec3::new(1.0, 2.0, 1.0),
        Vec3::new(1.0, 1.0, 2.0),
    ) * (1.0 / 120.0);

    let origin = mesh.centroid();
    let mut covariance = Mat3::ZERO;
    let mut volume = 0.0;
    let mut first_moment = Vec3::ZERO;
    for face in mesh.faces() {
        let [a, b, c] = face.vertices.map(|v| v - origin);
        let edges = Mat3::from_cols(a, b, c);
        let det = edges.determinant();
        covariance += edges * canonical * edges.transpose() * det;
        volume += det / 6.0;
        first_moment += (a + b + c) * (det / 24.0);
    }

    if volume <= f32::EPSILON {
        return Err(PhysicsError::DegenerateInertia("convex mesh has no volume"));
    }
    let com = first_moment / volume;
    let central_covariance = covariance - outer(com, com) * volume;
    let density = mass / volume;
    let trace = central_covariance.x_axis.x + central_covariance.y_axis.y + central_covariance.z_axis.z;
    let inertia = (Mat3::from_diagonal(Vec3::splat(trace)) - central_covariance) * density;
    Ok((inertia, origin + com))
}

fn parallel_axis(mass: f32, offset: Vec3) -> Mat3 {
    (Mat3::from_diagonal(Vec3::splat(offset.length_squared())) - outer(offset, offset)) * mass
}

fn apply_scale(tensor: Mat3, scale: Vec3) -> Mat3 {
    let s = scale.to_array();
    let mut cols = tensor.to_cols_array_2d();
    for (j, col) in cols.iter_mut().enumerate() {
        for (i, entry) in col.iter_mut().enumerate() {
            *entry *= (s[i] * s[j]).sqrt();
        }
    }
    Mat3::from_cols_array_2d(&cols)
}

fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}
