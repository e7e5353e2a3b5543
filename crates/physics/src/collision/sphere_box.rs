//! Sphere-box collision detection

use glam::Vec3;

use crate::shapes::Shape;
use crate::transform::Transform;

use super::ContactPoint;

/// Clamps the sphere centre into box space. A centre inside the box is
/// pushed out through the nearest face.
pub(crate) fn sphere_box(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<ContactPoint> {
    let (Shape::Sphere(sphere), Shape::Box(cuboid)) = (a, b) else {
        return None;
    };

    let rotation = cuboid.rotation();
    let center = ta.apply(sphere.center);
    let local = rotation.transpose() * (tb.inverse_apply(center) - cuboid.center);
    let half = cuboid.half_extents;
    let clamped = local.clamp(-half, half);
    let to_world = |p: Vec3| tb.apply(cuboid.center + rotation * p);
    let dir_to_world = |v: Vec3| tb.apply_vector(rotation * v);

    if clamped == local {
        // centre inside the box
        let distances = half - local.abs();
        let axis = if distances.x <= distances.y && distances.x <= distances.z {
            0
        } else if distances.y <= distances.z {
            1
        } else {
            2
        };
        let mut local_normal = Vec3::ZERO;
        local_normal[axis] = if local[axis] >= 0.0 { 1.0 } else { -1.0 };
        let mut surface = local;
        surface[axis] = half[axis] * local_normal[axis];
        return Some(ContactPoint {
            point: to_world(surface),
            normal: dir_to_world(local_normal),
            depth: sphere.radius + distances[axis],
        });
    }

    let diff = local - clamped;
    let distance = diff.length();
    if distance >= sphere.radius {
        return None;
    }
    Some(ContactPoint {
        point: to_world(clamped),
        normal: dir_to_world(diff / distance),
        depth: sphere.radius - distance,
    })
}
