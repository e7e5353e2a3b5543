//! Generic convex routines: GJK on the cores with the rounding radii added,
//! falling back to a separating axis search when the cores overlap.

use glam::Vec3;

use crate::shapes::Shape;
use crate::transform::Transform;

use super::gjk::{self, Core, Proximity};
use super::manifold::centred_contact;
use super::{normal_or_fallback, ContactPoint};

/// Contact between any two convex shapes.
pub(crate) fn convex_convex(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<ContactPoint> {
    let (core_a, radius_a) = Core::from_shape(a, ta);
    let (core_b, radius_b) = Core::from_shape(b, tb);

    match gjk::distance(&core_a, &core_b) {
        Proximity::Separated {
            point_a,
            point_b,
            distance,
        } => {
            let radii = radius_a + radius_b;
            if distance >= radii {
                return None;
            }
            let normal = normal_or_fallback(point_a - point_b);
            let surface_a = point_a - normal * radius_a;
            let surface_b = point_b + normal * radius_b;
            Some(ContactPoint {
                point: (surface_a + surface_b) * 0.5,
                normal,
                depth: radii - distance,
            })
        }
        Proximity::Overlapping => deepest_axis(&core_a, radius_a, &core_b, radius_b),
    }
}

/// Minimum-overlap axis over face normals, edge cross products and the
/// centre direction. The point sits in the middle of the overlap the two
/// cores share along that axis.
fn deepest_axis(a: &Core, radius_a: f32, b: &Core, radius_b: f32) -> Option<ContactPoint> {
    let mut axes = a.face_axes();
    axes.extend(b.face_axes());
    let edges_b = b.edge_axes();
    for ea in a.edge_axes() {
        for eb in &edges_b {
            axes.push(ea.cross(*eb));
        }
    }
    axes.push(a.center() - b.center());

    let mut best_depth = f32::INFINITY;
    let mut best_normal = Vec3::ZERO;
    for axis in axes {
        let Some(axis) = axis.try_normalize() else {
            continue;
        };
        let min_a = a.support(-axis).dot(axis) - radius_a;
        let max_a = a.support(axis).dot(axis) + radius_a;
        let min_b = b.support(-axis).dot(axis) - radius_b;
        let max_b = b.support(axis).dot(axis) + radius_b;

        // push A along +axis or along -axis
        let overlap_positive = max_b - min_a;
        let overlap_negative = max_a - min_b;
        if overlap_positive <= 0.0 || overlap_negative <= 0.0 {
            return None;
        }
        let (depth, normal) = if overlap_positive < overlap_negative {
            (overlap_positive, axis)
        } else {
            (overlap_negative, -axis)
        };
        if depth < best_depth {
            best_depth = depth;
            best_normal = normal;
        }
    }

    if !best_depth.is_finite() {
        return None;
    }
    Some(centred_contact(
        a,
        radius_a,
        b,
        radius_b,
        normal_or_fallback(best_normal),
        best_depth,
    ))
}

/// Sphere against a convex mesh using the mesh's containment and boundary
/// queries in body space.
pub(crate) fn sphere_mesh(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<ContactPoint> {
    let (Shape::Sphere(sphere), Shape::ConvexMesh(mesh)) = (a, b) else {
        return None;
    };

    let center = tb.inverse_apply(ta.apply(sphere.center));
    let boundary = mesh.closest_point_on_boundary(center);
    let offset = center - boundary;
    let distance = offset.length();

    let (local_normal, depth) = if mesh.contains_point(center) {
        let outward = if distance > 1e-6 {
            -offset / distance
        } else {
            // centre on the surface, use the closest face plane
            mesh.faces()
                .iter()
                .max_by(|x, y| x.signed_distance(center).total_cmp(&y.signed_distance(center)))
                .map_or(Vec3::Y, |face| face.normal)
        };
        (outward, sphere.radius + distance)
    } else {
        if distance >= sphere.radius {
            return None;
        }
        (offset / distance, sphere.radius - distance)
    };

    Some(ContactPoint {
        point: tb.apply(boundary),
        normal: normal_or_fallback(tb.apply_vector(local_normal)),
        depth,
    })
}
