//! Capsule routines built on closest points between segments.

use crate::geometry::{closest_point_on_segment, closest_points_segments};
use crate::shapes::Shape;
use crate::transform::Transform;

use super::{spheres_contact, ContactPoint};

pub(crate) fn sphere_capsule(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<ContactPoint> {
    let (Shape::Sphere(sphere), Shape::Capsule(capsule)) = (a, b) else {
        return None;
    };
    let center = ta.apply(sphere.center);
    let (closest, _) = closest_point_on_segment(center, tb.apply(capsule.a), tb.apply(capsule.b));
    spheres_contact(center, sphere.radius, closest, capsule.radius)
}

pub(crate) fn capsule_capsule(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<ContactPoint> {
    let (Shape::Capsule(ca), Shape::Capsule(cb)) = (a, b) else {
        return None;
    };
    let (pa, pb) = closest_points_segments(ta.apply(ca.a), ta.apply(ca.b), tb.apply(cb.a), tb.apply(cb.b));
    spheres_contact(pa, ca.radius, pb, cb.radius)
}
