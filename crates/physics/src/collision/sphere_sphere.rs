//! Sphere-sphere collision detection

use crate::shapes::Shape;
use crate::transform::Transform;

use super::{spheres_contact, ContactPoint};

/// Centre distance against the radius sum.
pub(crate) fn sphere_sphere(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<ContactPoint> {
    let (Shape::Sphere(sa), Shape::Sphere(sb)) = (a, b) else {
        return None;
    };
    spheres_contact(ta.apply(sa.center), sa.radius, tb.apply(sb.center), sb.radius)
}
