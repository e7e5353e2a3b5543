//! Box-box collision detection
//!
//! Separating axis test over the three face axes of each box and the nine
//! edge cross products. The reported point is the centre of the clipped
//! manifold the boxes share along the winning axis.

use glam::Vec3;

use crate::shapes::{OrientedBox, Shape};
use crate::transform::Transform;

use super::gjk::Core;
use super::manifold::centred_contact;
use super::{normal_or_fallback, ContactPoint};

/// Edge axes must beat the best face axis by this relative margin...
const EDGE_RELATIVE_BIAS: f32 = 0.95;
/// ...and by this absolute margin.
const EDGE_ABSOLUTE_BIAS: f32 = 0.01;

struct WorldBox {
    center: Vec3,
    axes: [Vec3; 3],
    half: [f32; 3],
}

impl WorldBox {
    fn new(cuboid: &OrientedBox, transform: &Transform) -> Self {
        Self {
            center: transform.apply(cuboid.center),
            axes: cuboid.axes.map(|axis| transform.apply_vector(axis)),
            half: cuboid.half_extents.to_array(),
        }
    }

    fn projected_radius(&self, axis: Vec3) -> f32 {
        self.axes
            .iter()
            .zip(self.half)
            .map(|(a, h)| h * a.dot(axis).abs())
            .sum()
    }
}

pub(crate) fn box_box(a: &Shape, ta: &Transform, b: &Shape, tb: &Transform) -> Option<ContactPoint> {
    let (Shape::Box(box_a), Shape::Box(box_b)) = (a, b) else {
        return None;
    };
    let wa = WorldBox::new(box_a, ta);
    let wb = WorldBox::new(box_b, tb);
    let offset = wa.center - wb.center;

    let mut best_depth = f32::INFINITY;
    let mut best_normal = Vec3::ZERO;

    // Returns false when the axis separates the boxes.
    let mut test_axis = |axis: Vec3, is_edge: bool| -> bool {
        let length = axis.length();
        if length < 1e-6 {
            return true;
        }
        let axis = axis / length;
        let distance = offset.dot(axis);
        let overlap = wa.projected_radius(axis) + wb.projected_radius(axis) - distance.abs();
        if overlap < 0.0 {
            return false;
        }
        let better = if is_edge {
            overlap < best_depth * EDGE_RELATIVE_BIAS - EDGE_ABSOLUTE_BIAS
        } else {
            overlap < best_depth
        };
        if better {
            best_depth = overlap;
            best_normal = if distance < 0.0 { -axis } else { axis };
        }
        true
    };

    for axis in wa.axes.iter().chain(wb.axes.iter()) {
        if !test_axis(*axis, false) {
            return None;
        }
    }
    for ea in &wa.axes {
        for eb in &wb.axes {
            if !test_axis(ea.cross(*eb), true) {
                return None;
            }
        }
    }

    let (core_a, _) = Core::from_shape(a, ta);
    let (core_b, _) = Core::from_shape(b, tb);
    Some(centred_contact(
        &core_a,
        0.0,
        &core_b,
        0.0,
        normal_or_fallback(best_normal),
        best_depth,
    ))
}
