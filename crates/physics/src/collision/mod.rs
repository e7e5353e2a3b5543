//! # Collision Detection
//!
//! Narrow-phase routines for every pair of convex primitives, the dispatcher
//! that routes a shape pair to its routine, the broad phase that produces
//! candidate pairs and the impulse solver that resolves the contacts. Each
//! narrow-phase hit is expanded into a manifold of contact points before it
//! reaches the solver.
//!
//! All routines report normals pointing from the second shape into the
//! first, so pushing body A along the normal separates the pair.

mod box_box;
mod broad_phase;
mod capsule;
mod convex;
mod dispatcher;
mod gjk;
mod manifold;
mod response;
mod sphere_box;
mod sphere_sphere;

pub use broad_phase::{candidate_pairs, pair_allowed, BroadPhase};
pub use dispatcher::{CollisionDispatcher, DetectFn};
pub use response::{bounce_threshold, ContactResolver, ResolverConfig};

pub(crate) use box_box::box_box;
pub(crate) use capsule::{capsule_capsule, sphere_capsule};
pub(crate) use convex::{convex_convex, sphere_mesh};
pub(crate) use manifold::contact_manifold;
pub(crate) use sphere_box::sphere_box;
pub(crate) use sphere_sphere::sphere_sphere;

use glam::Vec3;

use crate::types::Material;

/// Contacts shallower than this are discarded.
pub const CONTACT_EPSILON: f32 = 1e-4;

/// Used when a routine cannot derive a normal, e.g. coincident centres.
pub const FALLBACK_NORMAL: Vec3 = Vec3::Y;

/// A point of contact between two shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactPoint {
    /// World-space contact point
    pub point: Vec3,
    /// Unit normal from the second shape into the first
    pub normal: Vec3,
    /// Penetration depth, `>= 0`
    pub depth: f32,
}

impl ContactPoint {
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A contact between two bodies of a world, rebuilt every step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Index of body A
    pub a: usize,
    /// Index of body B
    pub b: usize,
    pub point: Vec3,
    /// Unit normal from B into A
    pub normal: Vec3,
    pub depth: f32,
    /// Combined friction coefficient
    pub friction: f32,
    /// Combined restitution coefficient
    pub restitution: f32,
}

impl Contact {
    #[must_use]
    pub fn new(a: usize, b: usize, contact: ContactPoint, mat_a: &Material, mat_b: &Material) -> Self {
        Self {
            a,
            b,
            point: contact.point,
            normal: contact.normal,
            depth: contact.depth,
            friction: combine_friction(mat_a.friction, mat_b.friction),
            restitution: combine_restitution(mat_a.restitution, mat_b.restitution),
        }
    }
}

/// Combine friction coefficients using geometric mean
#[must_use]
pub fn combine_friction(f1: f32, f2: f32) -> f32 {
    (f1 * f2).sqrt()
}

/// Combine restitution coefficients using geometric mean
#[must_use]
pub fn combine_restitution(r1: f32, r2: f32) -> f32 {
    (r1 * r2).sqrt()
}

/// Normalises `v`, or falls back to [`FALLBACK_NORMAL`] when it is degenerate.
pub(crate) fn normal_or_fallback(v: Vec3) -> Vec3 {
    let n = v.normalize_or_zero();
    if n == Vec3::ZERO || !n.is_finite() {
        FALLBACK_NORMAL
    } else {
        n
    }
}

/// Contact between two spheres given by centre and radius, normal from B
/// into A.
pub(crate) fn spheres_contact(center_a: Vec3, radius_a: f32, center_b: Vec3, radius_b: f32) -> Option<ContactPoint> {
    let delta = center_a - center_b;
    let distance_squared = delta.length_squared();
    let min_distance = radius_a + radius_b;
    if distance_squared >= min_distance * min_distance {
        return None;
    }

    let distance = distance_squared.sqrt();
    let normal = if distance > 1e-6 { delta / distance } else { FALLBACK_NORMAL };
    let depth = min_distance - distance;
    Some(ContactPoint {
        point: center_b + normal * (radius_b - depth * 0.5),
        normal,
        depth,
    })
}
