//! Collision detection dispatcher that routes to appropriate algorithms

use std::collections::HashMap;

use crate::error::PhysicsError;
use crate::shapes::{Shape, ShapeKind};
use crate::transform::Transform;

use super::{
    box_box, capsule_capsule, contact_manifold, convex_convex, normal_or_fallback, sphere_box, sphere_capsule,
    sphere_mesh, sphere_sphere, ContactPoint, CONTACT_EPSILON,
};

/// Function type for collision detection between two shapes. The first
/// shape is always of the lower [`ShapeKind`].
pub type DetectFn = fn(&Shape, &Transform, &Shape, &Transform) -> Option<ContactPoint>;

/// Table of detection routines keyed by ordered kind pairs.
#[derive(Clone, Debug)]
pub struct CollisionDispatcher {
    detectors: HashMap<(ShapeKind, ShapeKind), DetectFn>,
}

impl CollisionDispatcher {
    /// Create a new collision dispatcher with all detection algorithms registered
    #[must_use]
    pub fn new() -> Self {
        use ShapeKind::{Box, Capsule, ConvexMesh, Sphere};

        let mut dispatcher = Self::empty();
        dispatcher.register(Sphere, Sphere, sphere_sphere);
        dispatcher.register(Sphere, Capsule, sphere_capsule);
        dispatcher.register(Sphere, Box, sphere_box);
        dispatcher.register(Sphere, ConvexMesh, sphere_mesh);
        dispatcher.register(Capsule, Capsule, capsule_capsule);
        dispatcher.register(Capsule, Box, convex_convex);
        dispatcher.register(Capsule, ConvexMesh, convex_convex);
        dispatcher.register(Box, Box, box_box);
        dispatcher.register(Box, ConvexMesh, convex_convex);
        dispatcher.register(ConvexMesh, ConvexMesh, convex_convex);
        dispatcher
    }

    /// A dispatcher with no routines at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            detectors: HashMap::new(),
        }
    }

    /// Registers `detector` for the unordered pair. The routine must expect
    /// the lower kind first.
    pub fn register(&mut self, kind_a: ShapeKind, kind_b: ShapeKind, detector: DetectFn) {
        self.detectors.insert((kind_a.min(kind_b), kind_a.max(kind_b)), detector);
    }

    #[must_use]
    pub fn supports(&self, kind_a: ShapeKind, kind_b: ShapeKind) -> bool {
        self.detectors.contains_key(&(kind_a.min(kind_b), kind_a.max(kind_b)))
    }

    /// Deepest contact between two placed shapes, normal from `b` into `a`.
    /// Contacts shallower than [`CONTACT_EPSILON`] are dropped.
    pub fn detect(
        &self,
        a: &Shape,
        ta: &Transform,
        b: &Shape,
        tb: &Transform,
    ) -> Result<Option<ContactPoint>, PhysicsError> {
        let (kind_a, kind_b) = (a.kind(), b.kind());
        let swapped = kind_a > kind_b;
        let key = if swapped { (kind_b, kind_a) } else { (kind_a, kind_b) };
        let detector = self
            .detectors
            .get(&key)
            .ok_or(PhysicsError::UnsupportedShapePair(kind_a, kind_b))?;

        let contact = if swapped {
            detector(b, tb, a, ta).map(ContactPoint::flipped)
        } else {
            detector(a, ta, b, tb)
        };

        Ok(contact
            .filter(|c| c.depth.is_finite() && c.depth >= CONTACT_EPSILON)
            .map(|c| ContactPoint {
                normal: normal_or_fallback(c.normal),
                ..c
            }))
    }

    /// Every point over which the two shapes press on each other, normal
    /// from `b` into `a`. Flat contacts such as a box on the ground yield
    /// one point per clipped corner; empty when the shapes do not touch.
    pub fn manifold(
        &self,
        a: &Shape,
        ta: &Transform,
        b: &Shape,
        tb: &Transform,
    ) -> Result<Vec<ContactPoint>, PhysicsError> {
        let Some(deepest) = self.detect(a, ta, b, tb)? else {
            return Ok(Vec::new());
        };
        Ok(contact_manifold(a, ta, b, tb, deepest))
    }
}

impl Default for CollisionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
