//! Spatial queries against the bodies of a world.

use glam::Vec3;

use crate::body::RigidBody;
use crate::error::PhysicsError;
use crate::shapes::Shape;
use crate::transform::Transform;
use crate::types::BoundingBox;
use crate::world::World;

/// Surfaces further below the sampled point than this are not reported.
const HEIGHT_SEARCH_DEPTH: f32 = 10_000.0;

/// Minimum step up accepted by [`World::determine_height`].
const MIN_STEP_UP: f32 = 0.1;

fn matches_type(body: &RigidBody, type_ids: u32) -> bool {
    body.enabled && (body.type_id & type_ids) == body.type_id
}

impl World {
    /// Highest surface below `point` among bodies whose type is in
    /// `type_ids`, ignoring surfaces more than `max(0.1, step_up_max)` above
    /// the point.
    #[must_use]
    pub fn determine_height(&self, type_ids: u32, step_up_max: f32, point: Vec3) -> Option<f32> {
        let ceiling = point.y + step_up_max.max(MIN_STEP_UP);

        let mut height: Option<f32> = None;
        for body in self.bodies.iter().filter(|b| matches_type(b, type_ids)) {
            let bounds = body.shape.bounding_box(&body.transform);
            if !bounds.contains_xz(point) || bounds.min.y >= ceiling {
                continue;
            }
            // cast from just above the body to keep the hit precise
            let top = bounds.max.y + 1.0;
            let origin = Vec3::new(point.x, top, point.z);
            let Some(t) = body.shape.ray_cast(&body.transform, origin, Vec3::NEG_Y) else {
                continue;
            };
            let hit = top - t;
            if hit >= ceiling || hit < point.y - HEIGHT_SEARCH_DEPTH {
                continue;
            }
            height = Some(height.map_or(hit, |h| h.max(hit)));
        }
        height
    }

    /// Highest surface under a bounding volume: [`World::determine_height`]
    /// at the centre and the four corners of the bottom of `bounds`, so a
    /// body standing half on a step still finds it.
    #[must_use]
    pub fn determine_height_for_bounds(&self, type_ids: u32, step_up_max: f32, bounds: &BoundingBox) -> Option<f32> {
        let center = bounds.center();
        let bottom = bounds.min.y;
        [
            Vec3::new(center.x, bottom, center.z),
            Vec3::new(bounds.min.x, bottom, bounds.min.z),
            Vec3::new(bounds.min.x, bottom, bounds.max.z),
            Vec3::new(bounds.max.x, bottom, bounds.min.z),
            Vec3::new(bounds.max.x, bottom, bounds.max.z),
        ]
        .into_iter()
        .filter_map(|point| self.determine_height(type_ids, step_up_max, point))
        .reduce(f32::max)
    }

    /// Ids of the bodies whose type is in `type_ids` that `shape`, placed at
    /// `transform`, penetrates.
    pub fn does_collide_with(
        &self,
        type_ids: u32,
        shape: &Shape,
        transform: &Transform,
    ) -> Result<Vec<&str>, PhysicsError> {
        let bounds = shape.bounding_box(transform);
        let mut hits = Vec::new();
        for body in self.bodies.iter().filter(|b| matches_type(b, type_ids)) {
            if !bounds.overlaps(&body.shape.bounding_box(&body.transform)) {
                continue;
            }
            if self
                .dispatcher
                .detect(shape, transform, &body.shape, &body.transform)?
                .is_some()
            {
                hits.push(body.id.as_str());
            }
        }
        Ok(hits)
    }
}
