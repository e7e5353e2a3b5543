//! # World Builder
//!
//! Registration, lookup and removal of rigid bodies. Every add validates its
//! descriptor completely before touching the world, so a rejected body leaves
//! no trace.

use crate::body::{RigidBody, RigidBodyDesc};
use crate::error::PhysicsError;
use crate::types::BodyKind;
use crate::world::World;

/// Builder methods for adding rigid bodies to the world
impl World {
    /// Adds a dynamic body and returns its index.
    pub fn add_rigid_body(&mut self, desc: RigidBodyDesc) -> Result<usize, PhysicsError> {
        self.insert(desc, BodyKind::Dynamic)
    }

    /// Adds a static body and returns its index. Mass, velocities and
    /// inertia of the descriptor are ignored.
    pub fn add_static_rigid_body(&mut self, desc: RigidBodyDesc) -> Result<usize, PhysicsError> {
        self.insert(desc, BodyKind::Static)
    }

    fn insert(&mut self, desc: RigidBodyDesc, kind: BodyKind) -> Result<usize, PhysicsError> {
        if self.index_by_id.contains_key(&desc.id) {
            return Err(PhysicsError::DuplicateBodyId(desc.id));
        }
        let index = self.bodies.len();
        let body = RigidBody::from_desc(desc, kind, index)?;
        tracing::debug!(id = %body.id, index, kind = ?kind, "added rigid body");
        self.index_by_id.insert(body.id.clone(), index);
        self.bodies.push(body);
        Ok(index)
    }

    /// Removes a body; later bodies shift down one index.
    pub fn remove_rigid_body(&mut self, id: &str) -> Result<RigidBody, PhysicsError> {
        let index = self
            .index_by_id
            .remove(id)
            .ok_or_else(|| PhysicsError::UnknownBody(id.to_owned()))?;
        let removed = self.bodies.remove(index);
        for (i, body) in self.bodies.iter_mut().enumerate().skip(index) {
            body.index = i;
            self.index_by_id.insert(body.id.clone(), i);
        }
        tracing::debug!(id, "removed rigid body");
        Ok(removed)
    }

    #[must_use]
    pub fn rigid_body(&self, id: &str) -> Option<&RigidBody> {
        self.index_by_id.get(id).map(|&i| &self.bodies[i])
    }

    pub fn rigid_body_mut(&mut self, id: &str) -> Option<&mut RigidBody> {
        self.index_by_id.get(id).map(|&i| &mut self.bodies[i])
    }

    #[must_use]
    pub fn body(&self, index: usize) -> Option<&RigidBody> {
        self.bodies.get(index)
    }

    #[must_use]
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Disabled bodies are neither integrated, collided nor synched.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), PhysicsError> {
        let body = self
            .rigid_body_mut(id)
            .ok_or_else(|| PhysicsError::UnknownBody(id.to_owned()))?;
        body.enabled = enabled;
        if enabled {
            body.wake();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use glam::Vec3;

    #[test]
    fn removal_reindexes_later_bodies() {
        let mut world = World::default();
        for id in ["a", "b", "c"] {
            world
                .add_rigid_body(RigidBodyDesc::new(id, Shape::sphere(0.5).unwrap()))
                .unwrap();
        }
        let removed = world.remove_rigid_body("a").unwrap();
        assert_eq!(removed.id(), "a");
        assert_eq!(world.rigid_body("c").unwrap().index(), 1);
        assert_eq!(world.body(0).unwrap().id(), "b");
        assert!(matches!(world.remove_rigid_body("a"), Err(PhysicsError::UnknownBody(_))));
    }

    #[test]
    fn invalid_tensor_is_rejected() {
        let mut world = World::default();
        let desc = RigidBodyDesc::new("bad", Shape::cuboid(Vec3::ONE).unwrap())
            .inertia(crate::body::InertiaSpec::Tensor(glam::Mat3::ZERO));
        assert!(matches!(
            world.add_rigid_body(desc),
            Err(PhysicsError::DegenerateInertia(_))
        ));
        assert!(world.is_empty());
    }
}
