//! # Physics World
//!
//! The [`World`] owns every rigid body and steps them forward in time. It
//! coordinates integration, broad phase, narrow phase and contact
//! resolution, then refreshes the cached transforms and sleep state.

use std::collections::HashMap;

use glam::Vec3;

use crate::body::RigidBody;
use crate::collision::{
    bounce_threshold, candidate_pairs, BroadPhase, CollisionDispatcher, Contact, ContactResolver, ResolverConfig,
};
use crate::error::PhysicsError;
use crate::events::{CollisionEvent, CollisionTracker};
use crate::integrator::integrate_bodies;
use crate::types::{BodyKind, BoundingBox};

/// Simulation parameters
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldConfig {
    pub gravity: Vec3,
    pub resolver: ResolverConfig,
    pub broad_phase: BroadPhase,
    /// Linear and angular speed under which a body counts as resting
    pub sleep_velocity_tolerance: f32,
    /// Consecutive resting steps before a body falls asleep
    pub sleep_frames: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            resolver: ResolverConfig::default(),
            broad_phase: BroadPhase::AllPairs,
            sleep_velocity_tolerance: 0.1,
            sleep_frames: 300,
        }
    }
}

/// Main physics simulation container
#[derive(Clone, Debug)]
pub struct World {
    pub(crate) bodies: Vec<RigidBody>,
    pub(crate) index_by_id: HashMap<String, usize>,
    pub(crate) config: WorldConfig,
    pub(crate) dispatcher: CollisionDispatcher,
    pub(crate) tracker: CollisionTracker,
    contacts: Vec<Contact>,
}

impl World {
    /// Create a new empty world
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self::with_dispatcher(config, CollisionDispatcher::new())
    }

    /// World using a custom table of detection routines.
    #[must_use]
    pub fn with_dispatcher(config: WorldConfig, dispatcher: CollisionDispatcher) -> Self {
        Self {
            bodies: Vec::new(),
            index_by_id: HashMap::new(),
            config,
            dispatcher,
            tracker: CollisionTracker::default(),
            contacts: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut WorldConfig {
        &mut self.config
    }

    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Contact points resolved during the last step, the points of each
    /// body pair's manifold next to each other.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Collision events queued since the last call.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        self.tracker.drain()
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// A zero step leaves every body untouched. Fails on a negative or
    /// non-finite step, and when two touching shapes have no detection
    /// routine registered.
    pub fn update(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        if dt == 0.0 {
            return Ok(());
        }

        // 1. Apply forces and integrate poses
        integrate_bodies(&mut self.bodies, self.config.gravity, dt);

        // 2. Broad phase
        let bounds: Vec<BoundingBox> = self
            .bodies
            .iter()
            .map(|body| body.shape.bounding_box(&body.transform))
            .collect();
        let pairs = candidate_pairs(&self.bodies, &bounds, self.config.broad_phase);

        // 3. Narrow phase
        let contacts = self.detect_contacts(&pairs)?;

        // 4. Resolve contacts
        ContactResolver::new(self.config.resolver)
            .with_bounce_threshold(bounce_threshold(self.config.gravity, dt))
            .resolve(&mut self.bodies, &contacts);

        // 5. Bookkeeping
        self.finish_step();
        let bodies = &self.bodies;
        self.tracker
            .record(contacts.iter().map(|c| (bodies[c.a].id.as_str(), bodies[c.b].id.as_str())));

        tracing::trace!(
            bodies = self.bodies.len(),
            pairs = pairs.len(),
            contacts = contacts.len(),
            "physics step"
        );
        self.contacts = contacts;
        Ok(())
    }

    fn detect_contacts(&mut self, pairs: &[(usize, usize)]) -> Result<Vec<Contact>, PhysicsError> {
        let mut contacts = Vec::new();
        for &(i, j) in pairs {
            let (a, b) = (&self.bodies[i], &self.bodies[j]);
            for point in self.dispatcher.manifold(&a.shape, &a.transform, &b.shape, &b.transform)? {
                contacts.push(Contact::new(i, j, point, &a.material, &b.material));
            }
        }

        // touching dynamic bodies wake each other
        for contact in &contacts {
            let both_dynamic = self.bodies[contact.a].kind == BodyKind::Dynamic
                && self.bodies[contact.b].kind == BodyKind::Dynamic;
            if both_dynamic && (self.bodies[contact.a].sleeping || self.bodies[contact.b].sleeping) {
                self.bodies[contact.a].wake();
                self.bodies[contact.b].wake();
            }
        }
        Ok(contacts)
    }

    fn finish_step(&mut self) {
        let tolerance = self.config.sleep_velocity_tolerance;
        let frames = self.config.sleep_frames;
        for body in &mut self.bodies {
            if body.is_static() || !body.enabled {
                continue;
            }
            body.refresh_transform();
            if body.update_sleep_state(tolerance, frames) {
                tracing::debug!(id = %body.id, "rigid body fell asleep");
            }
        }
    }

    /// Restores every body to its initial state and forgets collision
    /// history.
    pub fn reset(&mut self) {
        for body in &mut self.bodies {
            body.reset();
        }
        self.tracker.clear();
        self.contacts.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}
