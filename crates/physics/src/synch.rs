//! Handing body poses to external consumers and to cloned worlds.

use std::collections::HashMap;

use crate::body::RigidBody;
use crate::transform::BodyTransform;
use crate::types::BodyKind;
use crate::world::World;

/// Receiver of per-body pose snapshots, typically a renderer's scene graph.
pub trait TransformSink {
    /// Shows or hides the entity of body `id`. Returns `false` when the
    /// sink has no entity with that id.
    fn set_enabled(&mut self, id: &str, enabled: bool) -> bool;

    /// Stores the pose of body `id`. Returns `false` when the sink has no
    /// entity with that id.
    fn update_transform(&mut self, id: &str, transform: &BodyTransform) -> bool;
}

/// Keeps the latest pose of every enabled body; disabling a body drops its
/// pose.
impl TransformSink for HashMap<String, BodyTransform> {
    fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        if !enabled {
            self.remove(id);
        }
        true
    }

    fn update_transform(&mut self, id: &str, transform: &BodyTransform) -> bool {
        self.insert(id.to_owned(), *transform);
        true
    }
}

impl RigidBody {
    /// Copies the simulation state of `source` onto this body, keeping its
    /// id, slot, material and initial state.
    fn synch_from(&mut self, source: &RigidBody) {
        self.kind = source.kind;
        self.shape = source.shape.clone();
        self.enabled = source.enabled;
        self.sleeping = source.sleeping;
        self.sleep_frames = source.sleep_frames;
        self.collision_type_ids = source.collision_type_ids;

        self.mass = source.mass;
        self.inverse_mass = source.inverse_mass;
        self.inertia = source.inertia;
        self.inverse_inertia = source.inverse_inertia;
        self.world_inverse_inertia = source.world_inverse_inertia;

        self.force = source.force;
        self.torque = source.torque;
        self.position = source.position;
        self.orientation = source.orientation;
        self.linear_velocity = source.linear_velocity;
        self.angular_velocity = source.angular_velocity;
        self.movement = source.movement;
        self.transform = source.transform;
        self.world_matrix = source.world_matrix;
    }
}

impl World {
    /// Hands every awake dynamic body to `sink`: its enabled flag first,
    /// then its pose when enabled. Returns the number of poses the sink
    /// accepted.
    pub fn synch(&self, sink: &mut impl TransformSink) -> usize {
        let mut accepted = 0;
        for body in self.bodies.iter().filter(|b| !b.sleeping && !b.is_static()) {
            if !sink.set_enabled(&body.id, body.enabled) {
                tracing::warn!(id = %body.id, "transform sink has no entity for rigid body");
                continue;
            }
            if !body.enabled {
                continue;
            }
            if sink.update_transform(&body.id, &body.body_transform()) {
                accepted += 1;
            } else {
                tracing::warn!(id = %body.id, "transform sink has no entity for rigid body");
            }
        }
        accepted
    }

    /// Copies the state of every dynamic body into the body with the same
    /// id in `clone`, usually a world made with [`Clone`] earlier. Bodies
    /// missing from `clone` are skipped with a warning. Returns the number
    /// of bodies copied.
    pub fn synch_world(&self, clone: &mut World) -> usize {
        let mut copied = 0;
        for body in self.bodies.iter().filter(|b| b.kind == BodyKind::Dynamic) {
            let Some(&index) = clone.index_by_id.get(&body.id) else {
                tracing::warn!(id = %body.id, "cloned world has no rigid body with this id");
                continue;
            };
            clone.bodies[index].synch_from(body);
            copied += 1;
        }
        tracing::trace!(copied, "synched cloned world");
        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBodyDesc;
    use crate::shapes::Shape;
    use glam::Vec3;

    #[test]
    fn only_moving_bodies_are_synched() {
        let mut world = World::default();
        world
            .add_static_rigid_body(RigidBodyDesc::new("ground", Shape::cuboid(Vec3::ONE).unwrap()))
            .unwrap();
        world
            .add_rigid_body(RigidBodyDesc::new("ball", Shape::sphere(0.5).unwrap()).position(Vec3::new(0.0, 5.0, 0.0)))
            .unwrap();
        world
            .add_rigid_body(RigidBodyDesc::new("ghost", Shape::sphere(0.5).unwrap()).enabled(false))
            .unwrap();

        let mut sink: HashMap<String, BodyTransform> = HashMap::new();
        sink.insert("ghost".to_owned(), BodyTransform::from(&crate::transform::Transform::IDENTITY));
        assert_eq!(world.synch(&mut sink), 1);
        assert_eq!(sink["ball"].position, [0.0, 5.0, 0.0]);
        assert!(!sink.contains_key("ghost"));
    }

    #[derive(Default)]
    struct Recorder {
        known: Vec<&'static str>,
        enabled: Vec<(String, bool)>,
        poses: Vec<String>,
    }

    impl TransformSink for Recorder {
        fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
            if !self.known.iter().any(|known| *known == id) {
                return false;
            }
            self.enabled.push((id.to_owned(), enabled));
            true
        }

        fn update_transform(&mut self, id: &str, _transform: &BodyTransform) -> bool {
            self.poses.push(id.to_owned());
            true
        }
    }

    #[test]
    fn disabled_bodies_are_reported_without_a_pose() {
        let mut world = World::default();
        world
            .add_rigid_body(RigidBodyDesc::new("crate", Shape::cuboid(Vec3::splat(0.5)).unwrap()))
            .unwrap();
        world
            .add_rigid_body(RigidBodyDesc::new("hidden", Shape::sphere(0.5).unwrap()).enabled(false))
            .unwrap();

        let mut sink = Recorder {
            known: vec!["crate", "hidden"],
            ..Recorder::default()
        };
        assert_eq!(world.synch(&mut sink), 1);
        assert_eq!(
            sink.enabled,
            vec![("crate".to_owned(), true), ("hidden".to_owned(), false)]
        );
        assert_eq!(sink.poses, vec!["crate".to_owned()]);

        world.set_enabled("hidden", true).unwrap();
        let mut sink = Recorder {
            known: vec!["crate", "hidden"],
            ..Recorder::default()
        };
        assert_eq!(world.synch(&mut sink), 2);
        assert!(sink.enabled.iter().all(|(_, enabled)| *enabled));
    }

    #[test]
    fn unknown_ids_are_not_counted() {
        let mut world = World::default();
        for id in ["known", "unknown"] {
            world
                .add_rigid_body(RigidBodyDesc::new(id, Shape::sphere(0.5).unwrap()))
                .unwrap();
        }
        let mut sink = Recorder {
            known: vec!["known"],
            ..Recorder::default()
        };
        assert_eq!(world.synch(&mut sink), 1);
        assert_eq!(sink.poses, vec!["known".to_owned()]);
    }

    #[test]
    fn cloned_world_catches_up() {
        let mut world = World::default();
        world
            .add_static_rigid_body(RigidBodyDesc::new("ground", Shape::cuboid(Vec3::new(8.0, 1.0, 8.0)).unwrap()))
            .unwrap();
        world
            .add_rigid_body(RigidBodyDesc::new("ball", Shape::sphere(0.5).unwrap()).position(Vec3::new(0.0, 6.0, 0.0)))
            .unwrap();
        let mut clone = world.clone();
        world
            .add_rigid_body(RigidBodyDesc::new("late", Shape::sphere(0.5).unwrap()).position(Vec3::new(3.0, 6.0, 0.0)))
            .unwrap();

        for _ in 0..30 {
            world.update(1.0 / 60.0).unwrap();
        }
        world.set_enabled("ball", false).unwrap();

        assert_eq!(world.synch_world(&mut clone), 1);
        let original = world.rigid_body("ball").unwrap();
        let copy = clone.rigid_body("ball").unwrap();
        assert_eq!(copy.position(), original.position());
        assert_eq!(copy.orientation(), original.orientation());
        assert_eq!(copy.linear_velocity(), original.linear_velocity());
        assert_eq!(copy.transform(), original.transform());
        assert!(!copy.is_enabled());
        assert!(clone.rigid_body("late").is_none());
        assert_eq!(clone.rigid_body("ground").unwrap().position(), Vec3::ZERO);
    }
}
