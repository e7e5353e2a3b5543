//! Rigid bodies and their construction descriptors.

use std::sync::Arc;

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::error::PhysicsError;
use crate::inertia::{compute_inertia_matrix, is_positive_definite};
use crate::shapes::Shape;
use crate::transform::{BodyTransform, Transform};
use crate::types::{BodyKind, Material, TYPEIDS_ALL};

/// Forces and impulses smaller than this are ignored.
const NEGLIGIBLE_FORCE: f32 = 1e-9;

/// How a dynamic body's inertia tensor is obtained.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InertiaSpec {
    /// Derive the tensor from the shape, scaled per axis.
    FromShape { scale: Vec3 },
    /// Body-space tensor supplied by the caller.
    Tensor(Mat3),
    /// Rotation locked: zero inverse inertia, torques have no effect.
    Locked,
}

impl Default for InertiaSpec {
    fn default() -> Self {
        InertiaSpec::FromShape { scale: Vec3::ONE }
    }
}

/// Everything needed to register a body with a [`crate::World`].
#[derive(Clone, Debug)]
pub struct RigidBodyDesc {
    pub id: String,
    pub shape: Arc<Shape>,
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Ignored for static bodies.
    pub mass: f32,
    pub inertia: InertiaSpec,
    pub material: Material,
    pub type_id: u32,
    pub collision_type_ids: u32,
    pub enabled: bool,
}

impl RigidBodyDesc {
    pub fn new(id: impl Into<String>, shape: Shape) -> Self {
        Self::with_shared_shape(id, Arc::new(shape))
    }

    /// Descriptor reusing a shape already held by other bodies.
    pub fn with_shared_shape(id: impl Into<String>, shape: Arc<Shape>) -> Self {
        Self {
            id: id.into(),
            shape,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            inertia: InertiaSpec::default(),
            material: Material::default(),
            type_id: 1,
            collision_type_ids: TYPEIDS_ALL,
            enabled: true,
        }
    }

    #[must_use]
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    #[must_use]
    pub fn angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    #[must_use]
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    #[must_use]
    pub fn inertia(mut self, inertia: InertiaSpec) -> Self {
        self.inertia = inertia;
        self
    }

    #[must_use]
    pub fn material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    #[must_use]
    pub fn restitution(mut self, restitution: f32) -> Self {
        self.material.restitution = restitution;
        self
    }

    #[must_use]
    pub fn friction(mut self, friction: f32) -> Self {
        self.material.friction = friction;
        self
    }

    #[must_use]
    pub fn type_id(mut self, type_id: u32) -> Self {
        self.type_id = type_id;
        self
    }

    #[must_use]
    pub fn collision_type_ids(mut self, mask: u32) -> Self {
        self.collision_type_ids = mask;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Initial state restored by [`RigidBody::reset`].
#[derive(Copy, Clone, Debug, PartialEq)]
struct InitialState {
    position: Vec3,
    orientation: Quat,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
}

/// A simulated rigid body.
///
/// Pose setters refresh the cached transform and wake the body; mass
/// properties are fixed at construction.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub(crate) id: String,
    pub(crate) index: usize,
    pub(crate) kind: BodyKind,
    pub(crate) shape: Arc<Shape>,

    pub(crate) position: Vec3,
    pub(crate) orientation: Quat,
    pub(crate) transform: Transform,
    pub(crate) world_matrix: Mat4,

    pub(crate) linear_velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
    pub(crate) force: Vec3,
    pub(crate) torque: Vec3,

    pub(crate) mass: f32,
    pub(crate) inverse_mass: f32,
    pub(crate) inertia: Mat3,
    pub(crate) inverse_inertia: Mat3,
    pub(crate) world_inverse_inertia: Mat3,

    pub(crate) material: Material,
    pub(crate) type_id: u32,
    pub(crate) collision_type_ids: u32,

    pub(crate) enabled: bool,
    pub(crate) sleeping: bool,
    pub(crate) sleep_frames: u32,
    pub(crate) movement: Vec3,

    initial: InitialState,
}

impl RigidBody {
    /// Validates a descriptor and builds the body.
    pub(crate) fn from_desc(desc: RigidBodyDesc, kind: BodyKind, index: usize) -> Result<Self, PhysicsError> {
        let RigidBodyDesc {
            id,
            shape,
            position,
            orientation,
            linear_velocity,
            angular_velocity,
            mass,
            inertia,
            material,
            type_id,
            collision_type_ids,
            enabled,
        } = desc;

        if !position.is_finite() || !orientation.is_finite() || orientation.length_squared() <= f32::EPSILON {
            return Err(PhysicsError::InvalidShape("body pose must be finite"));
        }
        let orientation = orientation.normalize();

        let (mass, inverse_mass, inertia, inverse_inertia, linear_velocity, angular_velocity) = match kind {
            BodyKind::Static => (0.0, 0.0, Mat3::ZERO, Mat3::ZERO, Vec3::ZERO, Vec3::ZERO),
            BodyKind::Dynamic => {
                if !(mass.is_finite() && mass > 0.0) {
                    return Err(PhysicsError::InvalidMass { id, mass });
                }
                let (tensor, inverse) = match inertia {
                    InertiaSpec::FromShape { scale } => {
                        let tensor = compute_inertia_matrix(&shape, mass, scale)?;
                        (tensor, tensor.inverse())
                    }
                    InertiaSpec::Tensor(tensor) => {
                        if !is_positive_definite(&tensor) {
                            return Err(PhysicsError::DegenerateInertia("supplied tensor is not positive definite"));
                        }
                        (tensor, tensor.inverse())
                    }
                    InertiaSpec::Locked => (Mat3::ZERO, Mat3::ZERO),
                };
                (mass, 1.0 / mass, tensor, inverse, linear_velocity, angular_velocity)
            }
        };

        let transform = Transform::new(position, orientation);
        let mut body = Self {
            id,
            index,
            kind,
            shape,
            position,
            orientation,
            transform,
            world_matrix: transform.to_matrix(),
            linear_velocity,
            angular_velocity,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            mass,
            inverse_mass,
            inertia,
            inverse_inertia,
            world_inverse_inertia: Mat3::ZERO,
            material: material.sanitized(),
            type_id,
            collision_type_ids,
            enabled,
            sleeping: false,
            sleep_frames: 0,
            movement: Vec3::ZERO,
            initial: InitialState {
                position,
                orientation,
                linear_velocity,
                angular_velocity,
            },
        };
        body.update_world_inertia();
        Ok(body)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dense index inside the owning world.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    #[must_use]
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    #[must_use]
    pub fn body_transform(&self) -> BodyTransform {
        BodyTransform::from(&self.transform)
    }

    #[must_use]
    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    #[must_use]
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Zero for static bodies.
    #[must_use]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[must_use]
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Body-space inertia tensor.
    #[must_use]
    pub fn inertia(&self) -> Mat3 {
        self.inertia
    }

    #[must_use]
    pub fn world_inverse_inertia(&self) -> Mat3 {
        self.world_inverse_inertia
    }

    #[must_use]
    pub fn material(&self) -> Material {
        self.material
    }

    #[must_use]
    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    #[must_use]
    pub fn collision_type_ids(&self) -> u32 {
        self.collision_type_ids
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Displacement of the last integration step.
    #[must_use]
    pub fn movement(&self) -> Vec3 {
        self.movement
    }

    /// Accumulated force of the current step.
    #[must_use]
    pub fn force(&self) -> Vec3 {
        self.force
    }

    #[must_use]
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.refresh_transform();
        self.wake();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
        self.refresh_transform();
        self.update_world_inertia();
        self.wake();
    }

    /// Ignored for static bodies.
    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        if self.is_static() {
            return;
        }
        self.linear_velocity = velocity;
        self.wake();
    }

    /// Ignored for static bodies.
    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        if self.is_static() {
            return;
        }
        self.angular_velocity = velocity;
        self.wake();
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material.sanitized();
    }

    pub fn set_collision_type_ids(&mut self, mask: u32) {
        self.collision_type_ids = mask;
    }

    /// Whether the other body's type passes this body's mask and vice versa.
    #[must_use]
    pub fn accepts(&self, other: &RigidBody) -> bool {
        (self.type_id & other.collision_type_ids) == self.type_id
            && (other.type_id & self.collision_type_ids) == other.type_id
    }

    /// Adds a force acting at a world-space point for the next step.
    pub fn apply_force(&mut self, force: Vec3, world_point: Vec3) {
        if self.is_static() || force.length_squared() < NEGLIGIBLE_FORCE {
            return;
        }
        self.force += force;
        self.torque += (world_point - self.position).cross(force);
        self.wake();
    }

    /// Instantly changes velocity by an impulse applied at a world-space point.
    pub fn apply_impulse(&mut self, impulse: Vec3, world_point: Vec3) {
        if self.is_static() || impulse.length_squared() < NEGLIGIBLE_FORCE {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        self.angular_velocity += self.world_inverse_inertia * (world_point - self.position).cross(impulse);
        self.wake();
    }

    /// Velocity of the material point at `world_point`.
    #[must_use]
    pub fn velocity_at(&self, world_point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(world_point - self.position)
    }

    pub fn wake(&mut self) {
        self.sleeping = false;
        self.sleep_frames = 0;
    }

    /// Puts the body to sleep, dropping its velocities.
    pub fn sleep(&mut self) {
        if self.is_static() {
            return;
        }
        self.sleeping = true;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Restores the pose and velocities the body was created with.
    pub fn reset(&mut self) {
        self.position = self.initial.position;
        self.orientation = self.initial.orientation;
        self.linear_velocity = self.initial.linear_velocity;
        self.angular_velocity = self.initial.angular_velocity;
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
        self.movement = Vec3::ZERO;
        self.refresh_transform();
        self.update_world_inertia();
        self.wake();
    }

    pub(crate) fn refresh_transform(&mut self) {
        self.transform = Transform::new(self.position, self.orientation);
        self.world_matrix = self.transform.to_matrix();
    }

    pub(crate) fn update_world_inertia(&mut self) {
        let rotation = Mat3::from_quat(self.orientation);
        self.world_inverse_inertia = rotation * self.inverse_inertia * rotation.transpose();
    }

    /// Counts low-velocity frames and puts the body to sleep after `frames`
    /// of them in a row.
    pub(crate) fn update_sleep_state(&mut self, tolerance: f32, frames: u32) -> bool {
        if self.is_static() || self.sleeping || !self.enabled {
            return false;
        }
        if self.linear_velocity.length() < tolerance && self.angular_velocity.length() < tolerance {
            self.sleep_frames += 1;
            if self.sleep_frames >= frames {
                self.sleep();
                return true;
            }
        } else {
            self.sleep_frames = 0;
        }
        false
    }
}
