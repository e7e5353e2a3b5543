#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # Rigid Body Physics
//!
//! The physics core of the engine: rigid bodies with convex collision
//! shapes, a fixed-step simulation loop, narrow-phase contact generation and
//! a sequential impulse contact solver.
//!
//! ## Key Components
//!
//! -   **Shapes:** spheres, capsules, oriented boxes and convex meshes,
//!     defined in the [`shapes`] module and shared between bodies through
//!     `Arc`.
//! -   **Rigid Bodies:** [`RigidBody`] holds pose, velocities, mass
//!     properties, material and collision filter bits. Bodies are described
//!     with a [`RigidBodyDesc`] and registered with a [`World`].
//! -   **World:** [`World::update`] integrates, finds candidate pairs,
//!     generates contact manifolds through the [`CollisionDispatcher`] and resolves
//!     them with the [`ContactResolver`].
//! -   **Output:** [`World::synch`] hands [`BodyTransform`] snapshots and
//!     enabled flags to any [`TransformSink`], e.g. a renderer's scene
//!     graph. [`World::synch_world`] brings a cloned world up to date.
//!
//! ## Usage
//!
//! ```rust
//! use glam::Vec3;
//! use physics::{RigidBodyDesc, Shape, World};
//!
//! # fn main() -> Result<(), physics::PhysicsError> {
//! let mut world = World::default();
//! world.add_static_rigid_body(
//!     RigidBodyDesc::new("ground", Shape::cuboid(Vec3::new(8.0, 1.0, 8.0))?),
//! )?;
//! world.add_rigid_body(
//!     RigidBodyDesc::new("ball", Shape::sphere(0.4)?)
//!         .position(Vec3::new(0.0, 12.0, 0.0))
//!         .mass(10.0),
//! )?;
//!
//! for _ in 0..60 {
//!     world.update(1.0 / 60.0)?;
//! }
//! assert!(world.rigid_body("ball").unwrap().position().y < 12.0);
//! # Ok(())
//! # }
//! ```

pub mod body;
mod builder;
pub mod collision;
pub mod error;
pub mod events;
mod geometry;
pub mod inertia;
mod integrator;
mod queries;
pub mod shapes;
pub mod spatial_grid;
pub mod synch;
pub mod transform;
pub mod types;
pub mod world;

pub use glam::{Mat3, Mat4, Quat, Vec3};

pub use body::{InertiaSpec, RigidBody, RigidBodyDesc};
pub use collision::{
    combine_friction, combine_restitution, BroadPhase, CollisionDispatcher, Contact, ContactPoint, ContactResolver,
    ResolverConfig, CONTACT_EPSILON,
};
pub use error::PhysicsError;
pub use events::{CollisionEvent, CollisionPhase};
pub use inertia::compute_inertia_matrix;
pub use integrator::integrate_bodies;
pub use shapes::{Capsule, ConvexMesh, OrientedBox, Shape, ShapeKind, Sphere};
pub use synch::TransformSink;
pub use transform::{BodyTransform, Transform};
pub use types::{BodyKind, BoundingBox, Material, TYPEIDS_ALL};
pub use world::{World, WorldConfig};
