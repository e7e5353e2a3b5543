use thiserror::Error;

use crate::shapes::ShapeKind;

/// Errors surfaced by the physics core.
///
/// Everything except [`PhysicsError::UnsupportedShapePair`] is a configuration
/// mistake made while building a world; the simulation loop itself never
/// reports numerical trouble, it skips the offending contact instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("rigid body id `{0}` is already registered")]
    DuplicateBodyId(String),
    #[error("no rigid body with id `{0}`")]
    UnknownBody(String),
    #[error("invalid shape: {0}")]
    InvalidShape(&'static str),
    #[error("rigid body `{id}` has invalid mass {mass}")]
    InvalidMass { id: String, mass: f32 },
    #[error("degenerate inertia tensor: {0}")]
    DegenerateInertia(&'static str),
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),
    #[error("no collision routine registered for {0:?} vs {1:?}")]
    UnsupportedShapePair(ShapeKind, ShapeKind),
}
