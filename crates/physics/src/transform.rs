//! Pose utilities for physics bodies
//!
//! This module provides the rigid [`Transform`] used throughout collision
//! detection and the [`BodyTransform`] snapshot that is handed to renderers
//! during `World::synch`.

use glam::{Mat4, Quat, Vec3};

/// Rigid pose: rotation followed by translation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    #[must_use]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Body space point to world space.
    #[must_use]
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.orientation * point + self.position
    }

    /// Body space direction to world space.
    #[must_use]
    pub fn apply_vector(&self, vector: Vec3) -> Vec3 {
        self.orientation * vector
    }

    /// World space point to body space.
    #[must_use]
    pub fn inverse_apply(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.position)
    }

    /// World space direction to body space.
    #[must_use]
    pub fn inverse_apply_vector(&self, vector: Vec3) -> Vec3 {
        self.orientation.inverse() * vector
    }

    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Read-only pose snapshot pushed to external consumers.
///
/// The layout is `#[repr(C)]` and `Pod` so a renderer can copy a slice of
/// snapshots straight into a GPU buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyTransform {
    pub position: [f32; 3],
    pub _pad: f32,
    /// Quaternion as `[x, y, z, w]`.
    pub orientation: [f32; 4],
    /// Column-major world matrix.
    pub matrix: [[f32; 4]; 4],
}

impl From<&Transform> for BodyTransform {
    fn from(transform: &Transform) -> Self {
        Self {
            position: transform.position.to_array(),
            _pad: 0.0,
            orientation: transform.orientation.to_array(),
            matrix: transform.to_matrix().to_cols_array_2d(),
        }
    }
}
