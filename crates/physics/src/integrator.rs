//! # Physics Integration
//!
//! Semi-implicit Euler: velocities are advanced from the accumulated force
//! and gravity first, then the pose is advanced with the new velocities.

use glam::{Quat, Vec3};

use crate::body::RigidBody;

impl RigidBody {
    /// Advances the body by `dt`. Static bodies are left untouched.
    pub fn integrate(&mut self, dt: f32, gravity: Vec3) {
        if self.is_static() {
            return;
        }

        let acceleration = self.force * self.inverse_mass + gravity;
        self.linear_velocity += acceleration * dt;
        self.angular_velocity += self.world_inverse_inertia * self.torque * dt;

        let before = self.position;
        self.position += self.linear_velocity * dt;
        self.movement = self.position - before;

        let w = self.angular_velocity;
        let spin = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * self.orientation;
        let q = self.orientation;
        self.orientation = Quat::from_xyzw(
            q.x + 0.5 * spin.x * dt,
            q.y + 0.5 * spin.y * dt,
            q.z + 0.5 * spin.z * dt,
            q.w + 0.5 * spin.w * dt,
        )
        .normalize();

        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;

        self.refresh_transform();
        self.update_world_inertia();
    }
}

/// Integrates every enabled, awake body of the slice.
pub fn integrate_bodies(bodies: &mut [RigidBody], gravity: Vec3, dt: f32) {
    for body in bodies.iter_mut().filter(|b| b.enabled && !b.sleeping) {
        body.integrate(dt, gravity);
    }
}
