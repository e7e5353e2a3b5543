//! Sequential impulse contact resolution
//!
//! Contacts are solved one after another for a fixed number of iterations,
//! accumulating the normal and friction impulses per contact. Penetration is
//! removed afterwards by a direct positional correction, once per body pair
//! using the deepest point of its manifold.

use glam::Vec3;

use crate::body::RigidBody;

use super::Contact;

/// Steps of gravity an approach must exceed before it bounces.
const RESTING_STEPS: f32 = 2.0;

/// Effective masses at or below this are skipped.
const MIN_EFFECTIVE_MASS: f32 = 1e-9;

/// Solver tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolverConfig {
    pub iterations: usize,
    /// Fraction of the penetration beyond `slop` removed per step
    pub correction_percent: f32,
    /// Penetration left uncorrected
    pub slop: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            iterations: 8,
            correction_percent: 0.8,
            slop: 0.01,
        }
    }
}

/// How the solver pushes on a body. Static bodies ignore both.
trait ContactResponder {
    fn apply_contact_impulse(&mut self, impulse: Vec3, arm: Vec3);
    fn apply_correction(&mut self, correction: Vec3);
}

impl ContactResponder for RigidBody {
    fn apply_contact_impulse(&mut self, impulse: Vec3, arm: Vec3) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        self.angular_velocity += self.world_inverse_inertia * arm.cross(impulse);
    }

    fn apply_correction(&mut self, correction: Vec3) {
        if self.is_static() {
            return;
        }
        self.position += correction;
    }
}

/// Per-contact solver state.
struct ContactState {
    ra: Vec3,
    rb: Vec3,
    normal_mass: f32,
    tangents: [Vec3; 2],
    tangent_mass: [f32; 2],
    target_velocity: f32,
    normal_impulse: f32,
    tangent_impulse: [f32; 2],
}

fn effective_mass(a: &RigidBody, b: &RigidBody, ra: Vec3, rb: Vec3, direction: Vec3) -> f32 {
    let angular_a = (a.world_inverse_inertia() * ra.cross(direction)).cross(ra);
    let angular_b = (b.world_inverse_inertia() * rb.cross(direction)).cross(rb);
    a.inverse_mass() + b.inverse_mass() + direction.dot(angular_a) + direction.dot(angular_b)
}

/// Mutable access to two distinct bodies of the slice.
fn pair_mut(bodies: &mut [RigidBody], i: usize, j: usize) -> (&mut RigidBody, &mut RigidBody) {
    if i < j {
        let (before, after) = bodies.split_at_mut(j);
        (&mut before[i], &mut after[0])
    } else {
        let (before, after) = bodies.split_at_mut(i);
        (&mut after[0], &mut before[j])
    }
}

/// Approach speed below which a contact is treated as resting rather than
/// bouncing: the speed `gravity` adds over two steps of `dt`. Without
/// gravity every approach bounces.
#[must_use]
pub fn bounce_threshold(gravity: Vec3, dt: f32) -> f32 {
    gravity.length() * dt * RESTING_STEPS
}

/// Resolves the contacts of one step.
#[derive(Clone, Debug, Default)]
pub struct ContactResolver {
    pub config: ResolverConfig,
    /// Approach speeds below this do not bounce
    pub bounce_threshold: f32,
}

impl ContactResolver {
    /// Resolver where every approaching contact may bounce.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            bounce_threshold: 0.0,
        }
    }

    #[must_use]
    pub fn with_bounce_threshold(mut self, threshold: f32) -> Self {
        self.bounce_threshold = threshold.max(0.0);
        self
    }

    /// Applies impulses and positional correction for `contacts` to
    /// `bodies`. Body indices in the contacts index the slice; the points of
    /// one manifold must be adjacent.
    pub fn resolve(&self, bodies: &mut [RigidBody], contacts: &[Contact]) {
        if contacts.is_empty() {
            return;
        }

        let mut states: Vec<Option<ContactState>> = contacts
            .iter()
            .map(|contact| self.prepare(bodies, contact))
            .collect();

        for _ in 0..self.config.iterations {
            for (contact, state) in contacts.iter().zip(states.iter_mut()) {
                if let Some(state) = state {
                    let (a, b) = pair_mut(bodies, contact.a, contact.b);
                    solve_normal(a, b, contact, state);
                    solve_friction(a, b, contact, state);
                }
            }
        }

        let mut start = 0;
        while start < contacts.len() {
            let pair = (contacts[start].a, contacts[start].b);
            let end = start
                + contacts[start..]
                    .iter()
                    .take_while(|c| (c.a, c.b) == pair)
                    .count();
            self.correct_position(bodies, &contacts[start..end]);
            start = end;
        }
    }

    fn prepare(&self, bodies: &[RigidBody], contact: &Contact) -> Option<ContactState> {
        let (a, b) = (&bodies[contact.a], &bodies[contact.b]);
        let n = contact.normal;
        let ra = contact.point - a.position;
        let rb = contact.point - b.position;

        let normal_mass = effective_mass(a, b, ra, rb, n);
        if !(normal_mass.is_finite() && normal_mass > MIN_EFFECTIVE_MASS) {
            tracing::debug!(a = %a.id, b = %b.id, normal_mass, "skipping contact with degenerate effective mass");
            return None;
        }

        let (t1, t2) = n.any_orthonormal_pair();
        let tangent_mass = [
            effective_mass(a, b, ra, rb, t1),
            effective_mass(a, b, ra, rb, t2),
        ];

        let approach = (a.velocity_at(contact.point) - b.velocity_at(contact.point)).dot(n);
        let target_velocity = if approach < -self.bounce_threshold {
            -contact.restitution * approach
        } else {
            0.0
        };

        Some(ContactState {
            ra,
            rb,
            normal_mass,
            tangents: [t1, t2],
            tangent_mass,
            target_velocity,
            normal_impulse: 0.0,
            tangent_impulse: [0.0; 2],
        })
    }

    /// Pushes the pair of `manifold` apart along its deepest point.
    fn correct_position(&self, bodies: &mut [RigidBody], manifold: &[Contact]) {
        let Some(contact) = manifold.iter().max_by(|x, y| x.depth.total_cmp(&y.depth)) else {
            return;
        };
        let (a, b) = pair_mut(bodies, contact.a, contact.b);
        let inverse_mass_sum = a.inverse_mass + b.inverse_mass;
        if inverse_mass_sum <= MIN_EFFECTIVE_MASS {
            return;
        }
        let magnitude =
            self.config.correction_percent * (contact.depth - self.config.slop).max(0.0) / inverse_mass_sum;
        let correction = contact.normal * magnitude;
        let inverse_mass_a = a.inverse_mass;
        let inverse_mass_b = b.inverse_mass;
        a.apply_correction(correction * inverse_mass_a);
        b.apply_correction(-correction * inverse_mass_b);
    }
}

fn solve_normal(a: &mut RigidBody, b: &mut RigidBody, contact: &Contact, state: &mut ContactState) {
    let n = contact.normal;
    let relative = a.velocity_at(contact.point) - b.velocity_at(contact.point);
    let lambda = (state.target_velocity - relative.dot(n)) / state.normal_mass;

    let accumulated = (state.normal_impulse + lambda).max(0.0);
    let delta = accumulated - state.normal_impulse;
    state.normal_impulse = accumulated;

    let impulse = n * delta;
    a.apply_contact_impulse(impulse, state.ra);
    b.apply_contact_impulse(-impulse, state.rb);
}

fn solve_friction(a: &mut RigidBody, b: &mut RigidBody, contact: &Contact, state: &mut ContactState) {
    let limit = contact.friction * state.normal_impulse;
    let relative = a.velocity_at(contact.point) - b.velocity_at(contact.point);

    let mut requested = [0.0; 2];
    for (k, tangent) in state.tangents.iter().enumerate() {
        if state.tangent_mass[k] > MIN_EFFECTIVE_MASS {
            requested[k] = state.tangent_impulse[k] - relative.dot(*tangent) / state.tangent_mass[k];
        }
    }

    // Coulomb cone: clamp the accumulated tangent impulse vector
    let magnitude = (requested[0] * requested[0] + requested[1] * requested[1]).sqrt();
    if magnitude > limit && magnitude > 0.0 {
        let scale = limit / magnitude;
        requested[0] *= scale;
        requested[1] *= scale;
    }

    let impulse = state.tangents[0] * (requested[0] - state.tangent_impulse[0])
        + state.tangents[1] * (requested[1] - state.tangent_impulse[1]);
    state.tangent_impulse = requested;

    a.apply_contact_impulse(impulse, state.ra);
    b.apply_contact_impulse(-impulse, state.rb);
}
