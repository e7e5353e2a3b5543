use glam::Vec3;

/// Collision mask accepting every type id.
pub const TYPEIDS_ALL: u32 = u32::MAX;

/// Whether a body takes part in integration and contact response.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Infinite mass; never integrated, never pushed by contacts.
    Static,
    Dynamic,
}

/// Surface properties used when two bodies touch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    /// Coulomb friction coefficient, `>= 0`.
    pub friction: f32,
    /// Bounciness in `[0, 1]`.
    pub restitution: f32,
}

impl Material {
    #[must_use]
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    #[must_use]
    pub const fn bouncy() -> Self {
        Self::new(0.4, 0.9)
    }

    #[must_use]
    pub const fn slippery() -> Self {
        Self::new(0.05, 0.1)
    }

    /// Clamps restitution into `[0, 1]` and friction to be non-negative.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            friction: self.friction.max(0.0),
            restitution: self.restitution.clamp(0.0, 1.0),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.5, 0.0)
    }
}

/// World-space axis aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    #[must_use]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    #[must_use]
    pub fn contains_xz(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.z && point.z <= self.max.z
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}
