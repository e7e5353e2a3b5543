//! Convex collision primitives
//!
//! Every shape is expressed in body space. Physics only ever reads shapes; a
//! rigid body holds its shape behind an `Arc` so worlds can be cloned cheaply.

use glam::{Mat3, Vec3};

use crate::error::PhysicsError;
use crate::geometry::{closest_point_on_triangle, ray_capsule, ray_sphere, GEOMETRY_EPSILON};
use crate::transform::Transform;
use crate::types::BoundingBox;

/// Tolerance of the plane-side test used by [`ConvexMesh::contains_point`].
pub const CONTAINMENT_EPSILON: f32 = 1e-5;

const VERTEX_WELD_DISTANCE: f32 = 1e-5;
const PARALLEL_EDGE_TOLERANCE: f32 = 1e-4;

/// Shape discriminant, ordered; the collision table is keyed by pairs of it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Sphere,
    Capsule,
    Box,
    ConvexMesh,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Result<Self, PhysicsError> {
        if !(radius.is_finite() && radius > 0.0) || !center.is_finite() {
            return Err(PhysicsError::InvalidShape("sphere radius must be positive"));
        }
        Ok(Self { center, radius })
    }
}

/// Segment `a`-`b` swept by a sphere of `radius`.
#[derive(Clone, Debug, PartialEq)]
pub struct Capsule {
    pub a: Vec3,
    pub b: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(a: Vec3, b: Vec3, radius: f32) -> Result<Self, PhysicsError> {
        if !(radius.is_finite() && radius > 0.0) || !a.is_finite() || !b.is_finite() {
            return Err(PhysicsError::InvalidShape("capsule radius must be positive"));
        }
        Ok(Self { a, b, radius })
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.a + self.b) * 0.5
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        (self.b - self.a).length()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    /// Orthonormal box axes in body space.
    pub axes: [Vec3; 3],
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Box aligned with the body axes.
    pub fn new(center: Vec3, half_extents: Vec3) -> Result<Self, PhysicsError> {
        Self::with_axes(center, [Vec3::X, Vec3::Y, Vec3::Z], half_extents)
    }

    pub fn with_axes(center: Vec3, axes: [Vec3; 3], half_extents: Vec3) -> Result<Self, PhysicsError> {
        if !half_extents.is_finite() || half_extents.min_element() <= 0.0 || !center.is_finite() {
            return Err(PhysicsError::InvalidShape("box half extents must be positive"));
        }
        let orthonormal = axes.iter().all(|axis| (axis.length() - 1.0).abs() < 1e-3)
            && axes[0].dot(axes[1]).abs() < 1e-3
            && axes[0].dot(axes[2]).abs() < 1e-3
            && axes[1].dot(axes[2]).abs() < 1e-3;
        if !orthonormal {
            return Err(PhysicsError::InvalidShape("box axes must be orthonormal"));
        }
        Ok(Self {
            center,
            axes,
            half_extents,
        })
    }

    /// Rotation taking box-local coordinates to body space.
    #[must_use]
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_cols(self.axes[0], self.axes[1], self.axes[2])
    }

    /// The eight corners in body space.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
            let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
            *corner = self.center
                + self.axes[0] * (sx * self.half_extents.x)
                + self.axes[1] * (sy * self.half_extents.y)
                + self.axes[2] * (sz * self.half_extents.z);
        }
        corners
    }
}

/// Face of a convex mesh with an outward plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub vertices: [Vec3; 3],
    pub normal: Vec3,
    pub offset: f32,
}

impl Face {
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// Closed convex polyhedron given by its triangles.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexMesh {
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    edge_directions: Vec<Vec3>,
    centroid: Vec3,
    volume: f32,
}

impl ConvexMesh {
    /// Builds a mesh from a triangle list. Face winding may be either way
    /// round; planes are re-oriented to point away from the vertex centroid.
    pub fn from_triangles(triangles: &[[Vec3; 3]]) -> Result<Self, PhysicsError> {
        if triangles.len() < 4 {
            return Err(PhysicsError::InvalidShape("convex mesh needs at least four triangles"));
        }
        if triangles.iter().flatten().any(|v| !v.is_finite()) {
            return Err(PhysicsError::InvalidShape("convex mesh has non-finite vertices"));
        }

        let mut vertices: Vec<Vec3> = Vec::new();
        for &v in triangles.iter().flatten() {
            if !vertices.iter().any(|w| w.distance(v) < VERTEX_WELD_DISTANCE) {
                vertices.push(v);
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let centroid = vertices.iter().copied().sum::<Vec3>() / vertices.len() as f32;

        let mut faces = Vec::with_capacity(triangles.len());
        let mut edge_directions: Vec<Vec3> = Vec::new();
        let mut volume = 0.0;
        for &[a, b, c] in triangles {
            let cross = (b - a).cross(c - a);
            let area2 = cross.length();
            if area2 <= GEOMETRY_EPSILON {
                continue;
            }
            let mut normal = cross / area2;
            let mut vertices = [a, b, c];
            if normal.dot(a - centroid) < 0.0 {
                normal = -normal;
                vertices.swap(1, 2);
            }
            let offset = normal.dot(a);
            volume += (offset - normal.dot(centroid)) * area2 * 0.5 / 3.0;
            faces.push(Face {
                vertices,
                normal,
                offset,
            });

            for (p, q) in [(a, b), (b, c), (c, a)] {
                let dir = (q - p).normalize_or_zero();
                if dir == Vec3::ZERO {
                    continue;
                }
                if !edge_directions
                    .iter()
                    .any(|e| e.cross(dir).length() < PARALLEL_EDGE_TOLERANCE)
                {
                    edge_directions.push(dir);
                }
            }
        }

        if faces.len() < 4 || volume <= GEOMETRY_EPSILON {
            return Err(PhysicsError::InvalidShape("convex mesh has no volume"));
        }

        Ok(Self {
            vertices,
            faces,
            edge_directions,
            centroid,
            volume,
        })
    }

    /// Axis aligned cuboid as twelve triangles.
    pub fn cuboid(half_extents: Vec3) -> Result<Self, PhysicsError> {
        let h = half_extents;
        let v = |x: f32, y: f32, z: f32| Vec3::new(x * h.x, y * h.y, z * h.z);
        let quads = [
            [v(-1., -1., 1.), v(1., -1., 1.), v(1., 1., 1.), v(-1., 1., 1.)],
            [v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.)],
            [v(1., -1., 1.), v(1., -1., -1.), v(1., 1., -1.), v(1., 1., 1.)],
            [v(-1., -1., -1.), v(-1., -1., 1.), v(-1., 1., 1.), v(-1., 1., -1.)],
            [v(-1., 1., 1.), v(1., 1., 1.), v(1., 1., -1.), v(-1., 1., -1.)],
            [v(-1., -1., -1.), v(1., -1., -1.), v(1., -1., 1.), v(-1., -1., 1.)],
        ];
        let triangles: Vec<[Vec3; 3]> = quads
            .iter()
            .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
            .collect();
        Self::from_triangles(&triangles)
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[must_use]
    pub fn edge_directions(&self) -> &[Vec3] {
        &self.edge_directions
    }

    #[must_use]
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// A body-space point is inside iff it lies on the inner side of every
    /// face plane.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.faces
            .iter()
            .all(|face| face.signed_distance(point) <= CONTAINMENT_EPSILON)
    }

    /// Closest point on the mesh surface to a body-space point, whether the
    /// point is inside or outside.
    #[must_use]
    pub fn closest_point_on_boundary(&self, point: Vec3) -> Vec3 {
        let mut best = self.faces[0].vertices[0];
        let mut best_distance = f32::INFINITY;
        for face in &self.faces {
            let [a, b, c] = face.vertices;
            let (candidate, _) = closest_point_on_triangle(point, a, b, c);
            let distance = candidate.distance_squared(point);
            if distance < best_distance {
                best_distance = distance;
                best = candidate;
            }
        }
        best
    }

    /// Support point in body space.
    #[must_use]
    pub fn support(&self, direction: Vec3) -> Vec3 {
        let mut best = self.vertices[0];
        let mut best_dot = best.dot(direction);
        for &v in &self.vertices[1..] {
            let d = v.dot(direction);
            if d > best_dot {
                best_dot = d;
                best = v;
            }
        }
        best
    }
}

/// A collision primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Capsule(Capsule),
    Box(OrientedBox),
    ConvexMesh(ConvexMesh),
}

impl Shape {
    /// Sphere centred on the body origin.
    pub fn sphere(radius: f32) -> Result<Self, PhysicsError> {
        Ok(Self::Sphere(Sphere::new(Vec3::ZERO, radius)?))
    }

    pub fn capsule(a: Vec3, b: Vec3, radius: f32) -> Result<Self, PhysicsError> {
        Ok(Self::Capsule(Capsule::new(a, b, radius)?))
    }

    /// Box centred on the body origin and aligned with its axes.
    pub fn cuboid(half_extents: Vec3) -> Result<Self, PhysicsError> {
        Ok(Self::Box(OrientedBox::new(Vec3::ZERO, half_extents)?))
    }

    pub fn convex_mesh(triangles: &[[Vec3; 3]]) -> Result<Self, PhysicsError> {
        Ok(Self::ConvexMesh(ConvexMesh::from_triangles(triangles)?))
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sphere(_) => ShapeKind::Sphere,
            Shape::Capsule(_) => ShapeKind::Capsule,
            Shape::Box(_) => ShapeKind::Box,
            Shape::ConvexMesh(_) => ShapeKind::ConvexMesh,
        }
    }

    /// Geometric centre in body space.
    #[must_use]
    pub fn local_center(&self) -> Vec3 {
        match self {
            Shape::Sphere(s) => s.center,
            Shape::Capsule(c) => c.center(),
            Shape::Box(b) => b.center,
            Shape::ConvexMesh(m) => m.centroid(),
        }
    }

    /// Radius of a sphere around [`Shape::local_center`] enclosing the shape.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Sphere(s) => s.radius,
            Shape::Capsule(c) => c.length() * 0.5 + c.radius,
            Shape::Box(b) => b.half_extents.length(),
            Shape::ConvexMesh(m) => m
                .vertices()
                .iter()
                .map(|v| v.distance(m.centroid()))
                .fold(0.0, f32::max),
        }
    }

    /// World-space support point, rounding radius included.
    #[must_use]
    pub fn support(&self, transform: &Transform, direction: Vec3) -> Vec3 {
        let local_dir = transform.inverse_apply_vector(direction);
        let unit = local_dir.normalize_or_zero();
        let local = match self {
            Shape::Sphere(s) => s.center + unit * s.radius,
            Shape::Capsule(c) => {
                let end = if (c.b - c.a).dot(local_dir) > 0.0 { c.b } else { c.a };
                end + unit * c.radius
            }
            Shape::Box(b) => {
                let mut p = b.center;
                for (axis, half) in b.axes.iter().zip(b.half_extents.to_array()) {
                    p += *axis * half * axis.dot(local_dir).signum();
                }
                p
            }
            Shape::ConvexMesh(m) => m.support(local_dir),
        };
        transform.apply(local)
    }

    /// World-space bounding box.
    #[must_use]
    pub fn bounding_box(&self, transform: &Transform) -> BoundingBox {
        match self {
            Shape::Sphere(s) => {
                BoundingBox::from_center_half_extents(transform.apply(s.center), Vec3::splat(s.radius))
            }
            Shape::Capsule(c) => {
                let a = transform.apply(c.a);
                let b = transform.apply(c.b);
                BoundingBox {
                    min: a.min(b) - Vec3::splat(c.radius),
                    max: a.max(b) + Vec3::splat(c.radius),
                }
            }
            Shape::Box(b) => {
                let mut extent = Vec3::ZERO;
                for (axis, half) in b.axes.iter().zip(b.half_extents.to_array()) {
                    extent += transform.apply_vector(*axis).abs() * half;
                }
                BoundingBox::from_center_half_extents(transform.apply(b.center), extent)
            }
            Shape::ConvexMesh(m) => {
                let mut min = Vec3::splat(f32::INFINITY);
                let mut max = Vec3::splat(f32::NEG_INFINITY);
                for &v in m.vertices() {
                    let w = transform.apply(v);
                    min = min.min(w);
                    max = max.max(w);
                }
                BoundingBox { min, max }
            }
        }
    }

    /// Distance along the world-space ray `origin + t * dir` at which it
    /// enters the shape, `t >= 0`. `dir` need not be normalised.
    #[must_use]
    pub fn ray_cast(&self, transform: &Transform, origin: Vec3, dir: Vec3) -> Option<f32> {
        let o = transform.inverse_apply(origin);
        let d = transform.inverse_apply_vector(dir);
        match self {
            Shape::Sphere(s) => ray_sphere(o, d, s.center, s.radius),
            Shape::Capsule(c) => ray_capsule(o, d, c.a, c.b, c.radius),
            Shape::Box(b) => {
                let rel = o - b.center;
                let mut t_min = 0.0_f32;
                let mut t_max = f32::INFINITY;
                for (axis, half) in b.axes.iter().zip(b.half_extents.to_array()) {
                    let start = axis.dot(rel);
                    let speed = axis.dot(d);
                    if speed.abs() <= GEOMETRY_EPSILON {
                        if start.abs() > half {
                            return None;
                        }
                        continue;
                    }
                    let t1 = (-half - start) / speed;
                    let t2 = (half - start) / speed;
                    t_min = t_min.max(t1.min(t2));
                    t_max = t_max.min(t1.max(t2));
                    if t_min > t_max {
                        return None;
                    }
                }
                Some(t_min)
            }
            Shape::ConvexMesh(m) => {
                let mut t_enter = 0.0_f32;
                let mut t_exit = f32::INFINITY;
                for face in m.faces() {
                    let denom = face.normal.dot(d);
                    let dist = face.signed_distance(o);
                    if denom.abs() <= GEOMETRY_EPSILON {
                        if dist > 0.0 {
                            return None;
                        }
                        continue;
                    }
                    let t = -dist / denom;
                    if denom < 0.0 {
                        t_enter = t_enter.max(t);
                    } else {
                        t_exit = t_exit.min(t);
                    }
                    if t_enter > t_exit {
                        return None;
                    }
                }
                Some(t_enter)
            }
        }
    }
}

impl From<Sphere> for Shape {
    fn from(value: Sphere) -> Self {
        Shape::Sphere(value)
    }
}

impl From<Capsule> for Shape {
    fn from(value: Capsule) -> Self {
        Shape::Capsule(value)
    }
}

impl From<OrientedBox> for Shape {
    fn from(value: OrientedBox) -> Self {
        Shape::Box(value)
    }
}

impl From<ConvexMesh> for Shape {
    fn from(value: ConvexMesh) -> Self {
        Shape::ConvexMesh(value)
    }
}
