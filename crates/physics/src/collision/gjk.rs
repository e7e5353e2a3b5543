//! GJK distance between convex cores.
//!
//! A core is the shape without its rounding radius: a point for spheres, a
//! segment for capsules, the box itself or the hull vertices of a mesh.
//! Callers add the radii back on top of the core distance.

use glam::Vec3;

use crate::geometry::{closest_point_on_segment, closest_point_on_triangle};
use crate::shapes::Shape;
use crate::transform::Transform;

const MAX_ITERATIONS: usize = 64;
const RELATIVE_TOLERANCE: f32 = 1e-5;
/// Cores closer than this are treated as overlapping.
pub(crate) const OVERLAP_DISTANCE: f32 = 1e-5;

/// A convex core in world space.
#[derive(Clone, Debug)]
pub(crate) enum Core {
    Point(Vec3),
    Segment(Vec3, Vec3),
    Box {
        center: Vec3,
        axes: [Vec3; 3],
        half: [f32; 3],
    },
    Hull {
        vertices: Vec<Vec3>,
        face_normals: Vec<Vec3>,
        edges: Vec<Vec3>,
    },
}

impl Core {
    /// World-space core of a shape and its rounding radius.
    pub(crate) fn from_shape(shape: &Shape, transform: &Transform) -> (Self, f32) {
        match shape {
            Shape::Sphere(s) => (Core::Point(transform.apply(s.center)), s.radius),
            Shape::Capsule(c) => (Core::Segment(transform.apply(c.a), transform.apply(c.b)), c.radius),
            Shape::Box(b) => (
                Core::Box {
                    center: transform.apply(b.center),
                    axes: b.axes.map(|axis| transform.apply_vector(axis)),
                    half: b.half_extents.to_array(),
                },
                0.0,
            ),
            Shape::ConvexMesh(m) => (
                Core::Hull {
                    vertices: m.vertices().iter().map(|v| transform.apply(*v)).collect(),
                    face_normals: m.faces().iter().map(|f| transform.apply_vector(f.normal)).collect(),
                    edges: m.edge_directions().iter().map(|e| transform.apply_vector(*e)).collect(),
                },
                0.0,
            ),
        }
    }

    pub(crate) fn support(&self, direction: Vec3) -> Vec3 {
        match self {
            Core::Point(p) => *p,
            Core::Segment(a, b) => {
                if (*b - *a).dot(direction) > 0.0 {
                    *b
                } else {
                    *a
                }
            }
            Core::Box { center, axes, half } => {
                let mut p = *center;
                for (axis, h) in axes.iter().zip(half) {
                    p += *axis * (*h * axis.dot(direction).signum());
                }
                p
            }
            Core::Hull { vertices, .. } => {
                let mut best = vertices[0];
                let mut best_dot = best.dot(direction);
                for v in &vertices[1..] {
                    let d = v.dot(direction);
                    if d > best_dot {
                        best_dot = d;
                        best = *v;
                    }
                }
                best
            }
        }
    }

    pub(crate) fn center(&self) -> Vec3 {
        match self {
            Core::Point(p) => *p,
            Core::Segment(a, b) => (*a + *b) * 0.5,
            Core::Box { center, .. } => *center,
            #[allow(clippy::cast_precision_loss)]
            Core::Hull { vertices, .. } => vertices.iter().copied().sum::<Vec3>() / vertices.len() as f32,
        }
    }

    pub(crate) fn vertices(&self) -> Vec<Vec3> {
        match self {
            Core::Point(p) => vec![*p],
            Core::Segment(a, b) => vec![*a, *b],
            Core::Box { center, axes, half } => (0..8)
                .map(|i| {
                    let mut p = *center;
                    for (bit, (axis, h)) in axes.iter().zip(half).enumerate() {
                        let sign = if i & (1 << bit) == 0 { -1.0 } else { 1.0 };
                        p += *axis * (sign * h);
                    }
                    p
                })
                .collect(),
            Core::Hull { vertices, .. } => vertices.clone(),
        }
    }

    /// Candidate separating axes contributed by face planes.
    pub(crate) fn face_axes(&self) -> Vec<Vec3> {
        match self {
            Core::Point(_) | Core::Segment(..) => Vec::new(),
            Core::Box { axes, .. } => axes.to_vec(),
            Core::Hull { face_normals, .. } => face_normals.clone(),
        }
    }

    /// Edge directions used for cross-product axes.
    pub(crate) fn edge_axes(&self) -> Vec<Vec3> {
        match self {
            Core::Point(_) => Vec::new(),
            Core::Segment(a, b) => vec![*b - *a],
            Core::Box { axes, .. } => axes.to_vec(),
            Core::Hull { edges, .. } => edges.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct SupportPoint {
    /// Point of the Minkowski difference `A - B`
    w: Vec3,
    a: Vec3,
    b: Vec3,
}

/// Result of a GJK distance query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Proximity {
    /// Closest points on A and B and their distance.
    Separated { point_a: Vec3, point_b: Vec3, distance: f32 },
    Overlapping,
}

fn support(a: &Core, b: &Core, direction: Vec3) -> SupportPoint {
    let pa = a.support(direction);
    let pb = b.support(-direction);
    SupportPoint { w: pa - pb, a: pa, b: pb }
}

/// Closest point to the origin of the current simplex. Shrinks the simplex
/// to the supporting sub-simplex and returns the barycentric weights of the
/// remaining points, or `None` when the origin is enclosed.
fn reduce(simplex: &mut Vec<SupportPoint>) -> Option<(Vec3, Vec<f32>)> {
    match simplex.len() {
        1 => Some((simplex[0].w, vec![1.0])),
        2 => {
            let (closest, t) = closest_point_on_segment(Vec3::ZERO, simplex[0].w, simplex[1].w);
            if t <= 0.0 {
                simplex.truncate(1);
                Some((closest, vec![1.0]))
            } else if t >= 1.0 {
                simplex.swap_remove(0);
                Some((closest, vec![1.0]))
            } else {
                Some((closest, vec![1.0 - t, t]))
            }
        }
        3 => {
            let (closest, weights) = closest_point_on_triangle(Vec3::ZERO, simplex[0].w, simplex[1].w, simplex[2].w);
            Some(keep_supporting(simplex, closest, &weights))
        }
        4 => {
            let w = [simplex[0].w, simplex[1].w, simplex[2].w, simplex[3].w];
            let faces = [[0, 1, 2, 3], [0, 1, 3, 2], [0, 2, 3, 1], [1, 2, 3, 0]];
            // a flat tetrahedron encloses nothing; search all of its faces
            let edges = [w[1] - w[0], w[2] - w[0], w[3] - w[0]];
            let scale = edges[0].length() * edges[1].length() * edges[2].length();
            let flat = edges[0].dot(edges[1].cross(edges[2])).abs() <= 1e-6 * scale.max(1e-12);

            let mut best: Option<(f32, Vec3, [usize; 3], [f32; 3])> = None;
            for [i, j, k, opposite] in faces {
                let normal = (w[j] - w[i]).cross(w[k] - w[i]);
                let origin_side = normal.dot(-w[i]);
                let opposite_side = normal.dot(w[opposite] - w[i]);
                if !flat && origin_side * opposite_side >= 0.0 {
                    continue;
                }
                let (closest, weights) = closest_point_on_triangle(Vec3::ZERO, w[i], w[j], w[k]);
                let distance = closest.length_squared();
                match best {
                    Some((d, ..)) if d <= distance => {}
                    _ => best = Some((distance, closest, [i, j, k], weights)),
                }
            }
            let (_, closest, indices, weights) = best?;
            let mut face: Vec<SupportPoint> = indices.iter().map(|&i| simplex[i]).collect();
            let reduced = keep_supporting(&mut face, closest, &weights);
            *simplex = face;
            Some(reduced)
        }
        _ => None,
    }
}

fn keep_supporting(simplex: &mut Vec<SupportPoint>, closest: Vec3, weights: &[f32]) -> (Vec3, Vec<f32>) {
    let mut kept = Vec::with_capacity(simplex.len());
    let mut kept_weights = Vec::with_capacity(simplex.len());
    for (point, &weight) in simplex.iter().zip(weights) {
        if weight > 0.0 {
            kept.push(*point);
            kept_weights.push(weight);
        }
    }
    if kept.is_empty() {
        kept.push(simplex[0]);
        kept_weights.push(1.0);
    }
    *simplex = kept;
    (closest, kept_weights)
}

/// Distance between two cores.
pub(crate) fn distance(a: &Core, b: &Core) -> Proximity {
    let mut direction = a.center() - b.center();
    if direction.length_squared() < 1e-12 {
        direction = Vec3::X;
    }

    let mut simplex = vec![support(a, b, -direction)];
    let mut v = simplex[0].w;
    let mut weights = vec![1.0];

    for _ in 0..MAX_ITERATIONS {
        let vv = v.length_squared();
        if vv <= OVERLAP_DISTANCE * OVERLAP_DISTANCE {
            return Proximity::Overlapping;
        }

        let next = support(a, b, -v);
        if vv - v.dot(next.w) <= RELATIVE_TOLERANCE * vv {
            break;
        }
        if simplex.iter().any(|p| p.w.distance_squared(next.w) < 1e-12) {
            break;
        }

        let mut candidate = simplex.clone();
        candidate.push(next);
        match reduce(&mut candidate) {
            Some((closest, w)) => {
                if closest.length_squared() >= vv {
                    // no progress; keep the previous answer
                    break;
                }
                simplex = candidate;
                v = closest;
                weights = w;
            }
            None => return Proximity::Overlapping,
        }
    }

    let mut point_a = Vec3::ZERO;
    let mut point_b = Vec3::ZERO;
    for (p, w) in simplex.iter().zip(&weights) {
        point_a += p.a * *w;
        point_b += p.b * *w;
    }
    let distance = v.length();
    if distance <= OVERLAP_DISTANCE {
        return Proximity::Overlapping;
    }
    Proximity::Separated {
        point_a,
        point_b,
        distance,
    }
}
