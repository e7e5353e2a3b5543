//! Contact manifolds
//!
//! The narrow phase reports the deepest point of a contact. Resting on that
//! single point lets a flat shape rock or spin about it, so the world
//! expands each contact into the points where the two shapes press on each
//! other:
//!
//! - a face of one shape (the reference) aligned with the contact normal
//!   clips the facing feature of the other shape (the incident);
//! - parallel capsules keep the overlapping stretch of their axes;
//! - everything else keeps the deepest point.
//!
//! Every point shares the contact normal and carries its own depth.

use glam::Vec3;

use crate::geometry::{closest_point_on_segment, closest_points_segments};
use crate::shapes::Shape;
use crate::transform::Transform;

use super::gjk::Core;
use super::ContactPoint;

/// A face qualifies as reference when its normal is this close to the
/// contact normal (cosine).
const FACE_ALIGNMENT: f32 = 0.99;
/// Shape A only becomes the reference when its face beats B's by this much.
const REFERENCE_BIAS: f32 = 1e-3;
/// Hull vertices this close to a face plane belong to the face.
const COPLANAR_TOLERANCE: f32 = 1e-3;
/// Vertices this close to the extreme along the normal form the touching
/// feature.
const SUPPORT_TOLERANCE: f32 = 0.02;
/// Capsule axes count as parallel below this sine.
const PARALLEL_SINE: f32 = 0.02;

/// Planar face of a core: outward normal, plane offset and the face
/// polygon in winding order.
#[derive(Debug)]
struct Face {
    normal: Vec3,
    offset: f32,
    polygon: Vec<Vec3>,
}

impl Face {
    /// Face of `core` whose outward normal points furthest along
    /// `direction`.
    fn towards(core: &Core, direction: Vec3) -> Option<Face> {
        match core {
            Core::Point(_) | Core::Segment(..) => None,
            Core::Box { center, axes, half } => {
                let (i, along) = axes
                    .iter()
                    .map(|axis| axis.dot(direction))
                    .enumerate()
                    .max_by(|x, y| x.1.abs().total_cmp(&y.1.abs()))?;
                let normal = axes[i] * along.signum();
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);
                let middle = *center + normal * half[i];
                let polygon = [(-1.0_f32, -1.0_f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                    .iter()
                    .map(|&(sj, sk)| middle + axes[j] * (sj * half[j]) + axes[k] * (sk * half[k]))
                    .collect();
                Some(Face {
                    normal,
                    offset: normal.dot(middle),
                    polygon,
                })
            }
            Core::Hull {
                vertices, face_normals, ..
            } => {
                let normal = *face_normals
                    .iter()
                    .max_by(|x, y| x.dot(direction).total_cmp(&y.dot(direction)))?;
                let offset = core.support(normal).dot(normal);
                let on_plane: Vec<Vec3> = vertices
                    .iter()
                    .copied()
                    .filter(|v| (v.dot(normal) - offset).abs() <= COPLANAR_TOLERANCE)
                    .collect();
                Some(Face {
                    normal,
                    offset,
                    polygon: wind(on_plane, normal),
                })
            }
        }
    }

    fn centroid(&self) -> Vec3 {
        centroid(&self.polygon)
    }

    /// Clips `incident` to the prism over this face and keeps the points
    /// below the face plane.
    fn clip(&self, incident: Vec<Vec3>, normal: Vec3) -> Vec<ContactPoint> {
        let middle = self.centroid();
        let mut polygon = incident;
        for (i, &start) in self.polygon.iter().enumerate() {
            let end = self.polygon[(i + 1) % self.polygon.len()];
            let mut inward = self.normal.cross(end - start);
            if inward.dot(middle - start) < 0.0 {
                inward = -inward;
            }
            if inward.length_squared() <= f32::EPSILON {
                continue;
            }
            polygon = clip_polygon(&polygon, start, inward);
            if polygon.is_empty() {
                break;
            }
        }

        polygon
            .into_iter()
            .filter_map(|p| {
                let depth = self.offset - self.normal.dot(p);
                if depth.is_finite() && depth >= 0.0 {
                    Some(ContactPoint {
                        point: p + self.normal * (depth * 0.5),
                        normal,
                        depth,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Orders coplanar points around their centroid.
fn wind(mut points: Vec<Vec3>, normal: Vec3) -> Vec<Vec3> {
    let middle = centroid(&points);
    let (u, v) = normal.any_orthonormal_pair();
    points.sort_by(|p, q| {
        let angle = |x: &Vec3| (*x - middle).dot(v).atan2((*x - middle).dot(u));
        angle(p).total_cmp(&angle(q))
    });
    points
}

#[allow(clippy::cast_precision_loss)]
fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

fn push_distinct(points: &mut Vec<Vec3>, p: Vec3) {
    if points.iter().all(|q| q.distance_squared(p) > 1e-10) {
        points.push(p);
    }
}

/// Sutherland-Hodgman step: the part of `polygon` on the side of the plane
/// through `origin` that `inward` points to.
fn clip_polygon(polygon: &[Vec3], origin: Vec3, inward: Vec3) -> Vec<Vec3> {
    let mut clipped = Vec::with_capacity(polygon.len() + 1);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let dc = (current - origin).dot(inward);
        let dn = (next - origin).dot(inward);
        if dc >= 0.0 {
            push_distinct(&mut clipped, current);
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            let t = dc / (dc - dn);
            push_distinct(&mut clipped, current + (next - current) * t);
        }
    }
    clipped
}

/// Face of `core` towards `direction` when it is aligned closely enough to
/// act as reference.
fn reference_face(core: &Core, direction: Vec3) -> Option<Face> {
    Face::towards(core, direction).filter(|face| face.normal.dot(direction) >= FACE_ALIGNMENT)
}

/// Feature of `core` facing `direction`, moved onto the rounded surface.
fn incident_feature(core: &Core, direction: Vec3, radius: f32) -> Vec<Vec3> {
    let feature = match core {
        Core::Point(p) => vec![*p],
        Core::Segment(a, b) => vec![*a, *b],
        Core::Box { .. } | Core::Hull { .. } => Face::towards(core, direction)
            .map(|face| face.polygon)
            .unwrap_or_default(),
    };
    feature.into_iter().map(|p| p + direction * radius).collect()
}

/// Overlap of two nearly parallel capsule axes, depth measured against B's
/// axis.
fn parallel_segments(
    (a0, a1): (Vec3, Vec3),
    radius_a: f32,
    (b0, b1): (Vec3, Vec3),
    radius_b: f32,
    normal: Vec3,
) -> Vec<ContactPoint> {
    let (Some(ua), Some(ub)) = ((a1 - a0).try_normalize(), (b1 - b0).try_normalize()) else {
        return Vec::new();
    };
    if ua.cross(ub).length() > PARALLEL_SINE {
        return Vec::new();
    }

    let overlap = clip_polygon(&clip_polygon(&[a0, a1], b0, ub), b1, -ub);
    overlap
        .into_iter()
        .filter_map(|p| {
            let (q, _) = closest_point_on_segment(p, b0, b1);
            let depth = radius_a + radius_b - p.distance(q);
            if depth >= 0.0 {
                Some(ContactPoint {
                    point: q + normal * (radius_b - depth * 0.5),
                    normal,
                    depth,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Manifold of a contact between two cores, falling back to `deepest`
/// when no clipping applies.
pub(crate) fn core_manifold(a: &Core, radius_a: f32, b: &Core, radius_b: f32, deepest: ContactPoint) -> Vec<ContactPoint> {
    let normal = deepest.normal;
    let points = match (a, b) {
        (Core::Point(_), _) | (_, Core::Point(_)) => Vec::new(),
        (Core::Segment(a0, a1), Core::Segment(b0, b1)) => {
            parallel_segments((*a0, *a1), radius_a, (*b0, *b1), radius_b, normal)
        }
        _ => match (reference_face(a, -normal), reference_face(b, normal)) {
            (Some(face_a), Some(face_b))
                if face_a.normal.dot(-normal) > face_b.normal.dot(normal) + REFERENCE_BIAS =>
            {
                face_a.clip(incident_feature(b, normal, radius_b), normal)
            }
            (_, Some(face_b)) => face_b.clip(incident_feature(a, -normal, radius_a), normal),
            (Some(face_a), None) => face_a.clip(incident_feature(b, normal, radius_b), normal),
            (None, None) => Vec::new(),
        },
    };

    if points.is_empty() {
        vec![deepest]
    } else {
        points
    }
}

/// Contact manifold of two placed shapes whose deepest contact is
/// `deepest`, normal from `b` into `a`.
pub(crate) fn contact_manifold(
    a: &Shape,
    ta: &Transform,
    b: &Shape,
    tb: &Transform,
    deepest: ContactPoint,
) -> Vec<ContactPoint> {
    let (core_a, radius_a) = Core::from_shape(a, ta);
    let (core_b, radius_b) = Core::from_shape(b, tb);
    core_manifold(&core_a, radius_a, &core_b, radius_b, deepest)
}

fn supporting_vertices(core: &Core, direction: Vec3) -> Vec<Vec3> {
    let vertices = core.vertices();
    let extreme = vertices
        .iter()
        .map(|v| v.dot(direction))
        .fold(f32::NEG_INFINITY, f32::max);
    vertices
        .into_iter()
        .filter(|v| v.dot(direction) >= extreme - SUPPORT_TOLERANCE)
        .collect()
}

/// The two points of `points` furthest apart.
fn extreme_pair(points: &[Vec3]) -> (Vec3, Vec3) {
    let first = points.first().copied().unwrap_or(Vec3::ZERO);
    let mut pair = (first, first);
    let mut best = 0.0;
    for (i, p) in points.iter().enumerate() {
        for q in &points[i + 1..] {
            let d = p.distance_squared(*q);
            if d > best {
                best = d;
                pair = (*p, *q);
            }
        }
    }
    pair
}

/// Midpoint between the features of `a` and `b` that meet along `normal`:
/// the vertex, edge or face of each core nearest the other.
fn touching_point(a: &Core, radius_a: f32, b: &Core, radius_b: f32, normal: Vec3) -> Vec3 {
    let (a0, a1) = extreme_pair(&supporting_vertices(a, -normal));
    let (b0, b1) = extreme_pair(&supporting_vertices(b, normal));
    let (pa, pb) = closest_points_segments(a0, a1, b0, b1);
    (pa - normal * radius_a + pb + normal * radius_b) * 0.5
}

/// Contact along `normal` with `depth`, placed at the centre of the
/// manifold the two cores span.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn centred_contact(
    a: &Core,
    radius_a: f32,
    b: &Core,
    radius_b: f32,
    normal: Vec3,
    depth: f32,
) -> ContactPoint {
    let deepest = ContactPoint {
        point: touching_point(a, radius_a, b, radius_b, normal),
        normal,
        depth,
    };
    let points = core_manifold(a, radius_a, b, radius_b, deepest);
    let middle = points.iter().map(|p| p.point).sum::<Vec3>() / points.len() as f32;
    ContactPoint {
        point: middle,
        ..deepest
    }
}
