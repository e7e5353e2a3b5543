//! Closest-point and ray helpers shared by shapes and collision routines.

use glam::Vec3;

pub(crate) const GEOMETRY_EPSILON: f32 = 1e-6;

/// Closest point on segment `ab` to `p`, with its segment parameter.
pub(crate) fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> (Vec3, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= GEOMETRY_EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest points between segments `p1q1` and `p2q2`.
pub(crate) fn closest_points_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= GEOMETRY_EPSILON && e <= GEOMETRY_EPSILON {
        (0.0, 0.0)
    } else if a <= GEOMETRY_EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= GEOMETRY_EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > GEOMETRY_EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// Closest point on triangle `abc` to `p` together with its barycentric
/// weights for `a`, `b` and `c`.
pub(crate) fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, [f32; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, [0.0, 1.0 - w, w]);
    }

    let sum = va + vb + vc;
    if sum.abs() <= GEOMETRY_EPSILON {
        // collinear triangle, fall back to its edges
        return closest_point_on_degenerate_triangle(p, a, b, c);
    }
    let denom = 1.0 / sum;
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, [1.0 - v - w, v, w])
}

fn closest_point_on_degenerate_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, [f32; 3]) {
    let (q_ab, t_ab) = closest_point_on_segment(p, a, b);
    let (q_bc, t_bc) = closest_point_on_segment(p, b, c);
    let (q_ca, t_ca) = closest_point_on_segment(p, c, a);
    let candidates = [
        (q_ab, [1.0 - t_ab, t_ab, 0.0]),
        (q_bc, [0.0, 1.0 - t_bc, t_bc]),
        (q_ca, [t_ca, 0.0, 1.0 - t_ca]),
    ];
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0.distance_squared(p) < best.0.distance_squared(p) {
            best = *candidate;
        }
    }
    best
}

/// Entry distance of the ray `origin + t * dir` into a sphere, `t >= 0`.
pub(crate) fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let m = origin - center;
    let b = m.dot(dir);
    let c = m.length_squared() - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let a = dir.length_squared();
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / a;
    Some(t.max(0.0))
}

/// Entry distance of a ray into the capsule around segment `ab`.
pub(crate) fn ray_capsule(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, radius: f32) -> Option<f32> {
    let mut best = ray_sphere(origin, dir, a, radius);
    if let Some(t) = ray_sphere(origin, dir, b, radius) {
        best = Some(best.map_or(t, |current| current.min(t)));
    }

    let d = b - a;
    let m = origin - a;
    let dd = d.length_squared();
    if dd <= GEOMETRY_EPSILON {
        return best;
    }
    let md = m.dot(d);
    let nd = dir.dot(d);
    let nn = dir.length_squared();
    let qa = dd * nn - nd * nd;
    if qa.abs() > GEOMETRY_EPSILON {
        let qb = dd * m.dot(dir) - nd * md;
        let qc = dd * (m.length_squared() - radius * radius) - md * md;
        let disc = qb * qb - qa * qc;
        if disc >= 0.0 {
            let t = ((-qb - disc.sqrt()) / qa).max(0.0);
            let along = md + t * nd;
            if (0.0..=dd).contains(&along) {
                best = Some(best.map_or(t, |current| current.min(t)));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_projection_clamps() {
        let (q, t) = closest_point_on_segment(Vec3::new(5.0, 1.0, 0.0), Vec3::ZERO, Vec3::X);
        assert_eq!(q, Vec3::X);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn crossing_segments_meet() {
        let (c1, c2) = closest_points_segments(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        );
        assert!((c1 - Vec3::ZERO).length() < 1e-6);
        assert!((c2 - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn triangle_face_region() {
        let (q, w) = closest_point_on_triangle(
            Vec3::new(0.25, 0.25, 1.0),
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
        );
        assert!((q - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-6);
        assert!((w[0] + w[1] + w[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ray_hits_capsule_side() {
        let t = ray_capsule(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::NEG_Y,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            0.5,
        )
        .unwrap();
        assert!((t - 9.5).abs() < 1e-4);
    }
}
