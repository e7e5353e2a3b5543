//! Broad-phase collision detection
//!
//! Both strategies return the same pairs: sorted `(lo, hi)` index pairs whose
//! bounding boxes overlap and whose bodies may interact at all.

use crate::body::RigidBody;
use crate::spatial_grid::SpatialGrid;
use crate::types::BoundingBox;

/// Candidate pair strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BroadPhase {
    /// Test every pair.
    #[default]
    AllPairs,
    /// Bucket bounding boxes into a uniform grid first.
    Grid { cell_size: f32 },
}

/// Whether two bodies take part in narrow phase: both enabled, at least one
/// awake dynamic body, and each accepted by the other's type mask.
#[must_use]
pub fn pair_allowed(a: &RigidBody, b: &RigidBody) -> bool {
    if !a.is_enabled() || !b.is_enabled() {
        return false;
    }
    let a_active = !a.is_static() && !a.is_sleeping();
    let b_active = !b.is_static() && !b.is_sleeping();
    if !a_active && !b_active {
        return false;
    }
    a.accepts(b)
}

/// Candidate pairs for this step. `bounds[i]` is the world bounding box of
/// `bodies[i]`.
#[must_use]
pub fn candidate_pairs(bodies: &[RigidBody], bounds: &[BoundingBox], strategy: BroadPhase) -> Vec<(usize, usize)> {
    let raw: Vec<(usize, usize)> = match strategy {
        BroadPhase::AllPairs => {
            let mut pairs = Vec::new();
            for i in 0..bodies.len() {
                for j in i + 1..bodies.len() {
                    pairs.push((i, j));
                }
            }
            pairs
        }
        BroadPhase::Grid { cell_size } => {
            let mut grid = SpatialGrid::new(cell_size);
            for (index, body) in bodies.iter().enumerate() {
                if body.is_enabled() {
                    grid.insert(index, &bounds[index]);
                }
            }
            let pairs = grid.potential_pairs();
            let stats = grid.stats();
            tracing::trace!(
                occupied_cells = stats.occupied_cells,
                oversized = stats.oversized,
                candidates = pairs.len(),
                "grid broad phase"
            );
            pairs
        }
    };

    raw.into_iter()
        .filter(|&(i, j)| pair_allowed(&bodies[i], &bodies[j]) && bounds[i].overlaps(&bounds[j]))
        .collect()
}
