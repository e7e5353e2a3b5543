//! Uniform hash grid used by the grid broad phase.

use std::collections::HashMap;

use glam::Vec3;

use crate::types::BoundingBox;

/// Bodies covering more cells than this go to a separate list tested
/// against everything.
const MAX_CELLS_PER_BODY: i64 = 64;

/// Statistics about the spatial grid
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SpatialGridStats {
    pub occupied_cells: usize,
    pub total_entries: usize,
    pub oversized: usize,
    pub average_entries_per_cell: f32,
}

#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<[i32; 3], Vec<usize>>,
    oversized: Vec<usize>,
}

impl SpatialGrid {
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 1.0 },
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Clear all cells in the grid
    pub fn clear(&mut self) {
        self.cells.clear();
        self.oversized.clear();
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_of(&self, point: Vec3) -> [i32; 3] {
        let p = (point / self.cell_size).floor();
        [p.x as i32, p.y as i32, p.z as i32]
    }

    /// Insert an object with the given bounding box
    pub fn insert(&mut self, index: usize, bounds: &BoundingBox) {
        let min = self.cell_of(bounds.min);
        let max = self.cell_of(bounds.max);
        let span = (0..3)
            .map(|axis| i64::from(max[axis]) - i64::from(min[axis]) + 1)
            .product::<i64>();
        if span > MAX_CELLS_PER_BODY {
            self.oversized.push(index);
            return;
        }

        for z in min[2]..=max[2] {
            for y in min[1]..=max[1] {
                for x in min[0]..=max[0] {
                    self.cells.entry([x, y, z]).or_default().push(index);
                }
            }
        }
    }

    /// Unordered index pairs sharing at least one cell, plus every pair
    /// involving an oversized entry. Sorted as `(lo, hi)` and deduplicated.
    #[must_use]
    pub fn potential_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for cell in self.cells.values() {
            for (i, &a) in cell.iter().enumerate() {
                for &b in &cell[i + 1..] {
                    pairs.push((a.min(b), a.max(b)));
                }
            }
        }

        if !self.oversized.is_empty() {
            let mut everything: Vec<usize> = self.cells.values().flatten().copied().collect();
            everything.extend_from_slice(&self.oversized);
            everything.sort_unstable();
            everything.dedup();
            for &big in &self.oversized {
                for &other in &everything {
                    if other != big {
                        pairs.push((big.min(other), big.max(other)));
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Get statistics about the grid
    #[must_use]
    pub fn stats(&self) -> SpatialGridStats {
        let occupied_cells = self.cells.len();
        let total_entries: usize = self.cells.values().map(Vec::len).sum();

        #[allow(clippy::cast_precision_loss)]
        let average_entries_per_cell = if occupied_cells > 0 {
            total_entries as f32 / occupied_cells as f32
        } else {
            0.0
        };

        SpatialGridStats {
            occupied_cells,
            total_entries,
            oversized: self.oversized.len(),
            average_entries_per_cell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_share_cells() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert(0, &BoundingBox::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)));
        grid.insert(1, &BoundingBox::from_center_half_extents(Vec3::new(0.8, 0.0, 0.0), Vec3::splat(0.5)));
        grid.insert(2, &BoundingBox::from_center_half_extents(Vec3::new(20.0, 0.0, 0.0), Vec3::splat(0.5)));
        assert_eq!(grid.potential_pairs(), vec![(0, 1)]);
    }

    #[test]
    fn oversized_entry_pairs_with_everyone() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(3, &BoundingBox::from_center_half_extents(Vec3::ZERO, Vec3::new(50.0, 1.0, 50.0)));
        grid.insert(0, &BoundingBox::from_center_half_extents(Vec3::new(30.0, 2.0, 0.0), Vec3::splat(0.5)));
        grid.insert(1, &BoundingBox::from_center_half_extents(Vec3::new(-30.0, 2.0, 0.0), Vec3::splat(0.5)));
        assert_eq!(grid.potential_pairs(), vec![(0, 3), (1, 3)]);
        assert_eq!(grid.stats().oversized, 1);
    }
}
