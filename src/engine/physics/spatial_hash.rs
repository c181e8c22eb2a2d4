// Broad phase: uniform grid rebuilt from scratch every tick

use std::collections::{HashMap, HashSet};

use super::body::BodyHandle;
use crate::core::math::Aabb;

/// Default cell size in world units
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Initial capacity of a freshly created cell
const INITIAL_CELL_CAPACITY: usize = 4;

/// Bodies covering more cells than this skip the grid and are paired with everything
pub const MAX_CELLS_PER_BODY: u64 = 1024;

/// Spatial hash mapping grid cells to the bodies whose bounds touch them.
///
/// A body spanning several cells is stored in each of them. The grid holds no
/// state between ticks: call [`SpatialHash::clear`] and re-insert everything
/// once positions have been integrated.
///
/// Bodies too large for the grid (see [`MAX_CELLS_PER_BODY`]) go to an
/// oversize list instead and are paired with every other inserted body.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<(i32, i32), Vec<BodyHandle>>,
    inserted: Vec<BodyHandle>,
    oversized: Vec<BodyHandle>,
}

impl SpatialHash {
    /// Create an empty grid. `cell_size` must be positive.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            inserted: Vec::new(),
            oversized: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Drop all cell contents
    pub fn clear(&mut self) {
        self.cells.clear();
        self.inserted.clear();
        self.oversized.clear();
    }

    /// Bodies kept out of the grid because of their size
    pub fn oversized(&self) -> &[BodyHandle] {
        &self.oversized
    }

    /// Number of cells covered by a cell range, without overflow
    fn span(((min_x, min_y), (max_x, max_y)): ((i32, i32), (i32, i32))) -> u64 {
        let width = (i64::from(max_x) - i64::from(min_x) + 1).max(0) as u64;
        let height = (i64::from(max_y) - i64::from(min_y) + 1).max(0) as u64;
        width.saturating_mul(height)
    }

    /// Inclusive range of cells covered by `aabb`
    pub fn cell_range(&self, aabb: &Aabb) -> ((i32, i32), (i32, i32)) {
        let min = (aabb.min * self.inv_cell_size).floor();
        let max = (aabb.max * self.inv_cell_size).floor();
        ((min.x as i32, min.y as i32), (max.x as i32, max.y as i32))
    }

    /// Insert a body into every cell its bounds overlap
    pub fn insert(&mut self, handle: BodyHandle, aabb: &Aabb) {
        self.inserted.push(handle);

        let range = self.cell_range(aabb);
        if Self::span(range) > MAX_CELLS_PER_BODY {
            self.oversized.push(handle);
            return;
        }

        let ((min_x, min_y), (max_x, max_y)) = range;
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                self.cells
                    .entry((cx, cy))
                    .or_insert_with(|| Vec::with_capacity(INITIAL_CELL_CAPACITY))
                    .push(handle);
            }
        }
    }

    /// Bodies stored in the cell containing grid coordinate `(cx, cy)`
    pub fn cell(&self, cx: i32, cy: i32) -> &[BodyHandle] {
        self.cells.get(&(cx, cy)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every unordered pair of bodies sharing at least one cell.
    ///
    /// Each pair is reported once as `(smaller, larger)` handle, and the list
    /// is sorted so the result does not depend on hash map iteration order.
    pub fn potential_collisions(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut seen: HashSet<(BodyHandle, BodyHandle)> = HashSet::new();
        let mut pairs = Vec::new();

        for bodies in self.cells.values() {
            for (i, &first) in bodies.iter().enumerate() {
                for &second in &bodies[i + 1..] {
                    if first == second {
                        continue;
                    }
                    let pair = if first < second {
                        (first, second)
                    } else {
                        (second, first)
                    };
                    if seen.insert(pair) {
                        pairs.push(pair);
                    }
                }
            }
        }

        for &big in &self.oversized {
            for &other in &self.inserted {
                if big == other {
                    continue;
                }
                let pair = (big.min(other), big.max(other));
                if seen.insert(pair) {
                    pairs.push(pair);
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}
